//! Seams between the crafting coordinator and the world it mutates.
//!
//! The coordinator only ever touches recipes, inventories, stations, and
//! the spawner through these traits. The [`Workshop`](crate::workshop::Workshop)
//! wires in-memory implementations; tests substitute recording ones.

use crate::coordinator::OutputSpec;
use crate::fixed::Fixed64;
use crate::id::{BlockPos, EntityId, ItemTypeId, PlayerId};
use crate::item::ItemStack;
use crate::name::ResourceName;
use crate::registry::VehicleRecipe;
use crate::station::StationSlot;

/// The world a transaction runs in. Recipes may be restricted to some worlds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorldContext {
    pub name: String,
}

impl WorldContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for WorldContext {
    fn default() -> Self {
        Self::new("overworld")
    }
}

/// Where a crafted output appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPosition {
    pub x: Fixed64,
    pub y: Fixed64,
    pub z: Fixed64,
}

impl SpawnPosition {
    /// Centre of the block, lifted just above a full-height station.
    pub fn above_station(pos: BlockPos) -> Self {
        let half = Fixed64::from_num(0.5);
        Self {
            x: Fixed64::from_num(pos.x) + half,
            y: Fixed64::from_num(pos.y) + Fixed64::from_num(1.125),
            z: Fixed64::from_num(pos.z) + half,
        }
    }
}

pub trait RecipeCatalog {
    /// The recipe producing `output` in `world`, if one is visible there.
    fn lookup(&self, output: &ResourceName, world: &WorldContext) -> Option<&VehicleRecipe>;
}

pub trait InventoryAccess {
    fn has(&self, holder: PlayerId, item: ItemTypeId, quantity: u32) -> bool;

    /// Only called after `has` returned true in the same transaction.
    fn remove(&mut self, holder: PlayerId, item: ItemTypeId, quantity: u32);
}

pub trait StationAccess {
    fn location(&self) -> BlockPos;

    fn slot(&self, slot: StationSlot) -> Option<&ItemStack>;

    fn set_slot(&mut self, slot: StationSlot, stack: Option<ItemStack>);

    /// Read and clear a slot.
    fn take_slot(&mut self, slot: StationSlot) -> Option<ItemStack> {
        let taken = self.slot(slot).cloned();
        self.set_slot(slot, None);
        taken
    }
}

pub trait Spawner {
    /// Fire-and-forget; the returned id is for bookkeeping only.
    fn spawn(&mut self, world: &WorldContext, position: SpawnPosition, spec: OutputSpec) -> EntityId;
}
