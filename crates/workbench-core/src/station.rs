use crate::access::StationAccess;
use crate::id::BlockPos;
use crate::item::ItemStack;
use serde::{Deserialize, Serialize};

/// Number of indexed slots on a workstation.
pub const STATION_SLOTS: usize = 3;

/// Fixed slot roles on a workstation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationSlot {
    /// Dye used to tint the output.
    Decoration = 0,
    /// Engine fitted to powered outputs.
    Component = 1,
    /// Wheels fitted to outputs that support swapping them.
    Accessory = 2,
}

impl StationSlot {
    pub const ALL: [StationSlot; STATION_SLOTS] = [
        StationSlot::Decoration,
        StationSlot::Component,
        StationSlot::Accessory,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// A vehicle workstation placed in the world.
///
/// Slot contents are not validated on insert; the crafting coordinator
/// checks each slot's item category when a transaction reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workstation {
    location: BlockPos,
    slots: [Option<ItemStack>; STATION_SLOTS],
}

impl Workstation {
    pub fn new(location: BlockPos) -> Self {
        Self {
            location,
            slots: Default::default(),
        }
    }

    /// Place a stack in a slot, returning whatever was there.
    pub fn insert(&mut self, slot: StationSlot, stack: ItemStack) -> Option<ItemStack> {
        self.slots[slot.index()].replace(stack)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

impl StationAccess for Workstation {
    fn location(&self) -> BlockPos {
        self.location
    }

    fn slot(&self, slot: StationSlot) -> Option<&ItemStack> {
        self.slots[slot.index()].as_ref()
    }

    fn set_slot(&mut self, slot: StationSlot, stack: Option<ItemStack>) {
        self.slots[slot.index()] = stack;
    }

    fn take_slot(&mut self, slot: StationSlot) -> Option<ItemStack> {
        self.slots[slot.index()].take()
    }
}
