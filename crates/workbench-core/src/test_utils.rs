//! Shared test helpers for unit tests and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests and, through the `test-utils` feature, in
//! other crates' tests.

use crate::access::{InventoryAccess, SpawnPosition, Spawner, WorldContext};
use crate::coordinator::OutputSpec;
use crate::id::*;
use crate::item::PlayerInventory;
use crate::name::ResourceName;
use crate::registry::{ItemCategory, RecipeEntry, Registry, RegistryBuilder};
use crate::vehicle::{DyeColor, EngineTier, EngineType, VehicleBlueprint, WheelType};
use slotmap::SlotMap;

// ===========================================================================
// Item names
// ===========================================================================

pub const PLANKS: &str = "pkg:planks";
pub const IRON_INGOT: &str = "pkg:iron_ingot";
pub const RED_DYE: &str = "pkg:red_dye";
pub const SMALL_ENGINE_IRON: &str = "pkg:small_engine_iron";
pub const SMALL_ENGINE_DIAMOND: &str = "pkg:small_engine_diamond";
pub const LARGE_ENGINE_GOLD: &str = "pkg:large_engine_gold";
pub const STANDARD_WHEEL: &str = "pkg:standard_wheel";
pub const SPORTS_WHEEL: &str = "pkg:sports_wheel";

/// Property carried on wheel stacks in tests.
pub const WHEEL_COLOR: PropertyId = PropertyId(0);

// ===========================================================================
// Entity names
// ===========================================================================

/// Unpowered, colorable. 8 planks + 2 iron.
pub const BASIC_CART: &str = "pkg:basic_cart";
/// Small motor, wheels swappable. 6 iron.
pub const GO_KART: &str = "pkg:go_kart";
/// Any engine, fixed wheels. 10 iron.
pub const UTILITY_TRUCK: &str = "pkg:utility_truck";
/// Unpowered, not colorable, nether only. 4 iron.
pub const NETHER_SLED: &str = "pkg:nether_sled";
/// Registered as a vehicle but has no blueprint. 1 plank.
pub const BROKEN_WAGON: &str = "pkg:broken_wagon";
/// Registered entity that is not a vehicle.
pub const COW: &str = "pkg:cow";

/// Where fixtures place their workstation.
pub const STATION_POS: BlockPos = BlockPos::new(4, 64, -7);

// ===========================================================================
// Registry
// ===========================================================================

/// Registry with every item and vehicle named above.
pub fn vehicle_registry() -> Registry {
    vehicle_registry_builder()
        .build()
        .expect("fixture registry is valid")
}

/// The builder behind [`vehicle_registry`], for tests that add to it.
pub fn vehicle_registry_builder() -> RegistryBuilder {
    let mut b = RegistryBuilder::new();

    let planks = b.register_item(PLANKS, ItemCategory::Plain).unwrap();
    let iron = b.register_item(IRON_INGOT, ItemCategory::Plain).unwrap();
    b.register_item(RED_DYE, ItemCategory::Dye { color: DyeColor::Red })
        .unwrap();
    for (name, engine_type, tier) in [
        (SMALL_ENGINE_IRON, EngineType::SmallMotor, EngineTier::Iron),
        (SMALL_ENGINE_DIAMOND, EngineType::SmallMotor, EngineTier::Diamond),
        (LARGE_ENGINE_GOLD, EngineType::LargeMotor, EngineTier::Gold),
    ] {
        b.register_item(name, ItemCategory::Engine { engine_type, tier })
            .unwrap();
    }
    b.register_item(
        STANDARD_WHEEL,
        ItemCategory::Wheel {
            wheel_type: WheelType::Standard,
        },
    )
    .unwrap();
    b.register_item(
        SPORTS_WHEEL,
        ItemCategory::Wheel {
            wheel_type: WheelType::Sports,
        },
    )
    .unwrap();

    b.register_vehicle(BASIC_CART, VehicleBlueprint::Unpowered { colorable: true })
        .unwrap();
    b.register_recipe(
        BASIC_CART,
        vec![
            RecipeEntry { item: planks, quantity: 8 },
            RecipeEntry { item: iron, quantity: 2 },
        ],
        None,
    )
    .unwrap();

    b.register_vehicle(
        GO_KART,
        VehicleBlueprint::Powered {
            colorable: true,
            engine_type: EngineType::SmallMotor,
            can_change_wheels: true,
        },
    )
    .unwrap();
    b.register_recipe(GO_KART, vec![RecipeEntry { item: iron, quantity: 6 }], None)
        .unwrap();

    b.register_vehicle(
        UTILITY_TRUCK,
        VehicleBlueprint::Powered {
            colorable: true,
            engine_type: EngineType::None,
            can_change_wheels: false,
        },
    )
    .unwrap();
    b.register_recipe(
        UTILITY_TRUCK,
        vec![RecipeEntry { item: iron, quantity: 10 }],
        None,
    )
    .unwrap();

    b.register_vehicle(NETHER_SLED, VehicleBlueprint::Unpowered { colorable: false })
        .unwrap();
    b.register_recipe(
        NETHER_SLED,
        vec![RecipeEntry { item: iron, quantity: 4 }],
        Some(vec!["nether".to_string()]),
    )
    .unwrap();

    b.register_vehicle(BROKEN_WAGON, VehicleBlueprint::Unpowered { colorable: true })
        .unwrap();
    b.mutate_blueprint(BROKEN_WAGON, |bp| *bp = None).unwrap();
    b.register_recipe(
        BROKEN_WAGON,
        vec![RecipeEntry { item: planks, quantity: 1 }],
        None,
    )
    .unwrap();

    b.register_entity(COW, None).unwrap();

    b
}

/// Item id by name. Panics if the fixture registry lacks it.
pub fn item_id(registry: &Registry, item: &str) -> ItemTypeId {
    registry
        .item_id(&name(item))
        .unwrap_or_else(|| panic!("{item} is not registered"))
}

pub fn name(raw: &str) -> ResourceName {
    ResourceName::parse(raw).expect("fixture name is valid")
}

// ===========================================================================
// Players and world stand-ins
// ===========================================================================

/// A stable player id. Every call returns the same key.
pub fn test_player() -> PlayerId {
    let mut players: SlotMap<PlayerId, ()> = SlotMap::with_key();
    players.insert(())
}

/// One player's inventory behind the [`InventoryAccess`] seam. Queries for
/// any other holder see nothing.
#[derive(Debug, Clone)]
pub struct SoloInventory {
    pub holder: PlayerId,
    pub inventory: PlayerInventory,
}

impl SoloInventory {
    pub fn new(holder: PlayerId) -> Self {
        Self {
            holder,
            inventory: PlayerInventory::default(),
        }
    }
}

impl InventoryAccess for SoloInventory {
    fn has(&self, holder: PlayerId, item: ItemTypeId, quantity: u32) -> bool {
        holder == self.holder && self.inventory.contains(item, quantity)
    }

    fn remove(&mut self, holder: PlayerId, item: ItemTypeId, quantity: u32) {
        if holder == self.holder {
            let _ = self.inventory.remove(item, quantity);
        }
    }
}

/// Spawner that records every call.
#[derive(Debug, Default)]
pub struct RecordingSpawner {
    ids: SlotMap<EntityId, ()>,
    pub spawned: Vec<(EntityId, SpawnPosition, OutputSpec)>,
}

impl Spawner for RecordingSpawner {
    fn spawn(&mut self, _world: &WorldContext, position: SpawnPosition, spec: OutputSpec) -> EntityId {
        let entity = self.ids.insert(());
        self.spawned.push((entity, position, spec));
        entity
    }
}
