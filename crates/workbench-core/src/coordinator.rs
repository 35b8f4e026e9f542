//! The crafting transaction: validate a request end-to-end, then commit it.
//!
//! A transaction walks a fixed chain of checks:
//!
//! 1. **Station match** -- the requester has this station open.
//! 2. **Eligibility** -- the output type is parseable, not disabled,
//!    registered, and a vehicle.
//! 3. **Recipe** -- a recipe exists for it in the current world.
//! 4. **Affordability** -- the requester holds every material.
//! 5. **Structure** -- the station holds the engine and wheels the output
//!    needs.
//! 6. **Commit** -- materials are removed, station slots consumed, and the
//!    output spawned.
//!
//! Steps 1-5 are read-only. Any failure returns a [`Rejection`] before the
//! first mutation, so a transaction either applies completely or not at all.

use crate::access::{InventoryAccess, RecipeCatalog, SpawnPosition, Spawner, StationAccess, WorldContext};
use crate::codec::CraftRequest;
use crate::eligibility::{self, EligibilityError, EligibilitySnapshot};
use crate::id::{BlockPos, EntityId, ItemTypeId, PlayerId};
use crate::item::ItemStack;
use crate::name::ResourceName;
use crate::registry::{ItemCategory, Registry, RecipeEntry};
use crate::station::StationSlot;
use crate::vehicle::{Capabilities, DEFAULT_TINT, EngineTier, EngineType};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything needed to spawn a crafted output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub output_type_id: ResourceName,
    /// Packed `0xRRGGBB`.
    pub tint: u32,
    pub tier: EngineTier,
    /// Wheels copied from the accessory slot, properties included.
    pub accessory: Option<ItemStack>,
}

/// The player submitting a request, as the authority sees them right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub id: PlayerId,
    /// Station whose menu the player currently has open.
    pub open_station: Option<BlockPos>,
}

/// Result of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crafted {
    pub entity: EntityId,
    pub position: SpawnPosition,
    pub spec: OutputSpec,
}

/// The validation step a transaction was rejected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    StationMatch,
    Eligibility,
    Recipe,
    Affordability,
    Structure,
}

/// Why a transaction was rejected. Never sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("requester has no station open")]
    NoOpenStation,
    #[error("requester has station {open} open, request names {requested}")]
    StationMismatch { open: BlockPos, requested: BlockPos },
    #[error("no station at {0}")]
    StationMissing(BlockPos),
    #[error(transparent)]
    Ineligible(#[from] EligibilityError),
    #[error("no recipe for {0} in this world")]
    NoRecipe(ResourceName),
    #[error("requester lacks {quantity} of {item:?}")]
    Unaffordable { item: ItemTypeId, quantity: u32 },
    #[error("{0} has no vehicle blueprint")]
    NotInstantiable(ResourceName),
    #[error("component slot does not hold an engine")]
    MissingComponent,
    #[error("engine is {found:?}, output needs {expected:?}")]
    ComponentMismatch { expected: EngineType, found: EngineType },
    #[error("accessory slot does not hold wheels")]
    MissingAccessory,
}

impl Rejection {
    pub fn stage(&self) -> Stage {
        match self {
            Rejection::NoOpenStation
            | Rejection::StationMismatch { .. }
            | Rejection::StationMissing(_) => Stage::StationMatch,
            Rejection::Ineligible(_) => Stage::Eligibility,
            Rejection::NoRecipe(_) => Stage::Recipe,
            Rejection::Unaffordable { .. } => Stage::Affordability,
            Rejection::NotInstantiable(_)
            | Rejection::MissingComponent
            | Rejection::ComponentMismatch { .. }
            | Rejection::MissingAccessory => Stage::Structure,
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Runs crafting transactions against one registry, catalog, eligibility
/// snapshot, and world. Build one per transaction (it only borrows) so the
/// snapshot cannot change underneath a running check.
pub struct Coordinator<'a, C: RecipeCatalog + ?Sized> {
    registry: &'a Registry,
    catalog: &'a C,
    eligibility: &'a EligibilitySnapshot,
    world: &'a WorldContext,
}

impl<'a, C: RecipeCatalog + ?Sized> Coordinator<'a, C> {
    pub fn new(
        registry: &'a Registry,
        catalog: &'a C,
        eligibility: &'a EligibilitySnapshot,
        world: &'a WorldContext,
    ) -> Self {
        Self {
            registry,
            catalog,
            eligibility,
            world,
        }
    }

    /// Validate and, if every check passes, commit one request.
    ///
    /// `station` is whatever station sits at `request.station`, if any.
    pub fn execute<I, S, W>(
        &self,
        request: &CraftRequest,
        requester: &Requester,
        inventory: &mut I,
        station: Option<&mut S>,
        spawner: &mut W,
    ) -> Result<Crafted, Rejection>
    where
        I: InventoryAccess + ?Sized,
        S: StationAccess + ?Sized,
        W: Spawner + ?Sized,
    {
        let station = check_station(request, requester, station)?;

        let resolved = eligibility::resolve(&request.output_type_id, self.eligibility, self.registry)?;
        let name = resolved.name();

        let recipe = self
            .catalog
            .lookup(name, self.world)
            .ok_or_else(|| Rejection::NoRecipe(name.clone()))?;

        let materials = total_materials(&recipe.materials);
        for entry in &materials {
            if !inventory.has(requester.id, entry.item, entry.quantity) {
                return Err(Rejection::Unaffordable {
                    item: entry.item,
                    quantity: entry.quantity,
                });
            }
        }

        let caps = resolved
            .entity
            .blueprint
            .map(|bp| bp.capabilities())
            .ok_or_else(|| Rejection::NotInstantiable(name.clone()))?;
        self.check_structure(&caps, &*station)?;

        // Commit. Nothing below may fail.
        for entry in &materials {
            inventory.remove(requester.id, entry.item, entry.quantity);
        }

        let tint = self.take_tint(&caps, &mut *station);
        let tier = match caps.component {
            Some(_) => self.take_tier(&mut *station),
            None => EngineTier::default(),
        };
        let accessory = if caps.accessory_swap {
            station.take_slot(StationSlot::Accessory)
        } else {
            None
        };

        let spec = OutputSpec {
            output_type_id: name.clone(),
            tint,
            tier,
            accessory,
        };
        let position = SpawnPosition::above_station(station.location());
        let entity = spawner.spawn(self.world, position, spec.clone());

        Ok(Crafted {
            entity,
            position,
            spec,
        })
    }

    /// Category of the item in `slot`. An empty stack counts as no item.
    fn category_in<S: StationAccess + ?Sized>(&self, station: &S, slot: StationSlot) -> Option<ItemCategory> {
        station
            .slot(slot)
            .filter(|stack| !stack.is_empty())
            .map(|stack| self.registry.item_category(stack.item_type))
    }

    fn check_structure<S: StationAccess + ?Sized>(
        &self,
        caps: &Capabilities,
        station: &S,
    ) -> Result<(), Rejection> {
        if let Some(expected) = caps.component {
            match self.category_in(station, StationSlot::Component) {
                Some(ItemCategory::Engine { engine_type, .. }) => {
                    if !caps.accepts_engine(engine_type) {
                        return Err(Rejection::ComponentMismatch {
                            expected,
                            found: engine_type,
                        });
                    }
                }
                _ => return Err(Rejection::MissingComponent),
            }
        }

        if caps.accessory_swap
            && !matches!(
                self.category_in(station, StationSlot::Accessory),
                Some(ItemCategory::Wheel { .. })
            )
        {
            return Err(Rejection::MissingAccessory);
        }

        Ok(())
    }

    /// A dye is consumed only by colorable outputs. Anything else in the
    /// decoration slot stays put and the default tint applies.
    fn take_tint<S: StationAccess + ?Sized>(&self, caps: &Capabilities, station: &mut S) -> u32 {
        if !caps.colorable {
            return DEFAULT_TINT;
        }
        match self.category_in(station, StationSlot::Decoration) {
            Some(ItemCategory::Dye { color }) => {
                station.take_slot(StationSlot::Decoration);
                color.rgb()
            }
            _ => DEFAULT_TINT,
        }
    }

    fn take_tier<S: StationAccess + ?Sized>(&self, station: &mut S) -> EngineTier {
        match self.category_in(station, StationSlot::Component) {
            Some(ItemCategory::Engine { tier, .. }) => {
                station.take_slot(StationSlot::Component);
                tier
            }
            _ => EngineTier::default(),
        }
    }
}

fn check_station<'s, S: StationAccess + ?Sized>(
    request: &CraftRequest,
    requester: &Requester,
    station: Option<&'s mut S>,
) -> Result<&'s mut S, Rejection> {
    let open = requester.open_station.ok_or(Rejection::NoOpenStation)?;
    if open != request.station {
        return Err(Rejection::StationMismatch {
            open,
            requested: request.station,
        });
    }
    match station {
        Some(station) if station.location() == request.station => Ok(station),
        _ => Err(Rejection::StationMissing(request.station)),
    }
}

/// Sum repeated materials so affordability is checked against the total
/// that commit will remove.
fn total_materials(materials: &[RecipeEntry]) -> Vec<RecipeEntry> {
    let mut totals: Vec<RecipeEntry> = Vec::with_capacity(materials.len());
    for entry in materials {
        match totals.iter_mut().find(|t| t.item == entry.item) {
            Some(total) => total.quantity = total.quantity.saturating_add(entry.quantity),
            None => totals.push(*entry),
        }
    }
    totals
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::PlayerInventory;
    use crate::registry::RegistryBuilder;
    use crate::station::Workstation;
    use crate::test_utils::*;
    use crate::vehicle::{DyeColor, VehicleBlueprint};
    use std::cell::Cell;

    /// Inventory that counts every query.
    struct CountingInventory {
        inner: PlayerInventory,
        queries: Cell<u32>,
        removals: u32,
    }

    impl CountingInventory {
        fn new(inner: PlayerInventory) -> Self {
            Self {
                inner,
                queries: Cell::new(0),
                removals: 0,
            }
        }
    }

    impl InventoryAccess for CountingInventory {
        fn has(&self, _holder: PlayerId, item: ItemTypeId, quantity: u32) -> bool {
            self.queries.set(self.queries.get() + 1);
            self.inner.contains(item, quantity)
        }

        fn remove(&mut self, _holder: PlayerId, item: ItemTypeId, quantity: u32) {
            self.removals += 1;
            let _ = self.inner.remove(item, quantity);
        }
    }

    struct Fixture {
        registry: Registry,
        snapshot: EligibilitySnapshot,
        world: WorldContext,
        requester: Requester,
        inventory: CountingInventory,
        station: Workstation,
        spawner: RecordingSpawner,
    }

    impl Fixture {
        fn new() -> Self {
            let registry = vehicle_registry();
            let snapshot = EligibilitySnapshot::from_registry(&registry);
            Self {
                registry,
                snapshot,
                world: WorldContext::default(),
                requester: Requester {
                    id: test_player(),
                    open_station: Some(STATION_POS),
                },
                inventory: CountingInventory::new(PlayerInventory::default()),
                station: Workstation::new(STATION_POS),
                spawner: RecordingSpawner::default(),
            }
        }

        fn give(&mut self, item: &str, quantity: u32) {
            let id = item_id(&self.registry, item);
            assert_eq!(self.inventory.inner.add(ItemStack::new(id, quantity)), 0);
        }

        fn give_cart_materials(&mut self) {
            self.give(PLANKS, 8);
            self.give(IRON_INGOT, 2);
        }

        fn put(&mut self, slot: StationSlot, item: &str) {
            self.put_n(slot, item, 1);
        }

        fn put_n(&mut self, slot: StationSlot, item: &str, quantity: u32) {
            let id = item_id(&self.registry, item);
            self.station.insert(slot, ItemStack::new(id, quantity));
        }

        fn craft(&mut self, output: &str) -> Result<Crafted, Rejection> {
            let coordinator = Coordinator::new(&self.registry, &self.registry, &self.snapshot, &self.world);
            let request = CraftRequest::new(output, STATION_POS);
            coordinator.execute(
                &request,
                &self.requester,
                &mut self.inventory,
                Some(&mut self.station),
                &mut self.spawner,
            )
        }
    }

    #[test]
    fn basic_cart_uses_defaults() {
        let mut fx = Fixture::new();
        fx.give_cart_materials();

        let crafted = fx.craft(BASIC_CART).unwrap();
        assert_eq!(crafted.spec.tint, DEFAULT_TINT);
        assert_eq!(crafted.spec.tier, EngineTier::Iron);
        assert!(crafted.spec.accessory.is_none());
        assert_eq!(crafted.position, SpawnPosition::above_station(STATION_POS));
        assert!(fx.inventory.inner.is_empty());
        assert_eq!(fx.spawner.spawned.len(), 1);
        assert!(fx.station.is_empty());
    }

    #[test]
    fn missing_material_rejects_without_mutation() {
        let mut fx = Fixture::new();
        fx.give(PLANKS, 8);
        fx.give(IRON_INGOT, 1);
        let before = fx.inventory.inner.clone();

        let err = fx.craft(BASIC_CART).unwrap_err();
        assert!(matches!(err, Rejection::Unaffordable { quantity: 2, .. }));
        assert_eq!(err.stage(), Stage::Affordability);
        assert_eq!(fx.inventory.inner, before);
        assert_eq!(fx.inventory.removals, 0);
        assert!(fx.spawner.spawned.is_empty());
    }

    #[test]
    fn repeated_materials_are_checked_as_a_total() {
        let mut fx = Fixture::new();
        let mut b = RegistryBuilder::new();
        let iron = b
            .register_item(IRON_INGOT, crate::registry::ItemCategory::Plain)
            .unwrap();
        b.register_vehicle("pkg:twin", VehicleBlueprint::Unpowered { colorable: false })
            .unwrap();
        b.register_recipe(
            "pkg:twin",
            vec![
                RecipeEntry { item: iron, quantity: 5 },
                RecipeEntry { item: iron, quantity: 5 },
            ],
            None,
        )
        .unwrap();
        fx.registry = b.build().unwrap();
        fx.snapshot = EligibilitySnapshot::from_registry(&fx.registry);
        fx.give(IRON_INGOT, 8);

        let err = fx.craft("pkg:twin").unwrap_err();
        assert_eq!(err, Rejection::Unaffordable { item: iron, quantity: 10 });
        assert_eq!(fx.inventory.inner.count(iron), 8);
    }

    #[test]
    fn disabled_output_skips_inventory() {
        let mut fx = Fixture::new();
        fx.give_cart_materials();
        fx.snapshot = fx.snapshot.clone().with_disabled([name(BASIC_CART)]);

        let err = fx.craft(BASIC_CART).unwrap_err();
        assert_eq!(err.stage(), Stage::Eligibility);
        assert_eq!(fx.inventory.queries.get(), 0);
    }

    #[test]
    fn station_mismatch_rejects_before_anything_else() {
        let mut fx = Fixture::new();
        fx.give_cart_materials();
        fx.requester.open_station = Some(BlockPos::new(99, 64, 99));

        let err = fx.craft(BASIC_CART).unwrap_err();
        assert!(matches!(err, Rejection::StationMismatch { .. }));
        assert_eq!(fx.inventory.queries.get(), 0);
    }

    #[test]
    fn no_open_station_rejects() {
        let mut fx = Fixture::new();
        fx.give_cart_materials();
        fx.requester.open_station = None;
        assert_eq!(fx.craft(BASIC_CART).unwrap_err(), Rejection::NoOpenStation);
    }

    #[test]
    fn missing_station_rejects() {
        let fx = Fixture::new();
        let coordinator = Coordinator::new(&fx.registry, &fx.registry, &fx.snapshot, &fx.world);
        let mut inventory = SoloInventory::new(fx.requester.id);
        let mut spawner = RecordingSpawner::default();
        let err = coordinator
            .execute(
                &CraftRequest::new(BASIC_CART, STATION_POS),
                &fx.requester,
                &mut inventory,
                None::<&mut Workstation>,
                &mut spawner,
            )
            .unwrap_err();
        assert_eq!(err, Rejection::StationMissing(STATION_POS));
    }

    #[test]
    fn world_restricted_recipe_is_invisible_elsewhere() {
        let mut fx = Fixture::new();
        fx.give(IRON_INGOT, 4);
        assert_eq!(
            fx.craft(NETHER_SLED).unwrap_err(),
            Rejection::NoRecipe(name(NETHER_SLED))
        );
        fx.world = WorldContext::new("nether");
        assert!(fx.craft(NETHER_SLED).is_ok());
    }

    #[test]
    fn powered_vehicle_needs_engine() {
        let mut fx = Fixture::new();
        fx.give(IRON_INGOT, 6);
        fx.put(StationSlot::Accessory, STANDARD_WHEEL);

        assert_eq!(fx.craft(GO_KART).unwrap_err(), Rejection::MissingComponent);

        fx.put(StationSlot::Component, PLANKS);
        assert_eq!(fx.craft(GO_KART).unwrap_err(), Rejection::MissingComponent);
        assert_eq!(fx.inventory.inner.count(item_id(&fx.registry, IRON_INGOT)), 6);
    }

    #[test]
    fn empty_stacks_do_not_satisfy_structure() {
        let mut fx = Fixture::new();
        fx.give(IRON_INGOT, 6);
        fx.put_n(StationSlot::Component, SMALL_ENGINE_DIAMOND, 0);
        fx.put_n(StationSlot::Accessory, SPORTS_WHEEL, 0);
        fx.put_n(StationSlot::Decoration, RED_DYE, 0);
        let station_before = fx.station.clone();

        assert_eq!(fx.craft(GO_KART).unwrap_err(), Rejection::MissingComponent);

        fx.put(StationSlot::Component, SMALL_ENGINE_DIAMOND);
        assert_eq!(fx.craft(GO_KART).unwrap_err(), Rejection::MissingAccessory);

        assert_eq!(fx.inventory.removals, 0);
        assert!(fx.spawner.spawned.is_empty());
        assert_eq!(
            fx.station.slot(StationSlot::Accessory),
            station_before.slot(StationSlot::Accessory)
        );
    }

    #[test]
    fn empty_dye_stack_gives_default_tint() {
        let mut fx = Fixture::new();
        fx.give_cart_materials();
        fx.put_n(StationSlot::Decoration, RED_DYE, 0);

        let crafted = fx.craft(BASIC_CART).unwrap();
        assert_eq!(crafted.spec.tint, DEFAULT_TINT);
        assert_eq!(fx.station.slot(StationSlot::Decoration).map(|s| s.quantity), Some(0));
    }

    #[test]
    fn engine_category_must_match() {
        let mut fx = Fixture::new();
        fx.give(IRON_INGOT, 6);
        fx.put(StationSlot::Component, LARGE_ENGINE_GOLD);
        fx.put(StationSlot::Accessory, STANDARD_WHEEL);

        assert_eq!(
            fx.craft(GO_KART).unwrap_err(),
            Rejection::ComponentMismatch {
                expected: EngineType::SmallMotor,
                found: EngineType::LargeMotor,
            }
        );
        assert!(fx.station.slot(StationSlot::Component).is_some());
        assert!(fx.station.slot(StationSlot::Accessory).is_some());
    }

    #[test]
    fn wheel_swap_needs_wheels() {
        let mut fx = Fixture::new();
        fx.give(IRON_INGOT, 6);
        fx.put(StationSlot::Component, SMALL_ENGINE_IRON);

        assert_eq!(fx.craft(GO_KART).unwrap_err(), Rejection::MissingAccessory);
        assert!(fx.station.slot(StationSlot::Component).is_some());
    }

    #[test]
    fn go_kart_consumes_engine_and_wheels() {
        let mut fx = Fixture::new();
        fx.give(IRON_INGOT, 6);
        fx.put(StationSlot::Component, SMALL_ENGINE_DIAMOND);
        let wheel = ItemStack::new(item_id(&fx.registry, SPORTS_WHEEL), 4)
            .with_property(WHEEL_COLOR, crate::fixed::Fixed64::from_num(DyeColor::Lime.rgb()));
        fx.station.insert(StationSlot::Accessory, wheel.clone());

        let crafted = fx.craft(GO_KART).unwrap();
        assert_eq!(crafted.spec.tier, EngineTier::Diamond);
        assert_eq!(crafted.spec.accessory, Some(wheel));
        assert!(fx.station.is_empty());
    }

    #[test]
    fn any_engine_fits_unspecified_category() {
        let mut fx = Fixture::new();
        fx.give(IRON_INGOT, 10);
        fx.put(StationSlot::Component, LARGE_ENGINE_GOLD);

        let crafted = fx.craft(UTILITY_TRUCK).unwrap();
        assert_eq!(crafted.spec.tier, EngineTier::Gold);
        assert!(fx.station.slot(StationSlot::Component).is_none());
    }

    #[test]
    fn dye_tints_colorable_output() {
        let mut fx = Fixture::new();
        fx.give_cart_materials();
        fx.put(StationSlot::Decoration, RED_DYE);

        let crafted = fx.craft(BASIC_CART).unwrap();
        assert_eq!(crafted.spec.tint, DyeColor::Red.rgb());
        assert!(fx.station.slot(StationSlot::Decoration).is_none());
        assert_eq!(fx.inventory.removals, 2);
    }

    #[test]
    fn non_dye_in_decoration_slot_is_left_alone() {
        let mut fx = Fixture::new();
        fx.give_cart_materials();
        fx.put(StationSlot::Decoration, PLANKS);

        let crafted = fx.craft(BASIC_CART).unwrap();
        assert_eq!(crafted.spec.tint, DEFAULT_TINT);
        assert!(fx.station.slot(StationSlot::Decoration).is_some());
    }

    #[test]
    fn non_colorable_output_keeps_dye() {
        let mut fx = Fixture::new();
        fx.give(IRON_INGOT, 4);
        fx.world = WorldContext::new("nether");
        fx.put(StationSlot::Decoration, RED_DYE);

        let crafted = fx.craft(NETHER_SLED).unwrap();
        assert_eq!(crafted.spec.tint, DEFAULT_TINT);
        assert!(fx.station.slot(StationSlot::Decoration).is_some());
    }

    #[test]
    fn blueprintless_vehicle_is_not_instantiable() {
        let mut fx = Fixture::new();
        fx.give(PLANKS, 1);
        let before = fx.inventory.inner.clone();

        let err = fx.craft(BROKEN_WAGON).unwrap_err();
        assert_eq!(err, Rejection::NotInstantiable(name(BROKEN_WAGON)));
        assert_eq!(err.stage(), Stage::Structure);
        assert_eq!(fx.inventory.inner, before);
    }

    #[test]
    fn rejection_is_repeatable() {
        let mut fx = Fixture::new();
        fx.give(PLANKS, 8);
        let first = fx.craft(BASIC_CART).unwrap_err();
        let second = fx.craft(BASIC_CART).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(fx.inventory.removals, 0);
    }

    #[test]
    fn total_materials_preserves_first_occurrence_order() {
        let a = ItemTypeId(1);
        let b = ItemTypeId(2);
        let totals = total_materials(&[
            RecipeEntry { item: b, quantity: 1 },
            RecipeEntry { item: a, quantity: 2 },
            RecipeEntry { item: b, quantity: 3 },
        ]);
        assert_eq!(
            totals,
            vec![
                RecipeEntry { item: b, quantity: 4 },
                RecipeEntry { item: a, quantity: 2 },
            ]
        );
    }
}
