//! Property-based tests for the crafting pipeline.
//!
//! Generates random inventories, station contents, deny-lists, and requests,
//! then checks that every transaction either applies completely or leaves
//! the world untouched.

use std::sync::Arc;

use proptest::prelude::*;
use workbench_core::access::{RecipeCatalog, StationAccess, WorldContext};
use workbench_core::codec::{CodecError, CraftRequest, MAX_OUTPUT_TYPE_LEN};
use workbench_core::eligibility::EligibilitySnapshot;
use workbench_core::id::BlockPos;
use workbench_core::item::{ItemStack, PlayerInventory};
use workbench_core::journal::CraftEvent;
use workbench_core::station::StationSlot;
use workbench_core::test_utils::*;
use workbench_core::workshop::Workshop;

// ===========================================================================
// Generators
// ===========================================================================

const OUTPUTS: [&str; 8] = [
    BASIC_CART,
    GO_KART,
    UTILITY_TRUCK,
    NETHER_SLED,
    BROKEN_WAGON,
    COW,
    "pkg:hovercraft",
    "Not A Name",
];

const STATION_ITEMS: [&str; 6] = [
    PLANKS,
    RED_DYE,
    SMALL_ENGINE_IRON,
    LARGE_ENGINE_GOLD,
    STANDARD_WHEEL,
    SPORTS_WHEEL,
];

#[derive(Debug, Clone)]
struct Case {
    planks: u32,
    iron: u32,
    slots: [Option<usize>; 3],
    output: usize,
    menu_open: bool,
    wrong_station: bool,
    disabled: Vec<usize>,
}

fn arb_case() -> impl Strategy<Value = Case> {
    (
        0..20u32,
        0..16u32,
        proptest::array::uniform3(proptest::option::of(0..STATION_ITEMS.len())),
        0..OUTPUTS.len(),
        proptest::bool::weighted(0.9),
        proptest::bool::weighted(0.1),
        proptest::collection::vec(0..5usize, 0..3),
    )
        .prop_map(
            |(planks, iron, slots, output, menu_open, wrong_station, disabled)| Case {
                planks,
                iron,
                slots,
                output,
                menu_open,
                wrong_station,
                disabled,
            },
        )
}

fn setup(case: &Case) -> (Workshop, workbench_core::id::PlayerId) {
    let registry = vehicle_registry();
    let disabled: Vec<_> = case.disabled.iter().map(|&i| name(OUTPUTS[i])).collect();
    let snapshot = EligibilitySnapshot::from_registry(&registry).with_disabled(disabled);
    let mut shop = Workshop::new(Arc::new(registry), snapshot, Default::default());

    let mut inventory = PlayerInventory::default();
    for (item, quantity) in [(PLANKS, case.planks), (IRON_INGOT, case.iron)] {
        if quantity > 0 {
            let id = item_id(shop.registry(), item);
            assert_eq!(inventory.add(ItemStack::new(id, quantity)), 0);
        }
    }
    let player = shop.add_player(inventory);

    let stacks: Vec<Option<ItemStack>> = case
        .slots
        .iter()
        .map(|slot| slot.map(|i| ItemStack::new(item_id(shop.registry(), STATION_ITEMS[i]), 1)))
        .collect();
    let station = shop.place_station(STATION_POS);
    for (slot, stack) in StationSlot::ALL.into_iter().zip(stacks) {
        if let Some(stack) = stack {
            station.insert(slot, stack);
        }
    }

    if case.menu_open {
        assert!(shop.open_station(player, STATION_POS));
    }
    (shop, player)
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A rejected transaction changes nothing. A committed one spawns
    /// exactly one crate, removes exactly the recipe's materials, and clears
    /// only the station slots the output consumed.
    #[test]
    fn transaction_is_all_or_nothing(case in arb_case()) {
        let (mut shop, player) = setup(&case);
        let inventory_before = shop.player(player).unwrap().inventory.clone();
        let station_before = shop.station(STATION_POS).unwrap().clone();

        let target = if case.wrong_station { BlockPos::new(0, 0, 0) } else { STATION_POS };
        shop.submit(player, CraftRequest::new(OUTPUTS[case.output], target));
        prop_assert_eq!(shop.process_pending(), 1);

        let inventory_after = &shop.player(player).unwrap().inventory;
        match shop.journal().last().unwrap() {
            CraftEvent::Rejected { .. } => {
                prop_assert_eq!(inventory_after, &inventory_before);
                prop_assert_eq!(shop.station(STATION_POS).unwrap(), &station_before);
                prop_assert_eq!(shop.spawned_count(), 0);
            }
            CraftEvent::Crafted { entity, spec, .. } => {
                prop_assert!(shop.spawned(*entity).is_some());
                prop_assert_eq!(shop.spawned_count(), 1);

                let registry = shop.registry();
                let recipe = registry.lookup(&spec.output_type_id, &WorldContext::default()).unwrap();
                for item in [PLANKS, IRON_INGOT] {
                    let id = item_id(registry, item);
                    let expected: u32 = recipe
                        .materials
                        .iter()
                        .filter(|entry| entry.item == id)
                        .map(|entry| entry.quantity)
                        .sum();
                    prop_assert_eq!(inventory_before.count(id) - inventory_after.count(id), expected);
                }

                let entity_type = registry.entity_id(&spec.output_type_id).unwrap();
                let caps = registry.get_entity(entity_type).unwrap().blueprint.unwrap().capabilities();
                let red_dye = item_id(registry, RED_DYE);
                let dyed = caps.colorable
                    && station_before.slot(StationSlot::Decoration).map(|s| s.item_type) == Some(red_dye);
                let station_after = shop.station(STATION_POS).unwrap();
                for (slot, consumed) in [
                    (StationSlot::Decoration, dyed),
                    (StationSlot::Component, caps.component.is_some()),
                    (StationSlot::Accessory, caps.accessory_swap),
                ] {
                    if consumed {
                        prop_assert!(station_after.slot(slot).is_none(), "{:?} not cleared", slot);
                    } else {
                        prop_assert_eq!(station_after.slot(slot), station_before.slot(slot));
                    }
                }
            }
            CraftEvent::Dropped { .. } => prop_assert!(false, "decoded request was dropped"),
        }
    }

    /// Rejections are deterministic: resubmitting gives the same reason.
    #[test]
    fn rejection_is_repeatable(case in arb_case()) {
        let (mut shop, player) = setup(&case);
        shop.submit(player, CraftRequest::new(OUTPUTS[case.output], STATION_POS));
        shop.process_pending();
        if let Some(first) = shop.journal().last().and_then(CraftEvent::rejection).cloned() {
            shop.submit(player, CraftRequest::new(OUTPUTS[case.output], STATION_POS));
            shop.process_pending();
            let second = shop.journal().last().and_then(CraftEvent::rejection).cloned();
            prop_assert_eq!(Some(first), second);
        }
    }

    /// Decoding arbitrary bytes never panics.
    #[test]
    fn decode_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..200)) {
        let _ = CraftRequest::decode(&bytes);
    }

    /// Any identifier within the limit survives the wire unchanged.
    #[test]
    fn encode_decode_preserves_request(
        id in "[a-z0-9_:/.-]{0,128}",
        x in any::<i32>(),
        y in any::<i32>(),
        z in any::<i32>(),
    ) {
        let request = CraftRequest::new(id, BlockPos::new(x, y, z));
        let bytes = request.encode().unwrap();
        prop_assert_eq!(CraftRequest::decode(&bytes).unwrap(), request);
    }

    /// Identifiers over the limit are rejected at encode, never truncated.
    #[test]
    fn oversized_identifier_rejected(extra in 1usize..64) {
        let request = CraftRequest::new("a".repeat(MAX_OUTPUT_TYPE_LEN + extra), BlockPos::default());
        prop_assert_eq!(request.encode(), Err(CodecError::TooLong(MAX_OUTPUT_TYPE_LEN + extra)));
    }
}
