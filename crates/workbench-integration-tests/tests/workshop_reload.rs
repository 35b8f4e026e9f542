//! The workshop loop with configuration reloads from other threads and
//! from data files.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use workbench_core::codec::CraftRequest;
use workbench_core::coordinator::Rejection;
use workbench_core::eligibility::{EligibilityError, EligibilitySnapshot};
use workbench_core::item::{ItemStack, PlayerInventory};
use workbench_core::journal::CraftEvent;
use workbench_core::test_utils::*;
use workbench_core::workshop::Workshop;
use workbench_data::{load_game_data, reload_eligibility};

fn stocked_workshop() -> (Workshop, workbench_core::id::PlayerId) {
    let registry = Arc::new(vehicle_registry());
    let mut inventory = PlayerInventory::default();
    for (item, quantity) in [(PLANKS, 32), (IRON_INGOT, 8)] {
        assert_eq!(inventory.add(ItemStack::new(item_id(&registry, item), quantity)), 0);
    }
    let mut shop = Workshop::with_registry(registry);
    shop.place_station(STATION_POS);
    let player = shop.add_player(inventory);
    assert!(shop.open_station(player, STATION_POS));
    (shop, player)
}

fn send(shop: &mut Workshop, player: workbench_core::id::PlayerId, output: &str) {
    let bytes = CraftRequest::new(output, STATION_POS).encode().unwrap();
    shop.handle_packet(player, &bytes).unwrap();
}

#[test]
fn reload_from_another_thread_applies_to_next_transaction() {
    let (mut shop, player) = stocked_workshop();

    send(&mut shop, player, BASIC_CART);
    shop.process_pending();

    let store = shop.eligibility();
    let registry = Arc::new(vehicle_registry());
    let admin = thread::spawn(move || {
        let snapshot = EligibilitySnapshot::from_registry(&registry).with_disabled([name(BASIC_CART)]);
        store.reload(snapshot);
    });
    admin.join().unwrap();

    send(&mut shop, player, BASIC_CART);
    shop.process_pending();

    let outcomes: Vec<_> = shop.journal().iter().collect();
    assert!(matches!(outcomes[0], CraftEvent::Crafted { .. }));
    assert!(matches!(
        outcomes[1].rejection(),
        Some(Rejection::Ineligible(EligibilityError::Disabled(_)))
    ));
    assert_eq!(shop.spawned_count(), 1);
}

#[test]
fn snapshot_held_across_reload_is_unchanged() {
    let (shop, _) = stocked_workshop();
    let store = shop.eligibility();
    let held = store.snapshot();

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store.reload(EligibilitySnapshot::default().with_disabled([name(GO_KART)]));
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert!(!held.is_disabled(&name(GO_KART)));
    assert!(held.is_vehicle(&name(GO_KART)));
    assert!(store.snapshot().is_disabled(&name(GO_KART)));
}

#[test]
fn listeners_observe_every_outcome() {
    let (mut shop, player) = stocked_workshop();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    shop.journal_mut().subscribe(Box::new(move |event: &CraftEvent| {
        sink.lock().unwrap().push(event.rejection().is_some());
    }));

    send(&mut shop, player, BASIC_CART);
    send(&mut shop, player, GO_KART);
    let _ = shop.handle_packet(player, &[0xff]);
    shop.process_pending();

    // Dropped packet first (recorded at decode), then the two transactions.
    assert_eq!(*seen.lock().unwrap(), vec![false, false, true]);
}

#[test]
fn server_file_reload_drives_the_workshop() {
    let dir = std::env::temp_dir().join(format!("workbench_reload_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    write_content(&dir);

    let data = load_game_data(&dir).unwrap();
    let registry = Arc::new(data.registry);
    let mut inventory = PlayerInventory::default();
    let planks = registry
        .item_id(&workbench_core::name::ResourceName::parse("planks").unwrap())
        .unwrap();
    assert_eq!(inventory.add(ItemStack::new(planks, 10)), 0);

    let mut shop = Workshop::new(Arc::clone(&registry), data.eligibility, Default::default());
    shop.place_station(STATION_POS);
    let player = shop.add_player(inventory);
    shop.open_station(player, STATION_POS);

    send(&mut shop, player, "raft");
    shop.process_pending();
    assert_eq!(shop.spawned_count(), 1);

    fs::write(dir.join("server.ron"), r#"(disabled_vehicles: ["raft"])"#).unwrap();
    reload_eligibility(&dir, &registry, &shop.eligibility()).unwrap();

    send(&mut shop, player, "raft");
    shop.process_pending();
    assert_eq!(shop.spawned_count(), 1);
    assert!(matches!(
        shop.journal().last().and_then(CraftEvent::rejection),
        Some(Rejection::Ineligible(EligibilityError::Disabled(_)))
    ));

    let _ = fs::remove_dir_all(&dir);
}

fn write_content(dir: &Path) {
    fs::write(dir.join("items.ron"), r#"[(name: "planks")]"#).unwrap();
    fs::write(
        dir.join("vehicles.ron"),
        r#"[(name: "raft", blueprint: Unpowered(colorable: false))]"#,
    )
    .unwrap();
    fs::write(
        dir.join("recipes.ron"),
        r#"[(output: "raft", materials: [("planks", 5)])]"#,
    )
    .unwrap();
}
