//! A short crafting session against an in-memory workshop.
//!
//! Registers a handful of items and two vehicles, places a workstation,
//! sends a few craft packets (good, unaffordable, malformed, disabled),
//! and prints the journal. Set `RUST_LOG=debug` to see rejection reasons.
//!
//! Run with: `cargo run -p workbench-core --example craft_session`

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use workbench_core::codec::CraftRequest;
use workbench_core::eligibility::EligibilitySnapshot;
use workbench_core::id::BlockPos;
use workbench_core::item::{ItemStack, PlayerInventory};
use workbench_core::journal::CraftEvent;
use workbench_core::name::ResourceName;
use workbench_core::registry::{ItemCategory, RecipeEntry, RegistryBuilder};
use workbench_core::station::StationSlot;
use workbench_core::vehicle::{DyeColor, EngineTier, EngineType, VehicleBlueprint, WheelType};
use workbench_core::workshop::Workshop;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- Step 1: Build the registry ---

    let mut b = RegistryBuilder::new();
    let planks = b.register_item("planks", ItemCategory::Plain)?;
    let iron = b.register_item("iron_ingot", ItemCategory::Plain)?;
    let blue_dye = b.register_item("blue_dye", ItemCategory::Dye { color: DyeColor::Blue })?;
    let engine = b.register_item(
        "small_engine",
        ItemCategory::Engine {
            engine_type: EngineType::SmallMotor,
            tier: EngineTier::Gold,
        },
    )?;
    let wheels = b.register_item(
        "racing_wheels",
        ItemCategory::Wheel {
            wheel_type: WheelType::Racing,
        },
    )?;

    b.register_vehicle("cart", VehicleBlueprint::Unpowered { colorable: true })?;
    b.register_recipe(
        "cart",
        vec![
            RecipeEntry { item: planks, quantity: 8 },
            RecipeEntry { item: iron, quantity: 2 },
        ],
        None,
    )?;
    b.register_vehicle(
        "go_kart",
        VehicleBlueprint::Powered {
            colorable: true,
            engine_type: EngineType::SmallMotor,
            can_change_wheels: true,
        },
    )?;
    b.register_recipe("go_kart", vec![RecipeEntry { item: iron, quantity: 6 }], None)?;
    let registry = Arc::new(b.build()?);

    // --- Step 2: Set up the world ---

    let mut shop = Workshop::with_registry(Arc::clone(&registry));
    let pos = BlockPos::new(12, 70, -3);
    let station = shop.place_station(pos);
    station.insert(StationSlot::Decoration, ItemStack::new(blue_dye, 1));
    station.insert(StationSlot::Component, ItemStack::new(engine, 1));
    station.insert(StationSlot::Accessory, ItemStack::new(wheels, 4));

    let mut inventory = PlayerInventory::default();
    for (item, quantity) in [(planks, 8), (iron, 10)] {
        let overflow = inventory.add(ItemStack::new(item, quantity));
        debug_assert_eq!(overflow, 0);
    }
    let player = shop.add_player(inventory);
    shop.open_station(player, pos);

    // --- Step 3: Send packets ---

    let go_kart = CraftRequest::new("go_kart", pos).encode()?;
    let cart = CraftRequest::new("cart", pos).encode()?;
    shop.handle_packet(player, &go_kart)?;
    shop.handle_packet(player, &cart)?;
    shop.handle_packet(player, &cart)?;
    // Truncated packet: dropped at decode.
    let _ = shop.handle_packet(player, &cart[..4]);
    shop.process_pending();

    // --- Step 4: Disable the cart and try again ---

    let cart_name = ResourceName::parse("cart")?;
    shop.reload_eligibility(EligibilitySnapshot::from_registry(&registry).with_disabled([cart_name]));
    shop.handle_packet(player, &cart)?;
    shop.process_pending();

    // --- Step 5: Report ---

    for event in shop.journal().iter() {
        match event {
            CraftEvent::Crafted { entity, spec, .. } => println!(
                "crafted {} as {entity:?}: tint #{:06X}, tier {:?}, wheels {}",
                spec.output_type_id,
                spec.tint,
                spec.tier,
                spec.accessory.is_some()
            ),
            CraftEvent::Rejected {
                output_type_id,
                reason,
                ..
            } => println!("rejected {output_type_id}: {reason}"),
            CraftEvent::Dropped { error, .. } => println!("dropped packet: {error}"),
        }
    }
    println!("{} crates in the world", shop.spawned_count());

    Ok(())
}
