//! Workbench Core -- the authoritative crafting pipeline for vehicle workstations.
//!
//! A client asks to craft a vehicle at a workstation. The authority decodes
//! the request, validates it against the recipe registry, the requester's
//! inventory, the station's slots, and a reloadable deny-list, then either
//! commits every effect or none of them.
//!
//! # Transaction Chain
//!
//! Each request drained by [`workshop::Workshop::process_pending`] runs:
//!
//! 1. **Station match** -- the requester has that station's menu open.
//! 2. **Eligibility** -- the output type parses, is not disabled, is
//!    registered, and is a vehicle.
//! 3. **Recipe** -- a recipe exists in the current world.
//! 4. **Affordability** -- every material is present.
//! 5. **Structure** -- the station holds the engine and wheels required.
//! 6. **Commit** -- materials removed, station slots consumed, crate spawned.
//!
//! ```rust,ignore
//! let mut shop = Workshop::with_registry(Arc::new(registry));
//! shop.place_station(pos);
//! shop.open_station(player, pos);
//! shop.handle_packet(player, &CraftRequest::new("core:go_kart", pos).encode()?)?;
//! shop.process_pending();
//! ```
//!
//! # Key Types
//!
//! - [`workshop::Workshop`] -- Authoritative world state and request loop.
//! - [`coordinator::Coordinator`] -- One crafting transaction, end to end.
//! - [`codec::CraftRequest`] -- The wire message.
//! - [`eligibility::EligibilityStore`] -- Snapshot-swapped deny-list.
//! - [`registry::Registry`] -- Immutable items, entities, and recipes
//!   (frozen at startup).
//! - [`vehicle::VehicleBlueprint`] -- Closed set of craftable outputs.
//! - [`journal::CraftJournal`] -- Ring buffer of craft outcomes.

pub mod access;
pub mod codec;
pub mod coordinator;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod eligibility;
pub mod fixed;
pub mod id;
pub mod item;
pub mod journal;
pub mod name;
pub mod queue;
pub mod registry;
pub mod station;
pub mod vehicle;
pub mod workshop;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
