//! The crafting authority: owns the world state and drains craft requests.
//!
//! # Architecture
//!
//! The `Workshop` owns:
//! - A frozen [`Registry`] shared behind an `Arc`
//! - An [`EligibilityStore`], also shared so an admin thread can reload it
//! - Players (inventory and the station menu they have open)
//! - [`Workstation`]s keyed by location
//! - Crates spawned by committed transactions
//! - A [`CraftQueue`] of decoded requests and a [`CraftJournal`] of outcomes
//!
//! Packets enter through [`Workshop::handle_packet`], which decodes and
//! enqueues. [`Workshop::process_pending`] drains the queue in submission
//! order and runs one transaction at a time, so two requests against the
//! same station never interleave.

use crate::access::{InventoryAccess, SpawnPosition, Spawner, WorldContext};
use crate::codec::{CodecError, CraftRequest};
use crate::coordinator::{Coordinator, OutputSpec, Requester};
use crate::eligibility::{EligibilitySnapshot, EligibilityStore};
use crate::id::{BlockPos, EntityId, ItemTypeId, PlayerId};
use crate::item::PlayerInventory;
use crate::journal::{CraftEvent, CraftJournal};
use crate::queue::{CraftQueue, Envelope};
use crate::registry::Registry;
use crate::station::Workstation;
use slotmap::SlotMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Journal capacity used by [`Workshop::new`].
pub const DEFAULT_JOURNAL_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// World state
// ---------------------------------------------------------------------------

/// A connected player as the authority tracks them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub inventory: PlayerInventory,
    /// Location of the workstation whose menu is open, if any.
    pub open_station: Option<BlockPos>,
}

/// A vehicle crate produced by a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedCrate {
    pub world: WorldContext,
    pub position: SpawnPosition,
    pub spec: OutputSpec,
}

#[derive(Debug, Default)]
struct Players(SlotMap<PlayerId, Player>);

impl InventoryAccess for Players {
    fn has(&self, holder: PlayerId, item: ItemTypeId, quantity: u32) -> bool {
        self.0
            .get(holder)
            .is_some_and(|p| p.inventory.contains(item, quantity))
    }

    fn remove(&mut self, holder: PlayerId, item: ItemTypeId, quantity: u32) {
        if let Some(player) = self.0.get_mut(holder) {
            let _ = player.inventory.remove(item, quantity);
        }
    }
}

#[derive(Debug, Default)]
struct Crates(SlotMap<EntityId, SpawnedCrate>);

impl Spawner for Crates {
    fn spawn(&mut self, world: &WorldContext, position: SpawnPosition, spec: OutputSpec) -> EntityId {
        self.0.insert(SpawnedCrate {
            world: world.clone(),
            position,
            spec,
        })
    }
}

// ---------------------------------------------------------------------------
// Workshop
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Workshop {
    registry: Arc<Registry>,
    eligibility: Arc<EligibilityStore>,
    world: WorldContext,
    players: Players,
    stations: HashMap<BlockPos, Workstation>,
    crates: Crates,
    queue: CraftQueue,
    journal: CraftJournal,
    /// Number of `process_pending` calls so far.
    batch: u64,
}

impl Workshop {
    pub fn new(registry: Arc<Registry>, eligibility: EligibilitySnapshot, world: WorldContext) -> Self {
        Self {
            registry,
            eligibility: Arc::new(EligibilityStore::new(eligibility)),
            world,
            players: Players::default(),
            stations: HashMap::new(),
            crates: Crates::default(),
            queue: CraftQueue::new(),
            journal: CraftJournal::new(DEFAULT_JOURNAL_CAPACITY),
            batch: 0,
        }
    }

    /// A workshop where every registered vehicle is eligible.
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        let snapshot = EligibilitySnapshot::from_registry(&registry);
        Self::new(registry, snapshot, WorldContext::default())
    }

    pub fn with_journal_capacity(mut self, capacity: usize) -> Self {
        self.journal = CraftJournal::new(capacity);
        self
    }

    /// Remember the last `retain` executed requests for inspection.
    pub fn with_queue_history(mut self, retain: usize) -> Self {
        self.queue = CraftQueue::retaining(retain);
        self
    }

    // -- Players --

    pub fn add_player(&mut self, inventory: PlayerInventory) -> PlayerId {
        self.players.0.insert(Player {
            inventory,
            open_station: None,
        })
    }

    pub fn remove_player(&mut self, player: PlayerId) -> Option<Player> {
        self.players.0.remove(player)
    }

    pub fn player(&self, player: PlayerId) -> Option<&Player> {
        self.players.0.get(player)
    }

    pub fn player_mut(&mut self, player: PlayerId) -> Option<&mut Player> {
        self.players.0.get_mut(player)
    }

    /// Open a station's menu for a player. Returns false if either the
    /// player or the station does not exist.
    pub fn open_station(&mut self, player: PlayerId, location: BlockPos) -> bool {
        if !self.stations.contains_key(&location) {
            return false;
        }
        match self.players.0.get_mut(player) {
            Some(p) => {
                p.open_station = Some(location);
                true
            }
            None => false,
        }
    }

    pub fn close_station(&mut self, player: PlayerId) {
        if let Some(p) = self.players.0.get_mut(player) {
            p.open_station = None;
        }
    }

    // -- Stations --

    /// Place a workstation, or return the one already at `location`.
    pub fn place_station(&mut self, location: BlockPos) -> &mut Workstation {
        self.stations
            .entry(location)
            .or_insert_with(|| Workstation::new(location))
    }

    /// Remove a workstation and close its menu for every player viewing it.
    pub fn remove_station(&mut self, location: BlockPos) -> Option<Workstation> {
        let removed = self.stations.remove(&location)?;
        for player in self.players.0.values_mut() {
            if player.open_station == Some(location) {
                player.open_station = None;
            }
        }
        Some(removed)
    }

    pub fn station(&self, location: BlockPos) -> Option<&Workstation> {
        self.stations.get(&location)
    }

    pub fn station_mut(&mut self, location: BlockPos) -> Option<&mut Workstation> {
        self.stations.get_mut(&location)
    }

    // -- Packets --

    /// Decode a craft packet and queue it. Malformed packets are logged,
    /// journaled, and dropped; nothing is sent back to the client.
    pub fn handle_packet(&mut self, sender: PlayerId, bytes: &[u8]) -> Result<(), CodecError> {
        match CraftRequest::decode(bytes) {
            Ok(request) => {
                self.queue.push(sender, request);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(player = ?sender, len = bytes.len(), %error, "dropping malformed craft packet");
                self.journal.record(CraftEvent::Dropped {
                    sender,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Queue an already-decoded request.
    pub fn submit(&mut self, sender: PlayerId, request: CraftRequest) {
        self.queue.push(sender, request);
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Run every queued request in submission order. Returns how many ran.
    pub fn process_pending(&mut self) -> usize {
        let batch = self.batch;
        self.batch += 1;

        let envelopes = self.queue.take_batch(batch);
        let count = envelopes.len();
        for envelope in envelopes {
            self.run(batch, envelope);
        }
        count
    }

    fn run(&mut self, batch: u64, envelope: Envelope) {
        let Envelope { sender, request } = envelope;

        // One snapshot per transaction; a concurrent reload affects the next one.
        let snapshot = self.eligibility.snapshot();
        let requester = Requester {
            id: sender,
            open_station: self.players.0.get(sender).and_then(|p| p.open_station),
        };

        let coordinator = Coordinator::new(&self.registry, self.registry.as_ref(), &snapshot, &self.world);
        let outcome = coordinator.execute(
            &request,
            &requester,
            &mut self.players,
            self.stations.get_mut(&request.station),
            &mut self.crates,
        );

        let event = match outcome {
            Ok(crafted) => {
                tracing::info!(
                    player = ?sender,
                    output = %crafted.spec.output_type_id,
                    station = %request.station,
                    tier = ?crafted.spec.tier,
                    tint = crafted.spec.tint,
                    "vehicle crafted"
                );
                CraftEvent::Crafted {
                    sender,
                    batch,
                    station: request.station,
                    entity: crafted.entity,
                    spec: crafted.spec,
                }
            }
            Err(reason) => {
                tracing::debug!(
                    player = ?sender,
                    output = %request.output_type_id,
                    station = %request.station,
                    stage = ?reason.stage(),
                    %reason,
                    "craft rejected"
                );
                CraftEvent::Rejected {
                    sender,
                    batch,
                    output_type_id: request.output_type_id,
                    station: request.station,
                    reason,
                }
            }
        };
        self.journal.record(event);
    }

    // -- Configuration --

    /// Swap in a new eligibility snapshot. Requests already running keep
    /// the snapshot they started with.
    pub fn reload_eligibility(&self, snapshot: EligibilitySnapshot) {
        self.eligibility.reload(snapshot);
    }

    /// Shared handle to the eligibility store, for reloading from elsewhere.
    pub fn eligibility(&self) -> Arc<EligibilityStore> {
        Arc::clone(&self.eligibility)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn world(&self) -> &WorldContext {
        &self.world
    }

    // -- Outcomes --

    pub fn journal(&self) -> &CraftJournal {
        &self.journal
    }

    pub fn journal_mut(&mut self) -> &mut CraftJournal {
        &mut self.journal
    }

    pub fn queue(&self) -> &CraftQueue {
        &self.queue
    }

    pub fn spawned(&self, entity: EntityId) -> Option<&SpawnedCrate> {
        self.crates.0.get(entity)
    }

    pub fn spawned_crates(&self) -> impl Iterator<Item = (EntityId, &SpawnedCrate)> {
        self.crates.0.iter()
    }

    pub fn spawned_count(&self) -> usize {
        self.crates.0.len()
    }

    /// Remove a crate once the world has taken it over. Its id is not reused.
    pub fn despawn(&mut self, entity: EntityId) -> Option<SpawnedCrate> {
        self.crates.0.remove(entity)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
