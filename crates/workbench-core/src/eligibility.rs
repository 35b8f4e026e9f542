//! Deny-list and registered-vehicle checks for requested output types.
//!
//! The configuration lives in an [`EligibilitySnapshot`]: an immutable value
//! that a transaction reads once at its start. Reloading configuration
//! builds a new snapshot and swaps it into the [`EligibilityStore`]; readers
//! holding the previous `Arc` are unaffected.

use crate::name::{NameError, ResourceName};
use crate::registry::{EntityTypeDef, Registry};
use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

/// Disabled and registered output types at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilitySnapshot {
    disabled: BTreeSet<ResourceName>,
    vehicles: BTreeSet<ResourceName>,
}

impl EligibilitySnapshot {
    pub fn new(disabled: BTreeSet<ResourceName>, vehicles: BTreeSet<ResourceName>) -> Self {
        Self { disabled, vehicles }
    }

    /// Every vehicle the registry knows about, nothing disabled.
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            disabled: BTreeSet::new(),
            vehicles: registry.vehicles().clone(),
        }
    }

    pub fn with_disabled(mut self, names: impl IntoIterator<Item = ResourceName>) -> Self {
        self.disabled.extend(names);
        self
    }

    pub fn is_disabled(&self, name: &ResourceName) -> bool {
        self.disabled.contains(name)
    }

    pub fn is_vehicle(&self, name: &ResourceName) -> bool {
        self.vehicles.contains(name)
    }

    pub fn disabled(&self) -> &BTreeSet<ResourceName> {
        &self.disabled
    }

    pub fn vehicles(&self) -> &BTreeSet<ResourceName> {
        &self.vehicles
    }
}

/// Why an output type is not eligible for crafting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityError {
    #[error("malformed output type: {0}")]
    Malformed(#[from] NameError),
    #[error("output type {0} is disabled")]
    Disabled(ResourceName),
    #[error("output type {0} is not registered")]
    UnknownType(ResourceName),
    #[error("output type {0} is not a craftable vehicle")]
    NotAVehicle(ResourceName),
}

/// An output type that passed every eligibility check.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedType<'r> {
    pub entity: &'r EntityTypeDef,
}

impl<'r> ResolvedType<'r> {
    pub fn name(&self) -> &'r ResourceName {
        &self.entity.name
    }
}

/// Resolve a raw output-type identifier. Checks run cheapest first and stop
/// at the first failure: parse, deny-list, registry, vehicle set.
pub fn resolve<'r>(
    raw: &str,
    snapshot: &EligibilitySnapshot,
    registry: &'r Registry,
) -> Result<ResolvedType<'r>, EligibilityError> {
    let name = ResourceName::parse(raw)?;

    if snapshot.is_disabled(&name) {
        return Err(EligibilityError::Disabled(name));
    }

    let entity = registry
        .entity_id(&name)
        .and_then(|id| registry.get_entity(id))
        .ok_or_else(|| EligibilityError::UnknownType(name.clone()))?;

    if !snapshot.is_vehicle(&name) {
        return Err(EligibilityError::NotAVehicle(name));
    }

    Ok(ResolvedType { entity })
}

/// Process-wide holder of the current eligibility snapshot.
#[derive(Debug, Default)]
pub struct EligibilityStore {
    current: RwLock<Arc<EligibilitySnapshot>>,
}

impl EligibilityStore {
    pub fn new(snapshot: EligibilitySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot in effect right now. Hold it for the whole transaction.
    pub fn snapshot(&self) -> Arc<EligibilitySnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the snapshot. In-flight readers keep the one they took.
    pub fn reload(&self, snapshot: EligibilitySnapshot) {
        let next = Arc::new(snapshot);
        tracing::info!(
            disabled = next.disabled().len(),
            vehicles = next.vehicles().len(),
            "eligibility reloaded"
        );
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }
}
