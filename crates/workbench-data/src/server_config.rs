//! Server configuration: the crafting deny-list and vehicle overrides.
//!
//! `server.{ron,toml,json}` is optional. Without it every registered
//! vehicle is craftable. The file can be edited while the server runs and
//! applied with [`reload_eligibility`].

use crate::loader::{DataFile, DataLoadError};
use crate::schema::ServerConfigData;
use std::collections::BTreeSet;
use std::path::Path;
use workbench_core::eligibility::{EligibilitySnapshot, EligibilityStore};
use workbench_core::registry::Registry;

/// Build an eligibility snapshot from `dir/server.*` and the registry.
///
/// Disabled names need not be registered; a deny-list may name content
/// that is not installed. Names in a `vehicles` override must be
/// registered entity types.
pub fn load_server_config(dir: &Path, registry: &Registry) -> Result<EligibilitySnapshot, DataLoadError> {
    let Some(file) = DataFile::locate(dir, "server")? else {
        return Ok(EligibilitySnapshot::from_registry(registry));
    };
    let config: ServerConfigData = file.read()?;

    let disabled = config
        .disabled_vehicles
        .iter()
        .map(|raw| file.name(raw))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let vehicles = match &config.vehicles {
        None => registry.vehicles().clone(),
        Some(list) => {
            let mut vehicles = BTreeSet::new();
            for raw in list {
                let name = file.name(raw)?;
                if registry.entity_id(&name).is_none() {
                    return Err(file.unresolved(&name, "entity"));
                }
                vehicles.insert(name);
            }
            vehicles
        }
    };

    Ok(EligibilitySnapshot::new(disabled, vehicles))
}

/// Re-read the server configuration and swap it into `store`.
///
/// On error the store keeps its current snapshot.
pub fn reload_eligibility(
    dir: &Path,
    registry: &Registry,
    store: &EligibilityStore,
) -> Result<(), DataLoadError> {
    match load_server_config(dir, registry) {
        Ok(snapshot) => {
            store.reload(snapshot);
            Ok(())
        }
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "server config reload failed, keeping current");
            Err(err)
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
