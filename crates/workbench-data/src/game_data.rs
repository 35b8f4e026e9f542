//! Resolution pipeline: reads content files, resolves cross-references,
//! and builds the registry.
//!
//! A content directory holds:
//!
//! | file        | required | contents                        |
//! |-------------|----------|---------------------------------|
//! | `items`     | yes      | item types and their categories |
//! | `entities`  | no       | non-craftable entity types      |
//! | `vehicles`  | no       | craftable vehicles + blueprints |
//! | `recipes`   | no       | materials per output            |
//! | `server`    | no       | deny-list and vehicle overrides |
//!
//! each as `.ron`, `.toml`, or `.json`.

use crate::loader::{DataFile, DataLoadError};
use crate::schema::{EntityData, ItemData, RecipeData, VehicleData};
use crate::server_config::load_server_config;
use std::collections::HashMap;
use std::path::Path;
use workbench_core::eligibility::EligibilitySnapshot;
use workbench_core::id::{EntityTypeId, ItemTypeId};
use workbench_core::name::ResourceName;
use workbench_core::registry::{RecipeEntry, Registry, RegistryBuilder};

/// Everything the authority needs at startup.
#[derive(Debug)]
pub struct GameData {
    pub registry: Registry,
    pub eligibility: EligibilitySnapshot,
}

/// Load content and server configuration from `dir`.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let registry = load_registry(dir)?.build()?;
    let eligibility = load_server_config(dir, &registry)?;
    tracing::info!(
        dir = %dir.display(),
        items = registry.item_count(),
        entities = registry.entity_count(),
        recipes = registry.recipe_count(),
        disabled = eligibility.disabled().len(),
        "game data loaded"
    );
    Ok(GameData {
        registry,
        eligibility,
    })
}

/// Load content files into a builder. The caller may still mutate recipes
/// or blueprints before building.
pub fn load_registry(dir: &Path) -> Result<RegistryBuilder, DataLoadError> {
    let mut builder = RegistryBuilder::new();

    let file = DataFile::require(dir, "items")?;
    let mut items: HashMap<ResourceName, ItemTypeId> = HashMap::new();
    for item in file.read_list::<ItemData>("items")? {
        let name = file.name(&item.name)?;
        file.ensure_unique(&items, &name)?;
        items.insert(name, builder.register_item(&item.name, item.category.into())?);
    }
    tracing::debug!(%file, count = items.len(), "items loaded");

    // Plain entities and vehicles share one namespace.
    let mut entities: HashMap<ResourceName, EntityTypeId> = HashMap::new();
    if let Some(file) = DataFile::locate(dir, "entities")? {
        for entity in file.read_list::<EntityData>("entities")? {
            let name = file.name(&entity.name)?;
            file.ensure_unique(&entities, &name)?;
            entities.insert(name, builder.register_entity(&entity.name, None)?);
        }
    }
    if let Some(file) = DataFile::locate(dir, "vehicles")? {
        let vehicles = file.read_list::<VehicleData>("vehicles")?;
        for vehicle in &vehicles {
            let name = file.name(&vehicle.name)?;
            file.ensure_unique(&entities, &name)?;
            let id = builder.register_vehicle(&vehicle.name, vehicle.blueprint.into())?;
            entities.insert(name, id);
        }
        tracing::debug!(%file, count = vehicles.len(), "vehicles loaded");
    }

    if let Some(file) = DataFile::locate(dir, "recipes")? {
        for recipe in file.read_list::<RecipeData>("recipes")? {
            let output = file.name(&recipe.output)?;
            file.resolve(&entities, &output, "entity")?;

            let materials = recipe
                .materials
                .iter()
                .map(|entry| {
                    let name = file.name(entry.item())?;
                    Ok::<_, DataLoadError>(RecipeEntry {
                        item: *file.resolve(&items, &name, "item")?,
                        quantity: entry.quantity(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            builder.register_recipe(&recipe.output, materials, recipe.worlds)?;
        }
    }

    Ok(builder)
}

// ===========================================================================
// Tests
// ===========================================================================
