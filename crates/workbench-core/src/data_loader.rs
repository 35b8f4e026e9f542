//! Single-document JSON content, enabled by the `data-loader` feature.
//!
//! A [`ContentDocument`] holds every item, plain entity, vehicle, and recipe
//! in one JSON object; every section is optional. Directory-based content in
//! RON, TOML, or JSON lives in the `workbench-data` crate.

use serde::Deserialize;

use crate::registry::{ItemCategory, RecipeEntry, RegistryBuilder, RegistryError};
use crate::vehicle::VehicleBlueprint;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("malformed content document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("recipe for {output} uses unregistered item {item}")]
    UnknownMaterial { output: String, item: String },
}

/// Parsed, not yet registered, content.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContentDocument {
    pub items: Vec<ItemDecl>,
    /// Entity types that exist in the world but have no blueprint.
    pub entities: Vec<String>,
    pub vehicles: Vec<VehicleDecl>,
    pub recipes: Vec<RecipeDecl>,
}

#[derive(Debug, Deserialize)]
pub struct ItemDecl {
    pub name: String,
    #[serde(default)]
    pub category: ItemCategory,
}

#[derive(Debug, Deserialize)]
pub struct VehicleDecl {
    pub name: String,
    pub blueprint: VehicleBlueprint,
}

#[derive(Debug, Deserialize)]
pub struct RecipeDecl {
    pub output: String,
    #[serde(default)]
    pub materials: Vec<MaterialDecl>,
    /// Omitted means every world.
    #[serde(default)]
    pub worlds: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct MaterialDecl {
    pub item: String,
    pub quantity: u32,
}

impl ContentDocument {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ContentError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Register the document's contents into `builder`.
    ///
    /// Types are registered before recipes, so a recipe may name any item
    /// declared in the same document regardless of order.
    pub fn register_into(self, builder: &mut RegistryBuilder) -> Result<(), ContentError> {
        for item in self.items {
            builder.register_item(&item.name, item.category)?;
        }
        for entity in &self.entities {
            builder.register_entity(entity, None)?;
        }
        for vehicle in self.vehicles {
            builder.register_vehicle(&vehicle.name, vehicle.blueprint)?;
        }
        for recipe in self.recipes {
            let materials = recipe
                .materials
                .iter()
                .map(|m| match builder.item_id(&m.item) {
                    Some(item) => Ok(RecipeEntry {
                        item,
                        quantity: m.quantity,
                    }),
                    None => Err(ContentError::UnknownMaterial {
                        output: recipe.output.clone(),
                        item: m.item.clone(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            builder.register_recipe(&recipe.output, materials, recipe.worlds)?;
        }
        Ok(())
    }

    /// Register into a fresh builder.
    pub fn into_builder(self) -> Result<RegistryBuilder, ContentError> {
        let mut builder = RegistryBuilder::new();
        self.register_into(&mut builder)?;
        Ok(builder)
    }
}
