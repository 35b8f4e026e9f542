//! Serde data file structs for workbench content definitions.
//!
//! These structs define the on-disk format for items, entities, vehicles,
//! recipes, and the server configuration. They are deserialized from RON,
//! JSON, or TOML data files and then resolved into core types by the loader.

use serde::Deserialize;
use workbench_core::registry::ItemCategory;
use workbench_core::vehicle::{DyeColor, EngineTier, EngineType, VehicleBlueprint, WheelType};

// ===========================================================================
// Items
// ===========================================================================

/// An item type definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
    #[serde(default)]
    pub category: CategoryData,
}

/// What the item does when placed in a workstation slot.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub enum CategoryData {
    #[default]
    Plain,
    Dye {
        color: DyeColor,
    },
    Engine {
        #[serde(default)]
        engine_type: EngineType,
        #[serde(default)]
        tier: EngineTier,
    },
    Wheel {
        wheel_type: WheelType,
    },
}

impl From<CategoryData> for ItemCategory {
    fn from(data: CategoryData) -> Self {
        match data {
            CategoryData::Plain => ItemCategory::Plain,
            CategoryData::Dye { color } => ItemCategory::Dye { color },
            CategoryData::Engine { engine_type, tier } => ItemCategory::Engine { engine_type, tier },
            CategoryData::Wheel { wheel_type } => ItemCategory::Wheel { wheel_type },
        }
    }
}

// ===========================================================================
// Entities and vehicles
// ===========================================================================

/// An entity type that exists in the world but cannot be crafted.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityData {
    pub name: String,
}

/// A craftable vehicle definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleData {
    pub name: String,
    pub blueprint: BlueprintData,
}

/// How the vehicle is built from a workstation.
#[derive(Debug, Clone, Copy, Deserialize)]
pub enum BlueprintData {
    Unpowered {
        #[serde(default = "default_true")]
        colorable: bool,
    },
    Powered {
        #[serde(default = "default_true")]
        colorable: bool,
        /// Omitted means any engine fits.
        #[serde(default)]
        engine_type: EngineType,
        #[serde(default)]
        can_change_wheels: bool,
    },
}

fn default_true() -> bool {
    true
}

impl From<BlueprintData> for VehicleBlueprint {
    fn from(data: BlueprintData) -> Self {
        match data {
            BlueprintData::Unpowered { colorable } => VehicleBlueprint::Unpowered { colorable },
            BlueprintData::Powered {
                colorable,
                engine_type,
                can_change_wheels,
            } => VehicleBlueprint::Powered {
                colorable,
                engine_type,
                can_change_wheels,
            },
        }
    }
}

// ===========================================================================
// Recipes
// ===========================================================================

/// A recipe material, in short tuple form or full form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MaterialData {
    /// Short form: `("item_name", quantity)`.
    Short(String, u32),
    Full { item: String, quantity: u32 },
}

impl MaterialData {
    pub fn item(&self) -> &str {
        match self {
            MaterialData::Short(item, _) | MaterialData::Full { item, .. } => item,
        }
    }

    pub fn quantity(&self) -> u32 {
        match self {
            MaterialData::Short(_, quantity) | MaterialData::Full { quantity, .. } => *quantity,
        }
    }
}

/// A vehicle recipe definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    /// The vehicle (or entity) produced.
    pub output: String,
    pub materials: Vec<MaterialData>,
    /// Worlds the recipe is visible in. Omitted means all worlds.
    #[serde(default)]
    pub worlds: Option<Vec<String>>,
}

// ===========================================================================
// Server configuration
// ===========================================================================

/// Runtime-tunable server settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigData {
    /// Output types that may not be crafted, whatever the registry says.
    #[serde(default)]
    pub disabled_vehicles: Vec<String>,
    /// Replaces the registry's vehicle set when present.
    #[serde(default)]
    pub vehicles: Option<Vec<String>>,
}

// ===========================================================================
// Tests
// ===========================================================================
