use crate::access::{RecipeCatalog, WorldContext};
use crate::id::*;
use crate::name::{NameError, ResourceName};
use crate::vehicle::{DyeColor, EngineTier, EngineType, VehicleBlueprint, WheelType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// What an item can be used for at a workstation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemCategory {
    /// Crafting material with no station role.
    #[default]
    Plain,
    /// Decoration slot: tints the crafted vehicle.
    Dye { color: DyeColor },
    /// Component slot: powers the crafted vehicle.
    Engine {
        engine_type: EngineType,
        tier: EngineTier,
    },
    /// Accessory slot: carried onto the crafted vehicle.
    Wheel { wheel_type: WheelType },
}

/// An item type definition in the registry.
#[derive(Debug, Clone)]
pub struct ItemTypeDef {
    pub name: ResourceName,
    pub category: ItemCategory,
}

/// An entity type definition. Only entities with a blueprint can be built.
#[derive(Debug, Clone)]
pub struct EntityTypeDef {
    pub name: ResourceName,
    pub blueprint: Option<VehicleBlueprint>,
}

/// A recipe input entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeEntry {
    pub item: ItemTypeId,
    pub quantity: u32,
}

/// A vehicle recipe: the materials consumed to build one output entity.
#[derive(Debug, Clone)]
pub struct VehicleRecipe {
    pub output: ResourceName,
    pub materials: Vec<RecipeEntry>,
    /// Worlds in which this recipe is visible. `None` means everywhere.
    pub worlds: Option<Vec<String>>,
}

impl VehicleRecipe {
    pub fn available_in(&self, world: &WorldContext) -> bool {
        self.worlds
            .as_ref()
            .is_none_or(|worlds| worlds.iter().any(|w| *w == world.name))
    }
}

/// Builder for constructing an immutable Registry.
/// Three-phase lifecycle: registration -> mutation -> finalization.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    items: Vec<ItemTypeDef>,
    item_name_to_id: HashMap<ResourceName, ItemTypeId>,
    entities: Vec<EntityTypeDef>,
    entity_name_to_id: HashMap<ResourceName, EntityTypeId>,
    vehicles: BTreeSet<ResourceName>,
    recipes: Vec<VehicleRecipe>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase 1: Register an item type. Returns its ID.
    pub fn register_item(
        &mut self,
        name: &str,
        category: ItemCategory,
    ) -> Result<ItemTypeId, RegistryError> {
        let name = ResourceName::parse(name)?;
        if self.item_name_to_id.contains_key(&name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let id = ItemTypeId(self.items.len() as u32);
        self.items.push(ItemTypeDef {
            name: name.clone(),
            category,
        });
        self.item_name_to_id.insert(name, id);
        Ok(id)
    }

    /// Phase 1: Register an entity type that is not a craftable vehicle.
    pub fn register_entity(
        &mut self,
        name: &str,
        blueprint: Option<VehicleBlueprint>,
    ) -> Result<EntityTypeId, RegistryError> {
        let name = ResourceName::parse(name)?;
        if self.entity_name_to_id.contains_key(&name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let id = EntityTypeId(self.entities.len() as u32);
        self.entities.push(EntityTypeDef {
            name: name.clone(),
            blueprint,
        });
        self.entity_name_to_id.insert(name, id);
        Ok(id)
    }

    /// Phase 1: Register an entity type and mark it as a craftable vehicle.
    pub fn register_vehicle(
        &mut self,
        name: &str,
        blueprint: VehicleBlueprint,
    ) -> Result<EntityTypeId, RegistryError> {
        let id = self.register_entity(name, Some(blueprint))?;
        self.vehicles.insert(self.entities[id.0 as usize].name.clone());
        Ok(id)
    }

    /// Phase 1: Register a recipe for an output entity.
    pub fn register_recipe(
        &mut self,
        output: &str,
        materials: Vec<RecipeEntry>,
        worlds: Option<Vec<String>>,
    ) -> Result<RecipeId, RegistryError> {
        let output = ResourceName::parse(output)?;
        let id = RecipeId(self.recipes.len() as u32);
        self.recipes.push(VehicleRecipe {
            output,
            materials,
            worlds,
        });
        Ok(id)
    }

    /// Phase 2: Mutate every recipe producing `output`.
    pub fn mutate_recipes<F>(&mut self, output: &str, mut f: F) -> Result<(), RegistryError>
    where
        F: FnMut(&mut VehicleRecipe),
    {
        let output = ResourceName::parse(output)?;
        let mut found = false;
        for recipe in self.recipes.iter_mut().filter(|r| r.output == output) {
            f(recipe);
            found = true;
        }
        if found {
            Ok(())
        } else {
            Err(RegistryError::NotFound(output.to_string()))
        }
    }

    /// Phase 2: Replace the blueprint of a registered entity.
    pub fn mutate_blueprint<F>(&mut self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut Option<VehicleBlueprint>),
    {
        let name = ResourceName::parse(name)?;
        let id = self
            .entity_name_to_id
            .get(&name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        f(&mut self.entities[id.0 as usize].blueprint);
        Ok(())
    }

    /// Lookup item type ID by name.
    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        let name = ResourceName::parse(name).ok()?;
        self.item_name_to_id.get(&name).copied()
    }

    /// Lookup entity type ID by name.
    pub fn entity_id(&self, name: &str) -> Option<EntityTypeId> {
        let name = ResourceName::parse(name).ok()?;
        self.entity_name_to_id.get(&name).copied()
    }

    /// Phase 3: Finalize and build the immutable registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        for recipe in &self.recipes {
            if !self.entity_name_to_id.contains_key(&recipe.output) {
                return Err(RegistryError::InvalidEntityRef(recipe.output.to_string()));
            }
            for entry in &recipe.materials {
                if entry.item.0 as usize >= self.items.len() {
                    return Err(RegistryError::InvalidItemRef(entry.item));
                }
            }
        }

        Ok(Registry {
            items: self.items,
            item_name_to_id: self.item_name_to_id,
            entities: self.entities,
            entity_name_to_id: self.entity_name_to_id,
            vehicles: self.vehicles,
            recipes: self.recipes,
        })
    }
}

/// Immutable registry. Frozen after build(). Thread-safe to share.
#[derive(Debug)]
pub struct Registry {
    items: Vec<ItemTypeDef>,
    item_name_to_id: HashMap<ResourceName, ItemTypeId>,
    entities: Vec<EntityTypeDef>,
    entity_name_to_id: HashMap<ResourceName, EntityTypeId>,
    vehicles: BTreeSet<ResourceName>,
    recipes: Vec<VehicleRecipe>,
}

impl Registry {
    pub fn get_item(&self, id: ItemTypeId) -> Option<&ItemTypeDef> {
        self.items.get(id.0 as usize)
    }

    pub fn get_entity(&self, id: EntityTypeId) -> Option<&EntityTypeDef> {
        self.entities.get(id.0 as usize)
    }

    pub fn item_id(&self, name: &ResourceName) -> Option<ItemTypeId> {
        self.item_name_to_id.get(name).copied()
    }

    pub fn entity_id(&self, name: &ResourceName) -> Option<EntityTypeId> {
        self.entity_name_to_id.get(name).copied()
    }

    /// Category of an item type. Unknown items are treated as plain.
    pub fn item_category(&self, id: ItemTypeId) -> ItemCategory {
        self.get_item(id)
            .map(|def| def.category)
            .unwrap_or_default()
    }

    /// Entity types registered as craftable vehicles.
    pub fn vehicles(&self) -> &BTreeSet<ResourceName> {
        &self.vehicles
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}

impl RecipeCatalog for Registry {
    fn lookup(&self, output: &ResourceName, world: &WorldContext) -> Option<&VehicleRecipe> {
        self.recipes
            .iter()
            .find(|r| r.output == *output && r.available_in(world))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),
    #[error("duplicate name: {0}")]
    Duplicate(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemTypeId),
    #[error("recipe output is not a registered entity: {0}")]
    InvalidEntityRef(String),
}
