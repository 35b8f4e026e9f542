use crate::fixed::Fixed64;
use crate::id::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest quantity a single inventory slot holds.
pub const MAX_STACK_SIZE: u32 = 64;

/// Number of slots in a player inventory.
pub const PLAYER_INVENTORY_SLOTS: usize = 36;

/// A stack of fungible items with optional per-instance properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_type: ItemTypeId,
    pub quantity: u32,
    /// Per-instance properties (e.g., wheel colour, wear).
    #[serde(default)]
    pub properties: BTreeMap<PropertyId, Fixed64>,
}

impl ItemStack {
    pub fn new(item_type: ItemTypeId, quantity: u32) -> Self {
        Self {
            item_type,
            quantity,
            properties: BTreeMap::new(),
        }
    }

    /// A zero-count stack holds nothing.
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    pub fn with_property(mut self, id: PropertyId, value: Fixed64) -> Self {
        self.properties.insert(id, value);
        self
    }

    pub fn set_property(&mut self, id: PropertyId, value: Fixed64) {
        self.properties.insert(id, value);
    }

    pub fn get_property(&self, id: PropertyId) -> Option<Fixed64> {
        self.properties.get(&id).copied()
    }

    /// Whether `other` can merge into this stack.
    fn stacks_with(&self, other: &ItemStack) -> bool {
        self.item_type == other.item_type && self.properties == other.properties
    }
}

/// Slot-based inventory held by a player.
///
/// Quantities are counted across all slots, so a recipe asking for 20 iron
/// is satisfied by two slots of 10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInventory {
    slots: Vec<Option<ItemStack>>,
}

impl Default for PlayerInventory {
    fn default() -> Self {
        Self::new(PLAYER_INVENTORY_SLOTS)
    }
}

impl PlayerInventory {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    /// Add a stack, merging into matching slots first. Returns the amount
    /// that didn't fit.
    #[must_use = "overflow count indicates items that did not fit"]
    pub fn add(&mut self, stack: ItemStack) -> u32 {
        let mut remaining = stack.quantity;

        for existing in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if existing.stacks_with(&stack) {
                let space = MAX_STACK_SIZE.saturating_sub(existing.quantity);
                let moved = remaining.min(space);
                existing.quantity += moved;
                remaining -= moved;
            }
        }

        for slot in self.slots.iter_mut().filter(|s| s.is_none()) {
            if remaining == 0 {
                break;
            }
            let moved = remaining.min(MAX_STACK_SIZE);
            let mut placed = stack.clone();
            placed.quantity = moved;
            *slot = Some(placed);
            remaining -= moved;
        }

        remaining
    }

    /// Total quantity of an item type across all slots.
    pub fn count(&self, item_type: ItemTypeId) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.item_type == item_type)
            .map(|s| s.quantity)
            .sum()
    }

    pub fn contains(&self, item_type: ItemTypeId, quantity: u32) -> bool {
        self.count(item_type) >= quantity
    }

    /// Remove up to `quantity` of an item type, draining slots in order.
    /// Returns the amount actually removed.
    #[must_use = "returns the quantity actually removed, which may be less than requested"]
    pub fn remove(&mut self, item_type: ItemTypeId, quantity: u32) -> u32 {
        let mut remaining = quantity;
        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            let Some(stack) = slot else { continue };
            if stack.item_type != item_type {
                continue;
            }
            let taken = remaining.min(stack.quantity);
            stack.quantity -= taken;
            remaining -= taken;
            if stack.quantity == 0 {
                *slot = None;
            }
        }
        quantity - remaining
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
