//! Vehicle blueprints and the item categories that feed them.
//!
//! A [`VehicleBlueprint`] is the closed set of craftable output variants.
//! The coordinator never inspects a blueprint directly; it asks for its
//! [`Capabilities`] once per transaction and validates against those.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Engine category and tier
// ---------------------------------------------------------------------------

/// Engine category. On a blueprint, `None` means any engine fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
    #[default]
    None,
    SmallMotor,
    LargeMotor,
    ElectricMotor,
}

/// Engine quality level, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineTier {
    Wood,
    Stone,
    #[default]
    Iron,
    Gold,
    Diamond,
    Netherite,
}

impl EngineTier {
    /// Power multiplier applied by the spawned vehicle, in percent.
    pub fn power_percent(self) -> u32 {
        match self {
            EngineTier::Wood => 75,
            EngineTier::Stone => 90,
            EngineTier::Iron => 100,
            EngineTier::Gold => 125,
            EngineTier::Diamond => 150,
            EngineTier::Netherite => 175,
        }
    }
}

/// Wheel variants that can be fitted through an accessory swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelType {
    Standard,
    Sports,
    Racing,
    OffRoad,
    Snow,
    AllTerrain,
    Plastic,
}

// ---------------------------------------------------------------------------
// Dye colours
// ---------------------------------------------------------------------------

/// The sixteen dye colours a decoration item can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DyeColor {
    White,
    Orange,
    Magenta,
    LightBlue,
    Yellow,
    Lime,
    Pink,
    Gray,
    LightGray,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    Black,
}

/// Tint applied when no dye is consumed.
pub const DEFAULT_TINT: u32 = DyeColor::White.rgb();

impl DyeColor {
    /// Packed `0xRRGGBB` value.
    pub const fn rgb(self) -> u32 {
        match self {
            DyeColor::White => 0xF9FFFE,
            DyeColor::Orange => 0xF9801D,
            DyeColor::Magenta => 0xC74EBD,
            DyeColor::LightBlue => 0x3AB3DA,
            DyeColor::Yellow => 0xFED83D,
            DyeColor::Lime => 0x80C71F,
            DyeColor::Pink => 0xF38BAA,
            DyeColor::Gray => 0x474F52,
            DyeColor::LightGray => 0x9D9D97,
            DyeColor::Cyan => 0x169C9C,
            DyeColor::Purple => 0x8932B8,
            DyeColor::Blue => 0x3C44AA,
            DyeColor::Brown => 0x835432,
            DyeColor::Green => 0x5E7C16,
            DyeColor::Red => 0xB02E26,
            DyeColor::Black => 0x1D1D21,
        }
    }
}

// ---------------------------------------------------------------------------
// Blueprints
// ---------------------------------------------------------------------------

/// How an entity type is instantiated when crafted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VehicleBlueprint {
    /// Pushed or pulled; takes nothing from the station but an optional dye.
    Unpowered {
        #[serde(default = "default_true")]
        colorable: bool,
    },
    /// Needs an engine from the component slot, and wheels from the
    /// accessory slot when `can_change_wheels` is set.
    Powered {
        #[serde(default = "default_true")]
        colorable: bool,
        #[serde(default)]
        engine_type: EngineType,
        #[serde(default)]
        can_change_wheels: bool,
    },
}

fn default_true() -> bool {
    true
}

/// What a transaction must take from (or may take from) the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// A dye in the decoration slot is applied as tint.
    pub colorable: bool,
    /// `Some(engine_type)` when an engine is required. `Some(EngineType::None)`
    /// accepts any category.
    pub component: Option<EngineType>,
    /// The accessory slot must hold wheels, which are carried onto the output.
    pub accessory_swap: bool,
}

impl VehicleBlueprint {
    pub fn capabilities(&self) -> Capabilities {
        match *self {
            VehicleBlueprint::Unpowered { colorable } => Capabilities {
                colorable,
                component: None,
                accessory_swap: false,
            },
            VehicleBlueprint::Powered {
                colorable,
                engine_type,
                can_change_wheels,
            } => Capabilities {
                colorable,
                component: Some(engine_type),
                accessory_swap: can_change_wheels,
            },
        }
    }
}

impl Capabilities {
    /// Whether an engine of `found` category satisfies this requirement.
    /// Always true when no component is required.
    pub fn accepts_engine(&self, found: EngineType) -> bool {
        match self.component {
            None | Some(EngineType::None) => true,
            Some(expected) => expected == found,
        }
    }
}
