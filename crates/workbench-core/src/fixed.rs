use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Used for world positions and item properties so that spawn positions
/// are bit-identical on every authority.
pub type Fixed64 = I32F32;
