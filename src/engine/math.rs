// Small 2D helpers layered over glam::Vec2.
// Everything here is total: zero vectors and out-of-range scalars map to
// well-defined values instead of NaN.

use glam::Vec2;

/// Largest value a quantized score can take.
pub const SCORE_MAX: u8 = u8::MAX;

// ============================================================================
// SCALARS
// ============================================================================

/// Clamp `x` into `[0, 1]`. NaN maps to 0.
#[inline]
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// `round(clamp01(x) * 255)` as an 8-bit score.
#[inline]
pub fn quantize_unit(x: f32) -> u8 {
    (clamp01(x) * SCORE_MAX as f32).round() as u8
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}


// ============================================================================
// VECTORS
// ============================================================================

/// Unit vector along `v`, or `Vec2::ZERO` when `v` has zero length.
#[inline]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > 0.0 { v / len } else { Vec2::ZERO }
}
