//! Pressure and velocity modulation helpers
//!
//! Cross-cutting rules every brush opts into per field: pressure scales
//! size and opacity, velocity thins and lightens the mark (less material
//! deposited per unit path length at speed). All factors are clamped so
//! sensor noise can never produce degenerate geometry.

use crate::geom::lerp;

/// Pressure-driven stamp size
///
/// `size = nominal * clamp(pressure, min_ratio, max_ratio)`.
pub fn pressure_size(nominal: f32, pressure: f32, min_ratio: f32, max_ratio: f32) -> f32 {
    (nominal * pressure.clamp(min_ratio, max_ratio)).max(0.1)
}

/// Pressure-driven opacity: `base * (k0 + k1 * pressure)`, clamped to [0, 1]
pub fn pressure_opacity(base: f32, pressure: f32, k0: f32, k1: f32) -> f32 {
    (base * (k0 + k1 * pressure.clamp(0.0, 1.0))).clamp(0.0, 1.0)
}

/// Velocity-driven multiplicative factor in [floor, 1]
///
/// Zero velocity gives 1.0; the factor decays toward `floor` as velocity
/// grows, with `half_speed` the velocity at which the decay is halfway.
pub fn velocity_factor(velocity: f32, half_speed: f32, floor: f32) -> f32 {
    if half_speed <= 0.0 {
        return 1.0;
    }
    let v = velocity.max(0.0);
    let t = v / (v + half_speed);
    lerp(1.0, floor.clamp(0.0, 1.0), t)
}
