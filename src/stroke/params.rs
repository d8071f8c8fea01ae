//! Per-stroke brush parameters
//!
//! One immutable snapshot per pointer-down. Brush-specific knobs live in
//! the individual brush config structs; this block carries only what
//! every brush shares.

use serde::{Deserialize, Serialize};

use crate::raster::{BlendMode, Rgba};

/// Immutable per-stroke configuration shared by all brushes
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushParams {
    /// Stroke color, straight RGBA in [0, 1]
    pub color: Rgba,
    /// Nominal stamp diameter in surface pixels
    pub size: f32,
    /// Fallback pressure when an event does not report one
    pub pressure: f32,
    /// Fallback velocity (pixels per millisecond)
    pub velocity: f32,
    /// Compositing mode between the stroke and existing surface content
    pub blend: BlendMode,
    /// Caller-supplied nonce mixed into the per-stroke random seed
    pub seed_nonce: u64,
}

impl Default for BrushParams {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 0.0, 1.0],
            size: 20.0,
            pressure: 1.0,
            velocity: 0.0,
            blend: BlendMode::Normal,
            seed_nonce: 0,
        }
    }
}

impl BrushParams {
    /// Nominal size clamped to a sane positive range
    pub fn safe_size(&self) -> f32 {
        if self.size.is_finite() {
            self.size.clamp(0.5, 2000.0)
        } else {
            1.0
        }
    }

    /// Per-stroke random seed
    ///
    /// Mixes the caller's nonce with the stroke start time, so repeated
    /// strokes with identical input look similar but not bit-identical,
    /// while a recorded stroke (fixed nonce and timestamps) replays
    /// pixel-identically.
    pub fn stroke_seed(&self, start_timestamp_ms: u64) -> u64 {
        splitmix64(self.seed_nonce ^ start_timestamp_ms.wrapping_mul(0x9e3779b97f4a7c15))
    }
}

/// SplitMix64 finalizer, used to whiten seed material
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e3779b97f4a7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}
