//! Deterministic per-stroke randomness
//!
//! Every random draw for a stamp derives from the stroke seed combined
//! with the stamp's monotone index, so replaying a recorded event stream
//! reproduces the stroke pixel-for-pixel while different strokes still
//! look organically different.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::Point;
use crate::stroke::params::splitmix64;

/// Per-stroke random source
#[derive(Debug, Clone, Copy)]
pub struct StampRng {
    stroke_seed: u64,
}

impl StampRng {
    pub fn new(stroke_seed: u64) -> Self {
        Self { stroke_seed }
    }

    /// Independent generator for one stamp
    ///
    /// The same `(stroke_seed, index)` pair always yields the same
    /// sequence, regardless of how many stamps were drawn before it.
    pub fn for_stamp(&self, index: u64) -> StdRng {
        StdRng::seed_from_u64(splitmix64(
            self.stroke_seed ^ index.wrapping_mul(0xd1b54a32d192ed03),
        ))
    }

    /// Generator for a named sub-stream (e.g. a per-stroke one-off draw)
    pub fn for_channel(&self, channel: u64) -> StdRng {
        StdRng::seed_from_u64(splitmix64(self.stroke_seed.rotate_left(17) ^ channel))
    }
}

/// Random point in a disc of radius `radius`, density biased toward the
/// center by `falloff`
///
/// `falloff` 1.0 gives uniform area density (`r = R * sqrt(u)`); larger
/// values concentrate mass toward the center.
pub fn disc_point(rng: &mut StdRng, center: Point, radius: f32, falloff: f32) -> Point {
    let u: f32 = rng.random();
    let r = radius * u.sqrt().powf(falloff.max(0.1));
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    center.offset_polar(angle, r)
}

/// Symmetric jitter in [-amount, amount]
pub fn jitter(rng: &mut StdRng, amount: f32) -> f32 {
    if amount <= 0.0 {
        return 0.0;
    }
    rng.random_range(-amount..amount)
}
