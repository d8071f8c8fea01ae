//! Procedural stamp-texture generators
//!
//! Offline (pre-stroke) synthesis of reusable stamp bitmaps: soft discs,
//! stars, value noise and paper grain. Generation is deterministic for a
//! given seed and row-parallel, since these run once per brush setup and
//! can be hundreds of pixels across.

use rayon::prelude::*;

use crate::error::BrushError;
use crate::raster::Texture;
use crate::stroke::params::splitmix64;

/// Hash a 2D lattice coordinate into [0, 1]
fn lattice_value(seed: u64, x: i64, y: i64) -> f32 {
    let h = splitmix64(seed ^ (x as u64).wrapping_mul(0x8da6b343) ^ (y as u64).wrapping_mul(0xd8163841));
    (h >> 40) as f32 / (1u64 << 24) as f32
}

/// Smoothly interpolated value noise at a point
pub(crate) fn value_noise(seed: u64, x: f32, y: f32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    // Smoothstep fade
    let sx = fx * fx * (3.0 - 2.0 * fx);
    let sy = fy * fy * (3.0 - 2.0 * fy);
    let (xi, yi) = (x0 as i64, y0 as i64);

    let v00 = lattice_value(seed, xi, yi);
    let v10 = lattice_value(seed, xi + 1, yi);
    let v01 = lattice_value(seed, xi, yi + 1);
    let v11 = lattice_value(seed, xi + 1, yi + 1);

    let top = v00 + (v10 - v00) * sx;
    let bottom = v01 + (v11 - v01) * sx;
    top + (bottom - top) * sy
}

/// Multi-octave value noise in [0, 1]
fn fractal_noise(seed: u64, x: f32, y: f32, octaves: u32) -> f32 {
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    let mut total = 0.0;
    let mut norm = 0.0;
    for octave in 0..octaves {
        total += amplitude * value_noise(seed.wrapping_add(octave as u64), x * frequency, y * frequency);
        norm += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    total / norm
}

/// Build a white texture from a per-pixel alpha function, row-parallel
fn alpha_texture<F>(size: u32, alpha_fn: F) -> Result<Texture, BrushError>
where
    F: Fn(f32, f32) -> f32 + Sync,
{
    if size == 0 || size > 1024 {
        return Err(BrushError::InvalidConfig(format!(
            "texture size {size} out of range (1..=1024)"
        )));
    }
    let mut pixels = vec![0u8; (size * size * 4) as usize];
    pixels
        .par_chunks_mut((size * 4) as usize)
        .enumerate()
        .for_each(|(row, chunk)| {
            let y = row as f32 + 0.5;
            for col in 0..size as usize {
                let x = col as f32 + 0.5;
                let a = (alpha_fn(x, y).clamp(0.0, 1.0) * 255.0).round() as u8;
                let idx = col * 4;
                chunk[idx] = 255;
                chunk[idx + 1] = 255;
                chunk[idx + 2] = 255;
                chunk[idx + 3] = a;
            }
        });
    Texture::from_rgba(size, size, pixels)
}

/// Soft disc: opaque center fading to transparent at the rim
///
/// `hardness` 1.0 keeps the disc solid almost to the edge, 0.0 fades
/// from the center.
pub fn soft_circle(size: u32, hardness: f32) -> Result<Texture, BrushError> {
    let radius = size as f32 * 0.5;
    let hard_r = radius * hardness.clamp(0.0, 1.0);
    let fade = (radius - hard_r).max(1.0);
    tracing::debug!("generating soft circle texture ({size}px, hardness {hardness})");
    alpha_texture(size, move |x, y| {
        let dx = x - radius;
        let dy = y - radius;
        let d = (dx * dx + dy * dy).sqrt();
        ((radius - d) / fade).clamp(0.0, 1.0)
    })
}

/// N-pointed star with soft edges
pub fn star(size: u32, points: u32) -> Result<Texture, BrushError> {
    if points < 3 {
        return Err(BrushError::InvalidConfig(
            "star texture needs at least 3 points".into(),
        ));
    }
    let radius = size as f32 * 0.5;
    let inner = radius * 0.4;
    let n = points as f32;
    tracing::debug!("generating star texture ({size}px, {points} points)");
    alpha_texture(size, move |x, y| {
        let dx = x - radius;
        let dy = y - radius;
        let d = (dx * dx + dy * dy).sqrt();
        let angle = dy.atan2(dx);
        // Star boundary radius oscillates between inner and outer with
        // the point count.
        let lobe = ((angle * n * 0.5).cos().abs()).powf(2.0);
        let boundary = inner + (radius - 1.0 - inner) * lobe;
        (boundary - d).clamp(0.0, 1.5) / 1.5
    })
}

/// Fractal value-noise alpha texture
pub fn noise(size: u32, seed: u64, scale: f32) -> Result<Texture, BrushError> {
    let scale = scale.clamp(0.5, 64.0);
    tracing::debug!("generating noise texture ({size}px, seed {seed})");
    alpha_texture(size, move |x, y| {
        fractal_noise(seed, x / size as f32 * scale, y / size as f32 * scale, 4)
    })
}

/// Tileable-looking paper grain: high-frequency noise sharpened around
/// mid gray, for multiply-composited tooth
pub fn paper_grain(size: u32, seed: u64) -> Result<Texture, BrushError> {
    tracing::debug!("generating paper grain texture ({size}px, seed {seed})");
    alpha_texture(size, move |x, y| {
        let coarse = fractal_noise(seed, x * 0.15, y * 0.15, 3);
        let fine = value_noise(seed ^ 0x5eed, x * 0.7, y * 0.7);
        let v = coarse * 0.6 + fine * 0.4;
        // Sharpen around the midpoint so the grain reads as speckle
        0.35 + (v - 0.5) * 1.3
    })
}
