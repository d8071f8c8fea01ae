//! Distortion - texture stamps resampled through a warp field
//!
//! Each stamp rebuilds the texture on a coarse working grid: every grid
//! texel samples the source through a displacement function, so the
//! warp cost is bounded by the grid, not the source resolution.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{StampPlacement, Surface, Texture, TextureSet};
use crate::stroke::modulate::pressure_size;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Largest working grid edge, in texels
const MAX_GRID: u32 = 64;

/// Displacement field applied while resampling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WarpKind {
    /// Horizontal sine waves
    #[default]
    Sine,
    /// Concentric waves from the center
    Ripple,
    /// Rotation growing toward the center
    Twist,
    /// Pull toward the center
    Pinch,
    /// Value-noise jitter
    Noise,
    /// Anisotropic squash along one axis
    Stretch,
    /// Smear along the instantaneous stroke direction
    Flow,
}

/// Distortion configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistortConfig {
    pub warp: WarpKind,
    /// Displacement amplitude in source-texel units
    pub amplitude: f32,
    /// Spatial frequency of the warp
    pub frequency: f32,
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
}

impl Default for DistortConfig {
    fn default() -> Self {
        Self {
            warp: WarpKind::Sine,
            amplitude: 3.0,
            frequency: 2.0,
            spacing: 0.35,
        }
    }
}

/// One distortion stroke
#[derive(Debug)]
pub struct DistortSession {
    config: DistortConfig,
    params: BrushParams,
    textures: TextureSet,
    stroke: WalkedStroke,
}

impl DistortSession {
    pub fn new(config: DistortConfig, params: BrushParams, textures: TextureSet) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            textures,
            stroke: WalkedStroke::new(step),
        }
    }

    /// Displacement at normalized grid position, in normalized units
    fn displace(&self, u: f32, v: f32, angle: f32, phase: f32) -> (f32, f32) {
        let amp = self.config.amplitude / MAX_GRID as f32;
        let freq = self.config.frequency;
        let (cx, cy) = (u - 0.5, v - 0.5);
        let r = (cx * cx + cy * cy).sqrt();
        match self.config.warp {
            WarpKind::Sine => {
                let d = amp * (v * freq * std::f32::consts::TAU + phase).sin();
                (d, 0.0)
            }
            WarpKind::Ripple => {
                let d = amp * (r * freq * std::f32::consts::TAU + phase).sin();
                if r < 1e-6 {
                    (0.0, 0.0)
                } else {
                    (d * cx / r, d * cy / r)
                }
            }
            WarpKind::Twist => {
                // Rotation falls off toward the rim
                let theta = amp * freq * 4.0 * (1.0 - (r * 2.0).min(1.0));
                let (s, c) = theta.sin_cos();
                (cx * c - cy * s - cx, cx * s + cy * c - cy)
            }
            WarpKind::Pinch => {
                let pull = amp * freq * (1.0 - (r * 2.0).min(1.0));
                (-cx * pull, -cy * pull)
            }
            WarpKind::Noise => {
                let n1 = crate::texgen::value_noise(1013, u * freq + phase, v * freq);
                let n2 = crate::texgen::value_noise(2027, u * freq, v * freq + phase);
                ((n1 - 0.5) * amp * 2.0, (n2 - 0.5) * amp * 2.0)
            }
            WarpKind::Stretch => (cx * amp * freq, -cy * amp * freq * 0.5),
            WarpKind::Flow => {
                let d = amp * (1.0 + (v * freq * std::f32::consts::TAU).sin()) * 0.5;
                (d * angle.cos(), d * angle.sin())
            }
        }
    }

    /// Resample the source through the warp onto the working grid
    fn warped(&self, source: &Texture, stamp: &StampPoint, phase: f32) -> Texture {
        let grid = source.max_dimension().clamp(8, MAX_GRID);
        let mut pixels = vec![0u8; (grid * grid * 4) as usize];
        for gy in 0..grid {
            for gx in 0..grid {
                let u = (gx as f32 + 0.5) / grid as f32;
                let v = (gy as f32 + 0.5) / grid as f32;
                let (du, dv) = self.displace(u, v, stamp.angle, phase);
                let texel = source.sample_uv(u + du, v + dv);
                let idx = ((gy * grid + gx) * 4) as usize;
                for (c, value) in texel.iter().enumerate() {
                    pixels[idx + c] = (value * 255.0).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        Texture::from_rgba(grid, grid, pixels).unwrap_or_else(|_| source.clone())
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let source = self.textures.pick(stamp.index as usize).clone();
        let mut rng = self.stroke.rng().for_stamp(stamp.index);
        let phase = rng.random_range(0.0..std::f32::consts::TAU);
        let warped = self.warped(&source, stamp, phase);

        let size = pressure_size(self.params.safe_size(), stamp.pressure, 0.3, 1.0);
        let scale = size / warped.max_dimension().max(1) as f32;
        let placement = StampPlacement {
            opacity: self.params.color[3],
            tint: Some(self.params.color),
            ..StampPlacement::new(stamp.pos, scale)
        };
        surface.draw_texture(&warped, &placement, self.params.blend);
        dirty.add(Rect::around(stamp.pos, placement.half_extent(&warped)));
    }
}

impl StrokeSession for DistortSession {
    fn start(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        if let Some(stamp) = self.stroke.start(&self.params, event) {
            self.render(surface, &stamp, &mut dirty);
        }
        dirty.take()
    }

    fn update(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        for stamp in self.stroke.update(&self.params, event) {
            self.render(surface, &stamp, &mut dirty);
        }
        dirty.take()
    }

    fn finish(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        for stamp in self.stroke.finish(&self.params, event) {
            self.render(surface, &stamp, &mut dirty);
        }
        dirty.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use crate::texgen;
    use std::sync::Arc;

    fn set() -> TextureSet {
        TextureSet::single(Arc::new(texgen::soft_circle(48, 0.9).expect("texture")))
    }

    #[test]
    fn test_working_grid_never_exceeds_ceiling() {
        let big = Arc::new(texgen::soft_circle(256, 0.9).expect("texture"));
        let session = DistortSession::new(
            DistortConfig::default(),
            BrushParams::default(),
            TextureSet::single(big.clone()),
        );
        let stamp = crate::stroke::StampPoint {
            pos: crate::geom::Point::new(0.0, 0.0),
            pressure: 1.0,
            velocity: 0.0,
            angle: 0.0,
            index: 0,
        };
        let warped = session.warped(&big, &stamp, 0.0);
        assert_eq!(warped.max_dimension(), MAX_GRID);
    }

    #[test]
    fn test_warp_moves_texels() {
        // Twist is a pure rotation per radius, so a radially symmetric
        // source would mask it; noise has no such symmetry
        let source = Arc::new(texgen::noise(48, 21, 6.0).expect("texture"));
        let session = DistortSession::new(
            DistortConfig {
                warp: WarpKind::Twist,
                amplitude: 8.0,
                ..Default::default()
            },
            BrushParams::default(),
            TextureSet::single(source.clone()),
        );
        let stamp = crate::stroke::StampPoint {
            pos: crate::geom::Point::new(0.0, 0.0),
            pressure: 1.0,
            velocity: 0.0,
            angle: 0.0,
            index: 0,
        };
        let warped = session.warped(&source, &stamp, 0.0);
        // A strong twist changes off-center texels
        let a = source.sample_uv(0.3, 0.3);
        let b = warped.sample_uv(0.3, 0.3);
        assert!(
            (a[3] - b[3]).abs() > 1e-3 || (a[0] - b[0]).abs() > 1e-3,
            "warp left the texture unchanged"
        );
    }

    #[test]
    fn test_distort_paints_deterministically() {
        let run = |warp: WarpKind| {
            let mut raster = Raster::new(96, 96);
            let mut session = DistortSession::new(
                DistortConfig {
                    warp,
                    ..Default::default()
                },
                BrushParams {
                    size: 24.0,
                    seed_nonce: 8,
                    ..Default::default()
                },
                set(),
            );
            session.start(&mut raster, &GestureEvent::new(30.0, 48.0, 1.0, 0));
            session.update(&mut raster, &GestureEvent::new(66.0, 48.0, 1.0, 16));
            session.finish(&mut raster, &GestureEvent::new(66.0, 48.0, 1.0, 24));
            raster.snapshot()
        };
        for warp in [
            WarpKind::Sine,
            WarpKind::Ripple,
            WarpKind::Pinch,
            WarpKind::Noise,
            WarpKind::Stretch,
            WarpKind::Flow,
        ] {
            assert_eq!(run(warp), run(warp), "{warp:?} must replay identically");
            assert!(run(warp).iter().any(|&b| b > 0), "{warp:?} painted nothing");
        }
    }
}
