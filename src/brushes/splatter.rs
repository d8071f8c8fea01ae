//! Splatter - heavy droplet bursts flung ahead of the stroke

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{StampPlacement, Surface, TextureSet};
use crate::stroke::modulate::pressure_size;
use crate::stroke::rng::disc_point;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Splatter configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplatterConfig {
    /// Droplets per burst
    pub droplets: u32,
    /// Burst spacing as a fraction of size
    pub spacing: f32,
    /// Throw distance as a fraction of size
    pub throw_ratio: f32,
    /// How much velocity stretches the throw forward
    pub velocity_throw: f32,
    /// Droplet scale range relative to size
    pub droplet_min: f32,
    pub droplet_max: f32,
}

impl Default for SplatterConfig {
    fn default() -> Self {
        Self {
            droplets: 7,
            spacing: 0.7,
            throw_ratio: 1.4,
            velocity_throw: 0.3,
            droplet_min: 0.08,
            droplet_max: 0.3,
        }
    }
}

/// One splatter stroke
#[derive(Debug)]
pub struct SplatterSession {
    config: SplatterConfig,
    params: BrushParams,
    textures: TextureSet,
    stroke: WalkedStroke,
}

impl SplatterSession {
    pub fn new(config: SplatterConfig, params: BrushParams, textures: TextureSet) -> Self {
        let step = (params.safe_size() * config.spacing).max(1.0);
        Self {
            config,
            params,
            textures,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let size = pressure_size(self.params.safe_size(), stamp.pressure, 0.3, 1.0);
        let throw = size * self.config.throw_ratio;
        // Fast strokes fling droplets further along the travel direction
        let drift = stamp.velocity * self.config.velocity_throw;
        let mut rng = self.stroke.rng().for_stamp(stamp.index);

        for _ in 0..self.config.droplets {
            let scattered = disc_point(&mut rng, stamp.pos, throw, 0.7);
            let center = scattered.offset_polar(stamp.angle, drift * rng.random::<f32>());
            let texture = self
                .textures
                .pick(rng.random_range(0..self.textures.len()))
                .clone();
            let droplet =
                size * rng.random_range(self.config.droplet_min..=self.config.droplet_max);
            let scale = droplet / texture.max_dimension().max(1) as f32;

            let placement = StampPlacement {
                rotation: rng.random_range(0.0..std::f32::consts::TAU),
                opacity: self.params.color[3] * rng.random_range(0.5..1.0),
                tint: Some(self.params.color),
                ..StampPlacement::new(center, scale)
            };
            surface.draw_texture(&texture, &placement, self.params.blend);
            dirty.add(Rect::around(center, placement.half_extent(&texture)));
        }
    }
}

impl StrokeSession for SplatterSession {
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
        TextureSet::single(Arc::new(texgen::soft_circle(16, 0.9).expect("texture")))
    }

    #[test]
    fn test_splatter_reaches_past_brush_radius() {
        let mut raster = Raster::new(160, 160);
        let mut session = SplatterSession::new(
            SplatterConfig {
                droplets: 20,
                ..Default::default()
            },
            BrushParams {
                size: 24.0,
                seed_nonce: 5,
                ..Default::default()
            },
            set(),
        );
        session.start(&mut raster, &GestureEvent::new(80.0, 80.0, 1.0, 0));
        session.finish(&mut raster, &GestureEvent::new(80.0, 80.0, 1.0, 8));

        let max_dist = (0..160)
            .flat_map(|x| (0..160).map(move |y| (x, y)))
            .filter(|&(x, y)| raster.pixel(x, y)[3] > 0)
            .map(|(x, y)| {
                let dx = x as f32 - 80.0;
                let dy = y as f32 - 80.0;
                (dx * dx + dy * dy).sqrt()
            })
            .fold(0.0f32, f32::max);
        assert!(max_dist > 12.0, "droplets stayed inside the core: {max_dist}");
    }

    #[test]
    fn test_dirty_region_contains_all_droplets() {
        let mut raster = Raster::new(160, 160);
        let mut session = SplatterSession::new(
            SplatterConfig::default(),
            BrushParams {
                size: 24.0,
                seed_nonce: 6,
                ..Default::default()
            },
            set(),
        );
        let mut dirty = crate::geom::DirtyAccum::new();
        dirty.merge(session.start(&mut raster, &GestureEvent::new(80.0, 80.0, 1.0, 0)));
        dirty.merge(session.update(&mut raster, &GestureEvent::new(100.0, 80.0, 1.0, 16)));
        dirty.merge(session.finish(&mut raster, &GestureEvent::new(104.0, 80.0, 1.0, 24)));
        let rect = dirty.take().expect("stroke painted");

        for x in 0..160u32 {
            for y in 0..160u32 {
                if raster.pixel(x, y)[3] > 0 {
                    let p = crate::geom::Point::new(x as f32 + 0.5, y as f32 + 0.5);
                    assert!(rect.pad(1.5).contains(p), "droplet escaped at {x},{y}");
                }
            }
        }
    }
}
