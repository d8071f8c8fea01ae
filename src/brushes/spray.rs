//! Spray - arc-length spaced dot scatter clusters

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::modulate::pressure_size;
use crate::stroke::rng::disc_point;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Spray configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprayConfig {
    /// Dots per cluster
    pub dots: u32,
    /// Cluster spacing as a fraction of size
    pub spacing: f32,
    /// Dot radius range in pixels
    pub dot_radius_min: f32,
    pub dot_radius_max: f32,
    /// Center bias; 1.0 = uniform area density
    pub falloff: f32,
}

impl Default for SprayConfig {
    fn default() -> Self {
        Self {
            dots: 12,
            spacing: 0.4,
            dot_radius_min: 0.6,
            dot_radius_max: 1.6,
            falloff: 1.2,
        }
    }
}

/// One spray stroke
#[derive(Debug)]
pub struct SpraySession {
    config: SprayConfig,
    params: BrushParams,
    stroke: WalkedStroke,
}

impl SpraySession {
    pub fn new(config: SprayConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(1.0);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let spread = pressure_size(self.params.safe_size(), stamp.pressure, 0.3, 1.0) * 0.5;
        let mut rng = self.stroke.rng().for_stamp(stamp.index);

        for _ in 0..self.config.dots {
            let p = disc_point(&mut rng, stamp.pos, spread, self.config.falloff);
            let radius = rng.random_range(self.config.dot_radius_min..=self.config.dot_radius_max);
            let alpha = self.params.color[3] * rng.random_range(0.4..1.0);
            let color = [
                self.params.color[0],
                self.params.color[1],
                self.params.color[2],
                alpha,
            ];
            surface.fill_circle(p, radius, 0.8, color, self.params.blend);
        }
        dirty.add(Rect::around(stamp.pos, spread + self.config.dot_radius_max + 1.0));
    }
}

impl StrokeSession for SpraySession {
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

    #[test]
    fn test_spray_scatters_within_spread() {
        let mut raster = Raster::new(64, 64);
        let mut session = SpraySession::new(
            SprayConfig::default(),
            BrushParams {
                size: 20.0,
                ..Default::default()
            },
        );
        let dirty = session.start(&mut raster, &GestureEvent::new(32.0, 32.0, 1.0, 0));
        session.finish(&mut raster, &GestureEvent::new(32.0, 32.0, 1.0, 8));

        let rect = dirty.expect("tap must paint");
        // Nothing outside the reported region
        for x in 0..64u32 {
            for y in 0..64u32 {
                if raster.pixel(x, y)[3] > 0 {
                    let p = crate::geom::Point::new(x as f32 + 0.5, y as f32 + 0.5);
                    assert!(rect.pad(14.0).contains(p), "dot escaped at {x},{y}");
                }
            }
        }
    }

    #[test]
    fn test_spray_deterministic() {
        let run = || {
            let mut raster = Raster::new(64, 64);
            let mut session = SpraySession::new(
                SprayConfig::default(),
                BrushParams {
                    size: 20.0,
                    seed_nonce: 3,
                    ..Default::default()
                },
            );
            session.start(&mut raster, &GestureEvent::new(20.0, 32.0, 1.0, 0));
            session.update(&mut raster, &GestureEvent::new(44.0, 32.0, 1.0, 16));
            session.finish(&mut raster, &GestureEvent::new(44.0, 32.0, 1.0, 24));
            raster.snapshot()
        };
        assert_eq!(run(), run());
    }
}
