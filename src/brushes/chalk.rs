//! Chalk - dry speckled dabs with broken, grainy coverage

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::modulate::{pressure_opacity, pressure_size};
use crate::stroke::rng::disc_point;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Chalk configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChalkConfig {
    /// Speckles per stamp
    pub speckles: u32,
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
    /// Fraction of speckles dropped at full pressure; dryness rises as
    /// pressure falls
    pub dryness: f32,
}

impl Default for ChalkConfig {
    fn default() -> Self {
        Self {
            speckles: 24,
            spacing: 0.25,
            dryness: 0.25,
        }
    }
}

/// One chalk stroke
#[derive(Debug)]
pub struct ChalkSession {
    config: ChalkConfig,
    params: BrushParams,
    stroke: WalkedStroke,
}

impl ChalkSession {
    pub fn new(config: ChalkConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.8);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let radius = pressure_size(self.params.safe_size(), stamp.pressure, 0.4, 1.0) * 0.5;
        let base_alpha = pressure_opacity(self.params.color[3] * 0.8, stamp.pressure, 0.4, 0.6);
        // Light pressure leaves more of the paper tooth uncovered
        let skip = (self.config.dryness + (1.0 - stamp.pressure) * 0.4).clamp(0.0, 0.9);

        let mut rng = self.stroke.rng().for_stamp(stamp.index);
        for _ in 0..self.config.speckles {
            if rng.random::<f32>() < skip {
                continue;
            }
            let p = disc_point(&mut rng, stamp.pos, radius, 0.8);
            let speck = rng.random_range(0.5..1.8);
            let alpha = base_alpha * rng.random_range(0.3..1.0);
            let color = [
                self.params.color[0],
                self.params.color[1],
                self.params.color[2],
                alpha,
            ];
            surface.fill_circle(p, speck, 0.4, color, self.params.blend);
        }
        dirty.add(Rect::around(stamp.pos, radius + 3.0));
    }
}

impl StrokeSession for ChalkSession {
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

    fn run(pressure: f32) -> usize {
        let mut raster = Raster::new(96, 64);
        let mut session = ChalkSession::new(
            ChalkConfig::default(),
            BrushParams {
                size: 16.0,
                seed_nonce: 4,
                ..Default::default()
            },
        );
        session.start(&mut raster, &GestureEvent::new(16.0, 32.0, pressure, 0));
        session.update(&mut raster, &GestureEvent::new(80.0, 32.0, pressure, 16));
        session.finish(&mut raster, &GestureEvent::new(80.0, 32.0, pressure, 24));
        (0..96)
            .flat_map(|x| (0..64).map(move |y| (x, y)))
            .filter(|&(x, y)| raster.pixel(x, y)[3] > 0)
            .count()
    }

    #[test]
    fn test_chalk_coverage_is_broken() {
        let covered = run(1.0);
        // Speckled, not solid: some but far from all of the band
        assert!(covered > 50);
        assert!(covered < 96 * 64 / 2);
    }

    #[test]
    fn test_light_pressure_is_drier() {
        assert!(run(0.2) < run(1.0));
    }
}
