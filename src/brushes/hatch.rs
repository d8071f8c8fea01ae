//! Hatch - a field of short lines perpendicular to the stroke direction

use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Point, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::modulate::{pressure_opacity, pressure_size};
use crate::stroke::rng::jitter;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Hatch configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HatchConfig {
    /// Hatch line spacing along the path, as a fraction of size
    pub spacing: f32,
    /// Line thickness in pixels
    pub line_width: f32,
    /// Random angular wobble in radians
    pub wobble: f32,
}

impl Default for HatchConfig {
    fn default() -> Self {
        Self {
            spacing: 0.35,
            line_width: 1.2,
            wobble: 0.12,
        }
    }
}

/// One hatching stroke
#[derive(Debug)]
pub struct HatchSession {
    config: HatchConfig,
    params: BrushParams,
    stroke: WalkedStroke,
}

impl HatchSession {
    pub fn new(config: HatchConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.8);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let length = pressure_size(self.params.safe_size(), stamp.pressure, 0.4, 1.0);
        let half = length * 0.5;
        let alpha = pressure_opacity(self.params.color[3], stamp.pressure, 0.5, 0.5);

        let mut rng = self.stroke.rng().for_stamp(stamp.index);
        let angle =
            stamp.angle + std::f32::consts::FRAC_PI_2 + jitter(&mut rng, self.config.wobble);
        let (sin, cos) = angle.sin_cos();

        let a = Point::new(stamp.pos.x - cos * half, stamp.pos.y - sin * half);
        let b = Point::new(stamp.pos.x + cos * half, stamp.pos.y + sin * half);
        let color = [
            self.params.color[0],
            self.params.color[1],
            self.params.color[2],
            alpha,
        ];
        surface.stroke_line(a, b, self.config.line_width, color, self.params.blend);
        dirty.add(Rect::around(stamp.pos, half + self.config.line_width + 1.0));
    }
}

impl StrokeSession for HatchSession {
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
    fn test_hatch_extends_perpendicular() {
        let mut raster = Raster::new(128, 64);
        let mut session = HatchSession::new(
            HatchConfig {
                wobble: 0.0,
                ..Default::default()
            },
            BrushParams {
                size: 20.0,
                ..Default::default()
            },
        );
        // Horizontal drag: hatch lines run vertically
        session.start(&mut raster, &GestureEvent::new(20.0, 32.0, 1.0, 0));
        session.update(&mut raster, &GestureEvent::new(80.0, 32.0, 1.0, 16));
        session.finish(&mut raster, &GestureEvent::new(100.0, 32.0, 1.0, 32));

        let above = (0..128).filter(|&x| raster.pixel(x, 25)[3] > 0).count();
        let below = (0..128).filter(|&x| raster.pixel(x, 39)[3] > 0).count();
        assert!(above > 3);
        assert!(below > 3);
    }

    #[test]
    fn test_hatch_dirty_covers_line_length() {
        let mut raster = Raster::new(64, 64);
        let mut session = HatchSession::new(
            HatchConfig::default(),
            BrushParams {
                size: 30.0,
                ..Default::default()
            },
        );
        let dirty = session.start(&mut raster, &GestureEvent::new(32.0, 32.0, 1.0, 0));
        let rect = dirty.expect("tap must paint");
        assert!(rect.height() >= 15.0);
    }
}
