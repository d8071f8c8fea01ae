//! Pencil - short jittered graphite strokes parallel to the path

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::modulate::{pressure_opacity, pressure_size};
use crate::stroke::rng::jitter;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Pencil configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PencilConfig {
    /// Graphite strands per stamp
    pub strands: u32,
    /// Perpendicular jitter as a fraction of size
    pub jitter_ratio: f32,
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
}

impl Default for PencilConfig {
    fn default() -> Self {
        Self {
            strands: 4,
            jitter_ratio: 0.4,
            spacing: 0.3,
        }
    }
}

/// One pencil stroke
#[derive(Debug)]
pub struct PencilSession {
    config: PencilConfig,
    params: BrushParams,
    stroke: WalkedStroke,
}

impl PencilSession {
    pub fn new(config: PencilConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let size = pressure_size(self.params.safe_size(), stamp.pressure, 0.3, 1.0);
        let half_len = size * 0.5;
        let jitter_amount = size * self.config.jitter_ratio;
        let alpha = pressure_opacity(self.params.color[3] * 0.5, stamp.pressure, 0.4, 0.6);

        let mut rng = self.stroke.rng().for_stamp(stamp.index);
        let (sin, cos) = stamp.angle.sin_cos();
        // Perpendicular unit vector for strand offsets
        let (px, py) = (-sin, cos);

        for _ in 0..self.config.strands {
            let offset = jitter(&mut rng, jitter_amount);
            let along = jitter(&mut rng, half_len * 0.3);
            let cx = stamp.pos.x + px * offset + cos * along;
            let cy = stamp.pos.y + py * offset + sin * along;

            let a = crate::geom::Point::new(cx - cos * half_len, cy - sin * half_len);
            let b = crate::geom::Point::new(cx + cos * half_len, cy + sin * half_len);
            let strand_alpha = alpha * rng.random_range(0.5..1.0);
            let color = [
                self.params.color[0],
                self.params.color[1],
                self.params.color[2],
                strand_alpha,
            ];
            surface.stroke_line(a, b, 1.0, color, self.params.blend);
        }

        // Pad for jitter plus strand length in any direction
        dirty.add(Rect::around(stamp.pos, half_len + jitter_amount + 2.0));
    }
}

impl StrokeSession for PencilSession {
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
