//! Crayon - waxy buildup from layered, jittered translucent rings

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Point, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::modulate::{pressure_opacity, pressure_size};
use crate::stroke::rng::jitter;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Crayon configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrayonConfig {
    /// Translucent layers per stamp
    pub layers: u32,
    /// Positional jitter as a fraction of size
    pub jitter_ratio: f32,
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
}

impl Default for CrayonConfig {
    fn default() -> Self {
        Self {
            layers: 3,
            jitter_ratio: 0.18,
            spacing: 0.22,
        }
    }
}

/// One crayon stroke
#[derive(Debug)]
pub struct CrayonSession {
    config: CrayonConfig,
    params: BrushParams,
    stroke: WalkedStroke,
}

impl CrayonSession {
    pub fn new(config: CrayonConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.8);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let size = pressure_size(self.params.safe_size(), stamp.pressure, 0.35, 1.0);
        let jitter_amount = size * self.config.jitter_ratio;
        let alpha = pressure_opacity(self.params.color[3] * 0.4, stamp.pressure, 0.5, 0.5);

        let mut rng = self.stroke.rng().for_stamp(stamp.index);
        for layer in 0..self.config.layers {
            let shrink = 1.0 - layer as f32 * 0.18;
            let center = Point::new(
                stamp.pos.x + jitter(&mut rng, jitter_amount),
                stamp.pos.y + jitter(&mut rng, jitter_amount),
            );
            let color = [
                self.params.color[0],
                self.params.color[1],
                self.params.color[2],
                alpha * rng.random_range(0.6..1.0),
            ];
            surface.fill_circle(center, size * 0.5 * shrink, 0.55, color, self.params.blend);
        }
        dirty.add(Rect::around(stamp.pos, size * 0.5 + jitter_amount + 1.0));
    }
}

impl StrokeSession for CrayonSession {
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
