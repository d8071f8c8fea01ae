//! Gradient - soft radial color ramps stamped along the path

use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{Rgba, Surface};
use crate::stroke::modulate::pressure_size;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Gradient configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientConfig {
    /// Rim color; the stroke color forms the center
    pub outer_color: Rgba,
    /// Rim alpha relative to the center alpha
    pub outer_alpha: f32,
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            outer_color: [1.0, 1.0, 1.0, 1.0],
            outer_alpha: 0.0,
            spacing: 0.3,
        }
    }
}

/// One gradient stroke
#[derive(Debug)]
pub struct GradientSession {
    config: GradientConfig,
    params: BrushParams,
    stroke: WalkedStroke,
}

impl GradientSession {
    pub fn new(config: GradientConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let radius = pressure_size(self.params.safe_size(), stamp.pressure, 0.3, 1.0) * 0.5;
        let inner = self.params.color;
        let outer = [
            self.config.outer_color[0],
            self.config.outer_color[1],
            self.config.outer_color[2],
            self.config.outer_color[3] * self.config.outer_alpha * inner[3],
        ];
        surface.radial_gradient(stamp.pos, radius, inner, outer, self.params.blend);
        dirty.add(Rect::around(stamp.pos, radius + 1.0));
    }
}

impl StrokeSession for GradientSession {
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
