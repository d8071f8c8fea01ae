//! Marker - wide soft dabs composited with multiply for layered darkening

use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{BlendMode, Surface};
use crate::stroke::modulate::pressure_opacity;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Marker configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerConfig {
    /// Edge softness of the tip
    pub hardness: f32,
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
    /// Per-dab ink flow
    pub flow: f32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            hardness: 0.6,
            spacing: 0.2,
            flow: 0.35,
        }
    }
}

/// One marker stroke; width stays constant, pressure drives only flow
#[derive(Debug)]
pub struct MarkerSession {
    config: MarkerConfig,
    params: BrushParams,
    stroke: WalkedStroke,
}

impl MarkerSession {
    pub fn new(config: MarkerConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let radius = self.params.safe_size() * 0.5;
        let alpha = pressure_opacity(self.config.flow, stamp.pressure, 0.4, 0.6)
            * self.params.color[3];
        let color = [
            self.params.color[0],
            self.params.color[1],
            self.params.color[2],
            alpha,
        ];
        surface.fill_circle(stamp.pos, radius, self.config.hardness, color, BlendMode::Multiply);
        dirty.add(Rect::around(stamp.pos, radius + 1.0));
    }
}

impl StrokeSession for MarkerSession {
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
