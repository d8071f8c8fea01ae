//! Eraser - removes surface alpha with the Clear compositing mode

use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{BlendMode, Surface};
use crate::stroke::modulate::pressure_size;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Eraser configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraserConfig {
    /// Edge hardness
    pub hardness: f32,
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
    /// Erase strength per dab
    pub strength: f32,
}

impl Default for EraserConfig {
    fn default() -> Self {
        Self {
            hardness: 0.8,
            spacing: 0.15,
            strength: 1.0,
        }
    }
}

/// One eraser stroke
#[derive(Debug)]
pub struct EraserSession {
    config: EraserConfig,
    params: BrushParams,
    stroke: WalkedStroke,
}

impl EraserSession {
    pub fn new(config: EraserConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let radius = pressure_size(self.params.safe_size(), stamp.pressure, 0.2, 1.0) * 0.5;
        // Color is irrelevant for Clear; alpha carries erase strength
        surface.fill_circle(
            stamp.pos,
            radius,
            self.config.hardness,
            [0.0, 0.0, 0.0, self.config.strength],
            BlendMode::Clear,
        );
        dirty.add(Rect::around(stamp.pos, radius + 1.0));
    }
}

impl StrokeSession for EraserSession {
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
