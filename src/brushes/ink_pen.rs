//! Ink pen - crisp round dabs, pressure drives width and ink density

use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::modulate::{pressure_opacity, pressure_size, velocity_factor};
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Ink pen configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InkPenConfig {
    /// Edge hardness, 1.0 = crisp
    pub hardness: f32,
    /// Size ratio at zero pressure
    pub min_size_ratio: f32,
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
    /// Velocity at which thinning reaches halfway
    pub velocity_half_speed: f32,
}

impl Default for InkPenConfig {
    fn default() -> Self {
        Self {
            hardness: 0.95,
            min_size_ratio: 0.15,
            spacing: 0.12,
            velocity_half_speed: 4.0,
        }
    }
}

/// One ink pen stroke
#[derive(Debug)]
pub struct InkPenSession {
    config: InkPenConfig,
    params: BrushParams,
    stroke: WalkedStroke,
}

impl InkPenSession {
    pub fn new(config: InkPenConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let thin = velocity_factor(stamp.velocity, self.config.velocity_half_speed, 0.5);
        let size = pressure_size(
            self.params.safe_size(),
            stamp.pressure,
            self.config.min_size_ratio,
            1.0,
        ) * thin;
        let opacity = pressure_opacity(self.params.color[3], stamp.pressure, 0.6, 0.4) * thin;

        let radius = size * 0.5;
        let color = [
            self.params.color[0],
            self.params.color[1],
            self.params.color[2],
            opacity,
        ];
        surface.fill_circle(stamp.pos, radius, self.config.hardness, color, self.params.blend);
        dirty.add(Rect::around(stamp.pos, radius + 1.0));
    }
}

impl StrokeSession for InkPenSession {
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
