//! Calligraphy - flat nib held at a fixed angle
//!
//! Each stamp draws the nib as a short thick segment. Stroke width then
//! depends on how the travel direction crosses the nib: strokes across
//! the nib come out broad, strokes along it come out thin.

use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::modulate::pressure_size;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Calligraphy configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalligraphyConfig {
    /// Nib angle in radians, measured from the x axis
    pub nib_angle: f32,
    /// Nib thickness as a fraction of size
    pub nib_ratio: f32,
    /// Minimum effective width when moving along the nib
    pub thin_ratio: f32,
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
}

impl Default for CalligraphyConfig {
    fn default() -> Self {
        Self {
            nib_angle: std::f32::consts::FRAC_PI_4,
            nib_ratio: 0.22,
            thin_ratio: 0.15,
            spacing: 0.1,
        }
    }
}

/// One calligraphy stroke
#[derive(Debug)]
pub struct CalligraphySession {
    config: CalligraphyConfig,
    params: BrushParams,
    stroke: WalkedStroke,
}

impl CalligraphySession {
    pub fn new(config: CalligraphyConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let size = pressure_size(self.params.safe_size(), stamp.pressure, 0.5, 1.0);
        // Travel perpendicular to the nib exposes its full breadth
        let cross = (stamp.angle - self.config.nib_angle).sin().abs();
        let breadth = size * 0.5 * (self.config.thin_ratio + (1.0 - self.config.thin_ratio) * cross);

        let a = stamp.pos.offset_polar(self.config.nib_angle, breadth);
        let b = stamp.pos.offset_polar(self.config.nib_angle, -breadth);
        let thickness = (size * self.config.nib_ratio).max(1.0);
        surface.stroke_line(a, b, thickness, self.params.color, self.params.blend);

        dirty.add(Rect::around(stamp.pos, breadth + thickness * 0.5 + 1.0));
    }
}

impl StrokeSession for CalligraphySession {
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
