//! Ribbon - filled path whose width swells and collapses with motion

use serde::{Deserialize, Serialize};

use crate::brushes::common::PathTracer;
use crate::geom::{Dirty, DirtyAccum, Point, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::modulate::{pressure_size, velocity_factor};
use crate::stroke::{BrushParams, StrokeSession};

/// Ribbon configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RibbonConfig {
    /// Width at zero pressure as a fraction of full width
    pub min_width_ratio: f32,
    /// Speed at which the ribbon thins to halfway, px/ms
    pub half_speed: f32,
    /// Narrowest width a fast stroke can reach, as a ratio
    pub speed_floor: f32,
    /// Length of the tapered tail at the stroke end, in samples
    pub taper_samples: u32,
}

impl Default for RibbonConfig {
    fn default() -> Self {
        Self {
            min_width_ratio: 0.15,
            half_speed: 1.5,
            speed_floor: 0.25,
            taper_samples: 12,
        }
    }
}

/// One ribbon stroke
#[derive(Debug)]
pub struct RibbonSession {
    config: RibbonConfig,
    params: BrushParams,
    tracer: PathTracer,
    velocity: f32,
}

impl RibbonSession {
    pub fn new(config: RibbonConfig, params: BrushParams) -> Self {
        Self {
            config,
            params,
            tracer: PathTracer::new(),
            velocity: 0.0,
        }
    }

    fn width_at(&self, pressure: f32) -> f32 {
        let base = pressure_size(
            self.params.safe_size(),
            pressure,
            self.config.min_width_ratio,
            1.0,
        );
        base * velocity_factor(self.velocity, self.config.half_speed, self.config.speed_floor)
    }

    fn render(&self, surface: &mut dyn Surface, path: &[(Point, f32)], dirty: &mut DirtyAccum) {
        if path.is_empty() {
            return;
        }
        surface.stroke_path(path, self.params.color, self.params.blend);
        for &(pos, width) in path {
            dirty.add(Rect::around(pos, width * 0.5 + 1.0));
        }
    }

    fn widths(&self, run: &[(Point, f32)]) -> Vec<(Point, f32)> {
        run.iter()
            .map(|&(pos, pressure)| (pos, self.width_at(pressure)))
            .collect()
    }
}

impl StrokeSession for RibbonSession {
    fn start(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        self.velocity = event.velocity_or(self.params.velocity);
        if let Some((pos, pressure)) = self.tracer.start(&self.params, event) {
            let path = self.widths(&[(pos, pressure)]);
            self.render(surface, &path, &mut dirty);
        }
        dirty.take()
    }

    fn update(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        // Smooth velocity so one slow event cannot balloon the ribbon
        let sample = event.velocity_or(self.params.velocity);
        self.velocity += (sample - self.velocity) * 0.3;
        let run = self.tracer.advance(&self.params, event);
        let path = self.widths(&run);
        self.render(surface, &path, &mut dirty);
        dirty.take()
    }

    fn finish(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        let run = self.tracer.finish(&self.params, event);
        let mut path = self.widths(&run);

        // Collapse the tail to a point
        let taper = (self.config.taper_samples as usize).min(path.len());
        let n = path.len();
        for (i, entry) in path.iter_mut().enumerate().skip(n - taper) {
            let t = (n - i) as f32 / taper as f32;
            entry.1 *= t.max(0.05);
        }
        self.render(surface, &path, &mut dirty);
        dirty.take()
    }
}
