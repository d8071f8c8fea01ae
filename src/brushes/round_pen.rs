//! Round pen - continuous gap-free path with pressure-driven width

use serde::{Deserialize, Serialize};

use crate::brushes::common::PathTracer;
use crate::geom::{Dirty, DirtyAccum, Point, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::modulate::pressure_size;
use crate::stroke::{BrushParams, StrokeSession};

/// Round pen configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundPenConfig {
    /// Width at zero pressure as a fraction of full width
    pub min_width_ratio: f32,
}

impl Default for RoundPenConfig {
    fn default() -> Self {
        Self {
            min_width_ratio: 0.3,
        }
    }
}

/// One round-pen stroke
#[derive(Debug)]
pub struct RoundPenSession {
    config: RoundPenConfig,
    params: BrushParams,
    tracer: PathTracer,
}

impl RoundPenSession {
    pub fn new(config: RoundPenConfig, params: BrushParams) -> Self {
        Self {
            config,
            params,
            tracer: PathTracer::new(),
        }
    }

    fn width_at(&self, pressure: f32) -> f32 {
        pressure_size(
            self.params.safe_size(),
            pressure,
            self.config.min_width_ratio,
            1.0,
        )
    }

    fn render(&self, surface: &mut dyn Surface, run: &[(Point, f32)], dirty: &mut DirtyAccum) {
        if run.is_empty() {
            return;
        }
        let path: Vec<(Point, f32)> = run
            .iter()
            .map(|&(pos, pressure)| (pos, self.width_at(pressure)))
            .collect();
        surface.stroke_path(&path, self.params.color, self.params.blend);
        for &(pos, width) in &path {
            dirty.add(Rect::around(pos, width * 0.5 + 1.0));
        }
    }
}

impl StrokeSession for RoundPenSession {
    fn start(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        if let Some((pos, pressure)) = self.tracer.start(&self.params, event) {
            self.render(surface, &[(pos, pressure)], &mut dirty);
        }
        dirty.take()
    }

    fn update(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        let run = self.tracer.advance(&self.params, event);
        self.render(surface, &run, &mut dirty);
        dirty.take()
    }

    fn finish(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        let run = self.tracer.finish(&self.params, event);
        self.render(surface, &run, &mut dirty);
        dirty.take()
    }
}
