//! Airbrush - time-rate particle emission rather than arc-length spacing
//!
//! Density is governed by elapsed time and travel speed: holding the
//! pointer still keeps depositing paint, and faster motion emits
//! proportionally more particles so coverage per unit path length stays
//! even, like a continuous spray.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geom::{Dirty, DirtyAccum, Point, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::modulate::pressure_opacity;
use crate::stroke::rng::disc_point;
use crate::stroke::{BrushParams, StampRng, StrokeSession};

/// Airbrush configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirbrushConfig {
    /// Particles per second while stationary
    pub rate: f32,
    /// Extra particles per pixel of travel
    pub travel_gain: f32,
    /// Particle radius in pixels
    pub particle_radius: f32,
    /// Center bias of the spray cone; 1.0 = uniform area density
    pub falloff: f32,
    /// Upper bound on particles for a single call
    pub max_burst: u32,
}

impl Default for AirbrushConfig {
    fn default() -> Self {
        Self {
            rate: 400.0,
            travel_gain: 1.5,
            particle_radius: 1.2,
            falloff: 1.8,
            max_burst: 256,
        }
    }
}

/// One airbrush stroke
#[derive(Debug)]
pub struct AirbrushSession {
    config: AirbrushConfig,
    params: BrushParams,
    rng: StampRng,
    last_pos: Point,
    last_time_ms: u64,
    particle_index: u64,
    active: bool,
}

impl AirbrushSession {
    pub fn new(config: AirbrushConfig, params: BrushParams) -> Self {
        Self {
            config,
            params,
            rng: StampRng::new(0),
            last_pos: Point::default(),
            last_time_ms: 0,
            particle_index: 0,
            active: false,
        }
    }

    /// Spray `count` particles along the segment from `from` to `to`
    fn spray(
        &mut self,
        surface: &mut dyn Surface,
        from: Point,
        to: Point,
        count: u32,
        pressure: f32,
        dirty: &mut DirtyAccum,
    ) {
        if count == 0 {
            return;
        }
        let spread = self.params.safe_size() * 0.5;
        let alpha = pressure_opacity(self.params.color[3] * 0.18, pressure, 0.3, 0.7);
        let color = [
            self.params.color[0],
            self.params.color[1],
            self.params.color[2],
            alpha,
        ];

        for i in 0..count {
            let mut rng = self.rng.for_stamp(self.particle_index);
            self.particle_index += 1;
            // Distribute particles along the movement so fast swipes
            // leave a continuous band, not clumps at event positions.
            let t = if count > 1 { i as f32 / (count - 1) as f32 } else { rng.random() };
            let center = from.lerp(to, t);
            let p = disc_point(&mut rng, center, spread, self.config.falloff);
            surface.fill_circle(p, self.config.particle_radius, 0.5, color, self.params.blend);
        }
        let pad = spread + self.config.particle_radius + 1.0;
        dirty.merge(Some(Rect::spanning(from, to).pad(pad)));
    }

    fn emit_for_elapsed(
        &mut self,
        surface: &mut dyn Surface,
        event: &GestureEvent,
        dirty: &mut DirtyAccum,
    ) {
        let elapsed_ms = event.timestamp_ms.saturating_sub(self.last_time_ms).min(500);
        let travel = self.last_pos.distance_to(event.position());
        let count = (self.config.rate * elapsed_ms as f32 / 1000.0
            + self.config.travel_gain * travel)
            .round()
            .clamp(0.0, self.config.max_burst as f32) as u32;

        let from = self.last_pos;
        let to = event.position();
        self.spray(
            surface,
            from,
            to,
            count,
            event.pressure_or(self.params.pressure),
            dirty,
        );
        self.last_pos = to;
        self.last_time_ms = event.timestamp_ms;
    }
}

impl StrokeSession for AirbrushSession {
    fn start(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        if !event.is_finite() {
            return None;
        }
        self.rng = StampRng::new(self.params.stroke_seed(event.timestamp_ms));
        self.last_pos = event.position();
        self.last_time_ms = event.timestamp_ms;
        self.active = true;

        // Initial puff so a tap is visible
        let mut dirty = DirtyAccum::new();
        let pos = event.position();
        let burst = (self.config.rate * 0.02).ceil().max(8.0) as u32;
        self.spray(
            surface,
            pos,
            pos,
            burst,
            event.pressure_or(self.params.pressure),
            &mut dirty,
        );
        dirty.take()
    }

    fn update(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        if !self.active || !event.is_finite() {
            return None;
        }
        let mut dirty = DirtyAccum::new();
        self.emit_for_elapsed(surface, event, &mut dirty);
        dirty.take()
    }

    fn finish(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        if !self.active {
            return None;
        }
        self.active = false;
        if !event.is_finite() {
            return None;
        }
        let mut dirty = DirtyAccum::new();
        self.emit_for_elapsed(surface, event, &mut dirty);
        dirty.take()
    }
}
