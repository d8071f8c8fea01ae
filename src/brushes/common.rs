//! Shared plumbing for stamping brushes
//!
//! Every stamping brush owns a `WalkedStroke`: the spacing walker, the
//! per-stroke random source and the degenerate-input guard, bundled so a
//! brush file only implements its stamp rendering. This is composition,
//! not a base class - each session decides per stamp what to draw.

use serde::{Deserialize, Serialize};

use crate::geom::{lerp, quad_arc_length, quad_point, Point};
use crate::input::GestureEvent;
use crate::stroke::{BrushParams, SpacingWalker, StampPoint, StampRng};

/// How a texture stamp is rotated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RotationMode {
    /// No rotation
    #[default]
    None,
    /// Fixed angle in radians
    Fixed(f32),
    /// Aligned to the instantaneous stroke direction
    Direction,
    /// Uniformly random per stamp
    Random,
    /// Exponentially smoothed toward the stroke direction
    FollowPath,
}

/// Walker + RNG + input guards for one stroke
#[derive(Debug)]
pub(crate) struct WalkedStroke {
    walker: SpacingWalker,
    rng: StampRng,
    warned_degenerate: bool,
}

impl WalkedStroke {
    pub fn new(step_px: f32) -> Self {
        Self {
            walker: SpacingWalker::new(step_px),
            rng: StampRng::new(0),
            warned_degenerate: false,
        }
    }

    pub fn rng(&self) -> &StampRng {
        &self.rng
    }

    /// Seed the stroke and emit the tap stamp; `None` for non-finite input
    pub fn start(&mut self, params: &BrushParams, event: &GestureEvent) -> Option<StampPoint> {
        if !event.is_finite() {
            self.warn_once();
            return None;
        }
        self.rng = StampRng::new(params.stroke_seed(event.timestamp_ms));
        Some(self.walker.start(
            event.position(),
            event.pressure_or(params.pressure),
            event.velocity_or(params.velocity),
        ))
    }

    /// Walk toward the next sample; degenerate events yield no stamps
    pub fn update(&mut self, params: &BrushParams, event: &GestureEvent) -> Vec<StampPoint> {
        let mut out = Vec::new();
        if !event.is_finite() {
            self.warn_once();
            return out;
        }
        self.walker.advance(
            event.position(),
            event.pressure_or(params.pressure),
            event.velocity_or(params.velocity),
            &mut out,
        );
        out
    }

    /// Close the stroke; always yields at least the terminal stamp
    pub fn finish(&mut self, params: &BrushParams, event: &GestureEvent) -> Vec<StampPoint> {
        let mut out = Vec::new();
        self.walker.finish(
            event.position(),
            event.pressure_or(params.pressure),
            event.velocity_or(params.velocity),
            &mut out,
        );
        out
    }

    fn warn_once(&mut self) {
        if !self.warned_degenerate {
            tracing::warn!("non-finite gesture event ignored");
            self.warned_degenerate = true;
        }
    }
}

/// Smoothed centerline sampler for the shape family
///
/// Same successive-midpoint quads as the walker, but instead of spaced
/// stamps it yields densely sampled `(point, pressure)` runs so the whole
/// segment can be filled as one continuous path.
#[derive(Debug)]
pub(crate) struct PathTracer {
    prev_mid: Point,
    anchor: Point,
    anchor_pressure: f32,
    mid_pressure: f32,
    started: bool,
    warned_degenerate: bool,
}

impl PathTracer {
    pub fn new() -> Self {
        Self {
            prev_mid: Point::default(),
            anchor: Point::default(),
            anchor_pressure: 1.0,
            mid_pressure: 1.0,
            started: false,
            warned_degenerate: false,
        }
    }

    pub fn start(&mut self, params: &BrushParams, event: &GestureEvent) -> Option<(Point, f32)> {
        if !event.is_finite() {
            self.warn_once();
            return None;
        }
        let pos = event.position();
        let pressure = event.pressure_or(params.pressure);
        self.prev_mid = pos;
        self.anchor = pos;
        self.anchor_pressure = pressure;
        self.mid_pressure = pressure;
        self.started = true;
        Some((pos, pressure))
    }

    /// Sample the quad toward the next midpoint; empty for degenerate input
    pub fn advance(&mut self, params: &BrushParams, event: &GestureEvent) -> Vec<(Point, f32)> {
        if !self.started || !event.is_finite() {
            self.warn_once();
            return Vec::new();
        }
        let pos = event.position();
        if self.anchor.distance_to(pos) < 1e-6 {
            return Vec::new();
        }
        let pressure = event.pressure_or(params.pressure);
        let mid = self.anchor.midpoint(pos);
        let mid_pressure = (self.anchor_pressure + pressure) * 0.5;
        let run = self.trace_quad(mid, mid_pressure);

        self.prev_mid = mid;
        self.mid_pressure = mid_pressure;
        self.anchor = pos;
        self.anchor_pressure = pressure;
        run
    }

    /// Close the centerline exactly at the final point
    pub fn finish(&mut self, params: &BrushParams, event: &GestureEvent) -> Vec<(Point, f32)> {
        if !self.started {
            return Vec::new();
        }
        let pos = if event.is_finite() {
            event.position()
        } else {
            self.anchor
        };
        let pressure = event.pressure_or(params.pressure);
        self.started = false;
        let mut run = self.trace_quad(pos, pressure);
        if run.is_empty() {
            run.push((pos, pressure));
        }
        run
    }

    fn trace_quad(&self, end: Point, end_pressure: f32) -> Vec<(Point, f32)> {
        let len = quad_arc_length(self.prev_mid, self.anchor, end);
        if len < 1e-6 {
            return Vec::new();
        }
        // Subdivide finely in the curve parameter, then emit samples by
        // accumulated chord length. Uniform-t sampling bunches points
        // wherever the control point sits near an endpoint (the first
        // segment always does, since the anchor starts on the curve).
        let steps = ((len / 0.25).ceil() as usize).max(16);
        let mut run = Vec::new();
        let mut cursor = self.prev_mid;
        let mut travelled = 0.0f32;
        let mut since_emit = f32::MAX;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let p = quad_point(self.prev_mid, self.anchor, end, t);
            let chord = cursor.distance_to(p);
            travelled += chord;
            since_emit += chord;
            cursor = p;
            if since_emit >= 1.0 || i == steps {
                let s = (travelled / len).min(1.0);
                run.push((p, lerp(self.mid_pressure, end_pressure, s)));
                since_emit = 0.0;
            }
        }
        run
    }

    fn warn_once(&mut self) {
        if !self.warned_degenerate {
            tracing::warn!("non-finite gesture event ignored");
            self.warned_degenerate = true;
        }
    }
}

/// Resolve a rotation mode into a stamp angle
pub(crate) fn resolve_rotation(
    mode: RotationMode,
    stamp: &StampPoint,
    rng: &StampRng,
    smoothed: &mut f32,
) -> f32 {
    match mode {
        RotationMode::None => 0.0,
        RotationMode::Fixed(angle) => angle,
        RotationMode::Direction => stamp.angle,
        RotationMode::Random => {
            use rand::Rng;
            let mut r = rng.for_stamp(stamp.index ^ 0x0707);
            r.random_range(0.0..std::f32::consts::TAU)
        }
        RotationMode::FollowPath => {
            // Exponential smoothing over the shortest angular difference
            let mut delta = stamp.angle - *smoothed;
            while delta > std::f32::consts::PI {
                delta -= std::f32::consts::TAU;
            }
            while delta < -std::f32::consts::PI {
                delta += std::f32::consts::TAU;
            }
            *smoothed += delta * 0.2;
            *smoothed
        }
    }
}
