//! Path smoothing and arc-length spacing walker
//!
//! The shared backbone of every stamping brush. Raw pointer samples are
//! smoothed with successive-midpoint quadratics (curve from the previous
//! reached midpoint, through the last raw anchor as control point, to the
//! new midpoint), then walked at a fixed arc-length step. Leftover
//! distance is carried into the next call, so stamp density depends only
//! on the step and the geometric path length, never on how many raw
//! events arrived per unit time.

use crate::geom::{lerp, quad_arc_length, quad_point, Point};

/// One stamp placement request emitted by the walker
#[derive(Debug, Clone, Copy)]
pub struct StampPoint {
    /// Stamp center in surface pixels
    pub pos: Point,
    /// Pressure interpolated along the smoothed curve, [0, 1]
    pub pressure: f32,
    /// Velocity interpolated along the smoothed curve
    pub velocity: f32,
    /// Local path direction in radians
    pub angle: f32,
    /// Monotone per-stroke stamp index, for seeded randomness
    pub index: u64,
}

/// Midpoint-smoothing, residual-carrying spacing walker
#[derive(Debug, Clone)]
pub struct SpacingWalker {
    step_px: f32,
    /// Last reached smoothed midpoint (start of the next rendered quad)
    prev_mid: Point,
    /// Last raw anchor (control point of the next rendered quad)
    anchor: Point,
    anchor_pressure: f32,
    anchor_velocity: f32,
    /// Pressure/velocity at `prev_mid`
    mid_pressure: f32,
    mid_velocity: f32,
    /// Path direction at the last emitted stamp
    last_angle: f32,
    /// Arc length accumulated since the last stamp
    residual: f32,
    next_index: u64,
    started: bool,
}

impl SpacingWalker {
    /// Create a walker with the given stamp spacing in pixels
    pub fn new(step_px: f32) -> Self {
        Self {
            step_px: if step_px.is_finite() { step_px.max(0.1) } else { 1.0 },
            prev_mid: Point::default(),
            anchor: Point::default(),
            anchor_pressure: 0.0,
            anchor_velocity: 0.0,
            mid_pressure: 0.0,
            mid_velocity: 0.0,
            last_angle: 0.0,
            residual: 0.0,
            next_index: 0,
            started: false,
        }
    }

    /// Stamp spacing in pixels
    pub fn step_px(&self) -> f32 {
        self.step_px
    }

    /// Number of stamps emitted so far
    pub fn stamp_count(&self) -> u64 {
        self.next_index
    }

    /// Begin a stroke; returns the immediate tap stamp
    ///
    /// A tap must leave a visible mark before any curve exists, so the
    /// first stamp is issued here unconditionally.
    pub fn start(&mut self, pos: Point, pressure: f32, velocity: f32) -> StampPoint {
        self.prev_mid = pos;
        self.anchor = pos;
        self.anchor_pressure = pressure;
        self.anchor_velocity = velocity;
        self.mid_pressure = pressure;
        self.mid_velocity = velocity;
        self.last_angle = 0.0;
        self.residual = 0.0;
        self.started = true;
        self.emit(pos, pressure, velocity, 0.0)
    }

    /// Feed the next raw point; appends spaced stamps to `out`
    ///
    /// Degenerate input (non-finite or zero-length movement) is a no-op.
    pub fn advance(&mut self, pos: Point, pressure: f32, velocity: f32, out: &mut Vec<StampPoint>) {
        if !self.started || !pos.is_finite() {
            return;
        }
        if self.anchor.distance_to(pos) < 1e-6 {
            return;
        }

        let mid = self.anchor.midpoint(pos);
        let end_pressure = (self.anchor_pressure + pressure) * 0.5;
        let end_velocity = (self.anchor_velocity + velocity) * 0.5;

        self.walk_quad(self.anchor, mid, end_pressure, end_velocity, out);

        self.prev_mid = mid;
        self.mid_pressure = end_pressure;
        self.mid_velocity = end_velocity;
        self.anchor = pos;
        self.anchor_pressure = pressure;
        self.anchor_velocity = velocity;
    }

    /// Close the stroke at the final raw point
    ///
    /// Treats the last anchor as the closing control point and always
    /// emits one terminal stamp so the stroke ends crisply even when the
    /// residual never reached the step.
    pub fn finish(
        &mut self,
        pos: Point,
        pressure: f32,
        velocity: f32,
        out: &mut Vec<StampPoint>,
    ) {
        if !self.started {
            return;
        }
        let end = if pos.is_finite() { pos } else { self.anchor };
        self.walk_quad(self.anchor, end, pressure, velocity, out);
        out.push(self.emit(end, pressure, velocity, self.last_angle));
        self.started = false;
    }

    /// Walk the quadratic from `prev_mid` through `control` to `end`,
    /// emitting stamps every `step_px` of arc length
    fn walk_quad(
        &mut self,
        control: Point,
        end: Point,
        end_pressure: f32,
        end_velocity: f32,
        out: &mut Vec<StampPoint>,
    ) {
        let a = self.prev_mid;
        let len = quad_arc_length(a, control, end);
        if len < 1e-6 {
            return;
        }

        // At least 8 subdivisions, denser for long segments, so the
        // per-substep linear interpolation error stays small.
        let steps = ((len / 6.0).ceil() as usize).max(8);

        let mut cursor = a;
        let mut cursor_t = 0.0f32;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let target = quad_point(a, control, end, t);
            let mut seg_len = cursor.distance_to(target);
            if seg_len < 1e-9 {
                continue;
            }
            let angle = cursor.angle_to(target);
            self.last_angle = angle;

            while self.residual + seg_len >= self.step_px {
                let need = self.step_px - self.residual;
                let frac = (need / seg_len).clamp(0.0, 1.0);
                let hit = cursor.lerp(target, frac);
                cursor_t = cursor_t + (t - cursor_t) * frac;

                let pressure = lerp(self.mid_pressure, end_pressure, cursor_t);
                let velocity = lerp(self.mid_velocity, end_velocity, cursor_t);
                out.push(self.emit(hit, pressure, velocity, angle));

                cursor = hit;
                seg_len -= need;
                self.residual = 0.0;
            }

            self.residual += seg_len;
            cursor = target;
            cursor_t = t;
        }
    }

    fn emit(&mut self, pos: Point, pressure: f32, velocity: f32, angle: f32) -> StampPoint {
        let stamp = StampPoint {
            pos,
            pressure: pressure.clamp(0.0, 1.0),
            velocity: velocity.max(0.0),
            angle,
            index: self.next_index,
        };
        self.next_index += 1;
        stamp
    }
}
