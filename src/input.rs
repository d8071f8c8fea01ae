//! Gesture events - normalized pointer samples fed into a stroke session
//!
//! The host's input layer produces one `GestureEvent` per pointer sample.
//! Pressure and velocity are optional; when a device omits them the
//! session substitutes the stroke-level fallback from `BrushParams`.

use serde::{Deserialize, Serialize};

use crate::geom::Point;

/// One pointer sample: position, optional pressure/velocity, timestamp
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GestureEvent {
    /// X coordinate in surface pixels
    pub x: f32,
    /// Y coordinate in surface pixels
    pub y: f32,
    /// Stylus pressure in [0, 1], if the device reports it
    pub pressure: Option<f32>,
    /// Instantaneous pointer velocity (pixels per millisecond), if known
    pub velocity: Option<f32>,
    /// Event timestamp in milliseconds
    pub timestamp_ms: u64,
}

impl GestureEvent {
    /// Create an event with position and pressure
    pub fn new(x: f32, y: f32, pressure: f32, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            pressure: Some(pressure),
            velocity: None,
            timestamp_ms,
        }
    }

    /// Create an event without pressure or velocity
    pub fn bare(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            pressure: None,
            velocity: None,
            timestamp_ms,
        }
    }

    /// Position as a point
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// All numeric fields are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.pressure.map_or(true, f32::is_finite)
            && self.velocity.map_or(true, f32::is_finite)
    }

    /// Pressure clamped to [0, 1], with a fallback when unreported
    pub fn pressure_or(&self, fallback: f32) -> f32 {
        self.pressure.unwrap_or(fallback).clamp(0.0, 1.0)
    }

    /// Velocity with a fallback when unreported
    pub fn velocity_or(&self, fallback: f32) -> f32 {
        self.velocity.unwrap_or(fallback).max(0.0)
    }
}
