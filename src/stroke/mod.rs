//! Stroke session contract and the shared stroke machinery
//!
//! A stroke session is the mutable state machine for one pointer-down to
//! pointer-up interaction. The host creates one session per pointer-down
//! (one per pointer id under multi-touch), feeds every pointer sample
//! exactly once, and drops the session after `finish`. Sessions never
//! share state with each other; the only cross-stroke resource is the
//! immutable texture store.

pub mod modulate;
pub mod params;
pub mod rng;
pub mod walker;

pub use params::BrushParams;
pub use rng::StampRng;
pub use walker::{SpacingWalker, StampPoint};

use crate::geom::Dirty;
use crate::input::GestureEvent;
use crate::raster::Surface;

/// Per-gesture state machine implemented by every brush
///
/// States: Idle -> Active -> Ended. The host guarantees `start` is called
/// first and exactly once, `update` only while active, and `finish` last;
/// a session is never reused. Each call returns the dirty region bounding
/// everything it painted, `None` when nothing was painted.
pub trait StrokeSession: std::fmt::Debug {
    /// Begin the stroke; always leaves a visible tap mark
    fn start(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty;

    /// Feed one pointer-move sample
    ///
    /// May return `None` when the pointer did not advance far enough to
    /// cross the spacing threshold, or when the event is degenerate.
    fn update(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty;

    /// Feed the final sample and close the stroke
    fn finish(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty;
}
