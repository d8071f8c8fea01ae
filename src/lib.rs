//! inkforge - the stroke-rendering core of a raster painting application
//!
//! Turns a live stream of pointer samples (position, pressure, time) into
//! marks on a raster surface. The host feeds one `GestureEvent` at a time
//! into a `StrokeSession` created per pointer-down; every call returns
//! the dirty region that must be repainted.
//!
//! The pipeline, leaves first:
//! - [`geom`] - point/rect math and the dirty-region algebra;
//! - [`input`] - normalized pointer samples;
//! - [`stroke`] - midpoint smoothing, the arc-length spacing walker,
//!   per-stroke parameters and seeded randomness;
//! - [`raster`] - the `Surface` drawing contract, compositing modes,
//!   textures and the software `Raster` implementation;
//! - [`texgen`] - procedural stamp-texture synthesis;
//! - [`brushes`] - the 25 concrete brushes and the session factory;
//! - [`sim`] - delayed drying timers for wet-media brushes.

pub mod brushes;
pub mod error;
pub mod geom;
pub mod input;
pub mod raster;
pub mod sim;
pub mod stroke;
pub mod texgen;

pub use brushes::{create_session, BrushSpec};
pub use error::BrushError;
pub use geom::{Dirty, Point, Rect};
pub use input::GestureEvent;
pub use raster::{BlendMode, Raster, Surface, TextureStore};
pub use stroke::{BrushParams, StrokeSession};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for hosts that do not bring their own subscriber
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkforge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("inkforge initializing...");
}
