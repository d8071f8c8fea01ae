//! Raster layer - compositing, the drawing surface and texture resources

mod blend;
mod surface;
mod texture;

pub use blend::{composite, with_alpha, BlendMode, Rgba};
pub use surface::{Raster, StampPlacement, Surface};
pub use texture::{Texture, TextureSet, TextureStore};
