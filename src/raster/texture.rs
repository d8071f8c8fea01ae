//! Immutable texture bitmaps and the shared texture store
//!
//! Textures are the only resource shared between concurrently active
//! strokes. They are immutable once created, so `Arc` sharing needs no
//! per-stroke locking; the store itself is guarded for registration from
//! the host's asset pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbaImage;
use parking_lot::RwLock;

use crate::error::BrushError;
use crate::raster::blend::Rgba;

/// An immutable RGBA8 stamp bitmap
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Texture {
    /// Create a texture from raw straight-alpha RGBA8 data
    ///
    /// Fails when the buffer length does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BrushError> {
        if width == 0 || height == 0 {
            return Err(BrushError::InvalidConfig(
                "texture dimensions must be non-zero".into(),
            ));
        }
        if pixels.len() != (width * height * 4) as usize {
            return Err(BrushError::InvalidConfig(format!(
                "texture buffer is {} bytes, expected {}",
                pixels.len(),
                width * height * 4
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a texture from a decoded image
    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Largest dimension, used for stamp scale normalization
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Nearest-neighbor sample at integer texel coordinates
    ///
    /// Out-of-bounds coordinates return transparent black.
    pub fn texel(&self, x: i32, y: i32) -> Rgba {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return [0.0; 4];
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        [
            self.pixels[idx] as f32 / 255.0,
            self.pixels[idx + 1] as f32 / 255.0,
            self.pixels[idx + 2] as f32 / 255.0,
            self.pixels[idx + 3] as f32 / 255.0,
        ]
    }

    /// Bilinear sample at fractional texel coordinates
    pub fn sample(&self, x: f32, y: f32) -> Rgba {
        let x = x - 0.5;
        let y = y - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);

        let p00 = self.texel(x0, y0);
        let p10 = self.texel(x0 + 1, y0);
        let p01 = self.texel(x0, y0 + 1);
        let p11 = self.texel(x0 + 1, y0 + 1);

        let mut out = [0.0f32; 4];
        for (i, channel) in out.iter_mut().enumerate() {
            let top = p00[i] + (p10[i] - p00[i]) * fx;
            let bottom = p01[i] + (p11[i] - p01[i]) * fx;
            *channel = top + (bottom - top) * fy;
        }
        out
    }

    /// Bilinear sample in normalized [0, 1] coordinates
    pub fn sample_uv(&self, u: f32, v: f32) -> Rgba {
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return [0.0; 4];
        }
        self.sample(u * self.width as f32, v * self.height as f32)
    }
}

/// A validated, non-empty list of stamp textures for one brush
#[derive(Debug, Clone)]
pub struct TextureSet {
    textures: Vec<Arc<Texture>>,
}

impl TextureSet {
    /// Create a texture set; an empty list is a fatal configuration error
    pub fn new(textures: Vec<Arc<Texture>>) -> Result<Self, BrushError> {
        if textures.is_empty() {
            return Err(BrushError::EmptyTextureList);
        }
        Ok(Self { textures })
    }

    /// Single-texture convenience constructor
    pub fn single(texture: Arc<Texture>) -> Self {
        Self {
            textures: vec![texture],
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Texture at `index % len`, so any stamp index maps to a texture
    pub fn pick(&self, index: usize) -> &Arc<Texture> {
        &self.textures[index % self.textures.len()]
    }

    /// Largest dimension across the set, for dirty-rect padding
    pub fn max_dimension(&self) -> u32 {
        self.textures
            .iter()
            .map(|t| t.max_dimension())
            .max()
            .unwrap_or(1)
    }
}

/// Host-owned registry of textures, shared read-only across strokes
#[derive(Debug, Default)]
pub struct TextureStore {
    textures: RwLock<HashMap<String, Arc<Texture>>>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture under an id, replacing any previous entry
    pub fn insert(&self, id: impl Into<String>, texture: Texture) {
        let id = id.into();
        tracing::debug!(
            "registering texture {} ({}x{})",
            id,
            texture.width(),
            texture.height()
        );
        self.textures.write().insert(id, Arc::new(texture));
    }

    /// Look up a texture by id
    pub fn get(&self, id: &str) -> Option<Arc<Texture>> {
        self.textures.read().get(id).cloned()
    }

    /// Resolve a list of ids into a validated texture set
    pub fn resolve(&self, ids: &[String]) -> Result<TextureSet, BrushError> {
        let guard = self.textures.read();
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let tex = guard
                .get(id)
                .cloned()
                .ok_or_else(|| BrushError::UnknownTexture(id.clone()))?;
            out.push(tex);
        }
        TextureSet::new(out)
    }

    pub fn len(&self) -> usize {
        self.textures.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.read().is_empty()
    }
}
