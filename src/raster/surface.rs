//! Drawing surface abstraction and the software raster implementation
//!
//! Brushes draw through the dyn-safe `Surface` trait, which models the
//! primitive set the host's rendering backend must provide: falloff
//! circles, capped lines, rects, variable-width paths, radial gradients
//! and transformed texture stamps, each with a compositing mode.
//!
//! `Raster` is the crate's own straight-alpha RGBA8 implementation. It is
//! what the tests composite into, and a host without a GPU backend can
//! use it directly and blit the dirty region.

use crate::geom::{Point, Rect};
use crate::raster::blend::{composite, BlendMode, Rgba};
use crate::raster::texture::Texture;

/// Placement of one texture stamp on the surface
#[derive(Debug, Clone, Copy)]
pub struct StampPlacement {
    /// Stamp center in surface pixels
    pub center: Point,
    /// Uniform scale factor from texel to surface pixel
    pub scale: f32,
    /// Rotation around the center, radians
    pub rotation: f32,
    /// Overall opacity multiplier
    pub opacity: f32,
    /// Optional multiplicative color filter
    pub tint: Option<Rgba>,
    /// Mirror horizontally before rotation
    pub flip_x: bool,
    /// Mirror vertically before rotation
    pub flip_y: bool,
}

impl StampPlacement {
    /// Axis-aligned placement with no tint or flips
    pub fn new(center: Point, scale: f32) -> Self {
        Self {
            center,
            scale,
            rotation: 0.0,
            opacity: 1.0,
            tint: None,
            flip_x: false,
            flip_y: false,
        }
    }

    /// Conservative half-extent of the stamped area for a texture,
    /// covering any rotation
    pub fn half_extent(&self, texture: &Texture) -> f32 {
        let w = texture.width() as f32 * self.scale;
        let h = texture.height() as f32 * self.scale;
        0.5 * (w * w + h * h).sqrt() + 1.0
    }
}

/// Raster drawing surface consumed by every brush
///
/// All operations clip against the surface bounds and must tolerate
/// positions partially or fully outside it.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Filled circle with a radial falloff edge
    ///
    /// `hardness` 1.0 gives a crisp anti-aliased edge, 0.0 a fully soft
    /// falloff from the center.
    fn fill_circle(&mut self, center: Point, radius: f32, hardness: f32, color: Rgba, mode: BlendMode);

    /// Line segment with round caps
    fn stroke_line(&mut self, a: Point, b: Point, width: f32, color: Rgba, mode: BlendMode);

    /// Axis-aligned filled rectangle with crisp edges
    fn fill_rect(&mut self, rect: Rect, color: Rgba, mode: BlendMode);

    /// Gap-free variable-width polyline with round joins and caps
    ///
    /// Each entry is a centerline point with its stroke width at that
    /// point. Intended for opaque shape-family brushes.
    fn stroke_path(&mut self, points: &[(Point, f32)], color: Rgba, mode: BlendMode);

    /// Radial gradient disc from `inner` at the center to `outer` at the rim
    fn radial_gradient(&mut self, center: Point, radius: f32, inner: Rgba, outer: Rgba, mode: BlendMode);

    /// Scaled, rotated, optionally tinted/flipped texture stamp
    fn draw_texture(&mut self, texture: &Texture, placement: &StampPlacement, mode: BlendMode);
}

/// Software surface over a straight-alpha RGBA8 buffer
#[derive(Debug, Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Create a transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    /// Read one pixel; out-of-bounds reads return transparent black
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Raw pixel buffer (row-major RGBA8)
    pub fn data(&self) -> &[u8] {
        &self.pixels
    }

    /// Copy of the full buffer, for snapshot-based comparisons
    pub fn snapshot(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    #[inline]
    fn blend_pixel(&mut self, x: u32, y: u32, src: Rgba, mode: BlendMode) {
        let idx = ((y * self.width + x) * 4) as usize;
        composite(&mut self.pixels[idx..idx + 4], src, mode);
    }
}

impl Surface for Raster {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_circle(&mut self, center: Point, radius: f32, hardness: f32, color: Rgba, mode: BlendMode) {
        if radius <= 0.0 || !center.is_finite() {
            return;
        }
        let bounds = Rect::around(center, radius + 1.0);
        let Some((l, t, r, b)) = bounds.pixel_bounds(self.width, self.height) else {
            return;
        };

        let hard_r = radius * hardness.clamp(0.0, 1.0);
        // At least ~1px of anti-aliased edge even for hard brushes
        let fade = (radius - hard_r).max(0.7);

        for y in t..b {
            for x in l..r {
                let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = p.distance_to(center);
                let coverage = ((radius - d) / fade).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(x, y, [color[0], color[1], color[2], color[3] * coverage], mode);
                }
            }
        }
    }

    fn stroke_line(&mut self, a: Point, b: Point, width: f32, color: Rgba, mode: BlendMode) {
        if width <= 0.0 || !a.is_finite() || !b.is_finite() {
            return;
        }
        let half = width * 0.5;
        let bounds = Rect::spanning(a, b).pad(half + 1.0);
        let Some((l, t, r, bt)) = bounds.pixel_bounds(self.width, self.height) else {
            return;
        };

        let seg = b - a;
        let seg_len2 = seg.x * seg.x + seg.y * seg.y;

        for y in t..bt {
            for x in l..r {
                let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                // Distance from pixel center to the segment
                let d = if seg_len2 <= 1e-12 {
                    p.distance_to(a)
                } else {
                    let tt = (((p.x - a.x) * seg.x + (p.y - a.y) * seg.y) / seg_len2).clamp(0.0, 1.0);
                    p.distance_to(a.lerp(b, tt))
                };
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(x, y, [color[0], color[1], color[2], color[3] * coverage], mode);
                }
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba, mode: BlendMode) {
        let Some((l, t, r, b)) = rect.pixel_bounds(self.width, self.height) else {
            return;
        };
        for y in t..b {
            for x in l..r {
                self.blend_pixel(x, y, color, mode);
            }
        }
    }

    fn stroke_path(&mut self, points: &[(Point, f32)], color: Rgba, mode: BlendMode) {
        match points {
            [] => {}
            [(p, w)] => self.fill_circle(*p, *w * 0.5, 0.95, color, mode),
            _ => {
                for pair in points.windows(2) {
                    let (p0, w0) = pair[0];
                    let (p1, w1) = pair[1];
                    if !p0.is_finite() || !p1.is_finite() {
                        continue;
                    }
                    // Dense sub-pixel stamping keeps the ribbon gap-free
                    // for any width profile.
                    let dist = p0.distance_to(p1);
                    let steps = (dist / 0.75).ceil().max(1.0) as usize;
                    for i in 0..=steps {
                        let t = i as f32 / steps as f32;
                        let w = w0 + (w1 - w0) * t;
                        self.fill_circle(p0.lerp(p1, t), (w * 0.5).max(0.3), 0.95, color, mode);
                    }
                }
            }
        }
    }

    fn radial_gradient(&mut self, center: Point, radius: f32, inner: Rgba, outer: Rgba, mode: BlendMode) {
        if radius <= 0.0 || !center.is_finite() {
            return;
        }
        let bounds = Rect::around(center, radius + 1.0);
        let Some((l, t, r, b)) = bounds.pixel_bounds(self.width, self.height) else {
            return;
        };

        for y in t..b {
            for x in l..r {
                let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = p.distance_to(center);
                if d >= radius + 0.5 {
                    continue;
                }
                let tt = (d / radius).clamp(0.0, 1.0);
                let mut src = [0.0f32; 4];
                for (i, channel) in src.iter_mut().enumerate() {
                    *channel = inner[i] + (outer[i] - inner[i]) * tt;
                }
                // Anti-alias the rim
                src[3] *= (radius + 0.5 - d).clamp(0.0, 1.0);
                self.blend_pixel(x, y, src, mode);
            }
        }
    }

    fn draw_texture(&mut self, texture: &Texture, placement: &StampPlacement, mode: BlendMode) {
        if placement.scale <= 0.0 || placement.opacity <= 0.0 || !placement.center.is_finite() {
            return;
        }
        let half = placement.half_extent(texture);
        let bounds = Rect::around(placement.center, half);
        let Some((l, t, r, b)) = bounds.pixel_bounds(self.width, self.height) else {
            return;
        };

        let (sin, cos) = placement.rotation.sin_cos();
        let inv_scale = 1.0 / placement.scale;
        let tw = texture.width() as f32;
        let th = texture.height() as f32;

        for y in t..b {
            for x in l..r {
                // Inverse-map the destination pixel into texel space
                let dx = x as f32 + 0.5 - placement.center.x;
                let dy = y as f32 + 0.5 - placement.center.y;
                let rx = (dx * cos + dy * sin) * inv_scale;
                let ry = (-dx * sin + dy * cos) * inv_scale;
                let mut tx = rx + tw * 0.5;
                let mut ty = ry + th * 0.5;
                if placement.flip_x {
                    tx = tw - tx;
                }
                if placement.flip_y {
                    ty = th - ty;
                }
                if tx < 0.0 || ty < 0.0 || tx > tw || ty > th {
                    continue;
                }

                let mut src = texture.sample(tx, ty);
                if let Some(tint) = placement.tint {
                    src[0] *= tint[0];
                    src[1] *= tint[1];
                    src[2] *= tint[2];
                    src[3] *= tint[3];
                }
                src[3] *= placement.opacity;
                self.blend_pixel(x, y, src, mode);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrushError;

    const RED: Rgba = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_fill_circle_center_and_outside() {
        let mut raster = Raster::new(64, 64);
        raster.fill_circle(Point::new(32.0, 32.0), 10.0, 1.0, RED, BlendMode::Normal);

        let center = raster.pixel(32, 32);
        assert!(center[0] > 200 && center[3] > 200);
        // Well outside the radius: untouched
        assert_eq!(raster.pixel(60, 60), [0; 4]);
    }

    #[test]
    fn test_soft_circle_fades() {
        let mut raster = Raster::new(64, 64);
        raster.fill_circle(Point::new(32.0, 32.0), 16.0, 0.0, RED, BlendMode::Normal);

        let center_a = raster.pixel(32, 32)[3];
        let edge_a = raster.pixel(32 + 13, 32)[3];
        assert!(center_a > edge_a);
        assert!(edge_a > 0);
    }

    #[test]
    fn test_circle_clips_at_borders() {
        let mut raster = Raster::new(32, 32);
        raster.fill_circle(Point::new(0.0, 0.0), 10.0, 1.0, RED, BlendMode::Normal);
        raster.fill_circle(Point::new(-50.0, -50.0), 10.0, 1.0, RED, BlendMode::Normal);
        assert!(raster.pixel(0, 0)[3] > 0);
    }

    #[test]
    fn test_stroke_line_covers_midpoint() {
        let mut raster = Raster::new(64, 64);
        raster.stroke_line(
            Point::new(10.0, 32.0),
            Point::new(50.0, 32.0),
            4.0,
            RED,
            BlendMode::Normal,
        );
        assert!(raster.pixel(30, 32)[3] > 200);
        assert_eq!(raster.pixel(30, 40), [0; 4]);
    }

    #[test]
    fn test_fill_rect() {
        let mut raster = Raster::new(32, 32);
        raster.fill_rect(Rect::new(4.0, 4.0, 8.0, 8.0), RED, BlendMode::Normal);
        assert_eq!(raster.pixel(5, 5), [255, 0, 0, 255]);
        assert_eq!(raster.pixel(9, 9), [0; 4]);
    }

    #[test]
    fn test_stroke_path_gap_free() {
        let mut raster = Raster::new(64, 64);
        let path: Vec<(Point, f32)> = (0..=10)
            .map(|i| (Point::new(5.0 + i as f32 * 5.0, 32.0), 6.0))
            .collect();
        raster.stroke_path(&path, RED, BlendMode::Normal);

        // Every centerline pixel along the path is covered
        for x in 6..54 {
            assert!(raster.pixel(x, 32)[3] > 200, "gap at x={x}");
        }
    }

    #[test]
    fn test_radial_gradient_profile() {
        let mut raster = Raster::new(64, 64);
        raster.radial_gradient(
            Point::new(32.0, 32.0),
            16.0,
            [0.0, 0.0, 1.0, 1.0],
            [0.0, 0.0, 1.0, 0.0],
            BlendMode::Normal,
        );
        let center = raster.pixel(32, 32)[3];
        let mid = raster.pixel(40, 32)[3];
        assert!(center > mid);
        assert!(mid > 0);
    }

    #[test]
    fn test_draw_texture_tint_and_rotation() -> Result<(), BrushError> {
        // Solid white 4x4 texture
        let texture = Texture::from_rgba(4, 4, vec![255; 64])?;
        let mut raster = Raster::new(32, 32);

        let mut placement = StampPlacement::new(Point::new(16.0, 16.0), 2.0);
        placement.tint = Some([1.0, 0.0, 0.0, 1.0]);
        placement.rotation = std::f32::consts::FRAC_PI_4;
        raster.draw_texture(&texture, &placement, BlendMode::Normal);

        let center = raster.pixel(16, 16);
        assert!(center[0] > 200);
        assert!(center[1] < 50);
        Ok(())
    }

    #[test]
    fn test_draw_texture_opacity() -> Result<(), BrushError> {
        let texture = Texture::from_rgba(4, 4, vec![255; 64])?;
        let mut raster = Raster::new(32, 32);

        let mut placement = StampPlacement::new(Point::new(16.0, 16.0), 2.0);
        placement.opacity = 0.5;
        raster.draw_texture(&texture, &placement, BlendMode::Normal);

        let a = raster.pixel(16, 16)[3] as i32;
        assert!((a - 128).abs() <= 2);
        Ok(())
    }

    #[test]
    fn test_degenerate_inputs_are_noops() {
        let mut raster = Raster::new(16, 16);
        raster.fill_circle(Point::new(f32::NAN, 0.0), 5.0, 1.0, RED, BlendMode::Normal);
        raster.fill_circle(Point::new(8.0, 8.0), -1.0, 1.0, RED, BlendMode::Normal);
        raster.stroke_line(
            Point::new(f32::INFINITY, 0.0),
            Point::new(1.0, 1.0),
            2.0,
            RED,
            BlendMode::Normal,
        );
        assert!(raster.data().iter().all(|&b| b == 0));
    }
}
