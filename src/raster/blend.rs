//! Per-pixel compositing for the software raster surface
//!
//! Pixels are straight (non-premultiplied) RGBA8. Source colors arrive as
//! f32 RGBA in [0, 1] with coverage already folded into the alpha channel.

use serde::{Deserialize, Serialize};

/// RGBA color, each channel in [0, 1]
pub type Rgba = [f32; 4];

/// Pixel-combination rule applied when a mark is drawn over existing
/// surface content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Source-over alpha blending
    #[default]
    Normal,
    /// Darkens: source and destination colors multiplied
    Multiply,
    /// Brightens: source added onto destination
    Additive,
    /// Inverse multiply
    Screen,
    /// Removes destination alpha (eraser)
    Clear,
}

/// Composite one source color onto a straight-alpha RGBA8 pixel
///
/// `src[3]` carries coverage x opacity. Pixels with effectively zero
/// source alpha are left untouched so fully transparent fringes never
/// disturb the destination.
#[inline]
pub fn composite(dst: &mut [u8], src: Rgba, mode: BlendMode) {
    let sa = src[3].clamp(0.0, 1.0);
    if sa < 1.0 / 255.0 {
        return;
    }

    let da = dst[3] as f32 / 255.0;

    if mode == BlendMode::Clear {
        let out_a = da * (1.0 - sa);
        dst[3] = (out_a * 255.0).round() as u8;
        return;
    }

    let dr = dst[0] as f32 / 255.0;
    let dg = dst[1] as f32 / 255.0;
    let db = dst[2] as f32 / 255.0;

    // Resolve the blended source color; where the destination is
    // transparent the source color passes through unmodified.
    let (sr, sg, sb) = match mode {
        BlendMode::Normal => (src[0], src[1], src[2]),
        BlendMode::Multiply => {
            let blend = |s: f32, d: f32| s * d;
            mix_blend(src, (dr, dg, db), da, blend)
        }
        BlendMode::Screen => {
            let blend = |s: f32, d: f32| 1.0 - (1.0 - s) * (1.0 - d);
            mix_blend(src, (dr, dg, db), da, blend)
        }
        BlendMode::Additive => {
            let blend = |s: f32, d: f32| (s + d).min(1.0);
            mix_blend(src, (dr, dg, db), da, blend)
        }
        BlendMode::Clear => unreachable!(),
    };

    // Source-over in straight alpha
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        dst[3] = 0;
        return;
    }
    let inv = da * (1.0 - sa);
    let out_r = (sr * sa + dr * inv) / out_a;
    let out_g = (sg * sa + dg * inv) / out_a;
    let out_b = (sb * sa + db * inv) / out_a;

    dst[0] = (out_r.clamp(0.0, 1.0) * 255.0).round() as u8;
    dst[1] = (out_g.clamp(0.0, 1.0) * 255.0).round() as u8;
    dst[2] = (out_b.clamp(0.0, 1.0) * 255.0).round() as u8;
    dst[3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
}

/// Apply a separable blend function, weighted by destination alpha
#[inline]
fn mix_blend<F: Fn(f32, f32) -> f32>(
    src: Rgba,
    dst: (f32, f32, f32),
    da: f32,
    blend: F,
) -> (f32, f32, f32) {
    let apply = |s: f32, d: f32| s + da * (blend(s, d) - s);
    (
        apply(src[0], dst.0),
        apply(src[1], dst.1),
        apply(src[2], dst.2),
    )
}

/// Multiply a color's alpha channel
#[inline]
pub fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    [color[0], color[1], color[2], color[3] * alpha]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_opaque_replaces() {
        let mut px = [0u8, 0, 0, 255];
        composite(&mut px, [1.0, 0.0, 0.0, 1.0], BlendMode::Normal);
        assert_eq!(px, [255, 0, 0, 255]);
    }

    #[test]
    fn test_normal_half_alpha_mixes() {
        let mut px = [0u8, 0, 0, 255];
        composite(&mut px, [1.0, 1.0, 1.0, 0.5], BlendMode::Normal);
        // Halfway between black and white
        assert!((px[0] as i32 - 128).abs() <= 1);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_zero_alpha_leaves_pixel() {
        let mut px = [10u8, 20, 30, 40];
        composite(&mut px, [1.0, 1.0, 1.0, 0.0], BlendMode::Normal);
        assert_eq!(px, [10, 20, 30, 40]);
    }

    #[test]
    fn test_multiply_darkens() {
        let mut px = [128u8, 128, 128, 255];
        composite(&mut px, [0.5, 0.5, 0.5, 1.0], BlendMode::Multiply);
        // 0.5 * 0.5 ~ 64
        assert!((px[0] as i32 - 64).abs() <= 1);
    }

    #[test]
    fn test_multiply_on_transparent_passes_source() {
        let mut px = [0u8, 0, 0, 0];
        composite(&mut px, [0.5, 0.5, 0.5, 1.0], BlendMode::Multiply);
        assert!((px[0] as i32 - 128).abs() <= 1);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_additive_brightens() {
        let mut px = [100u8, 100, 100, 255];
        composite(&mut px, [0.5, 0.5, 0.5, 1.0], BlendMode::Additive);
        assert!(px[0] > 200);
    }

    #[test]
    fn test_clear_erases_alpha() {
        let mut px = [255u8, 0, 0, 255];
        composite(&mut px, [0.0, 0.0, 0.0, 1.0], BlendMode::Clear);
        assert_eq!(px[3], 0);

        let mut px = [255u8, 0, 0, 200];
        composite(&mut px, [0.0, 0.0, 0.0, 0.5], BlendMode::Clear);
        assert!((px[3] as i32 - 100).abs() <= 1);
    }
}
