//! Dual - base texture pass plus an overlay pass with its own blend mode

use serde::{Deserialize, Serialize};

use crate::brushes::common::{resolve_rotation, RotationMode, WalkedStroke};
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{BlendMode, StampPlacement, Surface, TextureSet};
use crate::stroke::modulate::pressure_size;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Dual-pass configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualConfig {
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
    /// Rotation shared by both passes
    pub rotation: RotationMode,
    /// Compositing mode of the base pass
    pub base_blend: BlendMode,
    /// Compositing mode of the overlay pass
    pub overlay_blend: BlendMode,
    /// Overlay scale relative to the base
    pub overlay_scale: f32,
    /// Overlay opacity relative to the base
    pub overlay_opacity: f32,
}

impl Default for DualConfig {
    fn default() -> Self {
        Self {
            spacing: 0.35,
            rotation: RotationMode::Direction,
            base_blend: BlendMode::Normal,
            overlay_blend: BlendMode::Multiply,
            overlay_scale: 0.8,
            overlay_opacity: 0.6,
        }
    }
}

/// One dual-pass stroke
///
/// Texture 0 is the base, texture 1 the overlay; with a single texture
/// both passes reuse it.
#[derive(Debug)]
pub struct DualSession {
    config: DualConfig,
    params: BrushParams,
    textures: TextureSet,
    stroke: WalkedStroke,
    smoothed_angle: f32,
}

impl DualSession {
    pub fn new(config: DualConfig, params: BrushParams, textures: TextureSet) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            textures,
            stroke: WalkedStroke::new(step),
            smoothed_angle: 0.0,
        }
    }

    fn render(&mut self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let size = pressure_size(self.params.safe_size(), stamp.pressure, 0.3, 1.0);
        let rotation = resolve_rotation(
            self.config.rotation,
            stamp,
            self.stroke.rng(),
            &mut self.smoothed_angle,
        );

        let base = self.textures.pick(0).clone();
        let base_scale = size / base.max_dimension().max(1) as f32;
        let base_placement = StampPlacement {
            rotation,
            opacity: self.params.color[3],
            tint: Some(self.params.color),
            ..StampPlacement::new(stamp.pos, base_scale)
        };
        surface.draw_texture(&base, &base_placement, self.config.base_blend);
        dirty.add(Rect::around(stamp.pos, base_placement.half_extent(&base)));

        let overlay = self.textures.pick(1).clone();
        let overlay_scale =
            size * self.config.overlay_scale / overlay.max_dimension().max(1) as f32;
        let overlay_placement = StampPlacement {
            rotation,
            opacity: self.params.color[3] * self.config.overlay_opacity,
            tint: Some(self.params.color),
            ..StampPlacement::new(stamp.pos, overlay_scale)
        };
        surface.draw_texture(&overlay, &overlay_placement, self.config.overlay_blend);
        dirty.add(Rect::around(
            stamp.pos,
            overlay_placement.half_extent(&overlay),
        ));
    }
}

impl StrokeSession for DualSession {
    fn start(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        if let Some(stamp) = self.stroke.start(&self.params, event) {
            self.render(surface, &stamp, &mut dirty);
        }
        dirty.take()
    }

    fn update(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        for stamp in self.stroke.update(&self.params, event) {
            self.render(surface, &stamp, &mut dirty);
        }
        dirty.take()
    }

    fn finish(&mut self, surface: &mut dyn Surface, event: &GestureEvent) -> Dirty {
        let mut dirty = DirtyAccum::new();
        for stamp in self.stroke.finish(&self.params, event) {
            self.render(surface, &stamp, &mut dirty);
        }
        dirty.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use crate::texgen;
    use std::sync::Arc;

    fn set() -> TextureSet {
        TextureSet::new(vec![
            Arc::new(texgen::soft_circle(24, 0.9).expect("texture")),
            Arc::new(texgen::noise(24, 7, 4.0).expect("texture")),
        ])
        .expect("two textures")
    }

    #[test]
    fn test_overlay_darkens_base() {
        let paint = |overlay_opacity: f32| {
            let mut raster = Raster::new(64, 64);
            let mut session = DualSession::new(
                DualConfig {
                    overlay_opacity,
                    ..Default::default()
                },
                BrushParams {
                    size: 24.0,
                    color: [0.5, 0.5, 0.5, 1.0],
                    seed_nonce: 2,
                    ..Default::default()
                },
                set(),
            );
            session.start(&mut raster, &GestureEvent::new(32.0, 32.0, 1.0, 0));
            session.finish(&mut raster, &GestureEvent::new(32.0, 32.0, 1.0, 8));
            raster.pixel(32, 32)
        };

        let without = paint(0.0);
        let with = paint(0.9);
        assert!(with[0] <= without[0], "multiply overlay cannot brighten");
        assert!(with[3] > 0);
    }

    #[test]
    fn test_single_texture_serves_both_passes() {
        let mut raster = Raster::new(64, 64);
        let mut session = DualSession::new(
            DualConfig::default(),
            BrushParams {
                size: 20.0,
                ..Default::default()
            },
            TextureSet::single(Arc::new(texgen::soft_circle(24, 0.9).expect("texture"))),
        );
        session.start(&mut raster, &GestureEvent::new(32.0, 32.0, 1.0, 0));
        session.finish(&mut raster, &GestureEvent::new(32.0, 32.0, 1.0, 8));
        assert!(raster.pixel(32, 32)[3] > 0);
    }
}
