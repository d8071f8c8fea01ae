//! Stamp - a single tinted texture repeated along the path

use serde::{Deserialize, Serialize};

use crate::brushes::common::{resolve_rotation, RotationMode, WalkedStroke};
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{StampPlacement, Surface, TextureSet};
use crate::stroke::modulate::pressure_size;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Stamp brush configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampConfig {
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
    /// Rotation applied to each stamp
    pub rotation: RotationMode,
    /// Tint the texture with the stroke color
    pub tinted: bool,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            spacing: 0.35,
            rotation: RotationMode::None,
            tinted: true,
        }
    }
}

/// One stamp-brush stroke
#[derive(Debug)]
pub struct StampSession {
    config: StampConfig,
    params: BrushParams,
    textures: TextureSet,
    stroke: WalkedStroke,
    smoothed_angle: f32,
}

impl StampSession {
    pub fn new(config: StampConfig, params: BrushParams, textures: TextureSet) -> Self {
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
        let texture = self.textures.pick(0).clone();
        let size = pressure_size(self.params.safe_size(), stamp.pressure, 0.3, 1.0);
        let scale = size / texture.max_dimension().max(1) as f32;
        let rotation = resolve_rotation(
            self.config.rotation,
            stamp,
            self.stroke.rng(),
            &mut self.smoothed_angle,
        );

        let placement = StampPlacement {
            rotation,
            opacity: self.params.color[3],
            tint: self.config.tinted.then_some(self.params.color),
            ..StampPlacement::new(stamp.pos, scale)
        };
        surface.draw_texture(&texture, &placement, self.params.blend);
        dirty.add(Rect::around(stamp.pos, placement.half_extent(&texture)));
    }
}

impl StrokeSession for StampSession {
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

    fn soft_set() -> TextureSet {
        TextureSet::single(Arc::new(texgen::soft_circle(32, 0.6).expect("texture")))
    }

    #[test]
    fn test_stamp_tap_tints_with_stroke_color() {
        let mut raster = Raster::new(64, 64);
        let mut session = StampSession::new(
            StampConfig::default(),
            BrushParams {
                size: 24.0,
                color: [0.0, 0.8, 0.0, 1.0],
                ..Default::default()
            },
            soft_set(),
        );
        session.start(&mut raster, &GestureEvent::new(32.0, 32.0, 1.0, 0));
        session.finish(&mut raster, &GestureEvent::new(32.0, 32.0, 1.0, 8));

        let px = raster.pixel(32, 32);
        assert!(px[3] > 0);
        assert!(px[1] > px[0], "tint should dominate");
    }

    #[test]
    fn test_stamp_dirty_covers_rotation() {
        let mut raster = Raster::new(128, 128);
        let mut session = StampSession::new(
            StampConfig {
                rotation: RotationMode::Fixed(0.7),
                ..Default::default()
            },
            BrushParams {
                size: 24.0,
                ..Default::default()
            },
            soft_set(),
        );
        let rect = session
            .start(&mut raster, &GestureEvent::new(64.0, 64.0, 1.0, 0))
            .expect("tap must paint");
        session.finish(&mut raster, &GestureEvent::new(64.0, 64.0, 1.0, 8));

        for x in 0..128u32 {
            for y in 0..128u32 {
                if raster.pixel(x, y)[3] > 0 {
                    let p = crate::geom::Point::new(x as f32 + 0.5, y as f32 + 0.5);
                    assert!(rect.pad(1.5).contains(p), "texel escaped at {x},{y}");
                }
            }
        }
    }
}
