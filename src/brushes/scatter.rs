//! Scatter - randomized texture stamps strewn around the path

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{StampPlacement, Surface, TextureSet};
use crate::stroke::modulate::pressure_size;
use crate::stroke::rng::disc_point;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Scatter configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterConfig {
    /// Stamps per emission point
    pub count: u32,
    /// Scatter radius as a fraction of size
    pub scatter_ratio: f32,
    /// Emission spacing as a fraction of size
    pub spacing: f32,
    /// Scale jitter range around the nominal scale
    pub scale_min: f32,
    pub scale_max: f32,
    /// Minimum per-stamp opacity; each stamp draws in [min, 1]
    pub opacity_min: f32,
    /// Allow random horizontal/vertical mirroring
    pub flips: bool,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            count: 3,
            scatter_ratio: 0.8,
            spacing: 0.5,
            scale_min: 0.6,
            scale_max: 1.2,
            opacity_min: 0.4,
            flips: true,
        }
    }
}

/// One scatter stroke
#[derive(Debug)]
pub struct ScatterSession {
    config: ScatterConfig,
    params: BrushParams,
    textures: TextureSet,
    stroke: WalkedStroke,
}

impl ScatterSession {
    pub fn new(config: ScatterConfig, params: BrushParams, textures: TextureSet) -> Self {
        let step = (params.safe_size() * config.spacing).max(1.0);
        Self {
            config,
            params,
            textures,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let size = pressure_size(self.params.safe_size(), stamp.pressure, 0.3, 1.0);
        let scatter = size * self.config.scatter_ratio;
        let mut rng = self.stroke.rng().for_stamp(stamp.index);

        for _ in 0..self.config.count {
            let texture = self
                .textures
                .pick(rng.random_range(0..self.textures.len()))
                .clone();
            let center = disc_point(&mut rng, stamp.pos, scatter, 1.0);
            let nominal = size / texture.max_dimension().max(1) as f32;
            let scale = nominal * rng.random_range(self.config.scale_min..=self.config.scale_max);
            let opacity =
                self.params.color[3] * rng.random_range(self.config.opacity_min..=1.0_f32);
            let flip_x = self.config.flips && rng.random::<bool>();
            let flip_y = self.config.flips && rng.random::<bool>();

            let placement = StampPlacement {
                rotation: rng.random_range(0.0..std::f32::consts::TAU),
                opacity,
                tint: Some(self.params.color),
                flip_x,
                flip_y,
                ..StampPlacement::new(center, scale)
            };
            surface.draw_texture(&texture, &placement, self.params.blend);
            dirty.add(Rect::around(center, placement.half_extent(&texture)));
        }
    }
}

impl StrokeSession for ScatterSession {
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
