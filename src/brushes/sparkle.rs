//! Sparkle - additive star glints scattered along the path

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{BlendMode, StampPlacement, Surface, TextureSet};
use crate::stroke::modulate::pressure_size;
use crate::stroke::rng::disc_point;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Sparkle configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkleConfig {
    /// Glints per emission point
    pub glints: u32,
    /// Emission spacing as a fraction of size
    pub spacing: f32,
    /// Scatter radius as a fraction of size
    pub scatter_ratio: f32,
    /// Glint scale range relative to size
    pub glint_min: f32,
    pub glint_max: f32,
    /// Chance a given emission point produces no glints at all
    pub dropout: f32,
}

impl Default for SparkleConfig {
    fn default() -> Self {
        Self {
            glints: 2,
            spacing: 0.6,
            scatter_ratio: 0.9,
            glint_min: 0.2,
            glint_max: 0.6,
            dropout: 0.3,
        }
    }
}

/// One sparkle stroke
#[derive(Debug)]
pub struct SparkleSession {
    config: SparkleConfig,
    params: BrushParams,
    textures: TextureSet,
    stroke: WalkedStroke,
}

impl SparkleSession {
    pub fn new(config: SparkleConfig, params: BrushParams, textures: TextureSet) -> Self {
        let step = (params.safe_size() * config.spacing).max(1.0);
        Self {
            config,
            params,
            textures,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let mut rng = self.stroke.rng().for_stamp(stamp.index);
        if rng.random::<f32>() < self.config.dropout {
            return;
        }

        let size = pressure_size(self.params.safe_size(), stamp.pressure, 0.3, 1.0);
        let scatter = size * self.config.scatter_ratio;
        for _ in 0..self.config.glints {
            let texture = self
                .textures
                .pick(rng.random_range(0..self.textures.len()))
                .clone();
            let center = disc_point(&mut rng, stamp.pos, scatter, 1.0);
            let glint = size * rng.random_range(self.config.glint_min..=self.config.glint_max);
            let scale = glint / texture.max_dimension().max(1) as f32;

            let placement = StampPlacement {
                rotation: rng.random_range(0.0..std::f32::consts::TAU),
                opacity: self.params.color[3] * rng.random_range(0.6..1.0),
                tint: Some(self.params.color),
                ..StampPlacement::new(center, scale)
            };
            // Additive so crossing glints flare instead of occluding
            surface.draw_texture(&texture, &placement, BlendMode::Additive);
            dirty.add(Rect::around(center, placement.half_extent(&texture)));
        }
    }
}

impl StrokeSession for SparkleSession {
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
