//! Grain - pigment filtered through paper tooth

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{BlendMode, StampPlacement, Surface, TextureSet};
use crate::stroke::modulate::{pressure_opacity, pressure_size};
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Grain configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrainConfig {
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
    /// Pigment laid down per stamp
    pub flow: f32,
    /// Randomize grain phase per stamp instead of repeating the sheet
    pub vary_phase: bool,
}

impl Default for GrainConfig {
    fn default() -> Self {
        Self {
            spacing: 0.3,
            flow: 0.5,
            vary_phase: true,
        }
    }
}

/// One grain stroke
#[derive(Debug)]
pub struct GrainSession {
    config: GrainConfig,
    params: BrushParams,
    textures: TextureSet,
    stroke: WalkedStroke,
}

impl GrainSession {
    pub fn new(config: GrainConfig, params: BrushParams, textures: TextureSet) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            textures,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let texture = self.textures.pick(stamp.index as usize).clone();
        let size = pressure_size(self.params.safe_size(), stamp.pressure, 0.4, 1.0);
        let scale = size / texture.max_dimension().max(1) as f32;
        let opacity = pressure_opacity(
            self.params.color[3] * self.config.flow,
            stamp.pressure,
            0.4,
            0.6,
        );
        let rotation = if self.config.vary_phase {
            let mut rng = self.stroke.rng().for_stamp(stamp.index);
            // Quarter-turn steps keep the grain crisp while breaking repeats
            std::f32::consts::FRAC_PI_2 * rng.random_range(0..4) as f32
        } else {
            0.0
        };

        let placement = StampPlacement {
            rotation,
            opacity,
            tint: Some(self.params.color),
            ..StampPlacement::new(stamp.pos, scale)
        };
        // Multiply so repeated passes darken into the tooth
        surface.draw_texture(&texture, &placement, BlendMode::Multiply);
        dirty.add(Rect::around(stamp.pos, placement.half_extent(&texture)));
    }
}

impl StrokeSession for GrainSession {
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
