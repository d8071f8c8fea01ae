//! Neon - additive glow built from concentric soft layers

use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{BlendMode, Surface};
use crate::stroke::modulate::pressure_size;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Neon configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeonConfig {
    /// Halo radius as a multiple of the core radius
    pub glow_scale: f32,
    /// Glow intensity multiplier
    pub intensity: f32,
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
}

impl Default for NeonConfig {
    fn default() -> Self {
        Self {
            glow_scale: 2.6,
            intensity: 0.5,
            spacing: 0.15,
        }
    }
}

/// One neon stroke
#[derive(Debug)]
pub struct NeonSession {
    config: NeonConfig,
    params: BrushParams,
    stroke: WalkedStroke,
}

impl NeonSession {
    pub fn new(config: NeonConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
        }
    }

    fn render(&self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let core = pressure_size(self.params.safe_size(), stamp.pressure, 0.3, 1.0) * 0.5;
        let halo = core * self.config.glow_scale;
        let [r, g, b, a] = self.params.color;

        // Outer halo, middle bloom, then a near-white hot core
        surface.fill_circle(
            stamp.pos,
            halo,
            0.0,
            [r, g, b, a * 0.12 * self.config.intensity],
            BlendMode::Additive,
        );
        surface.fill_circle(
            stamp.pos,
            core * 1.5,
            0.2,
            [r, g, b, a * 0.3 * self.config.intensity],
            BlendMode::Additive,
        );
        let core_color = [
            (r + 0.6).min(1.0),
            (g + 0.6).min(1.0),
            (b + 0.6).min(1.0),
            a * 0.8,
        ];
        surface.fill_circle(stamp.pos, core * 0.7, 0.8, core_color, BlendMode::Additive);

        dirty.add(Rect::around(stamp.pos, halo + 1.0));
    }
}

impl StrokeSession for NeonSession {
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

    #[test]
    fn test_neon_core_brighter_than_halo() {
        let mut raster = Raster::new(96, 96);
        let mut session = NeonSession::new(
            NeonConfig::default(),
            BrushParams {
                size: 16.0,
                color: [0.1, 0.9, 0.4, 1.0],
                ..Default::default()
            },
        );
        session.start(&mut raster, &GestureEvent::new(48.0, 48.0, 1.0, 0));
        session.finish(&mut raster, &GestureEvent::new(48.0, 48.0, 1.0, 8));

        let core = raster.pixel(48, 48);
        let halo = raster.pixel(48 + 14, 48);
        assert!(core[1] > halo[1]);
        assert!(halo[3] > 0, "halo must extend past the core");
    }

    #[test]
    fn test_neon_dirty_covers_halo() {
        let mut raster = Raster::new(96, 96);
        let mut session = NeonSession::new(
            NeonConfig::default(),
            BrushParams {
                size: 16.0,
                ..Default::default()
            },
        );
        let rect = session
            .start(&mut raster, &GestureEvent::new(48.0, 48.0, 1.0, 0))
            .expect("tap must paint");
        // Halo radius = 8 * 2.6
        assert!(rect.width() >= 40.0);
    }
}
