//! Oil - loaded bristles that run dry along the stroke
//!
//! The session carries a paint-load accumulator, full at pointer-down and
//! depleted a little by every stamp. As the load drops the dab thins and
//! breaks up into bristle streaks, the familiar dry-brush tail. Dwelling
//! in place reloads the brush slightly, as if pressing pigment around.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::modulate::pressure_size;
use crate::stroke::rng::jitter;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Oil configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OilConfig {
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
    /// Paint consumed per stamp
    pub depletion: f32,
    /// Load below which streaks start breaking up
    pub dry_threshold: f32,
    /// Bristle streaks per stamp
    pub bristles: u32,
}

impl Default for OilConfig {
    fn default() -> Self {
        Self {
            spacing: 0.2,
            depletion: 0.012,
            dry_threshold: 0.5,
            bristles: 5,
        }
    }
}

/// One oil stroke
#[derive(Debug)]
pub struct OilSession {
    config: OilConfig,
    params: BrushParams,
    stroke: WalkedStroke,
    load: f32,
}

impl OilSession {
    pub fn new(config: OilConfig, params: BrushParams) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            stroke: WalkedStroke::new(step),
            load: 1.0,
        }
    }

    /// Remaining paint load, 1 (full) down to 0 (dry)
    pub fn load(&self) -> f32 {
        self.load
    }

    fn render(&mut self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let radius = pressure_size(self.params.safe_size(), stamp.pressure, 0.4, 1.0) * 0.5;
        let [r, g, b, a] = self.params.color;
        let alpha = a * (0.25 + 0.75 * self.load);
        let mut rng = self.stroke.rng().for_stamp(stamp.index);

        // Body of the dab; shrinks slightly as the paint runs out
        let body = radius * (0.75 + 0.25 * self.load);
        surface.fill_circle(
            stamp.pos,
            body,
            0.6,
            [r, g, b, alpha],
            self.params.blend,
        );

        // Dry tail: bristle streaks along the travel direction, more of
        // them dropping out the drier the brush
        if self.load < self.config.dry_threshold {
            let dryness = 1.0 - self.load / self.config.dry_threshold;
            for _ in 0..self.config.bristles {
                if rng.random::<f32>() < dryness * 0.6 {
                    continue;
                }
                let offset = jitter(&mut rng, radius * 0.8);
                let across = stamp.angle + std::f32::consts::FRAC_PI_2;
                let center = stamp.pos.offset_polar(across, offset);
                let half = radius * rng.random_range(0.4..0.9);
                let from = center.offset_polar(stamp.angle, -half);
                let to = center.offset_polar(stamp.angle, half);
                surface.stroke_line(
                    from,
                    to,
                    (radius * 0.18).max(0.7),
                    [r, g, b, alpha * rng.random_range(0.4..0.9)],
                    self.params.blend,
                );
            }
        }

        self.load = (self.load - self.config.depletion * stamp.pressure).max(0.0);
        dirty.add(Rect::around(stamp.pos, radius + 2.0));
    }
}

impl StrokeSession for OilSession {
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
