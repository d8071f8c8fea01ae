//! Watercolor - translucent washes with pigment edges and wet bleed
//!
//! Each stamp layers soft radial washes, clips paper grain into the dab,
//! darkens the rim where pigment settles, and scatters granulation dots.
//! A wetness accumulator grows while the stroke lingers; the wetter the
//! stroke, the more often a wide low-opacity bleed disc escapes the dab.
//! On finish the session schedules a drying transition for the host.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::{BlendMode, StampPlacement, Surface, TextureSet};
use crate::sim::{DryEvent, DryingScheduler, DryingTimer};
use crate::stroke::modulate::pressure_size;
use crate::stroke::rng::disc_point;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Watercolor configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatercolorConfig {
    /// Translucent washes per stamp
    pub washes: u32,
    /// Stamp spacing as a fraction of size
    pub spacing: f32,
    /// Granulation dots per stamp
    pub granulation: u32,
    /// Rim pigment strength
    pub rim_strength: f32,
    /// Wetness gained per stamp
    pub wet_gain: f32,
    /// Bleed disc radius as a multiple of the dab radius
    pub bleed_scale: f32,
    /// Milliseconds until the wash is considered dry
    pub dry_delay_ms: u64,
}

impl Default for WatercolorConfig {
    fn default() -> Self {
        Self {
            washes: 3,
            spacing: 0.3,
            granulation: 5,
            rim_strength: 0.35,
            wet_gain: 0.08,
            bleed_scale: 1.8,
            dry_delay_ms: 900,
        }
    }
}

/// One watercolor stroke
pub struct WatercolorSession {
    config: WatercolorConfig,
    params: BrushParams,
    grain: TextureSet,
    stroke: WalkedStroke,
    wetness: f32,
    wet_region: DirtyAccum,
    scheduler: Option<DryingScheduler>,
    timer: Option<DryingTimer>,
}

impl std::fmt::Debug for WatercolorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatercolorSession")
            .field("config", &self.config)
            .field("wetness", &self.wetness)
            .finish_non_exhaustive()
    }
}

impl WatercolorSession {
    pub fn new(
        config: WatercolorConfig,
        params: BrushParams,
        grain: TextureSet,
        scheduler: Option<DryingScheduler>,
    ) -> Self {
        let step = (params.safe_size() * config.spacing).max(0.5);
        Self {
            config,
            params,
            grain,
            stroke: WalkedStroke::new(step),
            wetness: 0.0,
            wet_region: DirtyAccum::new(),
            scheduler,
            timer: None,
        }
    }

    /// Current wetness level, 0 (dry) to 1 (saturated)
    pub fn wetness(&self) -> f32 {
        self.wetness
    }

    fn render(&mut self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let radius = pressure_size(self.params.safe_size(), stamp.pressure, 0.4, 1.0) * 0.5;
        let [r, g, b, a] = self.params.color;
        let mut rng = self.stroke.rng().for_stamp(stamp.index);

        // Layered washes, each smaller and fainter
        for wash in 0..self.config.washes {
            let shrink = 1.0 - wash as f32 * 0.22;
            let alpha = a * 0.10 * shrink;
            surface.radial_gradient(
                stamp.pos,
                radius * shrink,
                [r, g, b, alpha],
                [r, g, b, 0.0],
                self.params.blend,
            );
        }

        // Paper grain clipped into the dab
        let grain = self.grain.pick(stamp.index as usize).clone();
        let scale = (radius * 2.0) / grain.max_dimension().max(1) as f32;
        let placement = StampPlacement {
            opacity: a * 0.15,
            tint: Some(self.params.color),
            ..StampPlacement::new(stamp.pos, scale)
        };
        surface.draw_texture(&grain, &placement, BlendMode::Multiply);

        // Pigment collects at the rim: transparent center, darker edge
        let rim = [
            (r * 0.8).clamp(0.0, 1.0),
            (g * 0.8).clamp(0.0, 1.0),
            (b * 0.8).clamp(0.0, 1.0),
            a * self.config.rim_strength * 0.3,
        ];
        surface.radial_gradient(stamp.pos, radius, [r, g, b, 0.0], rim, self.params.blend);

        // Granulation dots
        for _ in 0..self.config.granulation {
            let p = disc_point(&mut rng, stamp.pos, radius * 0.85, 0.9);
            let dot = rng.random_range(0.4..1.1);
            surface.fill_circle(p, dot, 0.6, [r, g, b, a * 0.25], self.params.blend);
        }

        let mut pad = radius + 2.0;

        // Wet bleed, increasingly likely as wetness builds
        self.wetness = (self.wetness + self.config.wet_gain * stamp.pressure).min(1.0);
        if rng.random::<f32>() < self.wetness * 0.5 {
            let bleed_radius = radius * self.config.bleed_scale;
            let center = disc_point(&mut rng, stamp.pos, radius * 0.5, 1.0);
            surface.radial_gradient(
                center,
                bleed_radius,
                [r, g, b, a * 0.04],
                [r, g, b, 0.0],
                self.params.blend,
            );
            pad = pad.max(center.distance_to(stamp.pos) + bleed_radius + 2.0);
        }

        let rect = Rect::around(stamp.pos, pad);
        dirty.add(rect);
        self.wet_region.add(rect);
    }

    fn schedule_drying(&mut self) {
        let (Some(scheduler), Some(region)) = (&self.scheduler, self.wet_region.take()) else {
            return;
        };
        self.timer = Some(scheduler.schedule(
            Duration::from_millis(self.config.dry_delay_ms),
            DryEvent { region },
        ));
    }
}

impl StrokeSession for WatercolorSession {
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
        self.schedule_drying();
        dirty.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use crate::texgen;
    use std::sync::Arc;

    fn grain_set() -> TextureSet {
        TextureSet::single(Arc::new(texgen::paper_grain(32, 7).expect("texture")))
    }

    fn params() -> BrushParams {
        BrushParams {
            size: 24.0,
            color: [0.2, 0.3, 0.8, 1.0],
            seed_nonce: 17,
            ..Default::default()
        }
    }

    #[test]
    fn test_washes_stay_translucent() {
        let mut raster = Raster::new(96, 96);
        let mut session =
            WatercolorSession::new(WatercolorConfig::default(), params(), grain_set(), None);
        session.start(&mut raster, &GestureEvent::new(48.0, 48.0, 1.0, 0));
        session.finish(&mut raster, &GestureEvent::new(48.0, 48.0, 1.0, 8));

        let a = raster.pixel(48, 48)[3];
        assert!(a > 0);
        assert!(a < 230, "single dab must not reach full opacity");
    }

    #[test]
    fn test_wetness_builds_along_stroke() {
        let mut raster = Raster::new(192, 96);
        let mut session =
            WatercolorSession::new(WatercolorConfig::default(), params(), grain_set(), None);
        session.start(&mut raster, &GestureEvent::new(16.0, 48.0, 1.0, 0));
        let early = session.wetness();
        session.update(&mut raster, &GestureEvent::new(176.0, 48.0, 1.0, 60));
        assert!(session.wetness() > early);
        session.finish(&mut raster, &GestureEvent::new(176.0, 48.0, 1.0, 70));
    }

    #[test]
    fn test_dirty_covers_bleed() {
        let mut raster = Raster::new(192, 96);
        let mut session = WatercolorSession::new(
            WatercolorConfig {
                wet_gain: 1.0,
                ..Default::default()
            },
            params(),
            grain_set(),
            None,
        );
        let mut dirty = DirtyAccum::new();
        dirty.merge(session.start(&mut raster, &GestureEvent::new(96.0, 48.0, 1.0, 0)));
        dirty.merge(session.update(&mut raster, &GestureEvent::new(120.0, 48.0, 1.0, 16)));
        dirty.merge(session.finish(&mut raster, &GestureEvent::new(124.0, 48.0, 1.0, 24)));
        let rect = dirty.take().expect("stroke painted");

        for x in 0..192u32 {
            for y in 0..96u32 {
                if raster.pixel(x, y)[3] > 0 {
                    let p = crate::geom::Point::new(x as f32 + 0.5, y as f32 + 0.5);
                    assert!(rect.pad(1.5).contains(p), "wash escaped at {x},{y}");
                }
            }
        }
    }

    #[tokio::test]
    async fn test_finish_schedules_drying() {
        let (scheduler, mut rx) = DryingScheduler::new(tokio::runtime::Handle::current());
        let mut raster = Raster::new(96, 96);
        let mut session = WatercolorSession::new(
            WatercolorConfig {
                dry_delay_ms: 10,
                ..Default::default()
            },
            params(),
            grain_set(),
            Some(scheduler),
        );
        session.start(&mut raster, &GestureEvent::new(48.0, 48.0, 1.0, 0));
        session.finish(&mut raster, &GestureEvent::new(52.0, 48.0, 1.0, 8));

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("drying event within deadline")
            .expect("channel open");
        assert!(event.region.width() > 0.0);
        drop(session);
    }

    #[tokio::test]
    async fn test_dropping_session_cancels_drying() {
        let (scheduler, mut rx) = DryingScheduler::new(tokio::runtime::Handle::current());
        let mut raster = Raster::new(96, 96);
        {
            let mut session = WatercolorSession::new(
                WatercolorConfig {
                    dry_delay_ms: 30,
                    ..Default::default()
                },
                params(),
                grain_set(),
                Some(scheduler),
            );
            session.start(&mut raster, &GestureEvent::new(48.0, 48.0, 1.0, 0));
            session.finish(&mut raster, &GestureEvent::new(52.0, 48.0, 1.0, 8));
        }
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(rx.try_recv().is_err(), "cancelled timer must not fire");
    }
}
