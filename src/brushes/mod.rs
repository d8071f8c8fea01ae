//! The brush roster and the session factory
//!
//! Three families share the `StrokeSession` contract:
//! - procedural brushes draw primitives (circles, lines, rects) directly;
//! - texture brushes place image stamps, tinted, rotated and scattered;
//! - shape brushes trace one continuous variable-width path.
//!
//! Wet-media brushes (watercolor, oil) sit on top of the procedural
//! family and add per-stroke accumulators and drying timers.
//!
//! `BrushSpec` is the serializable brush selection the host persists in
//! its presets; `create_session` turns one spec plus per-stroke
//! parameters into a boxed session. Texture-family specs name their
//! textures by id and fail fast at construction when the list is empty
//! or an id is unknown.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::BrushError;
use crate::raster::{TextureSet, TextureStore};
use crate::sim::DryingScheduler;
use crate::stroke::{BrushParams, StrokeSession};
use crate::texgen;

mod common;

mod airbrush;
mod calligraphy;
mod chalk;
mod crayon;
mod distort;
mod dual;
mod eraser;
mod follow;
mod gradient;
mod grain;
mod hatch;
mod ink_pen;
mod marker;
mod neon;
mod oil;
mod pencil;
mod pixel;
mod ribbon;
mod round_pen;
mod scatter;
mod sparkle;
mod splatter;
mod spray;
mod stamp;
mod watercolor;

pub use common::RotationMode;

pub use airbrush::{AirbrushConfig, AirbrushSession};
pub use calligraphy::{CalligraphyConfig, CalligraphySession};
pub use chalk::{ChalkConfig, ChalkSession};
pub use crayon::{CrayonConfig, CrayonSession};
pub use distort::{DistortConfig, DistortSession, WarpKind};
pub use dual::{DualConfig, DualSession};
pub use eraser::{EraserConfig, EraserSession};
pub use follow::{FollowConfig, FollowSession};
pub use gradient::{GradientConfig, GradientSession};
pub use grain::{GrainConfig, GrainSession};
pub use hatch::{HatchConfig, HatchSession};
pub use ink_pen::{InkPenConfig, InkPenSession};
pub use marker::{MarkerConfig, MarkerSession};
pub use neon::{NeonConfig, NeonSession};
pub use oil::{OilConfig, OilSession};
pub use pencil::{PencilConfig, PencilSession};
pub use pixel::{PixelConfig, PixelSession};
pub use ribbon::{RibbonConfig, RibbonSession};
pub use round_pen::{RoundPenConfig, RoundPenSession};
pub use scatter::{ScatterConfig, ScatterSession};
pub use sparkle::{SparkleConfig, SparkleSession};
pub use splatter::{SplatterConfig, SplatterSession};
pub use spray::{SprayConfig, SpraySession};
pub use stamp::{StampConfig, StampSession};
pub use watercolor::{WatercolorConfig, WatercolorSession};

/// One brush choice with its construction-time knobs
///
/// Texture-family variants carry the ids of the textures they stamp,
/// resolved against the host's `TextureStore` at session creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "brush", rename_all = "kebab-case")]
pub enum BrushSpec {
    InkPen(InkPenConfig),
    Marker(MarkerConfig),
    Pencil(PencilConfig),
    Hatch(HatchConfig),
    Airbrush(AirbrushConfig),
    Spray(SprayConfig),
    Chalk(ChalkConfig),
    Crayon(CrayonConfig),
    Neon(NeonConfig),
    Eraser(EraserConfig),
    Calligraphy(CalligraphyConfig),
    Pixel(PixelConfig),
    Gradient(GradientConfig),
    Stamp {
        #[serde(flatten)]
        config: StampConfig,
        textures: Vec<String>,
    },
    Scatter {
        #[serde(flatten)]
        config: ScatterConfig,
        textures: Vec<String>,
    },
    Dual {
        #[serde(flatten)]
        config: DualConfig,
        textures: Vec<String>,
    },
    Follow {
        #[serde(flatten)]
        config: FollowConfig,
        textures: Vec<String>,
    },
    Distort {
        #[serde(flatten)]
        config: DistortConfig,
        textures: Vec<String>,
    },
    Splatter {
        #[serde(flatten)]
        config: SplatterConfig,
        textures: Vec<String>,
    },
    Grain {
        #[serde(flatten)]
        config: GrainConfig,
        textures: Vec<String>,
    },
    Sparkle {
        #[serde(flatten)]
        config: SparkleConfig,
        textures: Vec<String>,
    },
    RoundPen(RoundPenConfig),
    Ribbon(RibbonConfig),
    Watercolor(WatercolorConfig),
    Oil(OilConfig),
}

fn resolve(store: Option<&TextureStore>, ids: &[String]) -> Result<TextureSet, BrushError> {
    let store = store.ok_or(BrushError::EmptyTextureList)?;
    store.resolve(ids)
}

/// Build a session for one pointer-down-to-pointer-up interaction
///
/// `store` supplies textures for the texture family; `drying` lets
/// wet-media brushes schedule their post-stroke transitions. Both are
/// optional for brushes that need neither.
pub fn create_session(
    spec: &BrushSpec,
    params: BrushParams,
    store: Option<&TextureStore>,
    drying: Option<DryingScheduler>,
) -> Result<Box<dyn StrokeSession>, BrushError> {
    let session: Box<dyn StrokeSession> = match spec {
        BrushSpec::InkPen(config) => Box::new(InkPenSession::new(*config, params)),
        BrushSpec::Marker(config) => Box::new(MarkerSession::new(*config, params)),
        BrushSpec::Pencil(config) => Box::new(PencilSession::new(*config, params)),
        BrushSpec::Hatch(config) => Box::new(HatchSession::new(*config, params)),
        BrushSpec::Airbrush(config) => Box::new(AirbrushSession::new(*config, params)),
        BrushSpec::Spray(config) => Box::new(SpraySession::new(*config, params)),
        BrushSpec::Chalk(config) => Box::new(ChalkSession::new(*config, params)),
        BrushSpec::Crayon(config) => Box::new(CrayonSession::new(*config, params)),
        BrushSpec::Neon(config) => Box::new(NeonSession::new(*config, params)),
        BrushSpec::Eraser(config) => Box::new(EraserSession::new(*config, params)),
        BrushSpec::Calligraphy(config) => Box::new(CalligraphySession::new(*config, params)),
        BrushSpec::Pixel(config) => Box::new(PixelSession::new(*config, params)),
        BrushSpec::Gradient(config) => Box::new(GradientSession::new(*config, params)),
        BrushSpec::Stamp { config, textures } => {
            Box::new(StampSession::new(*config, params, resolve(store, textures)?))
        }
        BrushSpec::Scatter { config, textures } => Box::new(ScatterSession::new(
            *config,
            params,
            resolve(store, textures)?,
        )),
        BrushSpec::Dual { config, textures } => {
            Box::new(DualSession::new(*config, params, resolve(store, textures)?))
        }
        BrushSpec::Follow { config, textures } => Box::new(FollowSession::new(
            *config,
            params,
            resolve(store, textures)?,
        )),
        BrushSpec::Distort { config, textures } => Box::new(DistortSession::new(
            *config,
            params,
            resolve(store, textures)?,
        )),
        BrushSpec::Splatter { config, textures } => Box::new(SplatterSession::new(
            *config,
            params,
            resolve(store, textures)?,
        )),
        BrushSpec::Grain { config, textures } => Box::new(GrainSession::new(
            *config,
            params,
            resolve(store, textures)?,
        )),
        BrushSpec::Sparkle { config, textures } => Box::new(SparkleSession::new(
            *config,
            params,
            resolve(store, textures)?,
        )),
        BrushSpec::RoundPen(config) => Box::new(RoundPenSession::new(*config, params)),
        BrushSpec::Ribbon(config) => Box::new(RibbonSession::new(*config, params)),
        BrushSpec::Watercolor(config) => {
            // Grain comes from the store when the host loaded paper
            // sheets, otherwise a generated one
            let grain = match store.and_then(|s| s.get("paper-grain")) {
                Some(texture) => TextureSet::single(texture),
                None => TextureSet::single(Arc::new(texgen::paper_grain(128, params.seed_nonce)?)),
            };
            Box::new(WatercolorSession::new(*config, params, grain, drying))
        }
        BrushSpec::Oil(config) => Box::new(OilSession::new(*config, params)),
    };
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::input::GestureEvent;
    use crate::raster::Raster;
    use crate::texgen;

    fn store() -> TextureStore {
        let store = TextureStore::new();
        store.insert("dab", texgen::soft_circle(24, 0.8).expect("texture"));
        store.insert("star", texgen::star(24, 5).expect("texture"));
        store.insert("paper", texgen::paper_grain(32, 9).expect("texture"));
        store
    }

    fn roster() -> Vec<BrushSpec> {
        let t = || vec!["dab".to_string(), "star".to_string()];
        vec![
            BrushSpec::InkPen(InkPenConfig::default()),
            BrushSpec::Marker(MarkerConfig::default()),
            BrushSpec::Pencil(PencilConfig::default()),
            BrushSpec::Hatch(HatchConfig::default()),
            BrushSpec::Airbrush(AirbrushConfig::default()),
            BrushSpec::Spray(SprayConfig::default()),
            BrushSpec::Chalk(ChalkConfig::default()),
            BrushSpec::Crayon(CrayonConfig::default()),
            BrushSpec::Neon(NeonConfig::default()),
            BrushSpec::Eraser(EraserConfig::default()),
            BrushSpec::Calligraphy(CalligraphyConfig::default()),
            BrushSpec::Pixel(PixelConfig::default()),
            BrushSpec::Gradient(GradientConfig::default()),
            BrushSpec::Stamp {
                config: StampConfig::default(),
                textures: t(),
            },
            BrushSpec::Scatter {
                config: ScatterConfig::default(),
                textures: t(),
            },
            BrushSpec::Dual {
                config: DualConfig::default(),
                textures: t(),
            },
            BrushSpec::Follow {
                config: FollowConfig::default(),
                textures: t(),
            },
            BrushSpec::Distort {
                config: DistortConfig::default(),
                textures: t(),
            },
            BrushSpec::Splatter {
                config: SplatterConfig::default(),
                textures: t(),
            },
            BrushSpec::Grain {
                config: GrainConfig::default(),
                textures: vec!["paper".to_string()],
            },
            BrushSpec::Sparkle {
                config: SparkleConfig::default(),
                textures: vec!["star".to_string()],
            },
            BrushSpec::RoundPen(RoundPenConfig::default()),
            BrushSpec::Ribbon(RibbonConfig::default()),
            BrushSpec::Watercolor(WatercolorConfig::default()),
            BrushSpec::Oil(OilConfig::default()),
        ]
    }

    fn params() -> BrushParams {
        BrushParams {
            size: 16.0,
            color: [0.2, 0.4, 0.7, 1.0],
            seed_nonce: 99,
            ..Default::default()
        }
    }

    fn run_stroke(session: &mut dyn StrokeSession, raster: &mut Raster) -> Option<crate::geom::Rect> {
        let mut dirty = crate::geom::DirtyAccum::new();
        dirty.merge(session.start(raster, &GestureEvent::new(30.0, 64.0, 0.7, 0)));
        dirty.merge(session.update(raster, &GestureEvent::new(70.0, 50.0, 0.9, 16)));
        dirty.merge(session.update(raster, &GestureEvent::new(110.0, 70.0, 0.8, 32)));
        dirty.merge(session.finish(raster, &GestureEvent::new(130.0, 64.0, 0.6, 48)));
        dirty.take()
    }

    #[test]
    fn test_every_brush_paints_and_reports_dirty() {
        let store = store();
        for spec in roster() {
            let mut raster = Raster::new(192, 128);
            let mut session =
                create_session(&spec, params(), Some(&store), None).expect("construction");
            let dirty = run_stroke(session.as_mut(), &mut raster);

            if matches!(spec, BrushSpec::Eraser(_)) {
                // Nothing to erase on a blank surface, but the region is
                // still reported
                assert!(dirty.is_some(), "{spec:?} reported no dirty region");
                continue;
            }
            let rect = dirty.expect("stroke must report a dirty region");
            let painted = (0..192)
                .flat_map(|x| (0..128).map(move |y| (x, y)))
                .filter(|&(x, y)| raster.pixel(x, y)[3] > 0)
                .count();
            assert!(painted > 0, "{spec:?} painted nothing");
            assert!(rect.width() > 0.0 && rect.height() > 0.0);
        }
    }

    #[test]
    fn test_no_brush_paints_outside_its_dirty_region() {
        let store = store();
        for spec in roster() {
            let mut raster = Raster::new(192, 128);
            let mut session =
                create_session(&spec, params(), Some(&store), None).expect("construction");
            let Some(rect) = run_stroke(session.as_mut(), &mut raster) else {
                continue;
            };
            for x in 0..192u32 {
                for y in 0..128u32 {
                    if raster.pixel(x, y)[3] > 0 {
                        let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                        assert!(
                            rect.pad(1.5).contains(p),
                            "{spec:?} painted outside dirty at {x},{y}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_brush_marks_on_a_tap() {
        let store = store();
        for spec in roster() {
            if matches!(spec, BrushSpec::Eraser(_) | BrushSpec::Sparkle { .. }) {
                // Eraser needs existing paint; sparkle may drop out
                continue;
            }
            let mut raster = Raster::new(96, 96);
            let mut session =
                create_session(&spec, params(), Some(&store), None).expect("construction");
            session.start(&mut raster, &GestureEvent::new(48.0, 48.0, 0.8, 0));
            session.finish(&mut raster, &GestureEvent::new(48.0, 48.0, 0.8, 8));
            let painted = raster.data().iter().any(|&b| b > 0);
            assert!(painted, "{spec:?} left no tap mark");
        }
    }

    #[test]
    fn test_every_brush_ignores_nan_start() {
        let store = store();
        for spec in roster() {
            let mut raster = Raster::new(64, 64);
            let mut session =
                create_session(&spec, params(), Some(&store), None).expect("construction");
            let dirty = session.start(&mut raster, &GestureEvent::new(f32::NAN, 10.0, 1.0, 0));
            assert!(dirty.is_none(), "{spec:?} accepted NaN input");
            assert!(raster.data().iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_replay_with_same_nonce_is_identical() {
        let store = store();
        for spec in roster() {
            // Pixels and the reported dirty regions must both replay
            // bit-identically from the same nonce and timestamps
            let run = || {
                let mut raster = Raster::new(192, 128);
                let mut session =
                    create_session(&spec, params(), Some(&store), None).expect("construction");
                let regions = vec![
                    session.start(&mut raster, &GestureEvent::new(30.0, 64.0, 0.7, 0)),
                    session.update(&mut raster, &GestureEvent::new(70.0, 50.0, 0.9, 16)),
                    session.update(&mut raster, &GestureEvent::new(110.0, 70.0, 0.8, 32)),
                    session.finish(&mut raster, &GestureEvent::new(130.0, 64.0, 0.6, 48)),
                ];
                (raster.snapshot(), regions)
            };
            let (pixels_a, regions_a) = run();
            let (pixels_b, regions_b) = run();
            assert_eq!(pixels_a, pixels_b, "{spec:?} is not replay-deterministic");
            assert_eq!(regions_a, regions_b, "{spec:?} dirty regions diverged");
        }
    }

    #[test]
    fn test_texture_brush_requires_textures() {
        let spec = BrushSpec::Scatter {
            config: ScatterConfig::default(),
            textures: Vec::new(),
        };
        let err = create_session(&spec, params(), Some(&store()), None).unwrap_err();
        assert!(matches!(err, BrushError::EmptyTextureList));

        // No store at all fails the same way
        let err = create_session(&spec, params(), None, None).unwrap_err();
        assert!(matches!(err, BrushError::EmptyTextureList));
    }

    #[test]
    fn test_unknown_texture_id_fails_construction() {
        let spec = BrushSpec::Stamp {
            config: StampConfig::default(),
            textures: vec!["missing".to_string()],
        };
        let err = create_session(&spec, params(), Some(&store()), None).unwrap_err();
        assert!(matches!(err, BrushError::UnknownTexture(id) if id == "missing"));
    }

    #[test]
    fn test_brush_spec_round_trips_through_json() {
        for spec in roster() {
            let json = serde_json::to_string(&spec).expect("serialize");
            let back: BrushSpec = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(
                std::mem::discriminant(&spec),
                std::mem::discriminant(&back)
            );
        }
    }
}
