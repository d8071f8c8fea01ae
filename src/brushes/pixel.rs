//! Pixel - grid-snapped opaque squares for pixel art

use serde::{Deserialize, Serialize};

use crate::brushes::common::WalkedStroke;
use crate::geom::{Dirty, DirtyAccum, Rect};
use crate::input::GestureEvent;
use crate::raster::Surface;
use crate::stroke::{BrushParams, StampPoint, StrokeSession};

/// Pixel brush configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelConfig {
    /// Grid cell size in surface pixels
    pub cell: f32,
}

impl Default for PixelConfig {
    fn default() -> Self {
        Self { cell: 1.0 }
    }
}

/// One pixel-brush stroke
#[derive(Debug)]
pub struct PixelSession {
    config: PixelConfig,
    params: BrushParams,
    stroke: WalkedStroke,
    last_cell: Option<(i64, i64)>,
}

impl PixelSession {
    pub fn new(config: PixelConfig, params: BrushParams) -> Self {
        let cell = config.cell.max(1.0);
        // Sub-cell spacing so diagonal travel cannot skip cells
        let step = (cell * 0.5).max(0.5);
        Self {
            config: PixelConfig { cell },
            params,
            stroke: WalkedStroke::new(step),
            last_cell: None,
        }
    }

    fn render(&mut self, surface: &mut dyn Surface, stamp: &StampPoint, dirty: &mut DirtyAccum) {
        let cell = self.config.cell;
        let side = (self.params.safe_size() / cell).round().max(1.0) as i64;
        let cx = (stamp.pos.x / cell).floor() as i64;
        let cy = (stamp.pos.y / cell).floor() as i64;
        if self.last_cell == Some((cx, cy)) {
            return;
        }
        self.last_cell = Some((cx, cy));

        // Square block of cells centered on the snapped cell
        let origin = -(side / 2);
        let left = (cx + origin) as f32 * cell;
        let top = (cy + origin) as f32 * cell;
        let extent = side as f32 * cell;
        let rect = Rect::new(left, top, left + extent, top + extent);
        surface.fill_rect(rect, self.params.color, self.params.blend);
        dirty.add(rect);
    }
}

impl StrokeSession for PixelSession {
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
