use serde::{Deserialize, Serialize};

pub use kurbo::{Affine, BezPath, Point, Vec2};

/// Axis-aligned pixel rectangle `{x, y, w, h}` in viewport space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RectPx {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl RectPx {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle anchored at the origin.
    pub const fn from_size(w: f64, h: f64) -> Self {
        Self { x: 0.0, y: 0.0, w, h }
    }

    /// `true` when every component is finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }

    pub fn center(self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Width divided by height; `None` for degenerate rectangles.
    pub fn aspect(self) -> Option<f64> {
        let asp = self.w / self.h;
        (asp.is_finite() && asp > 0.0).then_some(asp)
    }

    /// Shrink by per-edge insets.
    pub fn inset(self, left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x: self.x + left,
            y: self.y + top,
            w: self.w - (left + right),
            h: self.h - (top + bottom),
        }
    }

    /// Seam-free pixel snapping: origin floored, size ceiled.
    pub fn snapped(self) -> Self {
        Self {
            x: self.x.floor(),
            y: self.y.floor(),
            w: self.w.ceil(),
            h: self.h.ceil(),
        }
    }

    /// Round every component to the nearest integer.
    pub fn rounded(self) -> Self {
        Self {
            x: self.x.round(),
            y: self.y.round(),
            w: self.w.round(),
            h: self.h.round(),
        }
    }

    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }
}

impl From<kurbo::Rect> for RectPx {
    fn from(r: kurbo::Rect) -> Self {
        Self {
            x: r.x0,
            y: r.y0,
            w: r.width(),
            h: r.height(),
        }
    }
}

/// Content size in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SizePx {
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl SizePx {
    pub const fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn is_finite(self) -> bool {
        self.w.is_finite() && self.h.is_finite()
    }
}

/// Output viewport dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Viewport {
    pub fn rect(self) -> RectPx {
        RectPx::from_size(f64::from(self.width), f64::from(self.height))
    }

    /// Default grid unit: the shorter viewport edge divided into 36 units.
    pub fn default_pixels_per_grid_unit(self) -> f64 {
        f64::from(self.width.min(self.height)) / 36.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
