use crate::foundation::core::RectPx;
use crate::layout::{LayoutCtx, LayoutParams};

pub const DEFAULT_ASPECT_RATIO: f64 = 16.0 / 9.0;
pub const DEFAULT_HEIGHT_GU: f64 = 12.0;
pub const DEFAULT_MARGIN_GU: f64 = 1.5;

/// Corner a picture-in-picture item is pinned to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "top-left" => Some(Self::TopLeft),
            "top-right" => Some(Self::TopRight),
            "bottom-left" => Some(Self::BottomLeft),
            "bottom-right" => Some(Self::BottomRight),
            _ => None,
        }
    }
}

/// Small inset frame pinned to a corner of the parent.
///
/// Unknown corner names fall back to the default corner.
pub fn pip(parent: RectPx, params: &LayoutParams, ctx: &LayoutCtx<'_>) -> Option<RectPx> {
    let corner = params
        .str("position_corner")
        .and_then(Corner::parse)
        .unwrap_or_default();
    let aspect = params.f64_or("aspect_ratio", DEFAULT_ASPECT_RATIO);
    let h = ctx.gu(params.f64_or("height_gu", DEFAULT_HEIGHT_GU));
    let margin = ctx.gu(params.f64_or("margin_gu", DEFAULT_MARGIN_GU));
    if !(aspect.is_finite() && aspect > 0.0 && h.is_finite() && margin.is_finite()) {
        return None;
    }
    let w = h * aspect;

    let x = match corner {
        Corner::TopLeft | Corner::BottomLeft => parent.x + margin,
        Corner::TopRight | Corner::BottomRight => parent.x + parent.w - w - margin,
    };
    let y = match corner {
        Corner::TopLeft | Corner::TopRight => parent.y + margin,
        Corner::BottomLeft | Corner::BottomRight => parent.y + parent.h - h - margin,
    };
    Some(RectPx::new(x, y, w, h).snapped())
}

#[cfg(test)]
#[path = "../../tests/unit/layout/pip.rs"]
mod tests;
