use crate::foundation::core::RectPx;
use crate::layout::{Edges, LayoutCtx, LayoutParams};

/// Shrink by per-edge insets.
///
/// Forms, first match wins: `pad` (uniform pixels), `pad_gu` (uniform grid units or an
/// `{l,r,t,b}` object in grid units), `pad_viewport_relative` (`{l,r,t,b}` fractions of the
/// viewport width for l/r and height for t/b). No padding form leaves the rect unchanged.
pub fn pad(parent: RectPx, params: &LayoutParams, ctx: &LayoutCtx<'_>) -> Option<RectPx> {
    let e = if let Some(px) = params.f64("pad") {
        Edges {
            l: px,
            r: px,
            t: px,
            b: px,
        }
    } else if let Some(gu) = params.f64("pad_gu") {
        let px = ctx.gu(gu);
        Edges {
            l: px,
            r: px,
            t: px,
            b: px,
        }
    } else if let Some(gu) = params.edges_of("pad_gu") {
        Edges {
            l: ctx.gu(gu.l),
            r: ctx.gu(gu.r),
            t: ctx.gu(gu.t),
            b: ctx.gu(gu.b),
        }
    } else if let Some(rel) = params.edges_of("pad_viewport_relative") {
        let vp = ctx.viewport();
        Edges {
            l: rel.l * vp.w,
            r: rel.r * vp.w,
            t: rel.t * vp.h,
            b: rel.b * vp.h,
        }
    } else {
        return Some(parent);
    };
    Some(parent.inset(e.l, e.t, e.r, e.b))
}

/// Translate by `offsets: {x, y}` or top-level `x` / `y`.
pub fn offset(parent: RectPx, params: &LayoutParams) -> Option<RectPx> {
    let (dx, dy) = match params.get("offsets").and_then(|v| v.as_object()) {
        Some(o) => (
            o.get("x").and_then(|v| v.as_f64()).unwrap_or(0.0),
            o.get("y").and_then(|v| v.as_f64()).unwrap_or(0.0),
        ),
        None => (params.f64_or("x", 0.0), params.f64_or("y", 0.0)),
    };
    Some(RectPx {
        x: parent.x + dx,
        y: parent.y + dy,
        ..parent
    })
}

/// Letterbox content of `content_aspect_ratio` inside the parent, centered.
pub fn fit(parent: RectPx, params: &LayoutParams) -> Option<RectPx> {
    let content_asp = params
        .f64("content_aspect_ratio")
        .filter(|v| v.is_finite() && *v > 0.0)?;
    let parent_asp = parent.w / parent.h;

    let mut out = parent;
    if content_asp >= parent_asp {
        out.h = parent.w / content_asp;
        out.y += (parent.h - out.h) / 2.0;
    } else {
        out.w = parent.h * content_asp;
        out.x += (parent.w - out.w) / 2.0;
    }
    Some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/transform.rs"]
mod tests;
