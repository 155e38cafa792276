use crate::foundation::core::RectPx;
use crate::layout::{LayoutCtx, LayoutParams};

#[derive(Clone, Copy)]
struct SplitArgs {
    index: u64,
    pos: f64,
    margin_px: f64,
}

fn split_args(params: &LayoutParams, ctx: &LayoutCtx<'_>) -> Option<SplitArgs> {
    let index = params.f64_or("index", 0.0);
    let pos = params.f64_or("pos", 0.5);
    let margin_px = match params.f64("margin_px") {
        Some(px) => px,
        None => ctx.gu(params.f64_or("margin_gu", 0.0)),
    };
    if !(index.is_finite() && pos.is_finite() && margin_px.is_finite()) || index < 0.0 {
        return None;
    }
    Some(SplitArgs {
        index: index as u64,
        pos: pos.clamp(0.0, 1.0),
        margin_px,
    })
}

/// Split into top (`index: 0`) and bottom (`index: 1`) parts at fraction `pos`.
pub fn split_horizontal(
    parent: RectPx,
    params: &LayoutParams,
    ctx: &LayoutCtx<'_>,
) -> Option<RectPx> {
    let a = split_args(params, ctx)?;
    let available = parent.h - a.margin_px;
    let first = available * a.pos;

    let mut out = parent;
    if a.index == 0 {
        out.h = first;
    } else {
        out.h = available - first;
        out.y += first + a.margin_px;
    }
    Some(out)
}

/// Split into left (`index: 0`) and right (`index: 1`) parts at fraction `pos`.
pub fn split_vertical(parent: RectPx, params: &LayoutParams, ctx: &LayoutCtx<'_>) -> Option<RectPx> {
    let a = split_args(params, ctx)?;
    let available = parent.w - a.margin_px;
    let first = available * a.pos;

    let mut out = parent;
    if a.index == 0 {
        out.w = first;
    } else {
        out.w = available - first;
        out.x += first + a.margin_px;
    }
    Some(out)
}

/// Side-by-side on landscape viewports, stacked on portrait ones.
pub fn split_across_longer_dimension(
    parent: RectPx,
    params: &LayoutParams,
    ctx: &LayoutCtx<'_>,
) -> Option<RectPx> {
    let vp = ctx.viewport();
    if vp.w >= vp.h {
        split_vertical(parent, params, ctx)
    } else {
        split_horizontal(parent, params, ctx)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/split.rs"]
mod tests;
