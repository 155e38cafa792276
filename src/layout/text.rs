use crate::foundation::core::RectPx;
use crate::layout::{LayoutCtx, LayoutParams};

/// Size the frame to the node's intrinsic content size and align it inside the parent.
///
/// `h_align` is `left|center|right`, `v_align` is `top|center|bottom`. Offsets
/// (`x_offset`/`y_offset` in pixels, or `*_gu`) point inward, so they flip sign when aligned
/// to the right or bottom edge. Without an intrinsic size there is nothing to place.
pub fn place_text(parent: RectPx, params: &LayoutParams, ctx: &LayoutCtx<'_>) -> Option<RectPx> {
    let size = ctx.intrinsic_size()?;
    let offset = |px: &str, gu: &str| match params.f64(px) {
        Some(v) => v,
        None => ctx.gu(params.f64_or(gu, 0.0)),
    };
    let mut x_off = offset("x_offset", "x_offset_gu");
    let mut y_off = offset("y_offset", "y_offset_gu");

    let mut out = RectPx::new(parent.x, parent.y, size.w, size.h);
    match params.str("h_align") {
        Some("right") => {
            out.x += parent.w - size.w;
            x_off = -x_off;
        }
        Some("center") => out.x += (parent.w - size.w) / 2.0,
        _ => {}
    }
    match params.str("v_align") {
        Some("bottom") => {
            out.y += parent.h - size.h;
            y_off = -y_off;
        }
        Some("center") => out.y += (parent.h - size.h) / 2.0,
        _ => {}
    }
    out.x += x_off;
    out.y += y_off;
    Some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
