use crate::foundation::core::RectPx;
use crate::layout::{LayoutCtx, LayoutParams};

/// Placement request for one cell of a uniform grid.
#[derive(Clone, Copy, Debug)]
struct GridCell {
    frame: RectPx,
    index: usize,
    total: usize,
    cols: usize,
    rows: usize,
    item_aspect: f64,
    inner_margin: f64,
    preserve_aspect: bool,
    center_remainder: bool,
}

/// Column count for `total` items.
pub fn grid_columns(total: usize) -> usize {
    match total {
        0..=1 => 1,
        2..=4 => 2,
        5..=9 => 3,
        10..=16 => 4,
        _ => 5,
    }
}

fn count_param(params: &LayoutParams, key: &str) -> Option<f64> {
    params.f64(key).filter(|v| v.is_finite())
}

/// One item of a near-square grid of `total` items, each with the viewport's aspect ratio.
///
/// Margins in grid units override the automatic ones when `>= 0`. The last row is centered
/// when it does not fill every column.
pub fn grid(parent: RectPx, params: &LayoutParams, ctx: &LayoutCtx<'_>) -> Option<RectPx> {
    let total = count_param(params, "total")?;
    if total < 1.0 {
        return Some(parent);
    }
    let index = count_param(params, "index").unwrap_or(0.0);
    let inner_gu = count_param(params, "inner_margin_gu").unwrap_or(-1.0);
    let outer_gu = count_param(params, "outer_margin_gu").unwrap_or(-1.0);
    let preserve_aspect = params.bool_or("preserve_item_aspect_ratio", true);
    if index < 0.0 {
        return None;
    }

    let total = total as usize;
    let cols = grid_columns(total);
    let rows = total.div_ceil(cols);

    let vp = ctx.viewport();
    let output_asp = vp.aspect()?;
    let landscape = output_asp > 1.0;

    let mut inner = 0.0;
    let (mut outer_x, mut outer_y) = (0.0, 0.0);
    if total > 1 {
        let margin_rel = if landscape {
            (vp.h * 0.05).round()
        } else {
            vp.w * 0.04
        };

        inner = if inner_gu >= 0.0 {
            ctx.gu(inner_gu)
        } else {
            margin_rel
        };

        if outer_gu >= 0.0 {
            outer_x = ctx.gu(outer_gu);
            outer_y = outer_x;
        } else if preserve_aspect && cols == rows {
            // Tight layouts keep vertical room for participant labels.
            outer_y = if landscape {
                (margin_rel * 0.7).round()
            } else {
                margin_rel.round()
            };
        }
    }

    Some(grid_item(GridCell {
        frame: parent.inset(outer_x, outer_y, outer_x, outer_y),
        index: index as usize,
        total,
        cols,
        rows,
        item_aspect: output_asp,
        inner_margin: inner,
        preserve_aspect,
        center_remainder: true,
    }))
}

/// One item of a single column (or a single row with `make_row`).
pub fn column(parent: RectPx, params: &LayoutParams, ctx: &LayoutCtx<'_>) -> Option<RectPx> {
    let total = count_param(params, "total")?;
    if total < 1.0 {
        return Some(parent);
    }
    let index = count_param(params, "index").unwrap_or(0.0);
    if index < 0.0 {
        return None;
    }
    let make_row = params.bool_or("make_row", false);
    let item_aspect = count_param(params, "item_aspect_ratio").unwrap_or(0.0);
    let inner_gu = count_param(params, "inner_margin_gu").unwrap_or(0.7);
    let outer_gu = count_param(params, "outer_margin_gu").unwrap_or(0.5);

    let total = total as usize;
    let (inner, outer) = if total > 1 {
        (ctx.gu(inner_gu), ctx.gu(outer_gu))
    } else {
        (0.0, 0.0)
    };
    let (cols, rows) = if make_row { (total, 1) } else { (1, total) };

    let frame = parent.inset(outer, outer, outer, outer);
    let n = total as f64;
    let item_aspect = if item_aspect > 0.0 {
        item_aspect
    } else if rows == 1 {
        (frame.w - inner * (n - 1.0)) / n / frame.h
    } else {
        frame.w / ((frame.h - inner * (n - 1.0)) / n)
    };

    Some(grid_item(GridCell {
        frame,
        index: index as usize,
        total,
        cols,
        rows,
        item_aspect,
        inner_margin: inner,
        preserve_aspect: true,
        center_remainder: false,
    }))
}

fn grid_item(cell: GridCell) -> RectPx {
    let GridCell {
        frame,
        cols,
        rows,
        item_aspect,
        inner_margin: gap,
        ..
    } = cell;
    let (nc, nr) = (cols as f64, rows as f64);
    let (mut x, mut y) = (frame.x, frame.y);

    let (item_w, item_h) = if cell.preserve_aspect {
        let frame_asp = frame.w / frame.h;
        let content_asp = nc * item_aspect / nr;
        if content_asp >= frame_asp {
            let w = (frame.w - (nc - 1.0) * gap) / nc;
            let h = w / item_aspect;
            y += (frame.h - (nr * h + gap * (nr - 1.0))) / 2.0;
            (w, h)
        } else {
            let h = (frame.h - (nr - 1.0) * gap) / nr;
            let w = h * item_aspect;
            x += (frame.w - (nc * w + gap * (nc - 1.0))) / 2.0;
            (w, h)
        }
    } else {
        (
            (frame.w - (nc - 1.0) * gap) / nc,
            (frame.h - (nr - 1.0) * gap) / nr,
        )
    };

    let col = cell.index % cols;
    let row = cell.index / cols;
    let remainder = cell.total.saturating_sub(cols * (rows - 1));
    if cell.center_remainder && row + 1 == rows && remainder > 0 && remainder < cols {
        x += (item_w + gap) * (cols - remainder) as f64 / 2.0;
    }

    x += col as f64 * item_w;
    x += col as f64 * gap;
    y += row as f64 * item_h;
    y += row as f64 * gap;

    RectPx::new(x, y, item_w, item_h).snapped()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
