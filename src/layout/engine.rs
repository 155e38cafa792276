use crate::foundation::core::RectPx;
use crate::foundation::diagnostics::{DiagnosticKind, Diagnostics};
use crate::layout::{LayoutCtx, LayoutFn};
use crate::scene::graph::SceneGraph;
use crate::scene::node::NodeId;

/// Lay out every attached node in one pre-order pass.
///
/// Each node receives `layout(parent_rect)` when it has a layout slot, otherwise its parent's
/// rectangle. The root receives `viewport`. Unusable layout inputs fall back to the parent
/// rectangle and are reported once per `(node, function)`.
#[tracing::instrument(skip(graph, diagnostics))]
pub fn compute_layout(
    graph: &mut SceneGraph,
    viewport: RectPx,
    pixels_per_grid_unit: f64,
    diagnostics: &mut Diagnostics,
) {
    let Some(root) = graph.root() else {
        return;
    };

    let rects = {
        let g: &SceneGraph = graph;
        let sizer = |id: NodeId| g.intrinsic_size(id);
        let mut out: Vec<(NodeId, RectPx)> = Vec::with_capacity(g.len());
        let mut stack = vec![(root, viewport)];

        while let Some((id, parent_rect)) = stack.pop() {
            let Some(node) = g.get(id) else {
                continue;
            };
            let rect = match node.props().layout() {
                None => parent_rect,
                Some(spec) => {
                    let ctx = LayoutCtx::for_node(viewport, pixels_per_grid_unit, id, &sizer);
                    match spec.func.apply(parent_rect, &spec.params, &ctx) {
                        Some(r) => r,
                        None => {
                            let sized = ctx.intrinsic_size().is_some();
                            report_fallback(diagnostics, id, &spec.func, sized);
                            parent_rect
                        }
                    }
                }
            };
            out.push((id, rect));
            stack.extend(node.children().iter().rev().map(|c| (*c, rect)));
        }
        out
    };

    tracing::debug!(nodes = rects.len(), "layout pass");
    for (id, rect) in rects {
        graph.set_rect(id, rect);
    }
}

fn report_fallback(diagnostics: &mut Diagnostics, id: NodeId, func: &LayoutFn, sized: bool) {
    let key = format!("{id}:{}", func.name());
    if matches!(func, LayoutFn::PlaceText) && !sized {
        diagnostics.warn_once(
            DiagnosticKind::IntrinsicSize,
            &key,
            "no intrinsic size for text placement; using parent rect",
        );
    } else {
        diagnostics.warn_once(
            DiagnosticKind::LayoutFallback,
            &key,
            "layout function rejected its inputs; using parent rect",
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
