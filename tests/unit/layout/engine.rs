use super::*;
use crate::layout::{LayoutParams, LayoutSpec};
use crate::scene::props::{BoxProps, NodeProps, NodeVariant};

const VIEWPORT: RectPx = RectPx::from_size(1280.0, 720.0);

fn laid_out(spec: Option<LayoutSpec>) -> NodeProps {
    let p = NodeProps::Box(BoxProps::default());
    match spec {
        Some(s) => p.with_layout(s),
        None => p,
    }
}

fn build() -> (SceneGraph, NodeId, NodeId, NodeId) {
    let mut g = SceneGraph::new();
    let root = g.create(NodeVariant::Root, NodeProps::Root).expect("root");
    let padded = g
        .create(
            NodeVariant::Box,
            laid_out(Some(LayoutSpec::new(
                LayoutFn::Pad,
                LayoutParams::new().num("pad_gu", 2.0),
            ))),
        )
        .expect("padded");
    let inherit = g.create(NodeVariant::Box, laid_out(None)).expect("inherit");
    g.append_child(root, padded).expect("append");
    g.append_child(padded, inherit).expect("append");
    g.attach_root(Some(root)).expect("attach");
    (g, root, padded, inherit)
}

#[test]
fn nested_layouts_compose() {
    let (mut g, root, padded, inherit) = build();
    let mut diag = Diagnostics::new();
    compute_layout(&mut g, VIEWPORT, 20.0, &mut diag);

    assert_eq!(g.rect(root), Some(VIEWPORT));
    assert_eq!(g.rect(padded), Some(RectPx::new(40.0, 40.0, 1200.0, 640.0)));
    assert_eq!(g.rect(inherit), g.rect(padded));
    assert_eq!(diag.reported_len(), 0);
}

#[test]
fn layout_is_idempotent() {
    let (mut g, _, _, _) = build();
    let mut diag = Diagnostics::new();
    compute_layout(&mut g, VIEWPORT, 20.0, &mut diag);
    let first: Vec<_> = g.preorder().into_iter().map(|id| g.rect(id)).collect();
    compute_layout(&mut g, VIEWPORT, 20.0, &mut diag);
    let second: Vec<_> = g.preorder().into_iter().map(|id| g.rect(id)).collect();
    assert_eq!(first, second);
}

#[test]
fn rejected_inputs_fall_back_and_warn_once() {
    let (mut g, _, padded, inherit) = build();
    g.commit(
        inherit,
        laid_out(Some(LayoutSpec::new(
            LayoutFn::Grid,
            LayoutParams::new().num("index", 0.0),
        ))),
    )
    .expect("commit");

    let mut diag = Diagnostics::new();
    compute_layout(&mut g, VIEWPORT, 20.0, &mut diag);
    compute_layout(&mut g, VIEWPORT, 20.0, &mut diag);

    assert_eq!(g.rect(inherit), g.rect(padded));
    assert_eq!(diag.reported_len(), 1);
    assert_eq!(diag.suppressed(), 1);
    let key = format!("{inherit}:grid");
    assert!(diag.has_reported(DiagnosticKind::LayoutFallback, &key));
}

#[test]
fn text_placement_without_size_reports_intrinsic() {
    let mut g = SceneGraph::new();
    let root = g.create(NodeVariant::Root, NodeProps::Root).expect("root");
    let label = g
        .create(
            NodeVariant::Label,
            NodeProps::label("hi").with_layout(LayoutSpec::new(
                LayoutFn::PlaceText,
                LayoutParams::new(),
            )),
        )
        .expect("label");
    g.append_child(root, label).expect("append");
    g.attach_root(Some(root)).expect("attach");

    let mut diag = Diagnostics::new();
    compute_layout(&mut g, VIEWPORT, 20.0, &mut diag);
    assert_eq!(g.rect(label), Some(VIEWPORT));
    assert!(diag.has_reported(DiagnosticKind::IntrinsicSize, &format!("{label}:place_text")));
}

#[test]
fn detached_graph_is_untouched() {
    let (mut g, root, _, _) = build();
    g.attach_root(None).expect("detach");
    let mut diag = Diagnostics::new();
    compute_layout(&mut g, VIEWPORT, 20.0, &mut diag);
    assert_eq!(g.rect(root), Some(RectPx::default()));
}
