use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::assets::table::{AssetEntry, SourceType};
use crate::foundation::core::RectPx;
use crate::layout::params::LayoutParams;
use crate::layout::{LayoutFn, LayoutSpec};
use crate::reconcile::op::ElementKey;
use crate::scene::props::{BoxProps, CommonProps, NodeProps, NodeVariant, VideoProps};

#[test]
fn opts_defaults_fill_missing_fields() {
    let opts = CompositionOpts::from_reader(r#"{"viewport": {"width": 1920, "height": 1080}}"#.as_bytes())
        .expect("opts");
    assert_eq!(opts.viewport, Viewport { width: 1920, height: 1080 });
    assert_eq!(opts.resolved_pixels_per_grid_unit(), 30.0);
    assert_eq!(opts.placeholder_color.to_css(), "#8f8f8f");
    assert_eq!(opts.insert_mode, InsertMode::Positional);

    let opts = CompositionOpts::from_reader(
        r#"{"pixels_per_grid_unit": 12, "placeholder_color": "gray", "insert_mode": "append"}"#.as_bytes(),
    )
    .expect("opts");
    assert_eq!(opts.viewport, Viewport::default());
    assert_eq!(opts.resolved_pixels_per_grid_unit(), 12.0);
    assert_eq!(opts.placeholder_color.to_css(), "#808080");
    assert_eq!(opts.insert_mode, InsertMode::Append);
}

#[test]
fn invalid_opts_are_config_errors() {
    let zero = r#"{"viewport": {"width": 0, "height": 720}}"#;
    assert!(CompositionOpts::from_reader(zero.as_bytes()).unwrap_err().is_config());
    let ppgu = r#"{"pixels_per_grid_unit": -1}"#;
    assert!(CompositionOpts::from_reader(ppgu.as_bytes()).unwrap_err().is_config());
    assert!(CompositionOpts::from_reader("{not json".as_bytes()).unwrap_err().is_config());
    assert!(CompositionOpts::from_path("/nonexistent/opts.json").is_err());
}

fn video_scene() -> Element {
    let mut backdrop = CommonProps::default();
    backdrop.style.fill_color = Some(ColorDef::BLACK);
    let video = VideoProps {
        common: CommonProps {
            layout: Some(LayoutSpec::new(
                LayoutFn::Pad,
                LayoutParams::new().num("pad_gu", 1.0),
            )),
            ..CommonProps::default()
        },
        ..VideoProps::new("cam")
    };
    Element::root(vec![
        Element::new(NodeProps::Box(BoxProps { common: backdrop })),
        Element::new(NodeProps::Video(video)),
        Element::new(NodeProps::label("on air")),
    ])
}

#[test]
fn encode_produces_all_three_outputs() {
    let mut comp = Composition::new(CompositionOpts::default()).expect("composition");
    comp.render(Some(&video_scene())).expect("render");
    let assets = AssetTable::new().with(SourceType::Video, "cam", AssetEntry::new("v", 16, 9));

    let frame = comp.encode(&assets).expect("encode");
    assert_eq!(frame.video_layers.len(), 1);
    assert_eq!(frame.video_layers[0].frame, RectPx::new(20.0, 20.0, 1240.0, 680.0));
    assert!(!frame.background.is_empty());
    assert_eq!(
        frame.foreground.opcodes().collect::<Vec<_>>(),
        vec!["font", "fillStyle", "fillText"]
    );

    let json = serde_json::to_value(&frame).expect("serialize");
    assert_eq!(json["video_layers"][0]["type"], "video");
    assert_eq!(json["background"]["width"], 1280);
}

#[test]
fn missing_video_falls_back_to_foreground_only() {
    let mut comp = Composition::new(CompositionOpts::default()).expect("composition");
    comp.render(Some(&video_scene())).expect("render");
    let frame = comp.encode(&AssetTable::new()).expect("encode");
    assert!(frame.video_layers.is_empty());
    assert!(frame.background.is_empty());
    assert_eq!(frame.foreground.opcodes().filter(|op| *op == "fillRect").count(), 1);
    assert_eq!(comp.diagnostics().reported_len(), 1);
}

#[test]
fn subscribers_fire_once_per_render() {
    let mut comp = Composition::new(CompositionOpts::default()).expect("composition");
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    comp.subscribe(move |graph| {
        assert!(graph.root().is_some());
        seen.fetch_add(1, Ordering::SeqCst);
    });
    comp.render(Some(&video_scene())).expect("first");
    comp.render(Some(&video_scene())).expect("second");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(comp.commit_count(), 2);
}

#[test]
fn resize_relayouts_and_tracks_grid_unit() {
    let mut comp = Composition::new(CompositionOpts::default()).expect("composition");
    comp.render(Some(&video_scene())).expect("render");
    comp.resize(Viewport { width: 720, height: 1280 }).expect("resize");

    assert_eq!(comp.host().pixels_per_grid_unit(), 20.0);
    let assets = AssetTable::new().with(SourceType::Video, "cam", AssetEntry::new("v", 16, 9));
    let frame = comp.encode(&assets).expect("encode");
    assert_eq!(frame.video_layers[0].frame, RectPx::new(20.0, 20.0, 680.0, 1240.0));
    assert_eq!((frame.foreground.width, frame.foreground.height), (720, 1280));

    assert!(comp.resize(Viewport { width: 0, height: 10 }).unwrap_err().is_config());
    assert_eq!(comp.opts().viewport, Viewport { width: 720, height: 1280 });
}

#[test]
fn replayed_ops_build_the_same_scene() {
    let ops = vec![
        HostOp::BeginCommit,
        HostOp::Create {
            key: ElementKey(1),
            variant: NodeVariant::Root,
            props: NodeProps::Root,
        },
        HostOp::Create {
            key: ElementKey(2),
            variant: NodeVariant::Label,
            props: NodeProps::label("hi"),
        },
        HostOp::Append {
            parent: ElementKey(1),
            child: ElementKey(2),
        },
        HostOp::AttachRoot {
            key: Some(ElementKey(1)),
        },
        HostOp::EndCommit,
    ];
    let mut comp = Composition::new(CompositionOpts::default()).expect("composition");
    comp.replay(&OpLog { ops }).expect("replay");
    assert_eq!(comp.graph().len(), 2);

    let frame = comp.encode(&AssetTable::new()).expect("encode");
    assert_eq!(
        frame.foreground.opcodes().collect::<Vec<_>>(),
        vec!["font", "fillStyle", "fillText"]
    );
}

#[test]
fn encode_inside_an_open_commit_is_rejected() {
    let mut comp = Composition::new(CompositionOpts::default()).expect("composition");
    comp.host_mut().begin_commit();
    assert!(matches!(
        comp.encode(&AssetTable::new()),
        Err(VcsError::Protocol(_))
    ));
}

#[test]
fn encode_recovers_after_a_failed_batch() {
    let mut comp = Composition::new(CompositionOpts::default()).expect("composition");
    let broken = [
        HostOp::BeginCommit,
        HostOp::Append {
            parent: ElementKey(99),
            child: ElementKey(98),
        },
        HostOp::EndCommit,
    ];
    assert!(comp.apply_ops(&broken).is_err());
    comp.apply_ops(&[HostOp::BeginCommit, HostOp::EndCommit])
        .expect("clean batch");
    assert!(comp.encode(&AssetTable::new()).is_ok());
}

#[test]
fn composition_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<Composition>();
}
