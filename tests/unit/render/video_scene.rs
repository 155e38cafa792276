use super::*;
use crate::assets::table::AssetEntry;
use crate::layout::params::LayoutParams;
use crate::layout::{LayoutFn, LayoutSpec};
use crate::reconcile::{Element, Host, Reconciler};
use crate::scene::props::{CommonProps, VideoProps};
use serde_json::json;

fn host_with(videos: Vec<VideoProps>) -> Host {
    let mut host = Host::new(RectPx::from_size(1280.0, 720.0), 20.0);
    let children = videos
        .into_iter()
        .map(|v| Element::new(NodeProps::Video(v)))
        .collect();
    Reconciler::new()
        .render_into(&mut host, Some(&Element::root(children)))
        .expect("render");
    host
}

fn padded(src: &str, pad: f64) -> VideoProps {
    VideoProps {
        common: CommonProps {
            layout: Some(LayoutSpec::new(
                LayoutFn::Pad,
                LayoutParams::new().num("pad", pad),
            )),
            ..CommonProps::default()
        },
        ..VideoProps::new(src)
    }
}

#[test]
fn layer_record_shape() {
    let mut video = padded("cam", 10.5);
    video.common.style.corner_radius_px = 6.0;
    video.zoom = 1.5;
    let host = host_with(vec![video]);
    let assets = AssetTable::new().with(SourceType::Video, "cam", AssetEntry::new("track-7", 1920, 1080));

    let layers = encode_video_layers(host.graph(), &assets, &mut Diagnostics::new());
    assert_eq!(layers.len(), 1);
    assert_eq!(
        serde_json::to_value(&layers[0]).expect("serialize"),
        json!({
            "type": "video",
            "id": "track-7",
            "frame": {"x": 11.0, "y": 11.0, "w": 1259.0, "h": 699.0},
            "attrs": {"cornerRadiusPx": 6.0, "scaleMode": "fill", "zoom": 1.5},
        })
    );
}

#[test]
fn defaults_are_omitted_from_attrs() {
    let host = host_with(vec![VideoProps::new("cam")]);
    let assets = AssetTable::new().with(SourceType::Video, "cam", AssetEntry::new("v", 16, 9));
    let layers = encode_video_layers(host.graph(), &assets, &mut Diagnostics::new());
    assert_eq!(
        serde_json::to_value(&layers[0].attrs).expect("serialize"),
        json!({"scaleMode": "fill"})
    );
}

#[test]
fn missing_sources_are_skipped_and_reported_once() {
    let host = host_with(vec![
        VideoProps::new("gone"),
        padded("cam", 100.0),
        VideoProps::new("gone"),
    ]);
    let assets = AssetTable::new().with(SourceType::Video, "cam", AssetEntry::new("v", 16, 9));
    let mut diagnostics = Diagnostics::new();

    let layers = encode_video_layers(host.graph(), &assets, &mut diagnostics);
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].frame, RectPx::new(100.0, 100.0, 1080.0, 520.0));
    assert!(diagnostics.has_reported(DiagnosticKind::MissingAsset, "video:gone"));
    assert_eq!(diagnostics.suppressed(), 1);
}

#[test]
fn layers_follow_preorder() {
    let host = host_with(vec![VideoProps::new("a"), VideoProps::new("b")]);
    let assets = AssetTable::new()
        .with(SourceType::Video, "a", AssetEntry::new("first", 16, 9))
        .with(SourceType::Video, "b", AssetEntry::new("second", 16, 9));
    let ids: Vec<String> = encode_video_layers(host.graph(), &assets, &mut Diagnostics::new())
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec!["first", "second"]);
}
