use super::*;
use crate::assets::table::AssetEntry;
use crate::layout::params::LayoutParams;
use crate::layout::{LayoutFn, LayoutSpec};
use crate::reconcile::{Element, Host, Reconciler};
use crate::foundation::core::SizePx;
use crate::render::video_scene::encode_video_layers;
use crate::scene::graph::IntrinsicSizer;
use crate::scene::props::{BlendProps, BoxProps, CommonProps, VideoProps};
use crate::text::block::{TextLine, TextRun};

fn color(s: &str) -> ColorDef {
    ColorDef::parse(s).expect("color")
}

fn filled(hex: &str) -> CommonProps {
    let mut common = CommonProps::default();
    common.style.fill_color = Some(color(hex));
    common
}

fn boxed(common: CommonProps) -> Element {
    Element::new(NodeProps::Box(BoxProps { common }))
}

fn render(tree: Element) -> Host {
    let mut host = Host::new(RectPx::from_size(1280.0, 720.0), 20.0);
    Reconciler::new()
        .render_into(&mut host, Some(&tree))
        .expect("render");
    host
}

fn ctx<'a>(host: &'a Host, assets: &'a AssetTable) -> EncodeCtx<'a> {
    EncodeCtx {
        graph: host.graph(),
        assets,
        viewport: host.viewport(),
        pixels_per_grid_unit: host.pixels_per_grid_unit(),
        placeholder: color("#8f8f8f"),
    }
}

fn encode(host: &Host, assets: &AssetTable) -> DisplayList {
    encode_display_list(&ctx(host, assets), &mut Diagnostics::new()).expect("encode")
}

const FULL: RectPx = RectPx::from_size(1280.0, 720.0);

#[test]
fn filled_box_covers_its_rect() {
    let host = render(Element::root(vec![boxed(filled("red"))]));
    let dl = encode(&host, &AssetTable::new());
    assert_eq!((dl.width, dl.height), (1280, 720));
    assert_eq!(
        dl.commands,
        vec![Command::FillStyle("#ff0000".into()), Command::FillRect(FULL)]
    );
}

#[test]
fn rounded_box_fills_and_strokes_a_path() {
    let mut common = filled("#00ff00");
    common.style.corner_radius_px = 12.0;
    common.style.stroke_color = Some(color("rgba(0, 0, 0, 0.5)"));
    common.style.stroke_width_px = 2.0;
    let host = render(Element::root(vec![boxed(common)]));
    let dl = encode(&host, &AssetTable::new());
    assert_eq!(
        dl.commands,
        vec![
            Command::FillStyle("#00ff00".into()),
            Command::BeginPath,
            Command::RoundRect(FULL, 12.0),
            Command::Fill(FillRule::NonZero),
            Command::StrokeStyle("rgba(0, 0, 0, 0.5)".into()),
            Command::LineWidth(2.0),
            Command::BeginPath,
            Command::RoundRect(FULL, 12.0),
            Command::Stroke,
        ]
    );
}

#[test]
fn nested_opacity_multiplies() {
    let mut outer = filled("#000000");
    outer.blend = Some(BlendProps { opacity: 0.5 });
    let mut inner = filled("#ffffff");
    inner.blend = Some(BlendProps { opacity: 0.5 });
    let host = render(Element::root(vec![boxed(outer).child(boxed(inner))]));
    let dl = encode(&host, &AssetTable::new());

    let alphas: Vec<f64> = dl
        .commands
        .iter()
        .filter_map(|c| match c {
            Command::GlobalAlpha(a) => Some(*a),
            _ => None,
        })
        .collect();
    assert_eq!(alphas, vec![0.5, 0.25]);
    assert_eq!(dl.commands.first(), Some(&Command::Save));
    assert_eq!(dl.commands.last(), Some(&Command::Restore));
    dl.check_balanced().expect("balanced");
}

#[test]
fn invisible_subtree_emits_nothing() {
    let mut hidden = filled("#000000");
    hidden.blend = Some(BlendProps { opacity: 0.0 });
    let host = render(Element::root(vec![
        boxed(hidden).child(boxed(filled("#ffffff"))),
    ]));
    assert!(encode(&host, &AssetTable::new()).is_empty());
}

#[test]
fn transform_rotates_about_the_center() {
    let mut common = filled("#123456");
    common.transform = Some(TransformProps {
        rotate_deg: 90.0,
        ..TransformProps::default()
    });
    let host = render(Element::root(vec![boxed(common)]));
    let dl = encode(&host, &AssetTable::new());
    assert_eq!(dl.commands[0], Command::Save);
    assert_eq!(dl.commands[1], Command::Translate(640.0, 360.0));
    let Command::Rotate(rad) = dl.commands[2] else {
        panic!("expected rotate, got {:?}", dl.commands[2]);
    };
    assert!((rad - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    assert_eq!(dl.commands[3], Command::Translate(-640.0, -360.0));
    dl.check_balanced().expect("balanced");
}

#[test]
fn clip_scope_wraps_own_content_and_children() {
    let mut clip = filled("#ff0000");
    clip.clip = true;
    clip.layout = Some(LayoutSpec::new(
        LayoutFn::Pad,
        LayoutParams::new().num("pad", 100.0),
    ));
    let host = render(Element::root(vec![
        boxed(clip).child(boxed(filled("#0000ff"))),
    ]));
    let dl = encode(&host, &AssetTable::new());
    let inner = RectPx::new(100.0, 100.0, 1080.0, 520.0);
    assert_eq!(
        dl.commands,
        vec![
            Command::Save,
            Command::BeginPath,
            Command::Rect(inner),
            Command::Clip(FillRule::NonZero),
            Command::FillStyle("#ff0000".into()),
            Command::FillRect(inner),
            Command::FillStyle("#0000ff".into()),
            Command::FillRect(inner),
            Command::Restore,
        ]
    );
}

#[test]
fn clipped_label_text_stays_inside_its_rect() {
    let mut props = NodeProps::label("overflowing caption");
    if let NodeProps::Label(p) = &mut props {
        p.common.clip = true;
        p.common.layout = Some(LayoutSpec::new(
            LayoutFn::Pad,
            LayoutParams::new().num("pad", 300.0),
        ));
    }
    let host = render(Element::root(vec![Element::new(props)]));
    let ops: Vec<&str> = encode(&host, &AssetTable::new()).opcodes().collect();
    assert_eq!(
        ops,
        vec!["save", "beginPath", "rect", "clip", "font", "fillStyle", "fillText", "restore"]
    );
}

#[test]
fn empty_scopes_are_never_written() {
    let mut clip = CommonProps {
        clip: true,
        ..CommonProps::default()
    };
    clip.blend = Some(BlendProps { opacity: 0.5 });
    let host = render(Element::root(vec![boxed(clip).child(boxed(CommonProps::default()))]));
    assert!(encode(&host, &AssetTable::new()).is_empty());
}

#[test]
fn missing_image_draws_placeholder_and_warns_once() {
    let image = || {
        Element::new(NodeProps::Image(ImageProps {
            src: "logo.png".into(),
            ..ImageProps::default()
        }))
    };
    let host = render(Element::root(vec![image(), image()]));
    let assets = AssetTable::new();
    let mut diagnostics = Diagnostics::new();
    let dl = encode_display_list(&ctx(&host, &assets), &mut diagnostics).expect("encode");

    assert_eq!(
        dl.commands,
        vec![
            Command::FillStyle("#8f8f8f".into()),
            Command::FillRect(FULL),
            Command::FillStyle("#8f8f8f".into()),
            Command::FillRect(FULL),
        ]
    );
    assert!(diagnostics.has_reported(DiagnosticKind::MissingAsset, "image:logo.png"));
    assert_eq!(diagnostics.reported_len(), 1);
    assert_eq!(diagnostics.suppressed(), 1);
}

#[test]
fn fit_image_is_letterboxed() {
    let host = render(Element::root(vec![Element::new(NodeProps::Image(
        ImageProps {
            src: "logo.png".into(),
            ..ImageProps::default()
        },
    ))]));
    let assets = AssetTable::new().with(
        SourceType::Image,
        "logo.png",
        AssetEntry::new("img-1", 100, 100),
    );
    let dl = encode(&host, &assets);
    assert_eq!(
        dl.commands,
        vec![Command::DrawImage(DrawImage {
            source: SourceRef {
                kind: SourceType::Image,
                id: "img-1".into(),
            },
            src_rect: None,
            dst: RectPx::new(280.0, 0.0, 720.0, 720.0),
        })]
    );
}

#[test]
fn fill_image_crops_the_source() {
    let entry = AssetEntry::new("img", 200, 100);
    let (src, dst) = place_image(&entry, RectPx::from_size(100.0, 100.0), ScaleMode::Fill);
    assert_eq!(src, Some(RectPx::new(50.0, 0.0, 100.0, 100.0)));
    assert_eq!(dst, RectPx::from_size(100.0, 100.0));

    let (src, _) = place_image(&entry, RectPx::from_size(400.0, 100.0), ScaleMode::Fill);
    assert_eq!(src, Some(RectPx::new(0.0, 25.0, 200.0, 50.0)));

    let degenerate = AssetEntry::new("img", 0, 0);
    assert_eq!(
        place_image(&degenerate, FULL, ScaleMode::Fill),
        (None, FULL)
    );
}

#[test]
fn rounded_image_draws_inside_a_clip() {
    let mut common = CommonProps::default();
    common.style.corner_radius_px = 8.0;
    let host = render(Element::root(vec![Element::new(NodeProps::Image(
        ImageProps {
            common,
            src: "a".into(),
            scale_mode: ScaleMode::Fill,
        },
    ))]));
    let assets = AssetTable::new().with(SourceType::Image, "a", AssetEntry::new("a", 16, 9));
    let ops: Vec<&str> = encode(&host, &assets).opcodes().collect();
    assert_eq!(
        ops,
        vec!["save", "beginPath", "roundRect", "clip", "drawImage", "restore"]
    );
}

#[test]
fn label_defaults_to_white_text() {
    let mut props = NodeProps::label("Hello");
    if let NodeProps::Label(p) = &mut props {
        p.common.style.font.font_family = Some("Roboto".into());
        p.common.style.font.font_size_px = Some(40.0);
    }
    let host = render(Element::root(vec![Element::new(props)]));
    let dl = encode(&host, &AssetTable::new());
    assert_eq!(
        dl.commands,
        vec![
            Command::Font("normal 400 40px Roboto".into()),
            Command::FillStyle("#ffffff".into()),
            Command::FillText("Hello".into(), 0.0, 40.0),
        ]
    );
}

#[test]
fn outlined_label_strokes_before_filling() {
    let mut props = NodeProps::label("Hi");
    if let NodeProps::Label(p) = &mut props {
        p.common.style.text_stroke_color = Some(ColorDef::BLACK);
        p.common.style.text_stroke_width_px = 3.0;
    }
    let host = render(Element::root(vec![Element::new(props)]));
    let ops: Vec<&str> = encode(&host, &AssetTable::new()).opcodes().collect();
    assert_eq!(
        ops,
        vec![
            "strokeStyle",
            "lineWidth",
            "lineJoin",
            "font",
            "fillStyle",
            "strokeText",
            "fillText"
        ]
    );
}

#[test]
fn mixed_label_splits_text_and_emoji() {
    struct TenPerChar;
    impl IntrinsicSizer for TenPerChar {
        fn measure(&self, text: &str, _style: &Style) -> Option<SizePx> {
            Some(SizePx::new(10.0 * text.chars().count() as f64, 20.0))
        }
    }

    let mut props = NodeProps::label("Hello 👋 hi");
    if let NodeProps::Label(p) = &mut props {
        p.common.style.font.font_size_px = Some(40.0);
        p.common.style.text_stroke_color = Some(ColorDef::BLACK);
        p.common.style.text_stroke_width_px = 2.0;
    }
    let tree = Element::root(vec![Element::new(props)]);
    let mut host = Host::new(RectPx::from_size(1280.0, 720.0), 20.0);
    host.set_sizer(Some(Box::new(TenPerChar)));
    Reconciler::new()
        .render_into(&mut host, Some(&tree))
        .expect("render");

    let dl = encode(&host, &AssetTable::new());
    let draws: Vec<&Command> = dl.commands.iter().filter(|c| is_text_draw(c)).collect();
    assert_eq!(
        draws,
        vec![
            &Command::StrokeText("Hello ".into(), 0.0, 40.0),
            &Command::FillText("Hello ".into(), 0.0, 40.0),
            &Command::FillTextEmoji("👋".into(), 60.0, 40.0),
            &Command::StrokeText(" hi".into(), 100.0, 40.0),
            &Command::FillText(" hi".into(), 100.0, 40.0),
        ]
    );
}

#[test]
fn mixed_label_without_sizer_estimates_advances() {
    let mut props = NodeProps::label("ab🎉");
    if let NodeProps::Label(p) = &mut props {
        p.common.style.font.font_size_px = Some(40.0);
    }
    let host = render(Element::root(vec![Element::new(props)]));
    let dl = encode(&host, &AssetTable::new());
    let draws: Vec<&Command> = dl.commands.iter().filter(|c| is_text_draw(c)).collect();
    assert_eq!(
        draws,
        vec![
            &Command::FillText("ab".into(), 0.0, 40.0),
            &Command::FillTextEmoji("🎉".into(), 40.0, 40.0),
        ]
    );
}

#[test]
fn empty_label_draws_nothing() {
    let host = render(Element::root(vec![Element::new(NodeProps::label(""))]));
    assert!(encode(&host, &AssetTable::new()).is_empty());
}

#[test]
fn shaped_runs_keep_their_positions_and_emoji() {
    let block = TextBlock {
        lines: vec![TextLine {
            x: 5.0,
            y: 10.0,
            width: 100.0,
            height: 30.0,
            baseline: 24.0,
            runs: vec![
                TextRun {
                    text: "Go ".into(),
                    x: 0.0,
                    width: 40.0,
                    ..TextRun::default()
                },
                TextRun {
                    text: "🎉".into(),
                    x: 40.0,
                    width: 30.0,
                    emoji: true,
                    style: None,
                },
            ],
        }],
        paragraph_spacing: 0.0,
    };
    let props = NodeProps::Label(LabelProps {
        common: CommonProps::default(),
        text: LabelContent::Shaped(block),
    });
    let host = render(Element::root(vec![Element::new(props)]));
    let dl = encode(&host, &AssetTable::new());
    let draws: Vec<&Command> = dl.commands.iter().filter(|c| is_text_draw(c)).collect();
    assert_eq!(
        draws,
        vec![
            &Command::FillText("Go ".into(), 5.0, 34.0),
            &Command::FillTextEmoji("🎉".into(), 45.0, 34.0),
        ]
    );
    // Both runs share one font and fill.
    assert_eq!(dl.opcodes().filter(|op| *op == "font").count(), 1);
}

fn video_tree() -> Element {
    let video = VideoProps {
        common: CommonProps {
            layout: Some(LayoutSpec::new(
                LayoutFn::Pad,
                LayoutParams::new().num("pad", 100.0),
            )),
            ..CommonProps::default()
        },
        ..VideoProps::new("cam")
    };
    let mut dim = filled("#000000");
    dim.blend = Some(BlendProps { opacity: 0.5 });
    Element::root(vec![
        boxed(filled("#222222")),
        boxed(dim).child(Element::new(NodeProps::Video(video)).keyed("video")),
        Element::new(NodeProps::label("LIVE")),
    ])
}

#[test]
fn split_puts_overlays_above_the_video() {
    let host = render(video_tree());
    let assets = AssetTable::new().with(SourceType::Video, "cam", AssetEntry::new("v1", 1920, 1080));
    let mut diagnostics = Diagnostics::new();
    let layers = encode_video_layers(host.graph(), &assets, &mut diagnostics);
    assert_eq!(layers.len(), 1);

    let split = encode_split(&ctx(&host, &assets), &layers, &mut diagnostics).expect("split");
    split.background.check_balanced().expect("background");
    split.foreground.check_balanced().expect("foreground");

    let bg: Vec<&str> = split.background.opcodes().collect();
    assert_eq!(
        bg,
        vec![
            "save",
            "beginPath",
            "rect",
            "rect",
            "clip",
            "fillStyle",
            "fillRect",
            "save",
            "globalAlpha",
            "fillStyle",
            "fillRect",
            "restore",
            "restore",
        ]
    );
    assert_eq!(
        split.background.commands[4],
        Command::Clip(FillRule::EvenOdd)
    );

    let fg: Vec<&str> = split.foreground.opcodes().collect();
    assert_eq!(fg, vec!["font", "fillStyle", "fillText"]);

    // Nothing is drawn twice.
    let whole = encode(&host, &assets);
    let fills = |dl: &DisplayList| dl.opcodes().filter(|op| *op == "fillRect").count();
    assert_eq!(
        fills(&split.background) + fills(&split.foreground),
        fills(&whole)
    );
}

#[test]
fn split_reopens_ancestor_scopes_in_the_foreground() {
    let video = Element::new(NodeProps::Video(VideoProps::new("cam")));
    let mut group = CommonProps::default();
    group.blend = Some(BlendProps { opacity: 0.5 });
    let host = render(Element::root(vec![
        boxed(group).child(video).child(boxed(filled("#ffffff"))),
    ]));
    let assets = AssetTable::new().with(SourceType::Video, "cam", AssetEntry::new("v1", 16, 9));
    let mut diagnostics = Diagnostics::new();
    let layers = encode_video_layers(host.graph(), &assets, &mut diagnostics);
    let split = encode_split(&ctx(&host, &assets), &layers, &mut diagnostics).expect("split");

    assert!(split.background.is_empty());
    assert_eq!(
        split.foreground.commands,
        vec![
            Command::Save,
            Command::GlobalAlpha(0.5),
            Command::FillStyle("#ffffff".into()),
            Command::FillRect(FULL),
            Command::Restore,
        ]
    );
}

#[test]
fn without_videos_everything_is_foreground() {
    let host = render(Element::root(vec![boxed(filled("red"))]));
    let assets = AssetTable::new();
    let split = encode_split(&ctx(&host, &assets), &[], &mut Diagnostics::new()).expect("split");
    assert!(split.background.is_empty());
    assert_eq!(split.foreground, encode(&host, &assets));
}
