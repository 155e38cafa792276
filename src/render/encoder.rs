use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::assets::color::ColorDef;
use crate::assets::table::{AssetEntry, AssetTable, SourceRef, SourceType};
use crate::foundation::core::RectPx;
use crate::foundation::diagnostics::{DiagnosticKind, Diagnostics};
use crate::foundation::error::VcsResult;
use crate::render::display_list::{Command, DisplayList, DrawImage, FillRule};
use crate::render::hole_punch::compute_background_clip;
use crate::render::video_scene::VideoLayer;
use crate::scene::graph::SceneGraph;
use crate::scene::node::{Node, NodeId};
use crate::scene::props::{
    ImageProps, LabelContent, LabelProps, NodeProps, ScaleMode, Style, TransformProps,
    WebFrameProps,
};
use crate::text::block::TextBlock;
use crate::text::emoji::{Fragment, split_emoji};
use crate::text::font::ResolvedFont;

/// Per-grapheme advance, in ems, for plain label text when no sizer is installed.
const FALLBACK_ADVANCE_EM: f64 = 0.5;

/// Read-only inputs of one encode.
#[derive(Clone, Copy)]
pub struct EncodeCtx<'a> {
    pub graph: &'a SceneGraph,
    pub assets: &'a AssetTable,
    pub viewport: RectPx,
    pub pixels_per_grid_unit: f64,
    /// Fill used where an image or web frame source is missing.
    pub placeholder: ColorDef,
}

impl EncodeCtx<'_> {
    fn empty_list(&self) -> DisplayList {
        DisplayList::new(
            self.viewport.w.max(0.0).round() as u32,
            self.viewport.h.max(0.0).round() as u32,
        )
    }
}

/// Display lists drawn below and above the video layers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitLists {
    pub background: DisplayList,
    pub foreground: DisplayList,
}

/// Encode the whole attached tree into one display list.
#[tracing::instrument(skip_all)]
pub fn encode_display_list(
    ctx: &EncodeCtx<'_>,
    diagnostics: &mut Diagnostics,
) -> VcsResult<DisplayList> {
    let mut walker = Walker::new(ctx, Window::All, diagnostics);
    walker.run();
    walker.finish()
}

/// Encode around the video layers.
///
/// Nodes before the first video node (in pre-order) go to the background, clipped so they
/// never cover a video. Nodes after it go to the foreground. Without videos everything is
/// foreground and the background is empty.
#[tracing::instrument(skip_all, fields(layers = layers.len()))]
pub fn encode_split(
    ctx: &EncodeCtx<'_>,
    layers: &[VideoLayer],
    diagnostics: &mut Diagnostics,
) -> VcsResult<SplitLists> {
    let first_video = ctx
        .graph
        .preorder()
        .into_iter()
        .position(|id| matches!(ctx.graph.get(id).map(Node::props), Some(NodeProps::Video(_))));
    let Some(first_video) = first_video.filter(|_| !layers.is_empty()) else {
        return Ok(SplitLists {
            background: ctx.empty_list(),
            foreground: encode_display_list(ctx, diagnostics)?,
        });
    };

    let mut back = Walker::new(ctx, Window::Before(first_video), diagnostics);
    back.run();
    let content = back.finish()?;
    let mut background = ctx.empty_list();
    if !content.is_empty() {
        background.push(Command::Save);
        compute_background_clip(ctx.viewport, layers).encode_into(&mut background);
        background.extend(content.commands);
        background.push(Command::Restore);
    }

    let mut front = Walker::new(ctx, Window::After(first_video), diagnostics);
    front.run();
    let foreground = front.finish()?;

    Ok(SplitLists {
        background,
        foreground,
    })
}

/// Which pre-order positions draw their own content.
#[derive(Clone, Copy, Debug)]
enum Window {
    All,
    Before(usize),
    After(usize),
}

impl Window {
    fn includes(self, pos: usize) -> bool {
        match self {
            Self::All => true,
            Self::Before(v) => pos < v,
            Self::After(v) => pos > v,
        }
    }
}

/// A `save` scope that is only written once something inside it draws.
struct Pending {
    open: Vec<Command>,
    opened: bool,
}

struct Walker<'a, 'g> {
    ctx: &'a EncodeCtx<'g>,
    window: Window,
    positions: HashMap<NodeId, usize>,
    pending: Vec<Pending>,
    out: DisplayList,
    diagnostics: &'a mut Diagnostics,
}

impl<'a, 'g> Walker<'a, 'g> {
    fn new(ctx: &'a EncodeCtx<'g>, window: Window, diagnostics: &'a mut Diagnostics) -> Self {
        let positions = ctx
            .graph
            .preorder()
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        Self {
            ctx,
            window,
            positions,
            pending: Vec::new(),
            out: ctx.empty_list(),
            diagnostics,
        }
    }

    fn run(&mut self) {
        if let Some(root) = self.ctx.graph.root() {
            self.visit(root, 1.0);
        }
    }

    fn finish(self) -> VcsResult<DisplayList> {
        self.out.check_balanced()?;
        Ok(self.out)
    }

    fn visit(&mut self, id: NodeId, alpha: f64) {
        let graph: &'g SceneGraph = self.ctx.graph;
        let Some(node) = graph.get(id) else {
            return;
        };
        let rect = node.rect();
        let common = node.props().common();

        let mut alpha = alpha;
        let mut scopes = 0;
        if let Some(common) = common {
            let opacity = common.opacity();
            if opacity <= 0.0 {
                return;
            }
            let mut open = Vec::new();
            if let Some(t) = common.transform.filter(|t| !t.is_identity()) {
                transform_commands(&t, rect, &mut open);
            }
            if opacity < 1.0 {
                alpha *= opacity;
                open.push(Command::GlobalAlpha(alpha));
            }
            if !open.is_empty() {
                self.pending.push(Pending {
                    open,
                    opened: false,
                });
                scopes += 1;
            }
        }

        if let Some(common) = common.filter(|c| c.clip) {
            let mut open = vec![Command::BeginPath];
            push_shape(rect, common.style.corner_radius_px, &mut open);
            open.push(Command::Clip(FillRule::NonZero));
            self.pending.push(Pending {
                open,
                opened: false,
            });
            scopes += 1;
        }

        let pos = self.positions.get(&id).copied().unwrap_or(usize::MAX);
        if self.window.includes(pos) {
            let content = self.content(node, rect);
            self.emit(content);
        }

        for child in node.children() {
            self.visit(*child, alpha);
        }

        for _ in 0..scopes {
            if self.pending.pop().is_some_and(|p| p.opened) {
                self.out.push(Command::Restore);
            }
        }
    }

    /// Write `cmds`, first opening every enclosing scope not yet written.
    fn emit(&mut self, cmds: Vec<Command>) {
        if cmds.is_empty() {
            return;
        }
        for scope in self.pending.iter_mut().filter(|s| !s.opened) {
            self.out.push(Command::Save);
            self.out.extend(scope.open.iter().cloned());
            scope.opened = true;
        }
        self.out.extend(cmds);
    }

    fn content(&mut self, node: &Node, rect: RectPx) -> Vec<Command> {
        let mut cmds = Vec::new();
        match node.props() {
            NodeProps::Root | NodeProps::Video(_) => {}
            NodeProps::Box(p) => box_commands(&p.common.style, rect, &mut cmds),
            NodeProps::Image(p) => self.image_commands(p, rect, &mut cmds),
            NodeProps::WebFrame(p) => self.web_frame_commands(p, rect, &mut cmds),
            NodeProps::Label(p) => self.label_commands(p, rect, &mut cmds),
        }
        cmds
    }

    fn placeholder(&self, style: &Style, rect: RectPx, cmds: &mut Vec<Command>) {
        cmds.push(Command::FillStyle(self.ctx.placeholder.to_css()));
        fill_shape(rect, style.corner_radius_px, cmds);
    }

    fn image_commands(&mut self, p: &ImageProps, rect: RectPx, cmds: &mut Vec<Command>) {
        let style = &p.common.style;
        let Some(entry) = self.ctx.assets.resolve(SourceType::Image, &p.src) else {
            self.diagnostics.warn_once(
                DiagnosticKind::MissingAsset,
                &format!("image:{}", p.src),
                "image source missing from asset table; drawing placeholder",
            );
            self.placeholder(style, rect, cmds);
            return;
        };
        let (src_rect, dst) = place_image(entry, rect, p.scale_mode);
        let draw = Command::DrawImage(DrawImage {
            source: SourceRef {
                kind: SourceType::Image,
                id: entry.backend_id.clone(),
            },
            src_rect,
            dst,
        });
        clipped_draw(draw, rect, style.corner_radius_px, cmds);
    }

    fn web_frame_commands(&mut self, p: &WebFrameProps, rect: RectPx, cmds: &mut Vec<Command>) {
        let style = &p.common.style;
        let Some(entry) = self.ctx.assets.resolve(SourceType::Webframe, &p.src) else {
            self.diagnostics.warn_once(
                DiagnosticKind::MissingAsset,
                &format!("webframe:{}", p.src),
                "web frame source missing from asset table; drawing placeholder",
            );
            self.placeholder(style, rect, cmds);
            return;
        };
        let draw = Command::DrawImage(DrawImage {
            source: SourceRef {
                kind: SourceType::Webframe,
                id: entry.backend_id.clone(),
            },
            src_rect: None,
            dst: rect,
        });
        clipped_draw(draw, rect, style.corner_radius_px, cmds);
    }

    fn label_commands(&self, p: &LabelProps, rect: RectPx, cmds: &mut Vec<Command>) {
        let style = &p.common.style;
        let base_font =
            ResolvedFont::resolve(&style.font, self.ctx.viewport, self.ctx.pixels_per_grid_unit);
        let base_color = style.text_color.unwrap_or(ColorDef::WHITE);
        let outline = style
            .text_stroke_color
            .filter(|c| !c.is_transparent() && style.text_stroke_width_px > 0.0);

        let mut pen = Pen::default();
        if let Some(color) = outline {
            cmds.push(Command::StrokeStyle(color.to_css()));
            cmds.push(Command::LineWidth(style.text_stroke_width_px));
            cmds.push(Command::LineJoin("round".to_owned()));
        }

        match &p.text {
            LabelContent::Text(text) => {
                if text.is_empty() {
                    cmds.clear();
                    return;
                }
                pen.set(&base_font, base_color, cmds);
                let y = rect.y + base_font.size_px;
                let mut x = rect.x;
                for frag in split_emoji(text) {
                    match frag {
                        Fragment::Emoji(e) => {
                            cmds.push(Command::FillTextEmoji(e.to_owned(), x, y));
                        }
                        Fragment::Text(t) => {
                            if outline.is_some() {
                                cmds.push(Command::StrokeText(t.to_owned(), x, y));
                            }
                            if !base_color.is_transparent() {
                                cmds.push(Command::FillText(t.to_owned(), x, y));
                            }
                        }
                    }
                    x += self.advance(frag, style, base_font.size_px);
                }
            }
            LabelContent::Shaped(block) => {
                self.shaped_commands(block, style, rect, outline.is_some(), &mut pen, cmds);
            }
        }

        if !cmds.iter().any(is_text_draw) {
            cmds.clear();
        }
    }

    /// Horizontal advance of one plain-label fragment.
    ///
    /// Emoji occupy a square of the font size. Text is measured by the graph's sizer when one
    /// is installed, otherwise estimated per grapheme.
    fn advance(&self, frag: Fragment<'_>, style: &Style, size_px: f64) -> f64 {
        match frag {
            Fragment::Emoji(_) => size_px,
            Fragment::Text(t) => self
                .ctx
                .graph
                .sizer()
                .and_then(|sizer| sizer.measure(t, style))
                .map(|size| size.w)
                .unwrap_or_else(|| {
                    t.graphemes(true).count() as f64 * size_px * FALLBACK_ADVANCE_EM
                }),
        }
    }

    fn shaped_commands(
        &self,
        block: &TextBlock,
        style: &Style,
        rect: RectPx,
        outline: bool,
        pen: &mut Pen,
        cmds: &mut Vec<Command>,
    ) {
        let base_color = style.text_color.unwrap_or(ColorDef::WHITE);
        for line in &block.lines {
            let y = rect.y + line.y + line.baseline;
            for run in &line.runs {
                if run.text.is_empty() {
                    continue;
                }
                let (font, color) = match &run.style {
                    Some(rs) => (
                        ResolvedFont::resolve(
                            &style.font.merged(&rs.font),
                            self.ctx.viewport,
                            self.ctx.pixels_per_grid_unit,
                        ),
                        rs.text_color.unwrap_or(base_color),
                    ),
                    None => (
                        ResolvedFont::resolve(
                            &style.font,
                            self.ctx.viewport,
                            self.ctx.pixels_per_grid_unit,
                        ),
                        base_color,
                    ),
                };
                pen.set(&font, color, cmds);
                let x = rect.x + line.x + run.x;
                if run.emoji {
                    cmds.push(Command::FillTextEmoji(run.text.clone(), x, y));
                    continue;
                }
                if outline {
                    cmds.push(Command::StrokeText(run.text.clone(), x, y));
                }
                if !color.is_transparent() {
                    cmds.push(Command::FillText(run.text.clone(), x, y));
                }
            }
        }
    }
}

/// Last font and fill written, so runs only restate what changed.
#[derive(Default)]
struct Pen {
    font: Option<String>,
    fill: Option<String>,
}

impl Pen {
    fn set(&mut self, font: &ResolvedFont, color: ColorDef, cmds: &mut Vec<Command>) {
        let css = font.css();
        if self.font.as_deref() != Some(css.as_str()) {
            cmds.push(Command::Font(css.clone()));
            self.font = Some(css);
        }
        let fill = color.to_css();
        if self.fill.as_deref() != Some(fill.as_str()) {
            cmds.push(Command::FillStyle(fill.clone()));
            self.fill = Some(fill);
        }
    }
}

fn is_text_draw(cmd: &Command) -> bool {
    matches!(
        cmd,
        Command::FillText(..) | Command::FillTextEmoji(..) | Command::StrokeText(..)
    )
}

fn transform_commands(t: &TransformProps, rect: RectPx, out: &mut Vec<Command>) {
    let c = rect.center();
    out.push(Command::Translate(c.x, c.y));
    if t.rotate_deg != 0.0 {
        out.push(Command::Rotate(t.rotate_deg.to_radians()));
    }
    if t.scale_x != 1.0 || t.scale_y != 1.0 {
        out.push(Command::Scale(t.scale_x, t.scale_y));
    }
    out.push(Command::Translate(-c.x, -c.y));
}

/// Path-building commands for a rectangle, rounded when `radius > 0`.
fn push_shape(rect: RectPx, radius: f64, out: &mut Vec<Command>) {
    if radius > 0.0 {
        out.push(Command::RoundRect(rect, radius));
    } else {
        out.push(Command::Rect(rect));
    }
}

fn fill_shape(rect: RectPx, radius: f64, out: &mut Vec<Command>) {
    if radius > 0.0 {
        out.push(Command::BeginPath);
        out.push(Command::RoundRect(rect, radius));
        out.push(Command::Fill(FillRule::NonZero));
    } else {
        out.push(Command::FillRect(rect));
    }
}

fn box_commands(style: &Style, rect: RectPx, out: &mut Vec<Command>) {
    let radius = style.corner_radius_px;
    if let Some(fill) = style.fill_color.filter(|c| !c.is_transparent()) {
        out.push(Command::FillStyle(fill.to_css()));
        fill_shape(rect, radius, out);
    }
    if let Some(stroke) = style
        .stroke_color
        .filter(|c| !c.is_transparent() && style.stroke_width_px > 0.0)
    {
        out.push(Command::StrokeStyle(stroke.to_css()));
        out.push(Command::LineWidth(style.stroke_width_px));
        if radius > 0.0 {
            out.push(Command::BeginPath);
            out.push(Command::RoundRect(rect, radius));
            out.push(Command::Stroke);
        } else {
            out.push(Command::StrokeRect(rect));
        }
    }
}

/// Wrap `draw` in a rounded clip scope when the node has a corner radius.
fn clipped_draw(draw: Command, rect: RectPx, radius: f64, out: &mut Vec<Command>) {
    if radius > 0.0 {
        out.extend([
            Command::Save,
            Command::BeginPath,
            Command::RoundRect(rect, radius),
            Command::Clip(FillRule::NonZero),
            draw,
            Command::Restore,
        ]);
    } else {
        out.push(draw);
    }
}

/// Source crop and destination for an image drawn into `frame`.
///
/// `Fit` letterboxes the whole source, centered. `Fill` crops the source to the frame's
/// aspect ratio around its center.
pub(crate) fn place_image(
    entry: &AssetEntry,
    frame: RectPx,
    mode: ScaleMode,
) -> (Option<RectPx>, RectPx) {
    let (Some(src_aspect), Some(dst_aspect)) = (entry.aspect(), frame.aspect()) else {
        return (None, frame);
    };
    match mode {
        ScaleMode::Fit => {
            let dst = if dst_aspect > src_aspect {
                let w = frame.h * src_aspect;
                RectPx::new(frame.x + (frame.w - w) / 2.0, frame.y, w, frame.h)
            } else {
                let h = frame.w / src_aspect;
                RectPx::new(frame.x, frame.y + (frame.h - h) / 2.0, frame.w, h)
            };
            (None, dst)
        }
        ScaleMode::Fill => {
            let (sw, sh) = (f64::from(entry.width), f64::from(entry.height));
            let src = if src_aspect > dst_aspect {
                let w = sh * dst_aspect;
                RectPx::new((sw - w) / 2.0, 0.0, w, sh)
            } else {
                let h = sw / dst_aspect;
                RectPx::new(0.0, (sh - h) / 2.0, sw, h)
            };
            (Some(src), frame)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/encoder.rs"]
mod tests;
