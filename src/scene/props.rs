use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assets::color::ColorDef;
use crate::foundation::core::SizePx;
use crate::foundation::error::VcsError;
use crate::foundation::math::Sanitize;
use crate::layout::LayoutSpec;
use crate::text::block::TextBlock;
use crate::text::font::FontProps;

/// Closed set of node kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeVariant {
    Root,
    Box,
    Image,
    Label,
    Video,
    WebFrame,
}

impl NodeVariant {
    pub const ALL: [NodeVariant; 6] = [
        Self::Root,
        Self::Box,
        Self::Image,
        Self::Label,
        Self::Video,
        Self::WebFrame,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Box => "box",
            Self::Image => "image",
            Self::Label => "label",
            Self::Video => "video",
            Self::WebFrame => "web_frame",
        }
    }
}

impl fmt::Display for NodeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeVariant {
    type Err = VcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| VcsError::config(format!("unknown node variant \"{s}\"")))
    }
}

/// Visual attributes. Which fields matter depends on the variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub fill_color: Option<ColorDef>,
    pub stroke_color: Option<ColorDef>,
    pub stroke_width_px: f64,
    pub corner_radius_px: f64,
    pub text_color: Option<ColorDef>,
    pub text_stroke_color: Option<ColorDef>,
    pub text_stroke_width_px: f64,
    #[serde(flatten)]
    pub font: FontProps,
}

impl Sanitize for Style {
    fn sanitize(&mut self) {
        self.fill_color.sanitize();
        self.stroke_color.sanitize();
        self.stroke_width_px.sanitize();
        self.corner_radius_px.sanitize();
        self.text_color.sanitize();
        self.text_stroke_color.sanitize();
        self.text_stroke_width_px.sanitize();
        self.font.sanitize();
    }
}

/// Rotation and scale about the center of the node's own rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformProps {
    pub rotate_deg: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for TransformProps {
    fn default() -> Self {
        Self {
            rotate_deg: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl TransformProps {
    pub fn is_identity(&self) -> bool {
        self.rotate_deg == 0.0 && self.scale_x == 1.0 && self.scale_y == 1.0
    }
}

impl Sanitize for TransformProps {
    fn sanitize(&mut self) {
        self.rotate_deg.sanitize();
        self.scale_x.sanitize();
        self.scale_y.sanitize();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendProps {
    pub opacity: f64,
}

impl Default for BlendProps {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

impl Sanitize for BlendProps {
    fn sanitize(&mut self) {
        self.opacity.sanitize();
    }
}

/// Props shared by every non-root variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonProps {
    /// Producer-side identifier, used for diagnostics only.
    pub id: Option<String>,
    pub layout: Option<LayoutSpec>,
    pub style: Style,
    pub transform: Option<TransformProps>,
    pub blend: Option<BlendProps>,
    pub clip: bool,
}

impl CommonProps {
    /// Opacity clamped to `[0, 1]`; `1` when no blend is set.
    pub fn opacity(&self) -> f64 {
        self.blend.map_or(1.0, |b| b.opacity.clamp(0.0, 1.0))
    }
}

impl Sanitize for CommonProps {
    fn sanitize(&mut self) {
        self.style.sanitize();
        self.transform.sanitize();
        self.blend.sanitize();
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Cover the frame, cropping the source.
    Fill,
    /// Letterbox inside the frame.
    #[default]
    Fit,
}

impl ScaleMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Fit => "fit",
        }
    }
}

/// Label content: a plain string or an externally shaped block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelContent {
    Text(String),
    Shaped(TextBlock),
}

impl Default for LabelContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxProps {
    #[serde(flatten)]
    pub common: CommonProps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageProps {
    #[serde(flatten)]
    pub common: CommonProps,
    pub src: String,
    #[serde(default)]
    pub scale_mode: ScaleMode,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelProps {
    #[serde(flatten)]
    pub common: CommonProps,
    #[serde(default)]
    pub text: LabelContent,
}

fn default_video_scale_mode() -> ScaleMode {
    ScaleMode::Fill
}

fn default_zoom() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoProps {
    #[serde(flatten)]
    pub common: CommonProps,
    pub src: String,
    #[serde(default = "default_video_scale_mode")]
    pub scale_mode: ScaleMode,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

impl VideoProps {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            common: CommonProps::default(),
            src: src.into(),
            scale_mode: ScaleMode::Fill,
            zoom: 1.0,
        }
    }
}

/// Key press forwarded to a remote web frame.
///
/// Only meaningful with both `name` and `key` set; anything else is dropped at commit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyPressAction {
    pub name: String,
    pub key: String,
    pub modifiers: String,
}

impl KeyPressAction {
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.key.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WebFrameProps {
    #[serde(flatten)]
    pub common: CommonProps,
    pub src: String,
    /// Size of the remote browser viewport.
    #[serde(default)]
    pub viewport_size: Option<SizePx>,
    #[serde(default)]
    pub key_press_action: Option<KeyPressAction>,
    /// Bumped by the producer whenever the remote content changed.
    #[serde(default)]
    pub live_asset_update_key: u64,
}

/// Variant-tagged node props.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeProps {
    Root,
    Box(BoxProps),
    Image(ImageProps),
    Label(LabelProps),
    Video(VideoProps),
    WebFrame(WebFrameProps),
}

impl NodeProps {
    pub fn variant(&self) -> NodeVariant {
        match self {
            Self::Root => NodeVariant::Root,
            Self::Box(_) => NodeVariant::Box,
            Self::Image(_) => NodeVariant::Image,
            Self::Label(_) => NodeVariant::Label,
            Self::Video(_) => NodeVariant::Video,
            Self::WebFrame(_) => NodeVariant::WebFrame,
        }
    }

    /// Empty props of the given variant.
    pub fn empty(variant: NodeVariant) -> Self {
        match variant {
            NodeVariant::Root => Self::Root,
            NodeVariant::Box => Self::Box(BoxProps::default()),
            NodeVariant::Image => Self::Image(ImageProps::default()),
            NodeVariant::Label => Self::Label(LabelProps::default()),
            NodeVariant::Video => Self::Video(VideoProps::new("")),
            NodeVariant::WebFrame => Self::WebFrame(WebFrameProps::default()),
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(LabelProps {
            common: CommonProps::default(),
            text: LabelContent::Text(text.into()),
        })
    }

    pub fn common(&self) -> Option<&CommonProps> {
        match self {
            Self::Root => None,
            Self::Box(p) => Some(&p.common),
            Self::Image(p) => Some(&p.common),
            Self::Label(p) => Some(&p.common),
            Self::Video(p) => Some(&p.common),
            Self::WebFrame(p) => Some(&p.common),
        }
    }

    pub fn common_mut(&mut self) -> Option<&mut CommonProps> {
        match self {
            Self::Root => None,
            Self::Box(p) => Some(&mut p.common),
            Self::Image(p) => Some(&mut p.common),
            Self::Label(p) => Some(&mut p.common),
            Self::Video(p) => Some(&mut p.common),
            Self::WebFrame(p) => Some(&mut p.common),
        }
    }

    pub fn layout(&self) -> Option<&LayoutSpec> {
        self.common().and_then(|c| c.layout.as_ref())
    }

    /// Builder: set the common props (no-op on `Root`).
    pub fn with_common(mut self, common: CommonProps) -> Self {
        if let Some(c) = self.common_mut() {
            *c = common;
        }
        self
    }

    /// Builder: set the layout slot (no-op on `Root`).
    pub fn with_layout(mut self, layout: LayoutSpec) -> Self {
        if let Some(c) = self.common_mut() {
            c.layout = Some(layout);
        }
        self
    }
}

impl Sanitize for NodeProps {
    fn sanitize(&mut self) {
        match self {
            Self::Root => {}
            Self::Box(p) => p.common.sanitize(),
            Self::Image(p) => p.common.sanitize(),
            Self::Label(p) => {
                p.common.sanitize();
                if let LabelContent::Shaped(block) = &mut p.text {
                    block.sanitize();
                }
            }
            Self::Video(p) => {
                p.common.sanitize();
                if !(p.zoom.is_finite() && p.zoom > 0.0) {
                    p.zoom = 1.0;
                }
            }
            Self::WebFrame(p) => {
                p.common.sanitize();
                if let Some(size) = &mut p.viewport_size {
                    size.w.sanitize();
                    size.h.sanitize();
                }
                if p.key_press_action.as_ref().is_some_and(|a| !a.is_valid()) {
                    p.key_press_action = None;
                }
            }
        }
    }
}

/// `true` iff committing `new` over `old` changes anything observable.
///
/// Both sides are compared NaN-sanitized, so `should_update(p, p)` is always `false`.
pub fn should_update(old: &NodeProps, new: &NodeProps) -> bool {
    old.clone().sanitized() != new.clone().sanitized()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/props.rs"]
mod tests;
