use serde::Serialize;
use serde::ser::{SerializeSeq, Serializer};

use crate::assets::table::SourceRef;
use crate::foundation::core::RectPx;
use crate::foundation::error::{VcsError, VcsResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

impl FillRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NonZero => "nonzero",
            Self::EvenOdd => "evenodd",
        }
    }
}

/// Image draw: whole source or a crop region, into a destination rect.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawImage {
    pub source: SourceRef,
    pub src_rect: Option<RectPx>,
    pub dst: RectPx,
}

/// One 2D-canvas style drawing command.
///
/// Serializes as `[opcode, ...args]`; rectangles expand to four numbers.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Save,
    Restore,
    Scale(f64, f64),
    /// Radians.
    Rotate(f64),
    Translate(f64, f64),
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f64),
    LineJoin(String),
    GlobalAlpha(f64),
    Font(String),
    Fill(FillRule),
    Stroke,
    Clip(FillRule),
    FillRect(RectPx),
    StrokeRect(RectPx),
    Rect(RectPx),
    RoundRect(RectPx, f64),
    FillText(String, f64, f64),
    FillTextEmoji(String, f64, f64),
    StrokeText(String, f64, f64),
    DrawImage(DrawImage),
    BeginPath,
    ClosePath,
}

impl Command {
    pub fn opcode(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Restore => "restore",
            Self::Scale(..) => "scale",
            Self::Rotate(_) => "rotate",
            Self::Translate(..) => "translate",
            Self::FillStyle(_) => "fillStyle",
            Self::StrokeStyle(_) => "strokeStyle",
            Self::LineWidth(_) => "lineWidth",
            Self::LineJoin(_) => "lineJoin",
            Self::GlobalAlpha(_) => "globalAlpha",
            Self::Font(_) => "font",
            Self::Fill(_) => "fill",
            Self::Stroke => "stroke",
            Self::Clip(_) => "clip",
            Self::FillRect(_) => "fillRect",
            Self::StrokeRect(_) => "strokeRect",
            Self::Rect(_) => "rect",
            Self::RoundRect(..) => "roundRect",
            Self::FillText(..) => "fillText",
            Self::FillTextEmoji(..) => "fillText_emoji",
            Self::StrokeText(..) => "strokeText",
            Self::DrawImage(_) => "drawImage",
            Self::BeginPath => "beginPath",
            Self::ClosePath => "closePath",
        }
    }
}

fn rect_args<S: SerializeSeq>(seq: &mut S, r: &RectPx) -> Result<(), S::Error> {
    seq.serialize_element(&r.x)?;
    seq.serialize_element(&r.y)?;
    seq.serialize_element(&r.w)?;
    seq.serialize_element(&r.h)
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(None)?;
        seq.serialize_element(self.opcode())?;
        match self {
            Self::Save | Self::Restore | Self::Stroke | Self::BeginPath | Self::ClosePath => {}
            Self::Scale(x, y) | Self::Translate(x, y) => {
                seq.serialize_element(x)?;
                seq.serialize_element(y)?;
            }
            Self::Rotate(v) | Self::LineWidth(v) | Self::GlobalAlpha(v) => {
                seq.serialize_element(v)?;
            }
            Self::FillStyle(v) | Self::StrokeStyle(v) | Self::LineJoin(v) | Self::Font(v) => {
                seq.serialize_element(v)?;
            }
            Self::Fill(rule) | Self::Clip(rule) => {
                seq.serialize_element(rule.as_str())?;
            }
            Self::FillRect(r) | Self::StrokeRect(r) | Self::Rect(r) => rect_args(&mut seq, r)?,
            Self::RoundRect(r, radius) => {
                rect_args(&mut seq, r)?;
                seq.serialize_element(radius)?;
            }
            Self::FillText(t, x, y) | Self::FillTextEmoji(t, x, y) | Self::StrokeText(t, x, y) => {
                seq.serialize_element(t)?;
                seq.serialize_element(x)?;
                seq.serialize_element(y)?;
            }
            Self::DrawImage(d) => {
                seq.serialize_element(&d.source)?;
                if let Some(src) = &d.src_rect {
                    rect_args(&mut seq, src)?;
                }
                rect_args(&mut seq, &d.dst)?;
            }
        }
        seq.end()
    }
}

/// Ordered drawing commands for one output frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DisplayList {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<Command>,
}

impl DisplayList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }

    pub fn extend(&mut self, cmds: impl IntoIterator<Item = Command>) {
        self.commands.extend(cmds);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn opcodes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(Command::opcode)
    }

    /// Every `save` is matched by exactly one later `restore`.
    pub fn check_balanced(&self) -> VcsResult<()> {
        let mut depth = 0usize;
        for (i, cmd) in self.commands.iter().enumerate() {
            match cmd {
                Command::Save => depth += 1,
                Command::Restore => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        VcsError::protocol(format!("restore without save at command {i}"))
                    })?;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(VcsError::protocol(format!("{depth} unclosed save scope(s)")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/display_list.rs"]
mod tests;
