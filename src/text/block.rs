use serde::{Deserialize, Serialize};

use crate::assets::color::ColorDef;
use crate::foundation::core::SizePx;
use crate::foundation::math::Sanitize;
use crate::text::font::FontProps;

/// Externally shaped, line-broken text.
///
/// Geometry is relative to the owning label's layout rectangle. The encoder only positions
/// what the shaper produced; it never breaks lines itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    /// Extra spacing between paragraphs, already folded into line `y` values.
    #[serde(default)]
    pub paragraph_spacing: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Distance from the line top to the text baseline.
    pub baseline: f64,
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    /// Offset from the line origin.
    pub x: f64,
    /// Sum of glyph advances.
    pub width: f64,
    #[serde(default)]
    pub emoji: bool,
    #[serde(default)]
    pub style: Option<RunStyle>,
}

/// Per-run style override on top of the label style.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStyle {
    pub text_color: Option<ColorDef>,
    #[serde(flatten)]
    pub font: FontProps,
}

impl TextBlock {
    /// Bounding size of the block: widest line by glyph advances, summed line heights.
    pub fn measure(&self) -> SizePx {
        let mut w: f64 = 0.0;
        let mut h = 0.0;
        for line in &self.lines {
            let line_w = if line.runs.is_empty() {
                line.width
            } else {
                line.runs.iter().map(|r| r.width).sum()
            };
            w = w.max(line_w);
            h += line.height;
        }
        SizePx::new(w, h)
    }

    pub fn run_count(&self) -> usize {
        self.lines.iter().map(|l| l.runs.len()).sum()
    }
}

impl Sanitize for TextBlock {
    fn sanitize(&mut self) {
        self.paragraph_spacing.sanitize();
        for line in &mut self.lines {
            line.x.sanitize();
            line.y.sanitize();
            line.width.sanitize();
            line.height.sanitize();
            line.baseline.sanitize();
            for run in &mut line.runs {
                run.x.sanitize();
                run.width.sanitize();
                if let Some(style) = &mut run.style {
                    style.text_color.sanitize();
                    style.font.sanitize();
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/block.rs"]
mod tests;
