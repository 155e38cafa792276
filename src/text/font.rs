use serde::{Deserialize, Serialize};

use crate::foundation::core::RectPx;
use crate::foundation::math::Sanitize;

/// Family used when a label does not name one.
pub const FALLBACK_FONT_FAMILY: &str = "Roboto";

const DEFAULT_SIZE_PX: f64 = 12.0;

/// Font weight as authored: a number (`700`) or a CSS weight name (`"bold"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontWeight {
    Numeric(f64),
    Named(String),
}

impl FontWeight {
    /// Numeric weight; unknown names resolve to 400.
    pub fn to_numeric(&self) -> u16 {
        match self {
            Self::Numeric(v) if v.is_finite() => v.clamp(1.0, 1000.0).round() as u16,
            Self::Numeric(_) => 400,
            Self::Named(name) => name
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.clamp(1.0, 1000.0).round() as u16)
                .or_else(|| weight_for_name(name))
                .unwrap_or(400),
        }
    }
}

fn weight_for_name(name: &str) -> Option<u16> {
    let w = match name.trim().to_ascii_lowercase().as_str() {
        "thin" | "hairline" => 100,
        "ultralight" | "extralight" => 200,
        "light" => 300,
        "normal" | "regular" => 400,
        "medium" => 500,
        "semibold" | "demibold" => 600,
        "bold" => 700,
        "ultrabold" | "extrabold" => 800,
        "heavy" | "black" => 900,
        _ => return None,
    };
    Some(w)
}

/// Font attributes carried in a node style or a text run override.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontProps {
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<String>,
    pub font_size_px: Option<f64>,
    pub font_size_gu: Option<f64>,
    pub font_size_vh: Option<f64>,
    pub line_height_rel: Option<f64>,
}

impl FontProps {
    /// `true` when no size unit is set at all.
    pub fn has_size(&self) -> bool {
        self.font_size_px.is_some() || self.font_size_gu.is_some() || self.font_size_vh.is_some()
    }

    /// Overlay `other` on top of `self`, field by field.
    pub fn merged(&self, other: &FontProps) -> FontProps {
        let size_overridden = other.has_size();
        FontProps {
            font_family: other.font_family.clone().or_else(|| self.font_family.clone()),
            font_weight: other.font_weight.clone().or_else(|| self.font_weight.clone()),
            font_style: other.font_style.clone().or_else(|| self.font_style.clone()),
            font_size_px: if size_overridden {
                other.font_size_px
            } else {
                self.font_size_px
            },
            font_size_gu: if size_overridden {
                other.font_size_gu
            } else {
                self.font_size_gu
            },
            font_size_vh: if size_overridden {
                other.font_size_vh
            } else {
                self.font_size_vh
            },
            line_height_rel: other.line_height_rel.or(self.line_height_rel),
        }
    }
}

impl Sanitize for FontProps {
    fn sanitize(&mut self) {
        self.font_size_px.sanitize();
        self.font_size_gu.sanitize();
        self.font_size_vh.sanitize();
        self.line_height_rel.sanitize();
        if let Some(FontWeight::Numeric(w)) = &mut self.font_weight {
            w.sanitize();
        }
    }
}

/// Font attributes resolved to pixels for one encode.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedFont {
    pub family: String,
    pub weight: u16,
    pub style: String,
    pub size_px: f64,
    pub line_height_px: Option<f64>,
}

impl ResolvedFont {
    /// Resolve sizes: grid units win over viewport-height fraction, which wins over pixels.
    ///
    /// Labels without any size default to one grid unit. Sizes are ceiled so that every
    /// backend rasterizes the same integral size.
    pub fn resolve(props: &FontProps, viewport: RectPx, pixels_per_grid_unit: f64) -> Self {
        let mut size_px = props
            .font_size_px
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_SIZE_PX);
        if let Some(gu) = props.font_size_gu.filter(|v| *v > 0.0 && v.is_finite()) {
            size_px = gu * pixels_per_grid_unit;
        } else if let Some(vh) = props.font_size_vh.filter(|v| *v > 0.0 && v.is_finite()) {
            size_px = vh * viewport.h;
        } else if !props.has_size() {
            size_px = pixels_per_grid_unit;
        }
        let size_px = size_px.max(0.0).ceil();

        let line_height_px = props
            .line_height_rel
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|rel| (rel * size_px).ceil());

        Self {
            family: props
                .font_family
                .clone()
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| FALLBACK_FONT_FAMILY.to_owned()),
            weight: props
                .font_weight
                .as_ref()
                .map(FontWeight::to_numeric)
                .unwrap_or(400),
            style: props
                .font_style
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "normal".to_owned()),
            size_px,
            line_height_px,
        }
    }

    /// CSS font shorthand, e.g. `normal 700 40px Roboto`.
    pub fn css(&self) -> String {
        format!(
            "{} {} {}px {}",
            self.style, self.weight, self.size_px, self.family
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
