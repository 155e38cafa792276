use kurbo::Shape;

use crate::foundation::core::{BezPath, Point, RectPx};
use crate::render::display_list::{Command, DisplayList, FillRule};
use crate::render::video_scene::VideoLayer;

const PATH_TOLERANCE: f64 = 0.1;

/// Area covered by one video layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hole {
    pub rect: RectPx,
    pub corner_radius: f64,
}

impl Hole {
    fn to_path(self) -> BezPath {
        let r = self.rect.to_kurbo();
        if self.corner_radius > 0.0 {
            kurbo::RoundedRect::from_rect(r, self.corner_radius).to_path(PATH_TOLERANCE)
        } else {
            r.to_path(PATH_TOLERANCE)
        }
    }
}

/// Viewport minus every video rectangle, under the even-odd rule.
///
/// Background drawing is clipped to this region so it never covers a video.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundClip {
    viewport: RectPx,
    holes: Vec<Hole>,
}

pub fn compute_background_clip(viewport: RectPx, layers: &[VideoLayer]) -> BackgroundClip {
    BackgroundClip {
        viewport,
        holes: layers
            .iter()
            .map(|l| Hole {
                rect: l.frame,
                corner_radius: l.attrs.corner_radius_px.unwrap_or(0.0),
            })
            .collect(),
    }
}

impl BackgroundClip {
    pub fn viewport(&self) -> RectPx {
        self.viewport
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    pub fn is_empty(&self) -> bool {
        self.holes.is_empty()
    }

    pub fn to_bez_path(&self) -> BezPath {
        let mut path = self.viewport.to_kurbo().to_path(PATH_TOLERANCE);
        for h in &self.holes {
            path.extend(h.to_path().elements().iter().copied());
        }
        path
    }

    /// Even-odd hit test against the clip region.
    pub fn contains(&self, p: Point) -> bool {
        self.to_bez_path().winding(p).rem_euclid(2) == 1
    }

    /// Emit the clip path and `clip`. The caller owns the surrounding `save`/`restore`.
    pub fn encode_into(&self, dl: &mut DisplayList) {
        dl.push(Command::BeginPath);
        dl.push(Command::Rect(self.viewport));
        for h in &self.holes {
            if h.corner_radius > 0.0 {
                dl.push(Command::RoundRect(h.rect, h.corner_radius));
            } else {
                dl.push(Command::Rect(h.rect));
            }
        }
        dl.push(Command::Clip(FillRule::EvenOdd));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/hole_punch.rs"]
mod tests;
