//! Layout engine: one top-down pass turning parent rectangles into child rectangles.
//!
//! Every node may carry a [`LayoutSpec`] (function + parameters). Nodes without one inherit
//! their parent's rectangle verbatim. Layout functions are pure: the result depends only on
//! the parent rectangle, the parameters and the [`LayoutCtx`].

pub mod engine;
pub mod grid;
pub mod params;
pub mod pip;
pub mod split;
pub mod text;
pub mod transform;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{RectPx, SizePx};
use crate::scene::node::NodeId;

pub use self::params::{Edges, LayoutParams};

/// Shared inputs available to every layout function during a pass.
#[derive(Clone, Copy)]
pub struct LayoutCtx<'a> {
    viewport: RectPx,
    pixels_per_grid_unit: f64,
    node: Option<NodeId>,
    sizer: Option<&'a dyn Fn(NodeId) -> Option<SizePx>>,
}

impl LayoutCtx<'static> {
    /// Context without intrinsic size information.
    pub fn new(viewport: RectPx, pixels_per_grid_unit: f64) -> Self {
        Self {
            viewport,
            pixels_per_grid_unit,
            node: None,
            sizer: None,
        }
    }
}

impl<'a> LayoutCtx<'a> {
    /// Context for laying out `node`, with intrinsic sizes served by `sizer`.
    pub fn for_node(
        viewport: RectPx,
        pixels_per_grid_unit: f64,
        node: NodeId,
        sizer: &'a dyn Fn(NodeId) -> Option<SizePx>,
    ) -> Self {
        Self {
            viewport,
            pixels_per_grid_unit,
            node: Some(node),
            sizer: Some(sizer),
        }
    }

    pub fn viewport(&self) -> RectPx {
        self.viewport
    }

    pub fn pixels_per_grid_unit(&self) -> f64 {
        self.pixels_per_grid_unit
    }

    /// Convert grid units to pixels.
    pub fn gu(&self, v: f64) -> f64 {
        v * self.pixels_per_grid_unit
    }

    /// Content size of the node being laid out, as of its last commit.
    pub fn intrinsic_size(&self) -> Option<SizePx> {
        self.node.and_then(|id| self.intrinsic_size_of(id))
    }

    pub fn intrinsic_size_of(&self, id: NodeId) -> Option<SizePx> {
        self.sizer.and_then(|f| f(id)).filter(|s| s.is_finite())
    }
}

impl fmt::Debug for LayoutCtx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutCtx")
            .field("viewport", &self.viewport)
            .field("pixels_per_grid_unit", &self.pixels_per_grid_unit)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

/// User-provided layout function.
///
/// Return `None` to reject the inputs; the engine then keeps the parent rectangle.
pub trait LayoutFunction: Send + Sync {
    fn name(&self) -> &str;

    fn compute(&self, parent: RectPx, params: &LayoutParams, ctx: &LayoutCtx<'_>)
    -> Option<RectPx>;
}

/// Reference to a layout function.
///
/// Builtins compare by kind; custom functions compare by pointer identity, so two distinct
/// `Arc`s wrapping equivalent code are still a change.
#[derive(Clone)]
pub enum LayoutFn {
    Pad,
    Offset,
    Fit,
    SplitHorizontal,
    SplitVertical,
    SplitAcrossLongerDimension,
    Column,
    Grid,
    Pip,
    PlaceText,
    Custom(Arc<dyn LayoutFunction>),
}

impl LayoutFn {
    pub fn custom(f: impl LayoutFunction + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Pad => "pad",
            Self::Offset => "offset",
            Self::Fit => "fit",
            Self::SplitHorizontal => "split_horizontal",
            Self::SplitVertical => "split_vertical",
            Self::SplitAcrossLongerDimension => "split_across_longer_dimension",
            Self::Column => "column",
            Self::Grid => "grid",
            Self::Pip => "pip",
            Self::PlaceText => "place_text",
            Self::Custom(f) => f.name(),
        }
    }

    /// Builtin lookup by name.
    pub fn builtin(name: &str) -> Option<Self> {
        let f = match name {
            "pad" => Self::Pad,
            "offset" => Self::Offset,
            "fit" => Self::Fit,
            "split_horizontal" => Self::SplitHorizontal,
            "split_vertical" => Self::SplitVertical,
            "split_across_longer_dimension" => Self::SplitAcrossLongerDimension,
            "column" => Self::Column,
            "grid" => Self::Grid,
            "pip" => Self::Pip,
            "place_text" => Self::PlaceText,
            _ => return None,
        };
        Some(f)
    }

    /// Run the function. `None` means the inputs or the result were unusable.
    pub fn apply(
        &self,
        parent: RectPx,
        params: &LayoutParams,
        ctx: &LayoutCtx<'_>,
    ) -> Option<RectPx> {
        if !parent.is_finite() || !ctx.pixels_per_grid_unit.is_finite() {
            return None;
        }
        let out = match self {
            Self::Pad => transform::pad(parent, params, ctx),
            Self::Offset => transform::offset(parent, params),
            Self::Fit => transform::fit(parent, params),
            Self::SplitHorizontal => split::split_horizontal(parent, params, ctx),
            Self::SplitVertical => split::split_vertical(parent, params, ctx),
            Self::SplitAcrossLongerDimension => {
                split::split_across_longer_dimension(parent, params, ctx)
            }
            Self::Column => grid::column(parent, params, ctx),
            Self::Grid => grid::grid(parent, params, ctx),
            Self::Pip => pip::pip(parent, params, ctx),
            Self::PlaceText => text::place_text(parent, params, ctx),
            Self::Custom(f) => f.compute(parent, params, ctx),
        }?;
        out.is_finite().then_some(out)
    }
}

impl PartialEq for LayoutFn {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom(a), Self::Custom(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl fmt::Debug for LayoutFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(c) => write!(f, "Custom({})", c.name()),
            other => f.write_str(other.name()),
        }
    }
}

impl Serialize for LayoutFn {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for LayoutFn {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let name = String::deserialize(d)?;
        Self::builtin(&name).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown layout function \"{name}\""))
        })
    }
}

/// A node's layout slot: function reference plus parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    #[serde(rename = "fn")]
    pub func: LayoutFn,
    #[serde(default)]
    pub params: LayoutParams,
}

impl LayoutSpec {
    pub fn new(func: LayoutFn, params: LayoutParams) -> Self {
        Self { func, params }
    }

    /// Apply with fail-soft semantics: unusable inputs yield `parent` unchanged.
    pub fn resolve(&self, parent: RectPx, ctx: &LayoutCtx<'_>) -> RectPx {
        self.func.apply(parent, &self.params, ctx).unwrap_or(parent)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/spec.rs"]
mod tests;
