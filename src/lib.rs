//! vcs-core is the compositing core of a live video layout system.
//!
//! It keeps a retained scene tree of boxes, images, labels, videos and web frames, lays it out
//! top-down with resolution-independent layout functions, and encodes each committed state
//! into two backend-agnostic outputs:
//!
//! - a canvas-style [`DisplayList`] of drawing commands, split into background and foreground
//! - a list of [`VideoLayer`] placements for an external video compositor
//!
//! Most callers go through a [`Composition`]: feed it declarative [`Element`] trees (or a
//! recorded [`OpLog`]) and call [`Composition::encode`] once per frame.
#![forbid(unsafe_code)]

pub mod assets;
pub mod foundation;
pub mod layout;
pub mod reconcile;
pub mod render;
pub mod scene;
pub mod session;
pub mod text;

pub use crate::assets::color::ColorDef;
pub use crate::assets::table::{AssetEntry, AssetTable, SourceRef, SourceType};
pub use crate::foundation::core::{BezPath, Point, RectPx, SizePx, Viewport};
pub use crate::foundation::diagnostics::{DiagnosticKind, Diagnostics};
pub use crate::foundation::error::{VcsError, VcsResult};
pub use crate::layout::{LayoutFn, LayoutFunction, LayoutParams, LayoutSpec};
pub use crate::reconcile::{Element, ElementKey, Host, HostOp, InsertMode, OpLog, Reconciler};
pub use crate::render::{Command, DisplayList, VideoLayer};
pub use crate::scene::{IntrinsicSizer, NodeId, NodeProps, NodeVariant, SceneGraph};
pub use crate::session::{Composition, CompositionOpts, FrameOutput};
