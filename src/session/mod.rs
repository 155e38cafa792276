//! One compositing session: options, the retained host, and per-commit encoding.

pub mod composition;

pub use self::composition::{Composition, CompositionOpts, FrameOutput};
