//! Text inputs for label nodes.
//!
//! Shaping, line breaking and font loading happen outside this crate. This module only
//! resolves font attributes to pixels, classifies emoji, and carries pre-shaped runs.

pub mod block;
pub mod emoji;
pub mod font;
