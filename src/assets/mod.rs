//! Asset references and color normalization shared by the encoders.

pub mod color;
pub mod table;
