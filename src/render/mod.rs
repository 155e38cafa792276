//! Output encoders: the canvas-style display list, the video placement list, and the
//! background clip that keeps drawing out of video areas.

pub mod display_list;
pub mod encoder;
pub mod hole_punch;
pub mod video_scene;

pub use self::display_list::{Command, DisplayList, DrawImage, FillRule};
pub use self::encoder::{EncodeCtx, SplitLists, encode_display_list, encode_split};
pub use self::hole_punch::{BackgroundClip, Hole, compute_background_clip};
pub use self::video_scene::{VideoAttrs, VideoLayer, encode_video_layers};
