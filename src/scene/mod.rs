//! Retained scene tree: typed node props, the node arena and its structural operations.

pub mod graph;
pub mod node;
pub mod props;

pub use self::graph::{IntrinsicSizer, SceneGraph};
pub use self::node::{Node, NodeId};
pub use self::props::{NodeProps, NodeVariant};
