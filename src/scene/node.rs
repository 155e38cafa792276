use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::foundation::core::{RectPx, SizePx};
use crate::scene::props::{NodeProps, NodeVariant};

/// Generational arena handle.
///
/// A slot index plus the generation it was allocated in; a stale handle to a reused slot never
/// resolves.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One retained scene node.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) props: NodeProps,
    pub(crate) rect: RectPx,
    pub(crate) intrinsic_size: Option<SizePx>,
}

impl Node {
    pub(crate) fn new(id: NodeId, props: NodeProps) -> Self {
        Self {
            id,
            parent: None,
            children: SmallVec::new(),
            props,
            rect: RectPx::default(),
            intrinsic_size: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn variant(&self) -> NodeVariant {
        self.props.variant()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in z-order, back to front.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn props(&self) -> &NodeProps {
        &self.props
    }

    /// Layout rectangle from the most recent commit.
    pub fn rect(&self) -> RectPx {
        self.rect
    }

    /// Content size recorded at the most recent commit.
    pub fn intrinsic_size(&self) -> Option<SizePx> {
        self.intrinsic_size
    }
}
