use crate::foundation::core::{RectPx, SizePx};
use crate::foundation::error::{VcsError, VcsResult};
use crate::foundation::math::Sanitize;
use crate::reconcile::diff::Element;
use crate::scene::node::{Node, NodeId};
use crate::scene::props::{LabelContent, NodeProps, NodeVariant, Style, should_update};

/// Text measurement hook for plain-string labels.
///
/// Shaped labels carry their own geometry and are measured without it.
pub trait IntrinsicSizer: Send {
    fn measure(&self, text: &str, style: &Style) -> Option<SizePx>;
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of scene nodes with parent/child links.
///
/// Parents own their children through `children`; `parent` is a back-reference only.
#[derive(Default)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
    root: Option<NodeId>,
    sizer: Option<Box<dyn IntrinsicSizer>>,
}

impl std::fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneGraph")
            .field("len", &self.len)
            .field("root", &self.root)
            .field("sizer", &self.sizer.is_some())
            .finish_non_exhaustive()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sizer(&mut self, sizer: Option<Box<dyn IntrinsicSizer>>) {
        self.sizer = sizer;
    }

    pub fn sizer(&self) -> Option<&dyn IntrinsicSizer> {
        self.sizer.as_deref()
    }

    /// Number of registered nodes, attached or not.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    /// Registered node, or a configuration error naming the stale/unknown id.
    pub fn node(&self, id: NodeId) -> VcsResult<&Node> {
        self.get(id)
            .ok_or_else(|| VcsError::config(format!("node {id} is not registered")))
    }

    fn node_mut(&mut self, id: NodeId) -> VcsResult<&mut Node> {
        self.get_mut(id)
            .ok_or_else(|| VcsError::config(format!("node {id} is not registered")))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[][..], Node::children)
    }

    pub fn rect(&self, id: NodeId) -> Option<RectPx> {
        self.get(id).map(Node::rect)
    }

    pub fn intrinsic_size(&self, id: NodeId) -> Option<SizePx> {
        self.get(id).and_then(Node::intrinsic_size)
    }

    /// Allocate and register a node, running its initial commit.
    pub fn create(&mut self, variant: NodeVariant, props: NodeProps) -> VcsResult<NodeId> {
        if props.variant() != variant {
            return Err(VcsError::config(format!(
                "props of type \"{}\" given for a {variant} node",
                props.variant()
            )));
        }

        let props = props.sanitized();
        let intrinsic = self.measure(&props);

        let id = match self.free.pop() {
            Some(index) => NodeId::new(index, self.slots[index as usize].generation),
            None => {
                let index = u32::try_from(self.slots.len())
                    .map_err(|_| VcsError::config("scene graph is full"))?;
                self.slots.push(Slot::default());
                NodeId::new(index, 0)
            }
        };
        let mut node = Node::new(id, props);
        node.intrinsic_size = intrinsic;
        self.slots[id.index() as usize].node = Some(node);
        self.len += 1;
        Ok(id)
    }

    /// Apply new props unconditionally and refresh the intrinsic size.
    pub fn commit(&mut self, id: NodeId, props: NodeProps) -> VcsResult<()> {
        let props = props.sanitized();
        let intrinsic = self.measure(&props);
        let node = self.node_mut(id)?;
        if node.props.variant() != props.variant() {
            return Err(VcsError::config(format!(
                "cannot commit {} props to {} node {id}",
                props.variant(),
                node.props.variant()
            )));
        }
        node.props = props;
        node.intrinsic_size = intrinsic;
        Ok(())
    }

    /// `true` iff committing `new` over the node's current props changes anything.
    pub fn should_update(&self, id: NodeId, new: &NodeProps) -> VcsResult<bool> {
        Ok(should_update(&self.node(id)?.props, new))
    }

    fn measure(&self, props: &NodeProps) -> Option<SizePx> {
        let NodeProps::Label(label) = props else {
            return None;
        };
        match &label.text {
            LabelContent::Shaped(block) => Some(block.measure()),
            LabelContent::Text(text) => self
                .sizer
                .as_ref()
                .and_then(|s| s.measure(text, &label.common.style)),
        }
    }

    /// Designate the root. `None` detaches the current root without deleting it.
    pub fn attach_root(&mut self, id: Option<NodeId>) -> VcsResult<()> {
        if let Some(id) = id {
            let node = self.node(id)?;
            if node.variant() != NodeVariant::Root {
                return Err(VcsError::config(format!(
                    "cannot attach {} node {id} as root",
                    node.variant()
                )));
            }
            if node.parent.is_some() {
                return Err(VcsError::config(format!("root {id} has a parent")));
            }
        }
        self.root = id;
        Ok(())
    }

    /// Detach the root and drop every registered node.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.len = 0;
        self.root = None;
    }

    /// Unregister a node. Its children are orphaned, not deleted.
    pub fn delete(&mut self, id: NodeId) -> VcsResult<()> {
        let node = self.node(id)?;
        let parent = node.parent;
        let children = node.children.clone();

        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        for c in children {
            if let Some(child) = self.get_mut(c) {
                child.parent = None;
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }

        let slot = &mut self.slots[id.index() as usize];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.len -= 1;
        Ok(())
    }

    /// `true` if `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    fn check_link(&self, parent: NodeId, child: NodeId) -> VcsResult<()> {
        self.node(parent)?;
        if self.node(child)?.variant() == NodeVariant::Root {
            return Err(VcsError::config(format!("root {child} cannot be a child")));
        }
        if self.is_ancestor(child, parent) {
            return Err(VcsError::config(format!(
                "appending {child} under {parent} would create a cycle"
            )));
        }
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(old) = self.parent(child) {
            if let Some(p) = self.get_mut(old) {
                p.children.retain(|c| *c != child);
            }
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = None;
        }
    }

    /// Make `child` the last child of `parent`, moving it if already attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> VcsResult<()> {
        self.check_link(parent, child)?;
        self.detach(child);
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Place `child` directly before `before` among `parent`'s children.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> VcsResult<()> {
        self.check_link(parent, child)?;
        if child == before {
            return Ok(());
        }
        if self.parent(before) != Some(parent) {
            return Err(VcsError::config(format!(
                "insert reference {before} is not a child of {parent}"
            )));
        }
        self.detach(child);
        let p = self.node_mut(parent)?;
        let at = p
            .children
            .iter()
            .position(|c| *c == before)
            .unwrap_or(p.children.len());
        p.children.insert(at, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from `parent` and unregister it.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> VcsResult<()> {
        self.node(parent)?;
        if self.parent(child) != Some(parent) {
            return Err(VcsError::config(format!(
                "{child} is not a child of {parent}"
            )));
        }
        self.delete(child)
    }

    /// Attached nodes in pre-order (parent before children, children in z-order).
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub(crate) fn set_rect(&mut self, id: NodeId, rect: RectPx) {
        if let Some(n) = self.get_mut(id) {
            n.rect = rect;
        }
    }

    /// Declarative tree equivalent to the attached graph.
    pub fn snapshot(&self) -> Option<Element> {
        self.root.map(|r| self.snapshot_node(r))
    }

    fn snapshot_node(&self, id: NodeId) -> Element {
        let props = self
            .get(id)
            .map_or(NodeProps::Root, |n| n.props.clone());
        Element {
            key: None,
            props,
            children: self
                .children(id)
                .iter()
                .map(|c| self.snapshot_node(*c))
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
