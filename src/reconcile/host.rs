use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::foundation::core::RectPx;
use crate::foundation::diagnostics::Diagnostics;
use crate::foundation::error::{VcsError, VcsResult};
use crate::layout::engine::compute_layout;
use crate::reconcile::op::{ElementKey, HostOp};
use crate::scene::graph::{IntrinsicSizer, SceneGraph};
use crate::scene::node::NodeId;
use crate::scene::props::{NodeProps, NodeVariant, should_update};

/// How `insert_child_before` treats its reference node.
///
/// Positional is the default because [`Reconciler`](crate::reconcile::diff::Reconciler)
/// emits `insert_before` for keyed moves, and append-only hosts would misorder those.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    /// Insert directly before the reference child.
    #[default]
    Positional,
    /// Ignore the reference and append.
    Append,
}

/// Callback run once per outermost commit, after layout.
pub type Subscriber = Box<dyn FnMut(&SceneGraph) + Send>;

/// Applies structural and prop mutations to a [`SceneGraph`] inside commit boundaries.
pub struct Host {
    graph: SceneGraph,
    viewport: RectPx,
    pixels_per_grid_unit: f64,
    insert_mode: InsertMode,
    depth: u32,
    commits: u64,
    subscribers: Vec<Subscriber>,
    keys: HashMap<ElementKey, NodeId>,
    diagnostics: Diagnostics,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("graph", &self.graph)
            .field("viewport", &self.viewport)
            .field("insert_mode", &self.insert_mode)
            .field("depth", &self.depth)
            .field("commits", &self.commits)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl Host {
    pub fn new(viewport: RectPx, pixels_per_grid_unit: f64) -> Self {
        Self {
            graph: SceneGraph::new(),
            viewport,
            pixels_per_grid_unit,
            insert_mode: InsertMode::default(),
            depth: 0,
            commits: 0,
            subscribers: Vec::new(),
            keys: HashMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_insert_mode(mut self, mode: InsertMode) -> Self {
        self.insert_mode = mode;
        self
    }

    pub fn set_sizer(&mut self, sizer: Option<Box<dyn IntrinsicSizer>>) {
        self.graph.set_sizer(sizer);
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn viewport(&self) -> RectPx {
        self.viewport
    }

    pub fn pixels_per_grid_unit(&self) -> f64 {
        self.pixels_per_grid_unit
    }

    pub fn insert_mode(&self) -> InsertMode {
        self.insert_mode
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Graph and warn-once sink together, for encoders that read one and report into the other.
    pub fn graph_and_diagnostics(&mut self) -> (&SceneGraph, &mut Diagnostics) {
        (&self.graph, &mut self.diagnostics)
    }

    /// Completed outermost commits.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    pub fn in_commit(&self) -> bool {
        self.depth > 0
    }

    pub fn subscribe(&mut self, f: impl FnMut(&SceneGraph) + Send + 'static) {
        self.subscribers.push(Box::new(f));
    }

    /// Arena id bound to a producer key.
    pub fn node_for_key(&self, key: ElementKey) -> Option<NodeId> {
        self.keys.get(&key).copied()
    }

    fn ensure_in_commit(&self, what: &str) -> VcsResult<()> {
        if self.depth == 0 {
            return Err(VcsError::config(format!("{what} outside of a commit")));
        }
        Ok(())
    }

    pub fn begin_commit(&mut self) {
        self.depth += 1;
    }

    /// Close a commit boundary. The outermost one lays out the tree and notifies subscribers.
    #[tracing::instrument(skip(self), fields(depth = self.depth))]
    pub fn end_commit(&mut self) -> VcsResult<()> {
        if self.depth == 0 {
            return Err(VcsError::config("end_commit without matching begin_commit"));
        }
        self.depth -= 1;
        if self.depth > 0 {
            return Ok(());
        }

        compute_layout(
            &mut self.graph,
            self.viewport,
            self.pixels_per_grid_unit,
            &mut self.diagnostics,
        );
        self.commits += 1;
        tracing::debug!(commit = self.commits, nodes = self.graph.len(), "commit");
        for s in &mut self.subscribers {
            s(&self.graph);
        }
        Ok(())
    }

    /// Run `f` inside a commit boundary. The boundary is closed even if `f` fails.
    pub fn commit_with<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> VcsResult<R>,
    ) -> VcsResult<R> {
        self.begin_commit();
        let out = f(self);
        let end = self.end_commit();
        let out = out?;
        end?;
        Ok(out)
    }

    /// Change the output geometry and lay out again.
    pub fn resize(&mut self, viewport: RectPx, pixels_per_grid_unit: f64) -> VcsResult<()> {
        self.viewport = viewport;
        self.pixels_per_grid_unit = pixels_per_grid_unit;
        self.commit_with(|_| Ok(()))
    }

    pub fn create_instance(&mut self, variant: NodeVariant, props: NodeProps) -> VcsResult<NodeId> {
        self.ensure_in_commit("create")?;
        self.graph.create(variant, props)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> VcsResult<()> {
        self.ensure_in_commit("append")?;
        self.graph.append_child(parent, child)
    }

    pub fn insert_child_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> VcsResult<()> {
        self.ensure_in_commit("insert_before")?;
        match self.insert_mode {
            InsertMode::Positional => self.graph.insert_before(parent, child, before),
            InsertMode::Append => self.graph.append_child(parent, child),
        }
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> VcsResult<()> {
        self.ensure_in_commit("remove")?;
        self.graph.remove_child(parent, child)
    }

    pub fn prepare_update(&self, old: &NodeProps, new: &NodeProps) -> bool {
        should_update(old, new)
    }

    pub fn commit_update(&mut self, node: NodeId, new: NodeProps) -> VcsResult<()> {
        self.ensure_in_commit("update")?;
        self.graph.commit(node, new)
    }

    pub fn attach_root(&mut self, node: Option<NodeId>) -> VcsResult<()> {
        self.ensure_in_commit("attach_root")?;
        self.graph.attach_root(node)
    }

    pub fn clear(&mut self) -> VcsResult<()> {
        self.ensure_in_commit("clear")?;
        self.graph.clear();
        self.keys.clear();
        Ok(())
    }

    fn resolve(&self, key: ElementKey) -> VcsResult<NodeId> {
        self.node_for_key(key)
            .ok_or_else(|| VcsError::config(format!("element {key} is not bound to a node")))
    }

    /// Apply one protocol operation.
    pub fn apply(&mut self, op: &HostOp) -> VcsResult<()> {
        match op {
            HostOp::BeginCommit => {
                self.begin_commit();
                Ok(())
            }
            HostOp::EndCommit => self.end_commit(),
            HostOp::Create {
                key,
                variant,
                props,
            } => {
                if self.keys.contains_key(key) {
                    return Err(VcsError::config(format!("element {key} already exists")));
                }
                let id = self.create_instance(*variant, props.clone())?;
                self.keys.insert(*key, id);
                Ok(())
            }
            HostOp::Append { parent, child } => {
                let (p, c) = (self.resolve(*parent)?, self.resolve(*child)?);
                self.append_child(p, c)
            }
            HostOp::InsertBefore {
                parent,
                child,
                before,
            } => {
                let (p, c, b) = (
                    self.resolve(*parent)?,
                    self.resolve(*child)?,
                    self.resolve(*before)?,
                );
                self.insert_child_before(p, c, b)
            }
            HostOp::Remove { parent, child } => {
                let (p, c) = (self.resolve(*parent)?, self.resolve(*child)?);
                self.remove_child(p, c)?;
                self.keys.remove(child);
                Ok(())
            }
            HostOp::Update { key, props } => {
                self.ensure_in_commit("update")?;
                let id = self.resolve(*key)?;
                let changed = self.prepare_update(self.graph.node(id)?.props(), props);
                if changed {
                    self.commit_update(id, props.clone())?;
                }
                Ok(())
            }
            HostOp::AttachRoot { key } => {
                let id = key.map(|k| self.resolve(k)).transpose()?;
                self.attach_root(id)
            }
            HostOp::Clear => self.clear(),
        }
    }

    /// Apply a batch, stopping at the first error.
    ///
    /// Commits opened by the batch are closed before the error is returned, so the host is
    /// back at the depth it had on entry.
    #[tracing::instrument(skip_all, fields(ops = ops.len()))]
    pub fn apply_all(&mut self, ops: &[HostOp]) -> VcsResult<()> {
        let depth = self.depth;
        for op in ops {
            if let Err(err) = self.apply(op) {
                tracing::warn!(
                    error = %err,
                    open = self.depth.saturating_sub(depth),
                    "batch failed; closing its commits"
                );
                while self.depth > depth {
                    self.end_commit()?;
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/host.rs"]
mod tests;
