use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{VcsError, VcsResult};
use crate::reconcile::host::Host;
use crate::reconcile::op::{ElementKey, HostOp};
use crate::scene::props::{NodeProps, NodeVariant, should_update};

/// Declarative description of a scene subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Explicit identity among siblings. Unkeyed children are matched by position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub props: NodeProps,
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(props: NodeProps) -> Self {
        Self {
            key: None,
            props,
            children: Vec::new(),
        }
    }

    pub fn root(children: Vec<Element>) -> Self {
        Self::new(NodeProps::Root).with_children(children)
    }

    pub fn keyed(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    pub fn variant(&self) -> NodeVariant {
        self.props.variant()
    }

    /// Number of elements in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Element::count).sum::<usize>()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Identity {
    Keyed(String, NodeVariant),
    Slot(usize, NodeVariant),
}

fn identities<'a>(items: impl Iterator<Item = (Option<&'a str>, NodeVariant)>) -> Vec<Identity> {
    let mut slot = 0;
    items
        .map(|(key, variant)| match key {
            Some(k) => Identity::Keyed(k.to_owned(), variant),
            None => {
                slot += 1;
                Identity::Slot(slot - 1, variant)
            }
        })
        .collect()
}

/// Mirror of what has been pushed to the host.
#[derive(Clone, Debug)]
struct Rendered {
    key: ElementKey,
    element_key: Option<String>,
    props: NodeProps,
    children: Vec<Rendered>,
}

/// Turns successive declarative trees into host operations.
///
/// Each [`render`](Self::render) diffs the new tree against the previous one and returns one
/// commit's worth of ops: updates for changed props, creations for new subtrees (children
/// appended before the subtree is inserted), bottom-up removals, and positional moves that keep
/// node identity.
#[derive(Debug, Default)]
pub struct Reconciler {
    next_key: u64,
    root: Option<Rendered>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key bound to the rendered root, if any.
    pub fn root_key(&self) -> Option<ElementKey> {
        self.root.as_ref().map(|r| r.key)
    }

    fn alloc_key(&mut self) -> ElementKey {
        self.next_key += 1;
        ElementKey(self.next_key)
    }

    /// Ops (wrapped in one commit) that turn the previous tree into `element`.
    #[tracing::instrument(skip_all)]
    pub fn render(&mut self, element: Option<&Element>) -> VcsResult<Vec<HostOp>> {
        if let Some(e) = element {
            if e.variant() != NodeVariant::Root {
                return Err(VcsError::config(format!(
                    "top-level element must be root, got {}",
                    e.variant()
                )));
            }
            validate_children(e)?;
        }

        let mut ops = vec![HostOp::BeginCommit];
        match (self.root.take(), element) {
            (None, None) => {}
            (None, Some(e)) => {
                let r = self.create_subtree(e, &mut ops);
                ops.push(HostOp::AttachRoot { key: Some(r.key) });
                self.root = Some(r);
            }
            (Some(_), None) => {
                ops.push(HostOp::AttachRoot { key: None });
                ops.push(HostOp::Clear);
            }
            (Some(mut r), Some(e)) => {
                self.reconcile_node(&mut r, e, &mut ops);
                self.root = Some(r);
            }
        }
        ops.push(HostOp::EndCommit);
        tracing::debug!(ops = ops.len(), "reconciled");
        Ok(ops)
    }

    /// Render and apply to `host` in one step.
    pub fn render_into(&mut self, host: &mut Host, element: Option<&Element>) -> VcsResult<()> {
        let ops = self.render(element)?;
        host.apply_all(&ops)
    }

    fn create_subtree(&mut self, e: &Element, ops: &mut Vec<HostOp>) -> Rendered {
        let key = self.alloc_key();
        ops.push(HostOp::Create {
            key,
            variant: e.variant(),
            props: e.props.clone(),
        });
        let mut children = Vec::with_capacity(e.children.len());
        for c in &e.children {
            let child = self.create_subtree(c, ops);
            ops.push(HostOp::Append {
                parent: key,
                child: child.key,
            });
            children.push(child);
        }
        Rendered {
            key,
            element_key: e.key.clone(),
            props: e.props.clone(),
            children,
        }
    }

    fn reconcile_node(&mut self, r: &mut Rendered, e: &Element, ops: &mut Vec<HostOp>) {
        if should_update(&r.props, &e.props) {
            ops.push(HostOp::Update {
                key: r.key,
                props: e.props.clone(),
            });
            r.props = e.props.clone();
        }
        let old = std::mem::take(&mut r.children);
        r.children = self.reconcile_children(r.key, old, &e.children, ops);
    }

    fn reconcile_children(
        &mut self,
        parent: ElementKey,
        old: Vec<Rendered>,
        new: &[Element],
        ops: &mut Vec<HostOp>,
    ) -> Vec<Rendered> {
        let old_ids = identities(
            old.iter()
                .map(|r| (r.element_key.as_deref(), r.props.variant())),
        );
        let new_ids = identities(new.iter().map(|e| (e.key.as_deref(), e.variant())));

        // Host-side order of the current children.
        let mut current: Vec<ElementKey> = old.iter().map(|r| r.key).collect();

        let mut gone = Vec::new();
        let mut by_id: HashMap<Identity, Rendered> = HashMap::with_capacity(old.len());
        for (id, r) in old_ids.into_iter().zip(old) {
            if let Some(dup) = by_id.insert(id, r) {
                gone.push(dup);
            }
        }
        let mut matched: Vec<Option<Rendered>> =
            new_ids.iter().map(|id| by_id.remove(id)).collect();

        gone.extend(by_id.into_values());
        gone.sort_by_key(|r| r.key);
        for r in gone {
            current.retain(|k| *k != r.key);
            remove_subtree(parent, r, ops);
        }

        // Walk backwards so everything after the current position is already final.
        let mut out = Vec::with_capacity(new.len());
        let mut next: Option<ElementKey> = None;
        for (e, slot) in new.iter().zip(matched.iter_mut()).rev() {
            let r = match slot.take() {
                Some(mut r) => {
                    self.reconcile_node(&mut r, e, ops);
                    let pos = current.iter().position(|k| *k == r.key);
                    let successor = pos.and_then(|p| current.get(p + 1).copied());
                    if pos.is_none() || successor != next {
                        place(parent, r.key, next, ops, &mut current);
                    }
                    r
                }
                None => {
                    let r = self.create_subtree(e, ops);
                    place(parent, r.key, next, ops, &mut current);
                    r
                }
            };
            next = Some(r.key);
            out.push(r);
        }
        out.reverse();
        out
    }
}

fn validate_children(e: &Element) -> VcsResult<()> {
    for c in &e.children {
        if c.variant() == NodeVariant::Root {
            return Err(VcsError::config("root element nested below the top level"));
        }
        validate_children(c)?;
    }
    Ok(())
}

/// Move or insert `child` so that it sits right before `before` (or last).
fn place(
    parent: ElementKey,
    child: ElementKey,
    before: Option<ElementKey>,
    ops: &mut Vec<HostOp>,
    current: &mut Vec<ElementKey>,
) {
    current.retain(|k| *k != child);
    match before {
        Some(before) => {
            let at = current
                .iter()
                .position(|k| *k == before)
                .unwrap_or(current.len());
            current.insert(at, child);
            ops.push(HostOp::InsertBefore {
                parent,
                child,
                before,
            });
        }
        None => {
            current.push(child);
            ops.push(HostOp::Append { parent, child });
        }
    }
}

/// Remove descendants first so no orphan stays registered.
fn remove_subtree(parent: ElementKey, r: Rendered, ops: &mut Vec<HostOp>) {
    for c in r.children {
        remove_subtree(r.key, c, ops);
    }
    ops.push(HostOp::Remove {
        parent,
        child: r.key,
    });
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/diff.rs"]
mod tests;
