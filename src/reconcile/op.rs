use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::VcsResult;
use crate::scene::props::{NodeProps, NodeVariant};

/// Producer-side node handle, bound to an arena id by the host on `create`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementKey(pub u64);

impl std::fmt::Display for ElementKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// One structural or prop operation of the host protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostOp {
    BeginCommit,
    EndCommit,
    Create {
        key: ElementKey,
        variant: NodeVariant,
        props: NodeProps,
    },
    Append {
        parent: ElementKey,
        child: ElementKey,
    },
    InsertBefore {
        parent: ElementKey,
        child: ElementKey,
        before: ElementKey,
    },
    Remove {
        parent: ElementKey,
        child: ElementKey,
    },
    Update {
        key: ElementKey,
        props: NodeProps,
    },
    AttachRoot {
        #[serde(default)]
        key: Option<ElementKey>,
    },
    Clear,
}

impl HostOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BeginCommit => "begin_commit",
            Self::EndCommit => "end_commit",
            Self::Create { .. } => "create",
            Self::Append { .. } => "append",
            Self::InsertBefore { .. } => "insert_before",
            Self::Remove { .. } => "remove",
            Self::Update { .. } => "update",
            Self::AttachRoot { .. } => "attach_root",
            Self::Clear => "clear",
        }
    }
}

/// Recorded operation stream, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpLog {
    pub ops: Vec<HostOp>,
}

impl OpLog {
    pub fn from_reader<R: std::io::Read>(r: R) -> VcsResult<Self> {
        Ok(serde_json::from_reader(r)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> VcsResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open op log '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Number of outermost commits in the log.
    pub fn commit_count(&self) -> usize {
        let mut depth = 0usize;
        let mut commits = 0;
        for op in &self.ops {
            match op {
                HostOp::BeginCommit => depth += 1,
                HostOp::EndCommit => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        commits += 1;
                    }
                }
                _ => {}
            }
        }
        commits
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/op.rs"]
mod tests;
