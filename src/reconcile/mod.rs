//! Structural protocol: the host that applies operations inside commit boundaries, the
//! serialized operation log, and an in-process differ that produces operations from
//! declarative trees.

pub mod diff;
pub mod host;
pub mod op;

pub use self::diff::{Element, Reconciler};
pub use self::host::{Host, InsertMode};
pub use self::op::{ElementKey, HostOp, OpLog};
