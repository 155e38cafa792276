/// Result alias used across the crate.
pub type VcsResult<T> = Result<T, VcsError>;

/// Error taxonomy for scene graph mutation, layout and encoding.
///
/// Data errors (missing assets, bad layout parameters) are never surfaced through this type:
/// they are recovered where they happen and reported through
/// [`Diagnostics`](crate::foundation::diagnostics::Diagnostics).
#[derive(thiserror::Error, Debug)]
pub enum VcsError {
    /// Unknown node variant, malformed structural operation sequence, bad configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal encoder invariant violation (for example unbalanced save/restore scopes).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// JSON (de)serialization failure at a boundary.
    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VcsError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors caused by the caller's input rather than by this crate.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Serde(_))
    }
}

impl From<serde_json::Error> for VcsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
