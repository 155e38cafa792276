use std::collections::HashSet;

/// Category of a recovered data error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Image/video/web-frame source not present in the asset table.
    MissingAsset,
    /// Layout function rejected its inputs; the parent rectangle was used instead.
    LayoutFallback,
    /// Intrinsic content size could not be resolved.
    IntrinsicSize,
}

/// Warn-once sink for data errors.
///
/// Owned by a [`Composition`](crate::session::composition::Composition) so that independent
/// sessions never share dedup state. A given `(kind, key)` pair is logged the first time it is
/// seen and silently counted afterwards.
#[derive(Debug, Default)]
pub struct Diagnostics {
    seen: HashSet<(DiagnosticKind, String)>,
    suppressed: u64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `message` unless `(kind, key)` was already reported. Returns `true` if logged.
    pub fn warn_once(&mut self, kind: DiagnosticKind, key: &str, message: &str) -> bool {
        if self.seen.contains(&(kind, key.to_owned())) {
            self.suppressed += 1;
            return false;
        }
        self.seen.insert((kind, key.to_owned()));
        tracing::warn!(?kind, key, "{message}");
        true
    }

    pub fn has_reported(&self, kind: DiagnosticKind, key: &str) -> bool {
        self.seen.contains(&(kind, key.to_owned()))
    }

    /// Number of distinct keys reported so far.
    pub fn reported_len(&self) -> usize {
        self.seen.len()
    }

    /// Number of repeat reports swallowed by dedup.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn reset(&mut self) {
        self.seen.clear();
        self.suppressed = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/diagnostics.rs"]
mod tests;
