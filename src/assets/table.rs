use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kind of externally resolved drawable.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Image,
    Video,
    Webframe,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Webframe => "webframe",
        }
    }
}

/// Opaque `{type, id}` pair placed into `drawImage` commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(rename = "type")]
    pub kind: SourceType,
    pub id: String,
}

/// A resolvable drawable handle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Identifier understood by the rendering backend.
    pub backend_id: String,
    /// Natural content width in pixels.
    pub width: u32,
    /// Natural content height in pixels.
    pub height: u32,
}

impl AssetEntry {
    pub fn new(backend_id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            backend_id: backend_id.into(),
            width,
            height,
        }
    }

    pub fn aspect(&self) -> Option<f64> {
        let asp = f64::from(self.width) / f64::from(self.height);
        (asp.is_finite() && asp > 0.0).then_some(asp)
    }
}

/// Per-encode mapping from `(type, key)` to drawable handle.
///
/// Supplied fresh to each encode call; the encoders never cache lookups across calls.
#[derive(Clone, Debug, Default)]
pub struct AssetTable {
    entries: HashMap<(SourceType, String), AssetEntry>,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: SourceType, key: impl Into<String>, entry: AssetEntry) {
        self.entries.insert((kind, key.into()), entry);
    }

    /// Builder-style [`AssetTable::insert`].
    pub fn with(mut self, kind: SourceType, key: impl Into<String>, entry: AssetEntry) -> Self {
        self.insert(kind, key, entry);
        self
    }

    /// Look up a source. Image keys without an extension also match the `.png` file.
    pub fn resolve(&self, kind: SourceType, key: &str) -> Option<&AssetEntry> {
        if let Some(e) = self.entries.get(&(kind, key.to_owned())) {
            return Some(e);
        }
        if kind == SourceType::Image && !key.contains('.') {
            return self.entries.get(&(kind, format!("{key}.png")));
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/table.rs"]
mod tests;
