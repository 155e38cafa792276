use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::foundation::math::json_number;

/// Per-edge insets `{l, r, t, b}`; missing edges are zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Edges {
    pub l: f64,
    pub r: f64,
    pub t: f64,
    pub b: f64,
}

/// Parameter map handed to a layout function.
///
/// Stored as a JSON object so that change detection is a value comparison. JSON numbers cannot
/// hold NaN, and the typed setters below sanitize on the way in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutParams(Map<String, Value>);

impl LayoutParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(v: Value) -> Self {
        match v {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn set_f64(&mut self, key: impl Into<String>, value: f64) {
        self.set(key, json_number(value));
    }

    /// Builder-style numeric setter.
    pub fn num(mut self, key: impl Into<String>, value: f64) -> Self {
        self.set_f64(key, value);
        self
    }

    pub fn flag(mut self, key: impl Into<String>, value: bool) -> Self {
        self.set(key, Value::Bool(value));
        self
    }

    pub fn text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, Value::String(value.into()));
        self
    }

    /// Builder-style setter for `{l, r, t, b}` objects.
    pub fn edges(mut self, key: impl Into<String>, e: Edges) -> Self {
        let mut m = Map::new();
        m.insert("l".into(), json_number(e.l));
        m.insert("r".into(), json_number(e.r));
        m.insert("t".into(), json_number(e.t));
        m.insert("b".into(), json_number(e.b));
        self.set(key, Value::Object(m));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Numeric parameter. Non-numeric values read as absent.
    pub fn f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.f64(key).unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// `{l, r, t, b}` object parameter; `None` if `key` is absent or not an object.
    pub fn edges_of(&self, key: &str) -> Option<Edges> {
        let obj = self.0.get(key)?.as_object()?;
        let edge = |k: &str| {
            obj.get(k)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite())
                .unwrap_or(0.0)
        };
        Some(Edges {
            l: edge("l"),
            r: edge("r"),
            t: edge("t"),
            b: edge("b"),
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/params.rs"]
mod tests;
