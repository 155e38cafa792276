/// Replace NaN with `0.0`.
///
/// NaN never compares equal to itself, so a single NaN in a committed prop would keep a node
/// dirty forever.
pub fn sanitize_f64(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v }
}

/// In-place NaN scrubbing for prop payloads.
pub trait Sanitize {
    fn sanitize(&mut self);

    fn sanitized(mut self) -> Self
    where
        Self: Sized,
    {
        self.sanitize();
        self
    }
}

impl Sanitize for f64 {
    fn sanitize(&mut self) {
        *self = sanitize_f64(*self);
    }
}

impl<T: Sanitize> Sanitize for Option<T> {
    fn sanitize(&mut self) {
        if let Some(v) = self {
            v.sanitize();
        }
    }
}

/// Convert an `f64` into a JSON number, mapping NaN to `0` and infinities to `null`.
pub fn json_number(v: f64) -> serde_json::Value {
    serde_json::Number::from_f64(sanitize_f64(v))
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
