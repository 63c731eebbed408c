//! Dynamic value type for socket payloads.
//!
//! Socket values cross node boundaries as dynamically-typed data. The
//! engine treats socket type tags as opaque, except for the numeric
//! widening applied during input resolution.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Dynamic value carried by a data socket.
///
/// Wraps `serde_json::Value` to provide the conversions and the numeric
/// widening the orchestrator applies when resolving node inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(pub JsonValue);

/// Type tags that resolve to a floating-point socket.
///
/// Widening agreed at authoring time is applied mechanically against the
/// target socket's semantic type tag.
const FLOAT_TAGS: &[&str] = &["float", "double", "f32", "f64", "number", "decimal"];

impl Value {
    /// Create a null value.
    pub fn null() -> Self {
        Self(JsonValue::Null)
    }

    /// Create a boolean value.
    pub fn bool(v: bool) -> Self {
        Self(JsonValue::Bool(v))
    }

    /// Create an integer value.
    pub fn int(v: i64) -> Self {
        Self(JsonValue::Number(v.into()))
    }

    /// Create a floating-point value.
    pub fn float(v: f64) -> Self {
        Self(serde_json::Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number))
    }

    /// Create a string value.
    pub fn string(v: impl Into<String>) -> Self {
        Self(JsonValue::String(v.into()))
    }

    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Convert to f64 if possible.
    pub fn as_f64(&self) -> Option<f64> {
        match &self.0 {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Convert to i64 if possible (whole-valued floats included).
    pub fn as_i64(&self) -> Option<i64> {
        match &self.0 {
            JsonValue::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            }),
            JsonValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Convert to bool if possible.
    pub fn as_bool(&self) -> Option<bool> {
        match &self.0 {
            JsonValue::Bool(b) => Some(*b),
            JsonValue::Null => Some(false),
            _ => None,
        }
    }

    /// Convert to string if possible.
    pub fn as_string(&self) -> Option<String> {
        match &self.0 {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            JsonValue::Bool(b) => Some(b.to_string()),
            JsonValue::Null => None,
            _ => Some(self.0.to_string()),
        }
    }

    /// Apply the numeric widening agreed for a target socket type tag.
    ///
    /// An integer value flowing into a floating-point socket is widened to
    /// a float. Widening never narrows; any other combination (including
    /// unknown type tags) passes through unchanged.
    #[must_use]
    pub fn widened_for(&self, type_name: &str) -> Self {
        if let JsonValue::Number(n) = &self.0 {
            if n.is_i64() || n.is_u64() {
                let tag = type_name.to_ascii_lowercase();
                if FLOAT_TAGS.contains(&tag.as_str()) {
                    if let Some(f) = n.as_f64() {
                        return Self::float(f);
                    }
                }
            }
        }
        self.clone()
    }

    /// Access the inner `serde_json::Value`.
    pub fn inner(&self) -> &JsonValue {
        &self.0
    }

    /// Convert into the inner `serde_json::Value`.
    pub fn into_inner(self) -> JsonValue {
        self.0
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        Self(v)
    }
}

impl From<Value> for JsonValue {
    fn from(v: Value) -> Self {
        v.0
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::string(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::bool(v)
    }
}
