//! Parsing the model's free-text reply into an index-aligned value list.

use log::debug;
use serde_json::{Number, Value};

use crate::error::{AutofillError, Result};

/// `{ "values": [v0, v1, ...] }`, aligned with the form controls by index.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMapping {
    values: Vec<Value>,
}

impl ValueMapping {
    /// Parse `reply` directly, then fall back to the widest `{...}` span.
    /// Anything without an array under `values` is rejected with the raw text.
    pub fn parse(reply: &str) -> Result<Self> {
        let parsed = match serde_json::from_str::<Value>(reply) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!("AI reply is not bare JSON ({e}), trying embedded object");
                widest_object(reply).and_then(|s| serde_json::from_str::<Value>(s).ok())
            }
        };

        match parsed {
            Some(Value::Object(mut obj)) => match obj.remove("values") {
                Some(Value::Array(values)) => Ok(Self { values }),
                _ => Err(invalid(reply)),
            },
            _ => Err(invalid(reply)),
        }
    }

    /// Value for control `index`; `None` when absent or JSON null.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).filter(|v| !v.is_null())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Value>> for ValueMapping {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

fn invalid(reply: &str) -> AutofillError {
    AutofillError::AiResponseInvalid {
        raw: reply.to_string(),
    }
}

/// First `{` through last `}` (a greedy match), if both exist in that order.
fn widest_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// String conversion with JavaScript `String(v)` semantics.
pub fn js_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => js_number(n),
        Value::Array(items) => items
            .iter()
            .map(|v| if v.is_null() { String::new() } else { js_string(v) })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Integers keep their exact text; floats print like a JS number, so `5.0`
/// becomes `"5"`.
fn js_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// JavaScript truthiness (`!!v`). Note that the string `"false"` is truthy.
pub fn js_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
