//! Type inference for raw value text
//!
//! Rules, first match wins:
//! 1. per-key override (or the configured default kind, when set)
//! 2. a `.`, `inf` or `nan` in the text means float
//! 3. `true` / `false` (any case) means boolean
//! 4. integer, falling back to the raw text
//!
//! Inference is total: anything that fails to parse as its target kind ends
//! up as [`Value::Text`].

use crate::constants::RESERVED_KEY_PREFIX;
use crate::models::{Value, ValueKind};
use indexmap::IndexMap;

/// Maps raw value text to typed values
#[derive(Debug, Clone, Default)]
pub struct TypeInferencer {
    overrides: IndexMap<String, ValueKind>,
    default_kind: Option<ValueKind>,
}

impl TypeInferencer {
    /// Inferencer that only applies the textual rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Inferencer with forced kinds per key and a kind for all other keys
    pub fn with_overrides(
        overrides: IndexMap<String, ValueKind>,
        default_kind: Option<ValueKind>,
    ) -> Self {
        Self {
            overrides,
            default_kind,
        }
    }

    /// Keys with the reserved prefix never reach the output
    pub fn is_reserved(key: &str) -> bool {
        key.starts_with(RESERVED_KEY_PREFIX)
    }

    pub fn infer(&self, key: &str, raw: &str) -> Value {
        let forced = self.overrides.get(key).copied().or(self.default_kind);
        if let Some(kind) = forced {
            if let Some(value) = coerce(kind, raw) {
                return value;
            }
        }
        infer_from_text(raw)
    }
}

/// Apply rules 2-4 to `raw`
pub fn infer_from_text(raw: &str) -> Value {
    if looks_like_float(raw) {
        return parse_float(raw)
            .map(Value::Float)
            .unwrap_or_else(|| Value::Text(raw.to_string()));
    }

    if raw.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    raw.parse::<i64>()
        .map(Value::Integer)
        .unwrap_or_else(|_| Value::Text(raw.to_string()))
}

/// Parse `raw` as exactly `kind`
pub fn coerce(kind: ValueKind, raw: &str) -> Option<Value> {
    match kind {
        ValueKind::Float => parse_float(raw).map(Value::Float),
        ValueKind::Integer => raw.parse::<i64>().ok().map(Value::Integer),
        ValueKind::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Some(Value::Boolean(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Some(Value::Boolean(false))
            } else {
                None
            }
        }
        ValueKind::Text => Some(Value::Text(raw.to_string())),
    }
}

fn looks_like_float(raw: &str) -> bool {
    if raw.contains('.') {
        return true;
    }
    let lower = raw.to_ascii_lowercase();
    lower.contains("inf") || lower.contains("nan")
}

/// Parse a float, accepting Fortran `D` exponents
pub fn parse_float(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    raw.parse::<f64>().ok().or_else(|| {
        if raw.contains(['d', 'D']) {
            raw.replace(['d', 'D'], "e").parse::<f64>().ok()
        } else {
            None
        }
    })
}
