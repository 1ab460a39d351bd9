//! Typed attribute values.
//!
//! Every synchronized field is either numeric or text. The type is fixed when
//! the schema is registered (by trying to read the declared default as a
//! number) and every later write is coerced to it.

use crate::error::CoerceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use winnow::ascii::{float, multispace0};
use winnow::combinator::delimited;
use winnow::prelude::*;

/// The declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrType {
    Number,
    Text,
}

/// A field value as it travels between backend and frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

impl AttrValue {
    /// Read a declared default: numeric if the literal parses as a number,
    /// text otherwise.
    pub fn infer(literal: &str) -> Self {
        match parse_number(literal).filter(|n| n.is_finite()) {
            Some(n) => AttrValue::Number(n),
            None => AttrValue::Text(literal.to_string()),
        }
    }

    pub fn ty(&self) -> AttrType {
        match self {
            AttrValue::Number(_) => AttrType::Number,
            AttrValue::Text(_) => AttrType::Text,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Number(_) => None,
        }
    }

    /// Convert an incoming JSON value. Only numbers and strings are accepted.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CoerceError> {
        match value {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(AttrValue::Number)
                .ok_or_else(|| CoerceError::UnsupportedValue(value.to_string())),
            serde_json::Value::String(s) => Ok(AttrValue::Text(s.clone())),
            other => Err(CoerceError::UnsupportedValue(other.to_string())),
        }
    }

    /// Convert to JSON for state snapshots and schema export. Field writes
    /// never store a non-finite number; one built by hand becomes `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttrValue::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            AttrValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

/// Renders the value the way a DOM `setAttribute` call would stringify it.
impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) => f.write_str(&format_number(*n)),
            AttrValue::Text(s) => f.write_str(s),
        }
    }
}

impl AttrType {
    /// Coerce a value to this type.
    ///
    /// Text bound for a numeric field must parse as a finite number; NaN and
    /// infinities are rejected so numeric fields always serialize as JSON
    /// numbers. Numbers bound for a text field are stringified.
    pub fn coerce(self, value: AttrValue) -> Result<AttrValue, CoerceError> {
        match (self, value) {
            (AttrType::Number, AttrValue::Number(n)) if n.is_finite() => {
                Ok(AttrValue::Number(n))
            }
            (AttrType::Number, AttrValue::Number(n)) => {
                Err(CoerceError::NotNumeric(format_number(n)))
            }
            (AttrType::Number, AttrValue::Text(s)) => parse_number(&s)
                .filter(|n| n.is_finite())
                .map(AttrValue::Number)
                .ok_or(CoerceError::NotNumeric(s)),
            (AttrType::Text, AttrValue::Text(s)) => Ok(AttrValue::Text(s)),
            (AttrType::Text, AttrValue::Number(n)) => Ok(AttrValue::Text(format_number(n))),
        }
    }
}

// ─── Numeric parsing ─────────────────────────────────────────────────────

fn number(input: &mut &str) -> ModalResult<f64> {
    delimited(multispace0, float, multispace0).parse_next(input)
}

/// Parse a whole string as a number, allowing surrounding whitespace.
/// Returns `None` for empty strings and anything with trailing garbage.
pub fn parse_number(text: &str) -> Option<f64> {
    number.parse(text).ok()
}

/// Shortest text form of a number, matching JavaScript's number-to-string for
/// the common cases (`3` not `3.0`, `NaN`, `Infinity`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
