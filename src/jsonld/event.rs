//! Structural JSON events
//!
//! The tokenizer produces these; the statement engine consumes them.

use serde_json::Number;
use std::fmt;

/// A decoded JSON scalar
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(Number),
    Boolean(bool),
    Null,
}

impl Scalar {
    /// Borrow the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the JSON type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::String(_) => "string",
            Scalar::Number(_) => "number",
            Scalar::Boolean(_) => "boolean",
            Scalar::Null => "null",
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Boolean(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Number(i.into())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "{:?}", s),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Boolean(b) => write!(f, "{}", b),
            Scalar::Null => write!(f, "null"),
        }
    }
}

/// One structural event of a JSON document
#[derive(Debug, Clone, PartialEq)]
pub enum JsonEvent {
    ObjectBegin,
    ObjectEnd,
    ArrayBegin,
    ArrayEnd,
    Key(String),
    Scalar(Scalar),
}

impl JsonEvent {
    /// Short description, for error messages and traces
    pub fn describe(&self) -> String {
        match self {
            JsonEvent::ObjectBegin => "'{'".to_string(),
            JsonEvent::ObjectEnd => "'}'".to_string(),
            JsonEvent::ArrayBegin => "'['".to_string(),
            JsonEvent::ArrayEnd => "']'".to_string(),
            JsonEvent::Key(k) => format!("key {:?}", k),
            JsonEvent::Scalar(s) => format!("{} {}", s.type_name(), s),
        }
    }
}
