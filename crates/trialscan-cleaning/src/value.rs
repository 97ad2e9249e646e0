//! Loosely typed cell values

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell as it arrives from a spreadsheet or CSV export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Missing,
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl RawValue {
    /// Interpret a CSV cell. Empty cells are missing; everything else is text.
    pub fn from_cell(cell: &str) -> Self {
        if cell.is_empty() {
            RawValue::Missing
        } else {
            RawValue::Text(cell.to_string())
        }
    }

    /// Missing, empty text, or NaN
    pub fn is_null(&self) -> bool {
        match self {
            RawValue::Missing => true,
            RawValue::Float(f) => f.is_nan(),
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Missing => "missing",
            RawValue::Integer(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Bool(_) => "bool",
            RawValue::Text(_) => "text",
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Integer(n)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Missing => write!(f, "nan"),
            RawValue::Integer(n) => write!(f, "{}", n),
            RawValue::Float(x) => write!(f, "{}", x),
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Text(s) => write!(f, "{}", s),
        }
    }
}
