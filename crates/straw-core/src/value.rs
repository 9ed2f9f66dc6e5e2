use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Failure;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

pub type PropertyMap = BTreeMap<String, StrawValue>;

impl StrawValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0,
            Self::String(value) => !value.is_empty(),
        }
    }

    /// Equality across kinds: numbers compare numerically, everything else
    /// only equals a value of the same kind.
    pub fn loosely_equals(&self, other: &StrawValue) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Natural ordering of the operand kind. Mixing kinds (other than the two
    /// numeric ones) or comparing NaN is an internal failure.
    pub fn compare(&self, other: &StrawValue) -> Result<Ordering, Failure> {
        let ordering = match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => {
                    return Err(Failure::internal(format!(
                        "Cannot compare {} with {}",
                        self.type_name(),
                        other.type_name()
                    )))
                }
            },
        };

        ordering.ok_or_else(|| {
            Failure::internal(format!("Values {} and {} are not ordered", self, other))
        })
    }

    /// Rendering used inside diagnostics: strings are quoted.
    pub fn to_literal(&self) -> String {
        match self {
            Self::String(value) => format!("\"{}\"", value.replace('"', "\\\"")),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for StrawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::Int(value) => write!(f, "{}", value),
            Self::Float(value) => {
                if value.is_finite() && value.fract() == 0.0 {
                    write!(f, "{:.1}", value)
                } else {
                    write!(f, "{}", value)
                }
            }
            Self::String(value) => f.write_str(value),
        }
    }
}

impl From<bool> for StrawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for StrawValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for StrawValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for StrawValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for StrawValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for StrawValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
