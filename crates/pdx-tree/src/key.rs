//! Hashable lookup keys for entry maps.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Date, NumberValue, ScalarValue};

/// A scalar reduced to something that can be hashed and compared.
///
/// Strings compare by content regardless of quoting; numbers compare by
/// value, so `1`, `1.0` and `1.00` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// String key.
    Str(String),
    /// Integer key (also integral floats).
    Int(i64),
    /// Non-integral float, stored as its bit pattern.
    Float(u64),
    /// Date key.
    Date(Date),
}

impl Key {
    /// Key for a float; integral values collapse to [`Key::Int`].
    pub fn from_f64(f: f64) -> Self {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            Key::Int(f as i64)
        } else {
            Key::Float(f.to_bits())
        }
    }

    /// String contents, for string keys.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(i) => write!(f, "{i}"),
            Key::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            Key::Date(d) => write!(f, "{d}"),
        }
    }
}

impl From<&ScalarValue> for Key {
    fn from(value: &ScalarValue) -> Self {
        match value {
            ScalarValue::String(t) => Key::Str(t.value.clone()),
            ScalarValue::Number(n) => match n.value() {
                NumberValue::Int(i) => Key::Int(i),
                NumberValue::Float(f) => Key::from_f64(f),
            },
            ScalarValue::Date(d) => Key::Date(*d),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::Str(s.clone())
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<f64> for Key {
    fn from(f: f64) -> Self {
        Key::from_f64(f)
    }
}

impl From<Date> for Key {
    fn from(d: Date) -> Self {
        Key::Date(d)
    }
}
