//! Dynamically typed property values

use chrono::NaiveDateTime;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Numeric operand or field value
///
/// Values of different representations compare by numeric value, so a
/// `u8` field can be tested against a signed operand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "repr", content = "value", rename_all = "snake_case")]
pub enum Number {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Decimal(Decimal),
}

impl Number {
    /// Three-way numeric comparison. `None` when either side is NaN.
    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        use Number::*;

        match (*self, *other) {
            (Signed(a), Signed(b)) => Some(a.cmp(&b)),
            (Unsigned(a), Unsigned(b)) => Some(a.cmp(&b)),
            (Signed(a), Unsigned(b)) => Some((a as i128).cmp(&(b as i128))),
            (Unsigned(a), Signed(b)) => Some((a as i128).cmp(&(b as i128))),
            (Decimal(a), Decimal(b)) => Some(a.cmp(&b)),
            (Decimal(a), b) => compare_decimal(a, b),
            (a, Decimal(b)) => compare_decimal(b, a).map(Ordering::reverse),
            (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
        }
    }

    /// Lossy conversion used for float comparisons
    pub fn to_f64(&self) -> f64 {
        match *self {
            Number::Signed(v) => v as f64,
            Number::Unsigned(v) => v as f64,
            Number::Float(v) => v,
            Number::Decimal(v) => v.to_f64().unwrap_or(f64::NAN),
        }
    }
}

fn compare_decimal(a: Decimal, b: Number) -> Option<Ordering> {
    let b = match b {
        Number::Signed(v) => Decimal::from(v),
        Number::Unsigned(v) => Decimal::from(v),
        Number::Decimal(v) => v,
        // Out of decimal range or NaN: fall back to float ordering
        Number::Float(v) => match Decimal::from_f64(v) {
            Some(d) => d,
            None => return a.to_f64()?.partial_cmp(&v),
        },
    };
    Some(a.cmp(&b))
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Signed(v) => write!(f, "{}", v),
            Number::Unsigned(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
            Number::Decimal(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Number {
                fn from(v: $source) -> Self {
                    Number::$variant(v as $target)
                }
            }
        )*
    };
}

number_from!(Signed as i64: i8, i16, i32, i64);
number_from!(Unsigned as u64: u8, u16, u32, u64);
number_from!(Float as f64: f32, f64);

impl From<Decimal> for Number {
    fn from(v: Decimal) -> Self {
        Number::Decimal(v)
    }
}

/// Value read from (or written to) a property of a target instance
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    String(String),
    Number(Number),
    DateTime(NaiveDateTime),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(d) => Some(*d),
            _ => None,
        }
    }

    /// Ordering between two numbers or two date-times; `None` for anything else
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.compare(b),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Short name of the carried representation, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::DateTime(_) => "date-time",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::DateTime(d) => write!(f, "{}", d),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Value::Number(v)
    }
}

macro_rules! value_from_number {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Value::Number(Number::from(v))
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, Decimal);

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
