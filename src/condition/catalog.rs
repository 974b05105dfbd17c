//! Condition operators and the value kinds they apply to

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::property::Number;

/// Comparison operators a leaf condition can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Contains,
    StartsWith,
    EndsWith,
    EqualTo,
    NotEqualTo,
    GreaterThan,
    LessThan,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
    IsEmpty,
    NotIsEmpty,
    IsNull,
    NotIsNull,
    Matches,
    DoesNotMatch,
    DoesNotContain,
    DoesNotStartWith,
    DoesNotEndWith,
}

impl Condition {
    /// Every operator, in declaration order
    pub const ALL: [Condition; 18] = [
        Condition::Contains,
        Condition::StartsWith,
        Condition::EndsWith,
        Condition::EqualTo,
        Condition::NotEqualTo,
        Condition::GreaterThan,
        Condition::LessThan,
        Condition::GreaterThanOrEqualTo,
        Condition::LessThanOrEqualTo,
        Condition::IsEmpty,
        Condition::NotIsEmpty,
        Condition::IsNull,
        Condition::NotIsNull,
        Condition::Matches,
        Condition::DoesNotMatch,
        Condition::DoesNotContain,
        Condition::DoesNotStartWith,
        Condition::DoesNotEndWith,
    ];

    /// Whether the operator compares against an operand value.
    ///
    /// Null and empty checks look only at the field itself.
    #[inline]
    pub fn requires_operand(self) -> bool {
        !matches!(
            self,
            Condition::IsEmpty | Condition::NotIsEmpty | Condition::IsNull | Condition::NotIsNull
        )
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Concrete width of a numeric property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
}

impl NumericType {
    /// Whether negative values are representable
    pub fn is_signed(self) -> bool {
        !matches!(
            self,
            NumericType::U8 | NumericType::U16 | NumericType::U32 | NumericType::U64
        )
    }

    /// Whether fractional values are representable
    pub fn is_decimal(self) -> bool {
        matches!(self, NumericType::F32 | NumericType::F64 | NumericType::Decimal)
    }

    /// Zero in the representation this type uses for operands
    pub fn zero(self) -> Number {
        match self {
            NumericType::F32 | NumericType::F64 => Number::Float(0.0),
            NumericType::Decimal => Number::Decimal(rust_decimal::Decimal::ZERO),
            t if t.is_signed() => Number::Signed(0),
            _ => Number::Unsigned(0),
        }
    }

    /// Whether `number` can be stored in a property of this type
    pub fn accepts(self, number: &Number) -> bool {
        fn in_range(n: &Number, min: i128, max: i128) -> bool {
            match *n {
                Number::Signed(v) => (min..=max).contains(&(v as i128)),
                Number::Unsigned(v) => (min..=max).contains(&(v as i128)),
                Number::Float(_) | Number::Decimal(_) => false,
            }
        }

        match self {
            NumericType::I8 => in_range(number, i8::MIN as i128, i8::MAX as i128),
            NumericType::U8 => in_range(number, 0, u8::MAX as i128),
            NumericType::I16 => in_range(number, i16::MIN as i128, i16::MAX as i128),
            NumericType::U16 => in_range(number, 0, u16::MAX as i128),
            NumericType::I32 => in_range(number, i32::MIN as i128, i32::MAX as i128),
            NumericType::U32 => in_range(number, 0, u32::MAX as i128),
            NumericType::I64 => in_range(number, i64::MIN as i128, i64::MAX as i128),
            NumericType::U64 => in_range(number, 0, u64::MAX as i128),
            NumericType::F32 | NumericType::F64 | NumericType::Decimal => true,
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumericType::I8 => "i8",
            NumericType::U8 => "u8",
            NumericType::I16 => "i16",
            NumericType::U16 => "u16",
            NumericType::I32 => "i32",
            NumericType::U32 => "u32",
            NumericType::I64 => "i64",
            NumericType::U64 => "u64",
            NumericType::F32 => "f32",
            NumericType::F64 => "f64",
            NumericType::Decimal => "decimal",
        };
        f.write_str(name)
    }
}

/// Semantic type family of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "numeric_type", rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Boolean,
    Numeric(NumericType),
    DateTime,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::String => f.write_str("string"),
            ValueKind::Boolean => f.write_str("boolean"),
            ValueKind::Numeric(t) => write!(f, "numeric ({})", t),
            ValueKind::DateTime => f.write_str("date-time"),
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

const STRING_CONDITIONS: &[Condition] = &[
    Condition::Contains,
    Condition::DoesNotContain,
    Condition::StartsWith,
    Condition::DoesNotStartWith,
    Condition::EndsWith,
    Condition::DoesNotEndWith,
    Condition::EqualTo,
    Condition::NotEqualTo,
    Condition::GreaterThan,
    Condition::GreaterThanOrEqualTo,
    Condition::LessThan,
    Condition::LessThanOrEqualTo,
    Condition::IsEmpty,
    Condition::NotIsEmpty,
    Condition::IsNull,
    Condition::NotIsNull,
];

const BOOLEAN_CONDITIONS: &[Condition] = &[Condition::EqualTo];

/// Shared by numeric and date-time values
const ORDERED_CONDITIONS: &[Condition] = &[
    Condition::EqualTo,
    Condition::NotEqualTo,
    Condition::GreaterThan,
    Condition::GreaterThanOrEqualTo,
    Condition::LessThan,
    Condition::LessThanOrEqualTo,
    Condition::IsNull,
    Condition::NotIsNull,
];

/// Operators the compiler accepts for a value kind
pub fn supported_conditions(kind: ValueKind) -> &'static [Condition] {
    match kind {
        ValueKind::String => STRING_CONDITIONS,
        ValueKind::Boolean => BOOLEAN_CONDITIONS,
        ValueKind::Numeric(_) | ValueKind::DateTime => ORDERED_CONDITIONS,
    }
}

/// Check whether `condition` is valid for `kind`
#[inline]
pub fn is_supported(kind: ValueKind, condition: Condition) -> bool {
    supported_conditions(kind).contains(&condition)
}
