//! Leaf predicates: one expression type per value kind
//!
//! An expression holds the selected operator and its operand. It does not
//! know which property it applies to; `PropertyCondition` binds the two.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::catalog::{Condition, NumericType, ValueKind};
use crate::property::Number;

/// String leaf predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringExpression {
    pub selected_condition: Condition,
    pub value: Option<String>,
}

impl Default for StringExpression {
    fn default() -> Self {
        Self {
            selected_condition: Condition::Contains,
            value: Some(String::new()),
        }
    }
}

/// Boolean leaf predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanExpression {
    pub selected_condition: Condition,
    pub value: bool,
    pub is_nullable: bool,
}

impl BooleanExpression {
    pub fn new(is_nullable: bool) -> Self {
        Self {
            selected_condition: Condition::EqualTo,
            value: true,
            is_nullable,
        }
    }
}

/// Numeric leaf predicate covering every integer width, floats and decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericExpression {
    pub numeric_type: NumericType,
    pub selected_condition: Condition,
    pub value: Option<Number>,
    pub is_nullable: bool,
}

impl NumericExpression {
    pub fn new(numeric_type: NumericType, is_nullable: bool) -> Self {
        Self {
            numeric_type,
            selected_condition: Condition::EqualTo,
            value: Some(numeric_type.zero()),
            is_nullable,
        }
    }

    #[inline]
    pub fn is_signed(&self) -> bool {
        self.numeric_type.is_signed()
    }

    #[inline]
    pub fn is_decimal(&self) -> bool {
        self.numeric_type.is_decimal()
    }
}

/// Date-time leaf predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeExpression {
    pub selected_condition: Condition,
    pub value: Option<NaiveDateTime>,
    pub is_nullable: bool,
}

impl DateTimeExpression {
    /// New expression comparing against the current local time
    pub fn new(is_nullable: bool) -> Self {
        Self {
            selected_condition: Condition::EqualTo,
            value: Some(Local::now().naive_local()),
            is_nullable,
        }
    }
}

/// Tagged union over the per-kind leaf predicates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataTypeExpression {
    String(StringExpression),
    Boolean(BooleanExpression),
    Numeric(NumericExpression),
    DateTime(DateTimeExpression),
}

impl DataTypeExpression {
    /// Default expression for a property of the given kind
    pub fn for_kind(kind: ValueKind, is_nullable: bool) -> Self {
        match kind {
            ValueKind::String => DataTypeExpression::String(StringExpression::default()),
            ValueKind::Boolean => DataTypeExpression::Boolean(BooleanExpression::new(is_nullable)),
            ValueKind::Numeric(t) => {
                DataTypeExpression::Numeric(NumericExpression::new(t, is_nullable))
            }
            ValueKind::DateTime => {
                DataTypeExpression::DateTime(DateTimeExpression::new(is_nullable))
            }
        }
    }

    pub fn value_kind(&self) -> ValueKind {
        match self {
            DataTypeExpression::String(_) => ValueKind::String,
            DataTypeExpression::Boolean(_) => ValueKind::Boolean,
            DataTypeExpression::Numeric(e) => ValueKind::Numeric(e.numeric_type),
            DataTypeExpression::DateTime(_) => ValueKind::DateTime,
        }
    }

    pub fn selected_condition(&self) -> Condition {
        match self {
            DataTypeExpression::String(e) => e.selected_condition,
            DataTypeExpression::Boolean(e) => e.selected_condition,
            DataTypeExpression::Numeric(e) => e.selected_condition,
            DataTypeExpression::DateTime(e) => e.selected_condition,
        }
    }

    /// Select another operator. Validity against the catalog is checked at compile time.
    pub fn set_condition(&mut self, condition: Condition) {
        match self {
            DataTypeExpression::String(e) => e.selected_condition = condition,
            DataTypeExpression::Boolean(e) => e.selected_condition = condition,
            DataTypeExpression::Numeric(e) => e.selected_condition = condition,
            DataTypeExpression::DateTime(e) => e.selected_condition = condition,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            DataTypeExpression::String(_) => true,
            DataTypeExpression::Boolean(e) => e.is_nullable,
            DataTypeExpression::Numeric(e) => e.is_nullable,
            DataTypeExpression::DateTime(e) => e.is_nullable,
        }
    }

    pub(crate) fn set_nullable(&mut self, is_nullable: bool) {
        match self {
            DataTypeExpression::String(_) => {}
            DataTypeExpression::Boolean(e) => e.is_nullable = is_nullable,
            DataTypeExpression::Numeric(e) => e.is_nullable = is_nullable,
            DataTypeExpression::DateTime(e) => e.is_nullable = is_nullable,
        }
    }

    /// Operand present when the operator needs one, and storable in the numeric width
    pub fn is_valid(&self) -> bool {
        if !self.selected_condition().requires_operand() {
            return true;
        }

        match self {
            DataTypeExpression::String(e) => e.value.is_some(),
            DataTypeExpression::Boolean(_) => true,
            DataTypeExpression::Numeric(e) => e
                .value
                .as_ref()
                .is_some_and(|v| e.numeric_type.accepts(v)),
            DataTypeExpression::DateTime(e) => e.value.is_some(),
        }
    }
}

impl fmt::Display for DataTypeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let condition = self.selected_condition();
        if !condition.requires_operand() {
            return write!(f, "{}", condition);
        }
        match self {
            DataTypeExpression::String(e) => match &e.value {
                Some(v) => write!(f, "{} {:?}", condition, v),
                None => write!(f, "{} <none>", condition),
            },
            DataTypeExpression::Boolean(e) => write!(f, "{} {}", condition, e.value),
            DataTypeExpression::Numeric(e) => match &e.value {
                Some(v) => write!(f, "{} {}", condition, v),
                None => write!(f, "{} <none>", condition),
            },
            DataTypeExpression::DateTime(e) => match &e.value {
                Some(v) => write!(f, "{} {}", condition, v),
                None => write!(f, "{} <none>", condition),
            },
        }
    }
}
