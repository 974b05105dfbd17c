//! Compiled leaf rules
//!
//! A `LeafRule` is a leaf expression with its null handling already
//! decided, so evaluation is a single match over the field value.

use std::cmp::Ordering;

use crate::condition::{is_supported, Condition, DataTypeExpression};
use crate::error::{FilterError, Result};
use crate::property::Value;

/// Ordering test shared by numeric, date-time and string comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    fn from_condition(condition: Condition) -> Option<Self> {
        match condition {
            Condition::EqualTo => Some(Comparison::Equal),
            Condition::GreaterThan => Some(Comparison::Greater),
            Condition::GreaterThanOrEqualTo => Some(Comparison::GreaterOrEqual),
            Condition::LessThan => Some(Comparison::Less),
            Condition::LessThanOrEqualTo => Some(Comparison::LessOrEqual),
            _ => None,
        }
    }

    #[inline]
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Equal => ordering == Ordering::Equal,
            Comparison::Greater => ordering == Ordering::Greater,
            Comparison::GreaterOrEqual => ordering != Ordering::Less,
            Comparison::Less => ordering == Ordering::Less,
            Comparison::LessOrEqual => ordering != Ordering::Greater,
        }
    }
}

/// Substring-style string test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Contains,
    StartsWith,
    EndsWith,
    Equals,
}

impl TextMatch {
    #[inline]
    fn test(self, field: &str, operand: &str) -> bool {
        match self {
            TextMatch::Contains => field.contains(operand),
            TextMatch::StartsWith => field.starts_with(operand),
            TextMatch::EndsWith => field.ends_with(operand),
            TextMatch::Equals => field == operand,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeafRule {
    /// Outcome fixed at compile time (null checks on non-nullable fields)
    Constant(bool),
    Null { negated: bool },
    /// String equals `""`; null is not empty
    Empty { negated: bool },
    /// Guarded text test: false on a null or empty field, then negated
    Text {
        matcher: TextMatch,
        operand: String,
        negated: bool,
    },
    /// Case-insensitive ordering, null sorts first
    TextOrder {
        comparison: Comparison,
        operand: String,
    },
    Flag(bool),
    /// Ordering against a non-null field
    Compare {
        comparison: Comparison,
        operand: Value,
    },
    /// Field is null or differs from the operand
    Differs(Value),
}

impl LeafRule {
    /// Build the rule for `expression` on a field of the given nullability
    ///
    /// Fails when the operator is not in the catalog for the expression's
    /// kind. Returns `None` when the operand is missing or unusable.
    pub fn compile(expression: &DataTypeExpression, nullable: bool) -> Result<Option<Self>> {
        let condition = expression.selected_condition();
        let kind = expression.value_kind();
        if !is_supported(kind, condition) {
            return Err(FilterError::unsupported(condition, kind));
        }
        if !expression.is_valid() {
            return Ok(None);
        }

        let rule = match expression {
            DataTypeExpression::String(e) => string_rule(condition, e.value.as_deref()),
            DataTypeExpression::Boolean(e) => Some(LeafRule::Flag(e.value)),
            DataTypeExpression::Numeric(e) => {
                ordered_rule(condition, e.value.map(Value::Number), nullable)
            }
            DataTypeExpression::DateTime(e) => {
                ordered_rule(condition, e.value.map(Value::DateTime), nullable)
            }
        };
        Ok(rule)
    }

    /// Evaluate against a field value
    pub fn evaluate(&self, value: &Value) -> bool {
        match self {
            LeafRule::Constant(outcome) => *outcome,
            LeafRule::Null { negated } => value.is_null() != *negated,
            LeafRule::Empty { negated } => (value.as_str() == Some("")) != *negated,
            LeafRule::Text {
                matcher,
                operand,
                negated,
            } => {
                let hit = match value.as_str() {
                    Some(field) if !field.is_empty() => matcher.test(field, operand),
                    _ => false,
                };
                hit != *negated
            }
            LeafRule::TextOrder {
                comparison,
                operand,
            } => comparison.holds(compare_ignore_case(value.as_str(), operand)),
            LeafRule::Flag(expected) => value.as_bool() == Some(*expected),
            LeafRule::Compare {
                comparison,
                operand,
            } => value
                .compare(operand)
                .is_some_and(|ordering| comparison.holds(ordering)),
            LeafRule::Differs(operand) => {
                value.is_null() || value.compare(operand) != Some(Ordering::Equal)
            }
        }
    }
}

fn string_rule(condition: Condition, operand: Option<&str>) -> Option<LeafRule> {
    let text = |matcher, negated| {
        operand.map(|operand| LeafRule::Text {
            matcher,
            operand: operand.to_string(),
            negated,
        })
    };

    match condition {
        Condition::Contains => text(TextMatch::Contains, false),
        Condition::DoesNotContain => text(TextMatch::Contains, true),
        Condition::StartsWith => text(TextMatch::StartsWith, false),
        Condition::DoesNotStartWith => text(TextMatch::StartsWith, true),
        Condition::EndsWith => text(TextMatch::EndsWith, false),
        Condition::DoesNotEndWith => text(TextMatch::EndsWith, true),
        Condition::EqualTo => text(TextMatch::Equals, false),
        Condition::NotEqualTo => text(TextMatch::Equals, true),
        Condition::IsEmpty => Some(LeafRule::Empty { negated: false }),
        Condition::NotIsEmpty => Some(LeafRule::Empty { negated: true }),
        Condition::IsNull => Some(LeafRule::Null { negated: false }),
        Condition::NotIsNull => Some(LeafRule::Null { negated: true }),
        other => {
            let comparison = Comparison::from_condition(other)?;
            operand.map(|operand| LeafRule::TextOrder {
                comparison,
                operand: operand.to_string(),
            })
        }
    }
}

fn ordered_rule(condition: Condition, operand: Option<Value>, nullable: bool) -> Option<LeafRule> {
    match condition {
        Condition::IsNull if nullable => Some(LeafRule::Null { negated: false }),
        Condition::IsNull => Some(LeafRule::Constant(false)),
        Condition::NotIsNull if nullable => Some(LeafRule::Null { negated: true }),
        Condition::NotIsNull => Some(LeafRule::Constant(true)),
        Condition::NotEqualTo => operand.map(LeafRule::Differs),
        other => {
            let comparison = Comparison::from_condition(other)?;
            operand.map(|operand| LeafRule::Compare {
                comparison,
                operand,
            })
        }
    }
}

/// Ordinal compare of the lowercased chars; null sorts first
///
/// This is not culture-aware collation. Strings are ordered by code point
/// after lowercasing, so `"a-b"` sorts before `"ab"` because `-` precedes
/// every letter.
fn compare_ignore_case(field: Option<&str>, operand: &str) -> Ordering {
    match field {
        Some(field) => field
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(operand.chars().flat_map(char::to_lowercase)),
        None => Ordering::Less,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{
        BooleanExpression, DateTimeExpression, NumericExpression, NumericType, StringExpression,
    };
    use crate::property::Number;
    use crate::test_support::date;

    fn string(condition: Condition, value: Option<&str>) -> LeafRule {
        let expression = DataTypeExpression::String(StringExpression {
            selected_condition: condition,
            value: value.map(str::to_string),
        });
        LeafRule::compile(&expression, true).unwrap().unwrap()
    }

    fn int(condition: Condition, value: i64, nullable: bool) -> LeafRule {
        let expression = DataTypeExpression::Numeric(NumericExpression {
            numeric_type: NumericType::I32,
            selected_condition: condition,
            value: Some(Number::Signed(value)),
            is_nullable: nullable,
        });
        LeafRule::compile(&expression, nullable).unwrap().unwrap()
    }

    #[test]
    fn test_contains_is_guarded_against_null_and_empty() {
        let rule = string(Condition::Contains, Some(""));
        assert!(rule.evaluate(&Value::from("abc")));
        assert!(!rule.evaluate(&Value::Null));
        assert!(!rule.evaluate(&Value::from("")));

        let rule = string(Condition::DoesNotContain, Some("x"));
        assert!(rule.evaluate(&Value::Null));
        assert!(rule.evaluate(&Value::from("abc")));
        assert!(!rule.evaluate(&Value::from("xyz")));
    }

    #[test]
    fn test_contains_is_case_sensitive() {
        let rule = string(Condition::Contains, Some("oh"));
        assert!(rule.evaluate(&Value::from("John")));
        assert!(!rule.evaluate(&Value::from("JOHN")));
    }

    #[test]
    fn test_string_equality() {
        let rule = string(Condition::EqualTo, Some("Anna"));
        assert!(rule.evaluate(&Value::from("Anna")));
        assert!(!rule.evaluate(&Value::from("anna")));
        assert!(!rule.evaluate(&Value::Null));

        let rule = string(Condition::NotEqualTo, Some("Anna"));
        assert!(rule.evaluate(&Value::Null));
        assert!(!rule.evaluate(&Value::from("Anna")));
    }

    #[test]
    fn test_string_null_and_empty_checks() {
        let is_null = string(Condition::IsNull, None);
        let not_null = string(Condition::NotIsNull, None);
        let is_empty = string(Condition::IsEmpty, None);
        let not_empty = string(Condition::NotIsEmpty, None);

        assert!(is_null.evaluate(&Value::Null));
        assert!(!not_null.evaluate(&Value::Null));
        assert!(not_null.evaluate(&Value::from("")));

        assert!(is_empty.evaluate(&Value::from("")));
        assert!(!is_empty.evaluate(&Value::Null));
        assert!(not_empty.evaluate(&Value::Null));
        assert!(not_empty.evaluate(&Value::from("a")));
    }

    #[test]
    fn test_string_ordering_ignores_case() {
        let rule = string(Condition::GreaterThan, Some("b"));
        assert!(rule.evaluate(&Value::from("C")));
        assert!(!rule.evaluate(&Value::from("B")));
        assert!(!rule.evaluate(&Value::Null));

        let rule = string(Condition::LessThanOrEqualTo, Some("b"));
        assert!(rule.evaluate(&Value::from("B")));
        assert!(rule.evaluate(&Value::from("A")));
        assert!(rule.evaluate(&Value::Null));
    }

    #[test]
    fn test_string_ordering_is_ordinal() {
        let rule = string(Condition::LessThan, Some("ab"));
        assert!(rule.evaluate(&Value::from("A-B")));
        assert!(!rule.evaluate(&Value::from("aB")));
        assert!(!rule.evaluate(&Value::from("b")));
    }

    #[test]
    fn test_numeric_null_handling() {
        let greater = int(Condition::GreaterThan, 5, true);
        assert!(!greater.evaluate(&Value::Null));
        assert!(greater.evaluate(&Value::from(6)));

        let not_equal = int(Condition::NotEqualTo, 5, true);
        assert!(not_equal.evaluate(&Value::Null));
        assert!(not_equal.evaluate(&Value::from(4)));
        assert!(!not_equal.evaluate(&Value::from(5)));
    }

    #[test]
    fn test_null_checks_on_non_nullable_fields_are_constant() {
        assert_eq!(int(Condition::IsNull, 0, false), LeafRule::Constant(false));
        assert_eq!(int(Condition::NotIsNull, 0, false), LeafRule::Constant(true));
        assert_eq!(int(Condition::IsNull, 0, true), LeafRule::Null { negated: false });
    }

    #[test]
    fn test_numeric_compares_across_representations() {
        let rule = int(Condition::GreaterThanOrEqualTo, 18, false);
        assert!(rule.evaluate(&Value::from(18u8)));
        assert!(rule.evaluate(&Value::from(18.5f64)));
        assert!(!rule.evaluate(&Value::from(17u64)));
    }

    #[test]
    fn test_boolean_requires_value() {
        let expression = DataTypeExpression::Boolean(BooleanExpression::new(true));
        let rule = LeafRule::compile(&expression, true).unwrap().unwrap();
        assert!(rule.evaluate(&Value::from(true)));
        assert!(!rule.evaluate(&Value::from(false)));
        assert!(!rule.evaluate(&Value::Null));
    }

    #[test]
    fn test_date_time_ordering() {
        let expression = DataTypeExpression::DateTime(DateTimeExpression {
            selected_condition: Condition::LessThan,
            value: Some(date(2000, 1, 1)),
            is_nullable: true,
        });
        let rule = LeafRule::compile(&expression, true).unwrap().unwrap();
        assert!(rule.evaluate(&Value::from(date(1999, 12, 31))));
        assert!(!rule.evaluate(&Value::from(date(2000, 1, 1))));
        assert!(!rule.evaluate(&Value::Null));
    }

    #[test]
    fn test_unsupported_operator_errors() {
        let mut expression = DataTypeExpression::Boolean(BooleanExpression::new(false));
        expression.set_condition(Condition::GreaterThan);
        let err = LeafRule::compile(&expression, false).unwrap_err();
        assert_eq!(
            err,
            FilterError::unsupported(Condition::GreaterThan, expression.value_kind())
        );

        let mut expression = DataTypeExpression::String(StringExpression::default());
        expression.set_condition(Condition::Matches);
        assert!(LeafRule::compile(&expression, true).is_err());
    }

    #[test]
    fn test_missing_operand_compiles_to_none() {
        let expression = DataTypeExpression::String(StringExpression {
            selected_condition: Condition::StartsWith,
            value: None,
        });
        assert_eq!(LeafRule::compile(&expression, true).unwrap(), None);
    }
}
