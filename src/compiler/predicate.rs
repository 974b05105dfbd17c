//! Executable predicate tree

use std::fmt;

use crate::condition::DataTypeExpression;
use crate::property::PropertyDescriptor;

use super::rule::LeafRule;

/// One leaf: read the property, test it against the rule
pub struct CompiledCondition<T> {
    property: PropertyDescriptor<T>,
    expression: DataTypeExpression,
    rule: LeafRule,
}

impl<T> CompiledCondition<T> {
    pub(crate) fn new(
        property: PropertyDescriptor<T>,
        expression: DataTypeExpression,
        rule: LeafRule,
    ) -> Self {
        Self {
            property,
            expression,
            rule,
        }
    }

    #[inline]
    pub fn property(&self) -> &PropertyDescriptor<T> {
        &self.property
    }

    #[inline]
    pub fn rule(&self) -> &LeafRule {
        &self.rule
    }

    #[inline]
    pub fn matches(&self, item: &T) -> bool {
        self.rule.evaluate(&self.property.get_value(item))
    }
}

/// Compiled condition tree, evaluated left to right with short-circuiting
pub enum Predicate<T> {
    Leaf(CompiledCondition<T>),
    And(Box<Predicate<T>>, Box<Predicate<T>>),
    Or(Box<Predicate<T>>, Box<Predicate<T>>),
}

impl<T> Predicate<T> {
    pub fn matches(&self, item: &T) -> bool {
        match self {
            Predicate::Leaf(leaf) => leaf.matches(item),
            Predicate::And(left, right) => left.matches(item) && right.matches(item),
            Predicate::Or(left, right) => left.matches(item) || right.matches(item),
        }
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            Predicate::Leaf(_) => 1,
            Predicate::And(left, right) | Predicate::Or(left, right) => {
                left.leaf_count() + right.leaf_count()
            }
        }
    }
}

/// Evaluate a possibly absent predicate; absent accepts everything
#[inline]
pub fn evaluate<T>(predicate: Option<&Predicate<T>>, item: &T) -> bool {
    predicate.map_or(true, |p| p.matches(item))
}

impl<T> Clone for CompiledCondition<T> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
            expression: self.expression.clone(),
            rule: self.rule.clone(),
        }
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        match self {
            Predicate::Leaf(leaf) => Predicate::Leaf(leaf.clone()),
            Predicate::And(l, r) => Predicate::And(l.clone(), r.clone()),
            Predicate::Or(l, r) => Predicate::Or(l.clone(), r.clone()),
        }
    }
}

impl<T> fmt::Debug for CompiledCondition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCondition")
            .field("property", &self.property.name())
            .field("rule", &self.rule)
            .finish()
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Leaf(leaf) => f.debug_tuple("Leaf").field(leaf).finish(),
            Predicate::And(l, r) => f.debug_tuple("And").field(l).field(r).finish(),
            Predicate::Or(l, r) => f.debug_tuple("Or").field(l).field(r).finish(),
        }
    }
}

/// Renders the fold shape, e.g. `((Age GreaterThan 1 AND Age LessThan 9) OR Name IsNull)`
impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Leaf(leaf) => write!(f, "{} {}", leaf.property.name(), leaf.expression),
            Predicate::And(l, r) => write!(f, "({} AND {})", l, r),
            Predicate::Or(l, r) => write!(f, "({} OR {})", l, r),
        }
    }
}
