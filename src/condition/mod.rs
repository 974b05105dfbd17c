//! Condition catalog and leaf expressions
//!
//! This module defines the operator set, which operators apply to which
//! value kinds, and the per-kind leaf predicates that carry an operator and
//! its operand.

mod catalog;
mod expression;

pub use catalog::*;
pub use expression::*;
