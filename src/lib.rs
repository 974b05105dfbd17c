//! Condition Filter Core - typed condition trees compiled into predicates
//!
//! Build a tree of AND/OR groups and typed property conditions over any
//! target type, compile it into a `Predicate`, and apply it to collections.
//!
//! ```ignore
//! let mut scheme = FilterScheme::new("Adults", "Person");
//! let root = scheme.tree().roots()[0];
//! scheme.tree_mut().add_condition(Some(root), PropertyCondition::new(age))?;
//! scheme.apply(&people, &mut adults)?;
//! ```

pub mod compiler;
pub mod condition;
pub mod config;
pub mod error;
pub mod filter;
pub mod property;
pub mod scheme;
pub mod session;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use compiler::{compile, evaluate, Predicate};
pub use condition::{Condition, DataTypeExpression, NumericType, ValueKind};
pub use config::FilterSettings;
pub use error::{FilterError, Result};
pub use filter::{apply, FilterTarget, ObservableVec};
pub use property::{
    Number, PropertyCollection, PropertyDescriptor, PropertyProvider, PropertyRegistry, Value,
};
pub use scheme::FilterScheme;
pub use session::FilterSession;
pub use tree::{Combinator, ConditionTree, NodeId, PropertyCondition};
