//! Predicate compiler
//!
//! Turns a condition tree into a `Predicate` that is interpreted directly
//! against instances of the target type.

mod compile;
mod predicate;
mod rule;


pub use compile::*;
pub use predicate::*;
pub use rule::*;
