//! Property metadata and values
//!
//! Descriptors carry typed accessors so evaluation never looks a property
//! up by name; the registry resolves persisted `Type||Property` references
//! to descriptors.

mod descriptor;
mod registry;
mod value;


pub use descriptor::*;
pub use registry::*;
pub use value::*;
