//! Condition tree
//!
//! Groups and leaf conditions stored in an arena, with id-based parent
//! links, bottom-up change notifications and lazy property resolution.

mod arena;
mod node;
mod notify;
mod resolve;


pub use arena::*;
pub use node::*;
pub use notify::{ListenerId, TreeUpdate};
pub use resolve::*;
