//! Filter application

mod apply;
mod observable;

pub use apply::*;
pub use observable::*;
