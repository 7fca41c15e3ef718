//! Service layer for business logic
//!
//! Link creation and retrieval, independent of the HTTP surface.

mod creation;
mod lifecycle;
mod retrieval;

pub use creation::*;
pub use lifecycle::*;
pub use retrieval::*;
