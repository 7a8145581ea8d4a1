//! Reelvault-Common: shared identifiers and error types.
//!
//! Everything in here is depended on by every other reelvault crate, so it
//! stays small: typed UUID wrappers and the unified error taxonomy.

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::{SessionId, VideoId};
