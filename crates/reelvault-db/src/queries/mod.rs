//! Database query operations.

pub mod sessions;
pub mod videos;
