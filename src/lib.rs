//! Reelvault: self-hosted video upload and streaming server.
//!
//! Publishing is two-phase: stage 1 stores the raw upload and records a
//! transient session, stage 2 attaches descriptive details and promotes the
//! session into the durable catalog. Playback is range-only HTTP streaming
//! over the stored files.
//!
//! # Modules
//!
//! - `config` - TOML configuration loading and validation
//! - `storage` - media object storage (videos and thumbnails)
//! - `upload` - the two-phase upload pipeline and expiry sweep
//! - `streaming` - range parsing and catalog lookup for playback
//! - `server` - axum HTTP surface

pub mod config;
pub mod server;
pub mod storage;
pub mod streaming;
pub mod upload;
