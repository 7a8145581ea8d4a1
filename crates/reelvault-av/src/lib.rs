//! Reelvault-AV: external media tool integration.
//!
//! Wraps the two external collaborators of the upload pipeline:
//!
//! - `probe` - ffprobe-based metadata extraction (duration, resolution,
//!   bitrate, frame rate)
//! - `thumbnail` - ffmpeg single-frame thumbnail generation
//! - `tools` - availability checks for the underlying binaries
//!
//! Both invocations are blocking external processes with no timeout; async
//! callers run them on a blocking task.

mod error;
pub mod probe;
pub mod thumbnail;
pub mod tools;

pub use error::{Error, Result};
pub use probe::{probe_video, VideoMetadata};
pub use tools::{check_tool_with_arg, check_tools, ToolInfo};
