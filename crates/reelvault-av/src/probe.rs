//! FFprobe-based video metadata extraction.
//!
//! Runs `ffprobe` with JSON output and pulls out the handful of fields the
//! upload pipeline records: duration, resolution, bitrate, frame rate.

use serde::Deserialize;
use std::path::Path;
use std::process::Command;

use crate::{Error, Result};

/// Technical metadata extracted from a video file.
///
/// All fields default to zero when the source does not report them, so a
/// partially-probed file still produces a usable record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VideoMetadata {
    /// Duration in whole seconds, rounded.
    pub duration_secs: i64,
    pub width: i32,
    pub height: i32,
    /// Overall bitrate in bits per second.
    pub bitrate: i64,
    /// Frames per second of the primary video stream.
    pub frame_rate: f64,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<i32>,
    height: Option<i32>,
    r_frame_rate: Option<String>,
}

/// Probe a video file using ffprobe.
pub fn probe_video(path: &Path) -> Result<VideoMetadata> {
    tracing::debug!(path = %path.display(), "running ffprobe");

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffprobe")
            } else {
                Error::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffprobe", stderr.to_string()));
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error("ffprobe", format!("Invalid UTF-8: {}", e)))?;

    let ff_output: FfprobeOutput = serde_json::from_str(&json_str)?;

    Ok(parse_ffprobe_output(ff_output))
}

fn parse_ffprobe_output(output: FfprobeOutput) -> VideoMetadata {
    let duration_secs = output
        .format
        .duration
        .and_then(|s| s.parse::<f64>().ok())
        .map(|d| d.round() as i64)
        .unwrap_or(0);

    let bitrate = output
        .format
        .bit_rate
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0);

    let video_stream = output.streams.iter().find(|s| s.codec_type == "video");

    let (width, height, frame_rate) = match video_stream {
        Some(stream) => (
            stream.width.unwrap_or(0),
            stream.height.unwrap_or(0),
            stream
                .r_frame_rate
                .as_deref()
                .and_then(parse_frame_rate)
                .unwrap_or(0.0),
        ),
        None => (0, 0, 0.0),
    };

    VideoMetadata {
        duration_secs,
        width,
        height,
        bitrate,
        frame_rate,
    }
}

/// Parse ffprobe's fractional frame-rate string ("24000/1001") by explicit
/// numerator/denominator division. Plain decimal strings also parse.
fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let parts: Vec<&str> = rate_str.split('/').collect();
    if parts.len() == 2 {
        let num: f64 = parts[0].parse().ok()?;
        let den: f64 = parts[1].parse().ok()?;
        if den != 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate_str.parse().ok()
}
