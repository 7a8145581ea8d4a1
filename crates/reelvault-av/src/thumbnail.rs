//! FFmpeg single-frame thumbnail generation.

use std::path::Path;
use std::process::Command;

use crate::{Error, Result};

/// Thumbnail width in pixels.
pub const THUMB_WIDTH: u32 = 480;
/// Thumbnail height in pixels.
pub const THUMB_HEIGHT: u32 = 270;

/// Generate a JPEG thumbnail from a video file.
///
/// Grabs one frame at `offset_secs` into the media and scales/crops it to
/// 480x270. The output path's parent directory must already exist.
pub fn generate(input: &Path, output: &Path, offset_secs: u32) -> Result<()> {
    tracing::debug!(
        input = %input.display(),
        output = %output.display(),
        offset_secs,
        "running ffmpeg for thumbnail"
    );

    let filter = format!(
        "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}",
        w = THUMB_WIDTH,
        h = THUMB_HEIGHT
    );

    let result = Command::new("ffmpeg")
        .arg("-i")
        .arg(input)
        .args(["-ss", &offset_secs.to_string(), "-vframes", "1", "-vf"])
        .arg(&filter)
        .args(["-q:v", "2", "-y"])
        .arg(output)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffmpeg")
            } else {
                Error::Io(e)
            }
        })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(Error::tool_failed("ffmpeg", stderr.to_string()));
    }

    // ffmpeg can exit 0 without writing a frame (e.g. offset past EOF on
    // some builds), so verify the file landed.
    if !output.exists() {
        return Err(Error::tool_failed(
            "ffmpeg",
            "no thumbnail frame was written",
        ));
    }

    Ok(())
}

/// Build the thumbnail filename for a stored video filename:
/// `thumb-<stem>.jpg`.
pub fn thumbnail_name(video_filename: &str) -> String {
    let stem = match video_filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => video_filename,
    };
    format!("thumb-{}.jpg", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_name() {
        assert_eq!(thumbnail_name("video-abc123.mp4"), "thumb-video-abc123.jpg");
        assert_eq!(thumbnail_name("video-abc123.webm"), "thumb-video-abc123.jpg");
        assert_eq!(thumbnail_name("noext"), "thumb-noext.jpg");
    }

    #[test]
    fn test_generate_fails_on_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.mp4");
        let output = dir.path().join("thumb.jpg");

        // Either ffmpeg is absent (ToolNotFound) or it rejects the missing
        // input (ToolFailed); both are errors.
        assert!(generate(&input, &output, 1).is_err());
    }
}
