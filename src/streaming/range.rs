//! Strict byte-range parsing.
//!
//! Playback is range-only, so the parser is deliberately narrow: one
//! `bytes=start-[end]` range per request, nothing else.

use reelvault_common::{Error, Result};

/// An inclusive byte range already resolved against a file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes the range covers.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Parse a Range header value against the file size.
///
/// Accepted: `bytes=start-` (open end, served to the last byte) and
/// `bytes=start-end`, with an oversized end clamped to the last byte.
/// Rejected with `InvalidRange`: suffix ranges (`bytes=-N`), multi-range
/// sets, non-numeric bounds, a start at or past the file size, and a
/// start beyond the end.
pub fn parse_range(header: &str, file_size: u64) -> Result<ByteRange> {
    let spec = header
        .strip_prefix("bytes=")
        .ok_or_else(|| Error::invalid_range(format!("unsupported range unit in {:?}", header)))?;

    let (start_str, end_str) = spec
        .split_once('-')
        .ok_or_else(|| Error::invalid_range(format!("malformed range {:?}", header)))?;

    if start_str.is_empty() {
        return Err(Error::invalid_range("suffix ranges are not supported"));
    }

    let start: u64 = start_str
        .parse()
        .map_err(|_| Error::invalid_range(format!("invalid range start {:?}", start_str)))?;

    let end: u64 = if end_str.is_empty() {
        file_size.saturating_sub(1)
    } else {
        end_str
            .parse()
            .map_err(|_| Error::invalid_range(format!("invalid range end {:?}", end_str)))?
    };

    if start >= file_size {
        return Err(Error::invalid_range(format!(
            "start {} is outside the {}-byte file",
            start, file_size
        )));
    }

    let end = end.min(file_size.saturating_sub(1));
    if start > end {
        return Err(Error::invalid_range(format!(
            "start {} is beyond end {}",
            start, end
        )));
    }

    Ok(ByteRange { start, end })
}
