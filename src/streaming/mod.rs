//! Catalog lookup for playback.
//!
//! Streaming accepts either a video ID or a stored filename as the
//! identifier; only `ready` entries are playable.

pub mod range;

use reelvault_common::{Error, Result, VideoId};
use reelvault_db::models::{Video, VideoStatus};
use reelvault_db::queries::videos;
use rusqlite::Connection;

/// Resolve a playable catalog entry from an ID or filename.
///
/// ID-shaped identifiers are tried against the primary key first, then
/// everything falls back to a filename lookup. Entries that are not
/// `ready` are reported as absent rather than leaking their state.
pub fn resolve_ready(conn: &Connection, identifier: &str) -> Result<Video> {
    let by_id = match identifier.parse::<VideoId>() {
        Ok(id) => match videos::get_video(conn, id) {
            Ok(video) => Some(video),
            Err(Error::NotFound(_)) => None,
            Err(e) => return Err(e),
        },
        Err(_) => None,
    };

    let video = match by_id {
        Some(video) => video,
        None => videos::get_video_by_filename(conn, identifier)?
            .ok_or_else(|| Error::not_found(format!("video {}", identifier)))?,
    };

    if video.status != VideoStatus::Ready {
        return Err(Error::not_found(format!("video {}", identifier)));
    }

    Ok(video)
}
