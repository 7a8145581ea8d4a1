//! Upload session query operations.
//!
//! CRUD for transient upload sessions, the explicit expiry query that
//! replaces a store-native TTL, and the atomic promotion of a session into
//! the video catalog.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use reelvault_common::{Error, Result, SessionId, VideoId};
use uuid::Uuid;

use crate::models::{UploadSession, Video, VideoDetails, VideoStatus};

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<UploadSession> {
    Ok(UploadSession {
        id: SessionId::from(Uuid::parse_str(&row.get::<_, String>(0)?).unwrap()),
        filename: row.get(1)?,
        original_name: row.get(2)?,
        file_size: row.get(3)?,
        content_type: row.get(4)?,
        duration_secs: row.get(5)?,
        width: row.get(6)?,
        height: row.get(7)?,
        bitrate: row.get(8)?,
        frame_rate: row.get(9)?,
        created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(10)?)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

const SESSION_COLUMNS: &str = "id, filename, original_name, file_size, content_type,
                duration_secs, width, height, bitrate, frame_rate, created_at";

/// Create a new upload session.
#[allow(clippy::too_many_arguments)]
pub fn create_session(
    conn: &Connection,
    filename: &str,
    original_name: &str,
    file_size: i64,
    content_type: &str,
    duration_secs: i64,
    width: i32,
    height: i32,
    bitrate: i64,
    frame_rate: f64,
) -> Result<UploadSession> {
    let id = SessionId::new();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO upload_sessions (id, filename, original_name, file_size, content_type,
             duration_secs, width, height, bitrate, frame_rate, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id.to_string(),
            filename,
            original_name,
            file_size,
            content_type,
            duration_secs,
            width,
            height,
            bitrate,
            frame_rate,
            now.to_rfc3339(),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(UploadSession {
        id,
        filename: filename.to_string(),
        original_name: original_name.to_string(),
        file_size,
        content_type: content_type.to_string(),
        duration_secs,
        width,
        height,
        bitrate,
        frame_rate,
        created_at: now,
    })
}

/// Get an upload session by ID.
pub fn get_session(conn: &Connection, id: SessionId) -> Result<UploadSession> {
    conn.query_row(
        &format!("SELECT {SESSION_COLUMNS} FROM upload_sessions WHERE id = ?"),
        [id.to_string()],
        row_to_session,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Error::session_not_found(id.to_string()),
        _ => Error::database(e.to_string()),
    })
}

/// Delete an upload session. Returns whether a row was removed.
pub fn delete_session(conn: &Connection, id: SessionId) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM upload_sessions WHERE id = ?", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(affected > 0)
}

/// List sessions created before the given cutoff, oldest first.
///
/// Used by the expiry sweep; timestamps are stored as RFC3339 in UTC so
/// lexicographic comparison matches chronological order.
pub fn list_expired(conn: &Connection, cutoff: DateTime<Utc>) -> Result<Vec<UploadSession>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM upload_sessions WHERE created_at < ?
             ORDER BY created_at"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let sessions = stmt
        .query_map([cutoff.to_rfc3339()], row_to_session)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(sessions)
}

/// Promote an upload session into a catalog entry.
///
/// Runs in a single transaction: the session row is deleted first (zero
/// affected rows means another finalize or the sweep got there already),
/// then the video row is inserted from the session's technical metadata
/// plus the supplied details. If the insert fails the transaction rolls
/// back and the session is untouched, so the caller can retry. The
/// delete-first ordering makes concurrent finalize single-admission.
pub fn promote(
    conn: &mut Connection,
    session_id: SessionId,
    details: &VideoDetails,
) -> Result<Video> {
    let tx = conn
        .transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let session = get_session(&tx, session_id)?;

    let affected = tx
        .execute(
            "DELETE FROM upload_sessions WHERE id = ?",
            [session_id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    if affected == 0 {
        return Err(Error::session_not_found(session_id.to_string()));
    }

    let id = VideoId::new();
    let now = Utc::now();
    let tags_json =
        serde_json::to_string(&details.tags).map_err(|e| Error::database(e.to_string()))?;

    tx.execute(
        "INSERT INTO videos (id, filename, original_name, title, description, tags, category,
             privacy, file_size, content_type, thumbnail, duration_secs, width, height,
             bitrate, frame_rate, views, status, uploaded_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
        params![
            id.to_string(),
            session.filename,
            session.original_name,
            details.title,
            details.description,
            tags_json,
            details.category,
            details.privacy.to_string(),
            session.file_size,
            session.content_type,
            details.thumbnail,
            session.duration_secs,
            session.width,
            session.height,
            session.bitrate,
            session.frame_rate,
            VideoStatus::Ready.to_string(),
            now.to_rfc3339(),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(Video {
        id,
        filename: session.filename,
        original_name: session.original_name,
        title: details.title.clone(),
        description: details.description.clone(),
        tags: details.tags.clone(),
        category: details.category.clone(),
        privacy: details.privacy,
        file_size: session.file_size,
        content_type: session.content_type,
        thumbnail: details.thumbnail.clone(),
        duration_secs: session.duration_secs,
        width: session.width,
        height: session.height,
        bitrate: session.bitrate,
        frame_rate: session.frame_rate,
        views: 0,
        status: VideoStatus::Ready,
        uploaded_at: now,
    })
}
