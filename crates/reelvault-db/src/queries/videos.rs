//! Video catalog query operations.
//!
//! Lookup by ID or stored filename, ready-only listing, view counting, and
//! deletion. Creation happens exclusively through `sessions::promote`.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};
use reelvault_common::{Error, Result, VideoId};
use uuid::Uuid;

use crate::models::{Privacy, Video, VideoStatus, VideoSummary};

const VIDEO_COLUMNS: &str = "id, filename, original_name, title, description, tags, category,
                privacy, file_size, content_type, thumbnail, duration_secs, width, height,
                bitrate, frame_rate, views, status, uploaded_at";

fn row_to_video(row: &Row<'_>) -> rusqlite::Result<Video> {
    let tags_json: String = row.get(5)?;
    Ok(Video {
        id: VideoId::from(Uuid::parse_str(&row.get::<_, String>(0)?).unwrap()),
        filename: row.get(1)?,
        original_name: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        category: row.get(6)?,
        privacy: row.get::<_, String>(7)?.parse().unwrap_or(Privacy::Public),
        file_size: row.get(8)?,
        content_type: row.get(9)?,
        thumbnail: row.get(10)?,
        duration_secs: row.get(11)?,
        width: row.get(12)?,
        height: row.get(13)?,
        bitrate: row.get(14)?,
        frame_rate: row.get(15)?,
        views: row.get(16)?,
        status: row
            .get::<_, String>(17)?
            .parse()
            .unwrap_or(VideoStatus::Error),
        uploaded_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(18)?)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// Get a video by ID.
pub fn get_video(conn: &Connection, id: VideoId) -> Result<Video> {
    conn.query_row(
        &format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?"),
        [id.to_string()],
        row_to_video,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Error::not_found("video"),
        _ => Error::database(e.to_string()),
    })
}

/// Get a video by its stored filename.
pub fn get_video_by_filename(conn: &Connection, filename: &str) -> Result<Option<Video>> {
    match conn.query_row(
        &format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE filename = ?"),
        [filename],
        row_to_video,
    ) {
        Ok(video) => Ok(Some(video)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List ready videos as summaries, newest upload first.
pub fn list_ready(conn: &Connection) -> Result<Vec<VideoSummary>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, filename, title, description, duration_secs, file_size, views,
                    uploaded_at, thumbnail
             FROM videos WHERE status = 'ready' ORDER BY uploaded_at DESC",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let videos = stmt
        .query_map([], |row| {
            Ok(VideoSummary {
                id: VideoId::from(Uuid::parse_str(&row.get::<_, String>(0)?).unwrap()),
                filename: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                duration_secs: row.get(4)?,
                file_size: row.get(5)?,
                views: row.get(6)?,
                uploaded_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(7)?)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
                thumbnail: row.get(8)?,
            })
        })
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(videos)
}

/// Increment the view counter for a video.
pub fn increment_views(conn: &Connection, id: VideoId) -> Result<()> {
    let affected = conn
        .execute(
            "UPDATE videos SET views = views + 1 WHERE id = ?",
            [id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("video"));
    }
    Ok(())
}

/// Delete a video record. Returns whether a row was removed.
pub fn delete_video(conn: &Connection, id: VideoId) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM videos WHERE id = ?", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoDetails;
    use crate::pool::{get_conn, init_memory_pool};
    use crate::queries::sessions;
    use reelvault_common::SessionId;

    fn insert_video(conn: &mut Connection, filename: &str, title: &str) -> Video {
        let session = sessions::create_session(
            conn,
            filename,
            "orig.mp4",
            1024,
            "video/mp4",
            5,
            640,
            360,
            500_000,
            25.0,
        )
        .unwrap();
        sessions::promote(
            conn,
            session.id,
            &VideoDetails {
                title: title.to_string(),
                description: "desc".to_string(),
                tags: vec!["a".to_string()],
                category: "General".to_string(),
                privacy: Privacy::Public,
                thumbnail: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_get_video_by_id_and_filename() {
        let pool = init_memory_pool().unwrap();
        let mut conn = get_conn(&pool).unwrap();
        let video = insert_video(&mut conn, "video-x.mp4", "X");

        let by_id = get_video(&conn, video.id).unwrap();
        assert_eq!(by_id.title, "X");
        assert_eq!(by_id.tags, vec!["a".to_string()]);

        let by_name = get_video_by_filename(&conn, "video-x.mp4").unwrap().unwrap();
        assert_eq!(by_name.id, video.id);

        assert!(get_video_by_filename(&conn, "missing.mp4").unwrap().is_none());
    }

    #[test]
    fn test_get_missing_video() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        let err = get_video(&conn, VideoId::new()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_list_ready_newest_first() {
        let pool = init_memory_pool().unwrap();
        let mut conn = get_conn(&pool).unwrap();

        let first = insert_video(&mut conn, "video-1.mp4", "First");
        // Force distinct uploaded_at ordering.
        conn.execute(
            "UPDATE videos SET uploaded_at = '2026-01-01T00:00:00+00:00' WHERE id = ?",
            [first.id.to_string()],
        )
        .unwrap();
        let second = insert_video(&mut conn, "video-2.mp4", "Second");

        let list = list_ready(&conn).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
    }

    #[test]
    fn test_list_ready_excludes_other_statuses() {
        let pool = init_memory_pool().unwrap();
        let mut conn = get_conn(&pool).unwrap();
        let video = insert_video(&mut conn, "video-p.mp4", "P");

        conn.execute(
            "UPDATE videos SET status = 'processing' WHERE id = ?",
            [video.id.to_string()],
        )
        .unwrap();

        assert!(list_ready(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_increment_views() {
        let pool = init_memory_pool().unwrap();
        let mut conn = get_conn(&pool).unwrap();
        let video = insert_video(&mut conn, "video-v.mp4", "V");

        increment_views(&conn, video.id).unwrap();
        increment_views(&conn, video.id).unwrap();
        assert_eq!(get_video(&conn, video.id).unwrap().views, 2);

        let err = increment_views(&conn, VideoId::new()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_delete_video() {
        let pool = init_memory_pool().unwrap();
        let mut conn = get_conn(&pool).unwrap();
        let video = insert_video(&mut conn, "video-del.mp4", "Del");

        assert!(delete_video(&conn, video.id).unwrap());
        assert!(!delete_video(&conn, video.id).unwrap());
    }

    #[test]
    fn test_session_id_and_video_id_are_distinct_spaces() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        // A random session id never resolves a video.
        let id = SessionId::new();
        let err = get_video(&conn, VideoId::from(uuid::Uuid::from(id))).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
