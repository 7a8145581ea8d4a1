//! Periodic reclamation of abandoned upload sessions.
//!
//! Sessions older than the configured TTL are deleted along with their
//! backing files. The sweep is the only thing that ages sessions out;
//! there is no store-native expiry.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reelvault_common::Result;
use reelvault_db::pool::{get_conn, DbPool};
use reelvault_db::queries::sessions;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::storage::{MediaStore, Namespace};

/// Spawn the background sweep, ticking every `interval`.
///
/// A slow sweep skips missed ticks rather than bursting to catch up.
pub fn start_expiry_sweep(
    db: DbPool,
    store: Arc<dyn MediaStore>,
    ttl: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match sweep_expired(&db, store.as_ref(), ttl).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(removed = n, "swept expired upload sessions"),
                Err(e) => tracing::warn!(error = %e, "expiry sweep failed"),
            }
        }
    })
}

/// Remove all sessions created more than `ttl` ago, and their files.
///
/// Returns the number of sessions removed. File removal is best-effort:
/// a failure is logged and does not abort the rest of the sweep.
pub async fn sweep_expired(db: &DbPool, store: &dyn MediaStore, ttl: Duration) -> Result<usize> {
    // A TTL too large for chrono can never expire anything.
    let Ok(ttl) = chrono::Duration::from_std(ttl) else {
        return Ok(0);
    };
    let cutoff = Utc::now() - ttl;

    let expired = {
        let conn = get_conn(db)?;
        sessions::list_expired(&conn, cutoff)?
    };

    reclaim(db, store, expired).await
}

/// Delete each session row, then its backing file - but only when the
/// row was still there. A session promoted between listing and deletion
/// keeps its file: the filename now belongs to a catalog entry.
async fn reclaim(
    db: &DbPool,
    store: &dyn MediaStore,
    expired: Vec<reelvault_db::models::UploadSession>,
) -> Result<usize> {
    let reclaimed = {
        let conn = get_conn(db)?;
        let mut filenames = Vec::new();
        for session in &expired {
            if sessions::delete_session(&conn, session.id)? {
                filenames.push(session.filename.clone());
            }
        }
        filenames
    };

    for filename in &reclaimed {
        if let Err(e) = store.remove(Namespace::Videos, filename).await {
            tracing::warn!(
                error = %e,
                filename = %filename,
                "failed to remove expired upload file"
            );
        }
    }

    Ok(reclaimed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ChunkStream, LocalMediaStore};
    use bytes::Bytes;
    use reelvault_db::pool::init_memory_pool;

    fn one_chunk(data: &'static [u8]) -> ChunkStream<'static> {
        let chunks: Vec<Result<Bytes>> = vec![Ok(Bytes::from_static(data))];
        Box::pin(futures::stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_sweep_removes_old_sessions_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path()).unwrap();
        let db = init_memory_pool().unwrap();

        store
            .write(Namespace::Videos, "video-old.mp4", one_chunk(b"data"), None)
            .await
            .unwrap();
        {
            let conn = get_conn(&db).unwrap();
            sessions::create_session(
                &conn, "video-old.mp4", "old.mp4", 4, "video/mp4", 0, 0, 0, 0, 0.0,
            )
            .unwrap();
        }

        let removed = sweep_expired(&db, &store, Duration::from_secs(0)).await.unwrap();
        assert_eq!(removed, 1);

        assert!(store
            .len(Namespace::Videos, "video-old.mp4")
            .await
            .unwrap()
            .is_none());

        let conn = get_conn(&db).unwrap();
        assert!(sessions::list_expired(&conn, Utc::now()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_spares_fresh_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path()).unwrap();
        let db = init_memory_pool().unwrap();

        {
            let conn = get_conn(&db).unwrap();
            sessions::create_session(
                &conn, "video-new.mp4", "new.mp4", 4, "video/mp4", 0, 0, 0, 0, 0.0,
            )
            .unwrap();
        }

        let removed = sweep_expired(&db, &store, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn test_reclaim_spares_session_promoted_mid_sweep() {
        use reelvault_db::models::{Privacy, VideoDetails};
        use reelvault_db::queries::videos;

        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path()).unwrap();
        let db = init_memory_pool().unwrap();

        store
            .write(Namespace::Videos, "video-won.mp4", one_chunk(b"data"), None)
            .await
            .unwrap();
        let session = {
            let conn = get_conn(&db).unwrap();
            sessions::create_session(
                &conn, "video-won.mp4", "won.mp4", 4, "video/mp4", 0, 0, 0, 0, 0.0,
            )
            .unwrap()
        };

        // A finalize wins after the session was listed for expiry: the
        // row is consumed and the filename belongs to a ready entry.
        {
            let mut conn = get_conn(&db).unwrap();
            sessions::promote(
                &mut conn,
                session.id,
                &VideoDetails {
                    title: "Won".to_string(),
                    description: String::new(),
                    tags: vec![],
                    category: "General".to_string(),
                    privacy: Privacy::Public,
                    thumbnail: None,
                },
            )
            .unwrap();
        }

        let removed = reclaim(&db, &store, vec![session]).await.unwrap();
        assert_eq!(removed, 0);

        // The published entry still owns its backing file.
        assert_eq!(
            store.len(Namespace::Videos, "video-won.mp4").await.unwrap(),
            Some(4)
        );
        let conn = get_conn(&db).unwrap();
        assert!(videos::get_video_by_filename(&conn, "video-won.mp4")
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_sweep_survives_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path()).unwrap();
        let db = init_memory_pool().unwrap();

        // Session whose backing file never existed.
        {
            let conn = get_conn(&db).unwrap();
            sessions::create_session(
                &conn, "video-ghost.mp4", "ghost.mp4", 4, "video/mp4", 0, 0, 0, 0, 0.0,
            )
            .unwrap();
        }

        let removed = sweep_expired(&db, &store, Duration::from_secs(0)).await.unwrap();
        assert_eq!(removed, 1);
    }
}
