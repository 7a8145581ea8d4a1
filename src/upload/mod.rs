//! Two-phase upload pipeline.
//!
//! Stage 1 ([`UploadPipeline::start_upload`]) persists the raw bytes,
//! probes them with ffprobe, and records a transient session. Stage 2
//! ([`UploadPipeline::finalize`]) generates a thumbnail, resolves the
//! descriptive details, and atomically promotes the session into the
//! catalog. Sessions that never reach stage 2 are reclaimed by the
//! [`expiry`] sweep or an explicit [`UploadPipeline::cancel`].

pub mod expiry;

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use reelvault_av::{probe_video, thumbnail, VideoMetadata};
use reelvault_common::{Error, Result, SessionId};
use reelvault_db::models::{Privacy, UploadSession, Video, VideoDetails};
use reelvault_db::pool::{get_conn, DbPool};
use reelvault_db::queries::sessions;

use crate::config::UploadConfig;
use crate::storage::{self, MediaStore, Namespace};

/// Descriptive fields accepted at finalize time, before defaults apply.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct FinalizeRequest {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
    pub privacy: Privacy,
}

/// The upload pipeline: storage, probing, sessions, promotion.
pub struct UploadPipeline {
    db: DbPool,
    store: Arc<dyn MediaStore>,
    config: UploadConfig,
}

impl UploadPipeline {
    pub fn new(db: DbPool, store: Arc<dyn MediaStore>, config: UploadConfig) -> Self {
        Self { db, store, config }
    }

    /// Stage 1: persist the upload stream, probe it, record a session.
    ///
    /// Only `video/*` content types are accepted and the stream must stay
    /// under the configured size cap. Probe failures are non-fatal; the
    /// session is recorded with zeroed metadata. If the session insert
    /// itself fails the stored file is removed so no orphan remains.
    pub async fn start_upload<S>(
        &self,
        stream: S,
        original_name: &str,
        content_type: &str,
    ) -> Result<UploadSession>
    where
        S: Stream<Item = Result<Bytes>> + Send,
    {
        if !content_type.starts_with("video/") {
            return Err(Error::invalid_upload(format!(
                "only video files are accepted, got {:?}",
                content_type
            )));
        }

        let key = storage::video_key(original_name);
        let size = self
            .store
            .write(
                Namespace::Videos,
                &key,
                Box::pin(stream),
                Some(self.config.max_file_size_bytes),
            )
            .await?;

        let meta = match run_probe(self.store.path(Namespace::Videos, &key)).await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "probe failed, recording zeroed metadata");
                VideoMetadata::default()
            }
        };

        let created = {
            let conn = get_conn(&self.db)?;
            sessions::create_session(
                &conn,
                &key,
                original_name,
                size as i64,
                content_type,
                meta.duration_secs,
                meta.width,
                meta.height,
                meta.bitrate,
                meta.frame_rate,
            )
        };

        match created {
            Ok(session) => {
                tracing::info!(
                    session_id = %session.id,
                    key = %key,
                    size,
                    "upload session created"
                );
                Ok(session)
            }
            Err(e) => {
                // A file without a session row is unreachable; remove it.
                if let Err(remove_err) = self.store.remove(Namespace::Videos, &key).await {
                    tracing::warn!(error = %remove_err, key = %key, "failed to remove orphaned upload");
                }
                Err(e)
            }
        }
    }

    /// Stage 2: attach details and promote the session into the catalog.
    ///
    /// Thumbnail generation is attempted first and is non-fatal. The
    /// promotion itself is a single transaction; on failure the session
    /// survives and any thumbnail just written is removed again.
    pub async fn finalize(&self, id: SessionId, request: FinalizeRequest) -> Result<Video> {
        let session = {
            let conn = get_conn(&self.db)?;
            sessions::get_session(&conn, id)?
        };

        let thumbnail = self.generate_thumbnail(&session.filename).await;
        let details = resolve_details(&session, request, thumbnail.clone());

        let promoted = {
            let mut conn = get_conn(&self.db)?;
            sessions::promote(&mut conn, id, &details)
        };

        match promoted {
            Ok(video) => {
                tracing::info!(video_id = %video.id, title = %video.title, "video published");
                Ok(video)
            }
            Err(e) => {
                // SessionNotFound here means a concurrent finalize won;
                // the published entry references the same thumbnail file,
                // so only clean up on other failures.
                if !matches!(e, Error::SessionNotFound(_)) {
                    if let Some(thumb) = thumbnail {
                        if let Err(remove_err) =
                            self.store.remove(Namespace::Thumbnails, &thumb).await
                        {
                            tracing::warn!(error = %remove_err, thumb = %thumb, "failed to remove thumbnail");
                        }
                    }
                }
                Err(e)
            }
        }
    }

    /// Look up a live session.
    pub fn session(&self, id: SessionId) -> Result<UploadSession> {
        let conn = get_conn(&self.db)?;
        sessions::get_session(&conn, id)
    }

    /// Abandon a session: delete the record, then the backing file.
    ///
    /// File removal is best-effort; the file may already be gone from an
    /// earlier partial failure.
    pub async fn cancel(&self, id: SessionId) -> Result<()> {
        let (deleted, filename) = {
            let conn = get_conn(&self.db)?;
            let session = sessions::get_session(&conn, id)?;
            let deleted = sessions::delete_session(&conn, id)?;
            (deleted, session.filename)
        };

        // Zero rows deleted means a concurrent finalize consumed the
        // session after we read it; the file now belongs to a catalog
        // entry and must stay.
        if !deleted {
            return Err(Error::session_not_found(id.to_string()));
        }

        if let Err(e) = self.store.remove(Namespace::Videos, &filename).await {
            tracing::warn!(
                error = %e,
                filename = %filename,
                "failed to remove canceled upload file"
            );
        }

        tracing::info!(session_id = %id, "upload session canceled");
        Ok(())
    }

    async fn generate_thumbnail(&self, video_key: &str) -> Option<String> {
        let thumb_key = thumbnail::thumbnail_name(video_key);
        let input = self.store.path(Namespace::Videos, video_key);
        let output = self.store.path(Namespace::Thumbnails, &thumb_key);
        let offset = self.config.thumbnail_offset_secs;

        let result =
            tokio::task::spawn_blocking(move || thumbnail::generate(&input, &output, offset))
                .await;

        match result {
            Ok(Ok(())) => Some(thumb_key),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, video_key = %video_key, "thumbnail generation failed");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, video_key = %video_key, "thumbnail task failed");
                None
            }
        }
    }
}

async fn run_probe(path: PathBuf) -> Result<VideoMetadata> {
    tokio::task::spawn_blocking(move || probe_video(&path))
        .await
        .map_err(|e| Error::internal(format!("probe task failed: {}", e)))?
        .map_err(|e| Error::internal(e.to_string()))
}

/// Apply finalize defaults: empty title falls back to the original filename
/// stem, tags are trimmed and blanks dropped, empty category becomes
/// "General".
fn resolve_details(
    session: &UploadSession,
    request: FinalizeRequest,
    thumbnail: Option<String>,
) -> VideoDetails {
    let title = request.title.trim();
    let title = if title.is_empty() {
        session.title_fallback()
    } else {
        title.to_string()
    };

    let tags = request
        .tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let category = request.category.trim();
    let category = if category.is_empty() {
        "General".to_string()
    } else {
        category.to_string()
    };

    VideoDetails {
        title,
        description: request.description,
        tags,
        category,
        privacy: request.privacy,
        thumbnail,
    }
}
