//! Catalog and playback routes: listing, detail, range streaming,
//! deletion, and thumbnail delivery.

use std::io::SeekFrom;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use reelvault_common::{Error, VideoId};
use reelvault_db::models::{Video, VideoSummary};
use reelvault_db::pool::get_conn;
use reelvault_db::queries::videos;
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::{AppContext, AppResult};
use crate::storage::{self, Namespace};
use crate::streaming::{self, range};

pub(super) fn routes() -> Router<AppContext> {
    Router::new()
        .route("/videos", get(list_videos))
        .route("/videos/info/:id", get(video_detail))
        .route("/videos/:identifier", get(stream_video).delete(delete_video))
        .route("/thumbnails/:filename", get(serve_thumbnail))
}

/// Catalog entry as the API exposes it: the stored row plus a fetchable
/// thumbnail URL.
#[derive(Debug, Serialize)]
pub(super) struct VideoResponse {
    #[serde(flatten)]
    video: Video,
    thumbnail_url: Option<String>,
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        let thumbnail_url = thumbnail_url(video.thumbnail.as_deref());
        Self {
            video,
            thumbnail_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    #[serde(flatten)]
    summary: VideoSummary,
    thumbnail_url: Option<String>,
}

impl From<VideoSummary> for SummaryResponse {
    fn from(summary: VideoSummary) -> Self {
        let thumbnail_url = thumbnail_url(summary.thumbnail.as_deref());
        Self {
            summary,
            thumbnail_url,
        }
    }
}

fn thumbnail_url(key: Option<&str>) -> Option<String> {
    key.map(|k| format!("/api/thumbnails/{}", k))
}

#[derive(Debug, Serialize)]
struct VideoListResponse {
    videos: Vec<SummaryResponse>,
}

/// `GET /api/videos` - ready entries, newest first.
async fn list_videos(State(ctx): State<AppContext>) -> AppResult<Json<VideoListResponse>> {
    let conn = get_conn(&ctx.db)?;
    let videos = videos::list_ready(&conn)?
        .into_iter()
        .map(SummaryResponse::from)
        .collect();
    Ok(Json(VideoListResponse { videos }))
}

/// `GET /api/videos/info/:id` - full detail; counts as one view.
async fn video_detail(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> AppResult<Json<VideoResponse>> {
    let id = parse_video_id(&id)?;
    let conn = get_conn(&ctx.db)?;

    let mut video = videos::get_video(&conn, id)?;
    videos::increment_views(&conn, id)?;
    video.views += 1;

    Ok(Json(video.into()))
}

/// `GET /api/videos/:identifier` - range-only playback by ID or filename.
///
/// A request without a Range header is a client error; the response is
/// always 206 with the requested slice.
async fn stream_video(
    State(ctx): State<AppContext>,
    Path(identifier): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let video = {
        let conn = get_conn(&ctx.db)?;
        streaming::resolve_ready(&conn, &identifier)?
    };

    let range_header = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .ok_or(Error::RangeRequired)?;

    let (mut file, size) = ctx
        .store
        .open(Namespace::Videos, &video.filename)
        .await?
        .ok_or_else(|| Error::not_found(format!("backing file for {}", video.filename)))?;

    let range = range::parse_range(range_header, size)?;

    file.seek(SeekFrom::Start(range.start))
        .await
        .map_err(Error::Io)?;
    let body = Body::from_stream(ReaderStream::new(file.take(range.len())));

    let response = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", range.start, range.end, size),
        )
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, range.len())
        .header(header::CONTENT_TYPE, video.content_type)
        .body(body)
        .map_err(|e| Error::internal(e.to_string()))?;

    Ok(response)
}

/// `DELETE /api/videos/:id` - remove the entry and its files.
///
/// Files go first: if a file removal fails the catalog row survives and
/// the delete can be retried.
async fn delete_video(
    State(ctx): State<AppContext>,
    Path(identifier): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let id = parse_video_id(&identifier)?;
    let video = {
        let conn = get_conn(&ctx.db)?;
        videos::get_video(&conn, id)?
    };

    ctx.store.remove(Namespace::Videos, &video.filename).await?;
    if let Some(thumb) = &video.thumbnail {
        if let Err(e) = ctx.store.remove(Namespace::Thumbnails, thumb).await {
            tracing::warn!(error = %e, thumb = %thumb, "failed to remove thumbnail");
        }
    }

    {
        let conn = get_conn(&ctx.db)?;
        videos::delete_video(&conn, id)?;
    }

    tracing::info!(video_id = %id, "video deleted");
    Ok(Json(json!({ "message": "Video deleted" })))
}

/// `GET /api/thumbnails/:filename` - thumbnail bytes.
async fn serve_thumbnail(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    if storage::validate_key(&filename).is_err() {
        return Err(Error::not_found(format!("thumbnail {}", filename)).into());
    }

    let (file, size) = ctx
        .store
        .open(Namespace::Thumbnails, &filename)
        .await?
        .ok_or_else(|| Error::not_found(format!("thumbnail {}", filename)))?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(header::CONTENT_LENGTH, size)
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| Error::internal(e.to_string()))?;

    Ok(response)
}

/// Non-UUID video IDs cannot name a catalog entry.
fn parse_video_id(raw: &str) -> Result<VideoId, Error> {
    raw.parse()
        .map_err(|_| Error::not_found(format!("video {}", raw)))
}
