//! Upload routes: stage-1 file intake, stage-2 finalize, session
//! inspection and cancellation.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use reelvault_common::{Error, Result, SessionId};
use reelvault_db::models::UploadSession;
use serde::Serialize;
use serde_json::json;

use super::routes_videos::VideoResponse;
use super::{AppContext, AppResult};
use crate::upload::FinalizeRequest;

pub(super) fn routes() -> Router<AppContext> {
    Router::new()
        .route("/upload/file", post(upload_file))
        .route("/upload/details/:session_id", post(save_details))
        .route(
            "/upload/temp/:session_id",
            get(get_session).delete(cancel_session),
        )
}

#[derive(Debug, Serialize)]
struct UploadCreated {
    session_id: SessionId,
    filename: String,
    original_name: String,
    file_size: i64,
    duration_secs: i64,
}

impl From<UploadSession> for UploadCreated {
    fn from(session: UploadSession) -> Self {
        Self {
            session_id: session.id,
            filename: session.filename,
            original_name: session.original_name,
            file_size: session.file_size,
            duration_secs: session.duration_secs,
        }
    }
}

/// `POST /api/upload/file` - multipart intake of a single `video` field.
async fn upload_file(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadCreated>)> {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("video") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return Err(Error::invalid_upload("no `video` field in upload").into());
            }
            Err(e) => {
                return Err(Error::invalid_upload(format!("malformed multipart body: {}", e)).into());
            }
        }
    };

    let original_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();

    let stream = futures::stream::unfold(field, |mut field| async move {
        match field.chunk().await {
            Ok(Some(chunk)) => Some((Ok(chunk), field)),
            Ok(None) => None,
            Err(e) => Some((
                Err(Error::invalid_upload(format!("upload stream failed: {}", e))),
                field,
            )),
        }
    });

    let session = ctx
        .pipeline
        .start_upload(stream, &original_name, &content_type)
        .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// `POST /api/upload/details/:session_id` - finalize a session into the
/// catalog.
async fn save_details(
    State(ctx): State<AppContext>,
    Path(session_id): Path<String>,
    Json(request): Json<FinalizeRequest>,
) -> AppResult<(StatusCode, Json<VideoResponse>)> {
    let id = parse_session_id(&session_id)?;
    let video = ctx.pipeline.finalize(id, request).await?;
    Ok((StatusCode::CREATED, Json(video.into())))
}

/// `GET /api/upload/temp/:session_id` - inspect a live session.
async fn get_session(
    State(ctx): State<AppContext>,
    Path(session_id): Path<String>,
) -> AppResult<Json<UploadSession>> {
    let id = parse_session_id(&session_id)?;
    let session = ctx.pipeline.session(id)?;
    Ok(Json(session))
}

/// `DELETE /api/upload/temp/:session_id` - abandon a session.
async fn cancel_session(
    State(ctx): State<AppContext>,
    Path(session_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let id = parse_session_id(&session_id)?;
    ctx.pipeline.cancel(id).await?;
    Ok(Json(json!({ "message": "Upload canceled" })))
}

/// Non-UUID session IDs cannot name a session, so they read as absent.
fn parse_session_id(raw: &str) -> Result<SessionId> {
    raw.parse().map_err(|_| Error::session_not_found(raw))
}
