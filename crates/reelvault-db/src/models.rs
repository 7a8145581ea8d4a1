//! Internal Rust models matching the database schema.
//!
//! Strongly-typed structures that map to the `upload_sessions` and `videos`
//! tables, using the typed IDs from reelvault-common.

use chrono::{DateTime, Utc};
use reelvault_common::{SessionId, VideoId};
use serde::{Deserialize, Serialize};

/// Transient upload session: a stored file awaiting its descriptive details.
///
/// Exists only between stage-1 upload and stage-2 finalize/cancel; the
/// expiry sweep removes sessions older than the configured window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadSession {
    pub id: SessionId,
    /// Storage key of the uploaded file in the video namespace.
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub content_type: String,
    pub duration_secs: i64,
    pub width: i32,
    pub height: i32,
    pub bitrate: i64,
    pub frame_rate: f64,
    pub created_at: DateTime<Utc>,
}

impl UploadSession {
    /// The session's original filename with its extension stripped.
    ///
    /// Used as the default title when finalize supplies none.
    pub fn title_fallback(&self) -> String {
        match self.original_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => self.original_name.clone(),
        }
    }
}

/// Who can see a published video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Unlisted,
    Private,
}

impl std::fmt::Display for Privacy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Unlisted => write!(f, "unlisted"),
            Self::Private => write!(f, "private"),
        }
    }
}

impl std::str::FromStr for Privacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "unlisted" => Ok(Self::Unlisted),
            "private" => Ok(Self::Private),
            _ => Err(format!("Invalid privacy value: {}", s)),
        }
    }
}

/// Processing status of a catalog entry.
///
/// Only `Ready` entries are reachable by the streaming routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Processing,
    #[default]
    Ready,
    Error,
}

impl std::fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Ready => write!(f, "ready"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for VideoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "ready" => Ok(Self::Ready),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid video status: {}", s)),
        }
    }
}

/// Durable catalog entry for a published video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: VideoId,
    /// Storage key of the backing file; unique across the catalog.
    pub filename: String,
    pub original_name: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
    pub privacy: Privacy,
    pub file_size: i64,
    pub content_type: String,
    /// Storage key of the thumbnail, if one was generated.
    pub thumbnail: Option<String>,
    pub duration_secs: i64,
    pub width: i32,
    pub height: i32,
    pub bitrate: i64,
    pub frame_rate: f64,
    pub views: i64,
    pub status: VideoStatus,
    pub uploaded_at: DateTime<Utc>,
}

/// Descriptive fields supplied at finalize time, already resolved
/// (defaults applied, tags trimmed).
#[derive(Debug, Clone, PartialEq)]
pub struct VideoDetails {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
    pub privacy: Privacy,
    pub thumbnail: Option<String>,
}

/// Lightweight listing projection of a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoSummary {
    pub id: VideoId,
    pub filename: String,
    pub title: String,
    pub description: String,
    pub duration_secs: i64,
    pub file_size: i64,
    pub views: i64,
    pub uploaded_at: DateTime<Utc>,
    pub thumbnail: Option<String>,
}
