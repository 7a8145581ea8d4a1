//! Media object storage.
//!
//! Videos and thumbnails live in separate namespaces behind the
//! [`MediaStore`] trait, so the pipeline and routes never touch paths
//! directly. The one production implementation is [`LocalMediaStore`],
//! flat directories on the local filesystem.

mod local;

pub use local::LocalMediaStore;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use reelvault_common::{Error, Result};
use tokio::fs::File;
use uuid::Uuid;

/// A stream of body chunks being written into the store.
pub type ChunkStream<'a> = BoxStream<'a, Result<Bytes>>;

/// The two kinds of objects reelvault stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Videos,
    Thumbnails,
}

impl Namespace {
    /// Directory name backing this namespace.
    pub fn dir(self) -> &'static str {
        match self {
            Self::Videos => "videos",
            Self::Thumbnails => "thumbnails",
        }
    }
}

/// Durable storage for media objects.
///
/// Keys are flat names inside a namespace; anything path-like is rejected.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Stream chunks into a new object, returning the byte count written.
    ///
    /// When `max_bytes` is set and the stream exceeds it, the partial
    /// object is removed and the write fails with `InvalidUpload`.
    async fn write(
        &self,
        ns: Namespace,
        key: &str,
        stream: ChunkStream<'_>,
        max_bytes: Option<u64>,
    ) -> Result<u64>;

    /// Open an object for reading along with its size. `None` if absent.
    async fn open(&self, ns: Namespace, key: &str) -> Result<Option<(File, u64)>>;

    /// Size of an object in bytes. `None` if absent.
    async fn len(&self, ns: Namespace, key: &str) -> Result<Option<u64>>;

    /// Remove an object. Removing a missing object is not an error.
    async fn remove(&self, ns: Namespace, key: &str) -> Result<()>;

    /// Filesystem path of an object, for handing to external tools.
    fn path(&self, ns: Namespace, key: &str) -> PathBuf;
}

/// Generate a fresh storage key for an uploaded video, keeping the original
/// extension: `video-<uuid><ext>`.
pub fn video_key(original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("video-{}{}", Uuid::new_v4().simple(), ext)
}

/// Reject keys that could escape the namespace directory.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(Error::storage(format!("invalid storage key: {:?}", key)));
    }
    Ok(())
}
