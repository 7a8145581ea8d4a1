//! Local filesystem media store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use reelvault_common::{Error, Result};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::{validate_key, ChunkStream, MediaStore, Namespace};

/// Flat directories under a single root, one per namespace.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    /// Create the store, making the namespace directories if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for ns in [Namespace::Videos, Namespace::Thumbnails] {
            std::fs::create_dir_all(root.join(ns.dir())).map_err(|e| {
                Error::storage(format!(
                    "failed to create {} directory under {}: {}",
                    ns.dir(),
                    root.display(),
                    e
                ))
            })?;
        }
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn write(
        &self,
        ns: Namespace,
        key: &str,
        mut stream: ChunkStream<'_>,
        max_bytes: Option<u64>,
    ) -> Result<u64> {
        validate_key(key)?;
        let path = self.path(ns, key);

        let mut file = File::create(&path)
            .await
            .map_err(|e| Error::storage(format!("failed to create {}: {}", path.display(), e)))?;

        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(&path).await;
                    return Err(e);
                }
            };

            written += chunk.len() as u64;
            if let Some(max) = max_bytes {
                if written > max {
                    drop(file);
                    let _ = tokio::fs::remove_file(&path).await;
                    return Err(Error::invalid_upload(format!(
                        "file exceeds maximum size of {} bytes",
                        max
                    )));
                }
            }

            file.write_all(&chunk)
                .await
                .map_err(|e| Error::storage(format!("write to {} failed: {}", path.display(), e)))?;
        }

        file.flush()
            .await
            .map_err(|e| Error::storage(format!("flush of {} failed: {}", path.display(), e)))?;
        file.sync_all()
            .await
            .map_err(|e| Error::storage(format!("sync of {} failed: {}", path.display(), e)))?;

        Ok(written)
    }

    async fn open(&self, ns: Namespace, key: &str) -> Result<Option<(File, u64)>> {
        validate_key(key)?;
        let path = self.path(ns, key);

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::storage(format!(
                    "failed to open {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let size = file
            .metadata()
            .await
            .map_err(|e| Error::storage(format!("failed to stat {}: {}", path.display(), e)))?
            .len();

        Ok(Some((file, size)))
    }

    async fn len(&self, ns: Namespace, key: &str) -> Result<Option<u64>> {
        validate_key(key)?;
        let path = self.path(ns, key);

        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(format!(
                "failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn remove(&self, ns: Namespace, key: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.path(ns, key);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn path(&self, ns: Namespace, key: &str) -> PathBuf {
        self.root.join(ns.dir()).join(key)
    }
}
