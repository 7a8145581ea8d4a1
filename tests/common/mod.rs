//! Shared test harness: in-memory database, tempdir media store, and the
//! full router on a random local port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use reelvault::config::Config;
use reelvault::server::{create_router, AppContext};
use reelvault::storage::{LocalMediaStore, MediaStore};
use reelvault::upload::FinalizeRequest;
use reelvault_db::models::{UploadSession, Video};
use reelvault_db::pool::{init_memory_pool, DbPool};

pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub store: Arc<dyn MediaStore>,
    _dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(mut config: Config) -> Self {
        let dir = tempfile::tempdir().unwrap();
        config.storage.data_dir = dir.path().to_path_buf();

        let db = init_memory_pool().unwrap();
        let store: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(dir.path()).unwrap());
        let ctx = AppContext::new(config, db.clone(), store.clone());

        Self {
            ctx,
            db,
            store,
            _dir: dir,
        }
    }

    /// Serve the router on a random port and return its address.
    pub async fn spawn_server(&self) -> SocketAddr {
        let app = create_router(self.ctx.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        addr
    }

    /// Stage-1 upload straight through the pipeline.
    pub async fn upload(&self, data: &[u8], original_name: &str) -> UploadSession {
        let chunk = Bytes::copy_from_slice(data);
        let stream = futures::stream::iter(vec![Ok::<_, reelvault_common::Error>(chunk)]);
        self.ctx
            .pipeline
            .start_upload(stream, original_name, "video/mp4")
            .await
            .unwrap()
    }

    /// Upload and finalize, yielding a ready catalog entry.
    pub async fn publish(&self, data: &[u8], title: &str) -> Video {
        let session = self.upload(data, "clip.mp4").await;
        self.ctx
            .pipeline
            .finalize(
                session.id,
                FinalizeRequest {
                    title: title.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }
}
