//! Catalog routes: listing, detail with view counting, deletion, and
//! thumbnail delivery.

mod common;

use bytes::Bytes;
use common::TestHarness;
use reelvault::storage::{MediaStore, Namespace};

#[tokio::test]
async fn test_list_is_newest_first() {
    let harness = TestHarness::new();
    let addr = harness.spawn_server().await;

    harness.publish(&[1u8; 100], "older").await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    harness.publish(&[2u8; 100], "newer").await;

    let resp = reqwest::get(format!("http://{}/api/videos", addr))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let videos = body["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0]["title"], "newer");
    assert_eq!(videos[1]["title"], "older");
}

#[tokio::test]
async fn test_detail_counts_views() {
    let harness = TestHarness::new();
    let addr = harness.spawn_server().await;
    let video = harness.publish(&[1u8; 100], "Watched").await;

    let url = format!("http://{}/api/videos/info/{}", addr, video.id);
    let client = reqwest::Client::new();

    let first: serde_json::Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(first["views"], 1);
    assert_eq!(first["title"], "Watched");

    let second: serde_json::Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(second["views"], 2);
}

#[tokio::test]
async fn test_detail_unknown_video() {
    let harness = TestHarness::new();
    let addr = harness.spawn_server().await;
    let client = reqwest::Client::new();

    for bogus in [reelvault_common::VideoId::new().to_string(), "not-a-uuid".to_string()] {
        let resp = client
            .get(format!("http://{}/api/videos/info/{}", addr, bogus))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    }
}

#[tokio::test]
async fn test_delete_removes_entry_and_files() {
    let harness = TestHarness::new();
    let addr = harness.spawn_server().await;
    let video = harness.publish(&[1u8; 100], "Doomed").await;
    let client = reqwest::Client::new();

    let url = format!("http://{}/api/videos/{}", addr, video.id);
    let resp = client.delete(&url).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    assert!(harness
        .store
        .len(Namespace::Videos, &video.filename)
        .await
        .unwrap()
        .is_none());

    let list: serde_json::Value = reqwest::get(format!("http://{}/api/videos", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(list["videos"].as_array().unwrap().is_empty());

    // Already gone.
    let resp = client.delete(&url).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_serve_thumbnail() {
    let harness = TestHarness::new();
    let addr = harness.spawn_server().await;

    let jpeg = b"\xff\xd8\xff\xe0fake jpeg".to_vec();
    harness
        .store
        .write(
            Namespace::Thumbnails,
            "thumb-video-abc.jpg",
            Box::pin(futures::stream::iter(vec![Ok::<_, reelvault_common::Error>(
                Bytes::from(jpeg.clone()),
            )])),
            None,
        )
        .await
        .unwrap();

    let resp = reqwest::get(format!("http://{}/api/thumbnails/thumb-video-abc.jpg", addr))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "image/jpeg");
    assert_eq!(resp.bytes().await.unwrap().to_vec(), jpeg);
}

#[tokio::test]
async fn test_missing_thumbnail() {
    let harness = TestHarness::new();
    let addr = harness.spawn_server().await;

    let resp = reqwest::get(format!("http://{}/api/thumbnails/thumb-nope.jpg", addr))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_thumbnail_traversal_blocked() {
    let harness = TestHarness::new();
    let addr = harness.spawn_server().await;

    let resp = reqwest::get(format!("http://{}/api/thumbnails/..", addr))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_health() {
    let harness = TestHarness::new();
    let addr = harness.spawn_server().await;

    let resp = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}
