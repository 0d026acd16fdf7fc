use d_translate::RefreshBehaviour;
use d_translate::StoreState;
use serde_json::json;
use tempfile::TempDir;

use crate::common::dictionary_file;
use crate::common::enable_logger;
use crate::common::file_filter;
use crate::common::rewrite;
use crate::common::translate;
use crate::common::wait_for_refresh;

#[tokio::test]
async fn test_scheduled_merge_keeps_removed_keys() {
    enable_logger();
    let dir = TempDir::new().unwrap();
    let path = dictionary_file(dir.path(), "codes.csv", "a,1\nb,2\nc,3\n");

    let mut filter = file_filter(&path, RefreshBehaviour::Merge).await;
    assert_eq!(translate(&filter, "b"), Some(json!("2")));

    rewrite(&path, "a,1\nb,4\n", 60);
    wait_for_refresh().await;

    assert_eq!(translate(&filter, "a"), Some(json!("1")));
    assert_eq!(translate(&filter, "b"), Some(json!("4")));
    assert_eq!(translate(&filter, "c"), Some(json!("3")));

    filter.close().await.unwrap();
}

#[tokio::test]
async fn test_scheduled_replace_drops_removed_keys() {
    enable_logger();
    let dir = TempDir::new().unwrap();
    let path = dictionary_file(dir.path(), "codes.csv", "a,1\nb,2\nc,3\n");

    let mut filter = file_filter(&path, RefreshBehaviour::Replace).await;

    rewrite(&path, "a,1\nb,4\n", 60);
    wait_for_refresh().await;

    assert_eq!(translate(&filter, "b"), Some(json!("4")));
    assert_eq!(translate(&filter, "c"), None);
    assert_eq!(filter.store().len(), 2);

    filter.close().await.unwrap();
}

#[tokio::test]
async fn test_malformed_update_keeps_previous_dictionary() {
    enable_logger();
    let dir = TempDir::new().unwrap();
    let path = dictionary_file(dir.path(), "codes.yml", "a: first\nb: second\n");

    let mut filter = file_filter(&path, RefreshBehaviour::Replace).await;

    rewrite(&path, "a: [unterminated\n", 60);
    wait_for_refresh().await;

    assert_eq!(translate(&filter, "a"), Some(json!("first")));
    assert_eq!(translate(&filter, "b"), Some(json!("second")));

    // A later valid version is still picked up
    rewrite(&path, "a: third\n", 120);
    wait_for_refresh().await;
    assert_eq!(translate(&filter, "a"), Some(json!("third")));

    filter.close().await.unwrap();
}

#[tokio::test]
async fn test_deleted_file_keeps_previous_dictionary() {
    enable_logger();
    let dir = TempDir::new().unwrap();
    let path = dictionary_file(dir.path(), "codes.json", r#"{"a": "kept"}"#);

    let mut filter = file_filter(&path, RefreshBehaviour::Replace).await;
    std::fs::remove_file(&path).unwrap();
    wait_for_refresh().await;

    assert_eq!(translate(&filter, "a"), Some(json!("kept")));
    assert_eq!(filter.store().state(), StoreState::Loaded);

    filter.close().await.unwrap();
}

#[tokio::test]
async fn test_no_reload_after_close() {
    enable_logger();
    let dir = TempDir::new().unwrap();
    let path = dictionary_file(dir.path(), "codes.csv", "a,before\n");

    let mut filter = file_filter(&path, RefreshBehaviour::Merge).await;
    filter.close().await.unwrap();
    assert_eq!(filter.store().state(), StoreState::Stopped);

    rewrite(&path, "a,after\n", 60);
    wait_for_refresh().await;

    assert_eq!(translate(&filter, "a"), Some(json!("before")));
}
