use std::sync::Arc;
use std::time::Duration;

use d_translate::RefreshBehaviour;
use futures::future::join_all;
use serde_json::json;
use tempfile::TempDir;

use crate::common::dictionary_file;
use crate::common::enable_logger;
use crate::common::file_filter;
use crate::common::rewrite;
use crate::common::translate;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_lookups_run_alongside_reloads() {
    enable_logger();
    let dir = TempDir::new().unwrap();
    let path = dictionary_file(dir.path(), "codes.csv", "k,v0\nstable,yes\n");

    let filter = Arc::new(file_filter(&path, RefreshBehaviour::Replace).await);

    let writer_path = path.clone();
    let writer = tokio::spawn(async move {
        for round in 1..=3u64 {
            rewrite(&writer_path, &format!("k,v{}\nstable,yes\n", round % 2), round * 60);
            tokio::time::sleep(Duration::from_millis(700)).await;
        }
    });

    let readers = (0..8).map(|_| {
        let filter = filter.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                let value = translate(&filter, "k");
                assert!(
                    value == Some(json!("v0")) || value == Some(json!("v1")),
                    "unexpected translation {value:?}"
                );
                assert_eq!(translate(&filter, "stable"), Some(json!("yes")));
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
    });

    for result in join_all(readers).await {
        result.unwrap();
    }
    writer.await.unwrap();

    let mut filter = Arc::into_inner(filter).unwrap();
    filter.close().await.unwrap();
}
