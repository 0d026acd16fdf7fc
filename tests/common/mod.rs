use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;

use d_translate::DictionaryConfig;
use d_translate::Event;
use d_translate::FieldConfig;
use d_translate::FieldRef;
use d_translate::MatchConfig;
use d_translate::Record;
use d_translate::RefreshBehaviour;
use d_translate::TranslateConfig;
use d_translate::TranslateFilter;
use serde_json::json;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

pub const REFRESH_SECS: i64 = 1;

pub fn enable_logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Replaces the file atomically and pushes the mtime forward so a
/// short-interval reload always notices the change, even within the same
/// second.
pub fn rewrite(
    path: &Path,
    content: &str,
    bump: u64,
) {
    let staging = path.with_file_name(format!(".{}.tmp", path.file_name().unwrap().to_string_lossy()));
    fs::write(&staging, content).unwrap();
    let file = fs::File::options().write(true).open(&staging).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(bump)).unwrap();
    drop(file);
    fs::rename(&staging, path).unwrap();
}

pub fn dictionary_file(
    dir: &Path,
    name: &str,
    content: &str,
) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

pub async fn file_filter(
    path: &Path,
    behaviour: RefreshBehaviour,
) -> TranslateFilter {
    let config = TranslateConfig {
        field: FieldConfig {
            source: "key".to_string(),
            target: Some("[value]".to_string()),
            ..Default::default()
        },
        dictionary: DictionaryConfig {
            path: Some(path.to_path_buf()),
            refresh_interval: REFRESH_SECS,
            refresh_behaviour: behaviour,
            ..Default::default()
        },
        matching: MatchConfig::default(),
    };
    TranslateFilter::register(config).await.unwrap()
}

/// Translated value for `key`, `None` when nothing was written
pub fn translate(
    filter: &TranslateFilter,
    key: &str,
) -> Option<Value> {
    let mut event = Event::from_json(&json!({ "key": key }).to_string()).unwrap();
    filter.filter(&mut event).unwrap();
    event.get(&FieldRef::parse("[value]").unwrap())
}

/// Long enough for at least one scheduled tick after a rewrite
pub async fn wait_for_refresh() {
    tokio::time::sleep(Duration::from_millis(REFRESH_SECS as u64 * 1000 + 800)).await;
}
