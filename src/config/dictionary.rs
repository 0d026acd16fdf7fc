use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::config_error;
use crate::constants::DEFAULT_DICTIONARY_MAX_BYTES;
use crate::constants::DEFAULT_REFRESH_INTERVAL_SECS;
use crate::DictionaryFormat;
use crate::Result;

/// How a reload combines freshly parsed pairs with the current mapping
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RefreshBehaviour {
    /// Overlay new pairs; keys absent from the new load are kept
    #[default]
    Merge,
    /// Clear the mapping first, then overlay
    Replace,
}

/// Dictionary source and refresh policy
///
/// ```toml
/// [dictionary]
/// path = "/etc/translate/status.yml"
/// refresh_interval = 60
/// refresh_behaviour = "replace"
/// ```
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DictionaryConfig {
    /// Inline mapping; mutually exclusive with `path`.
    /// Keys keep their case; environment variables cannot set entries.
    #[serde(default)]
    pub entries: IndexMap<String, Value>,

    /// YAML, JSON or CSV file, selected by extension
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Seconds between scheduled reloads of `path`.
    /// `<= 0` loads once; `<= 300` only reloads when the file mtime changes.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: i64,

    #[serde(default)]
    pub refresh_behaviour: RefreshBehaviour,

    /// Upper bound on the dictionary file size
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
            path: None,
            refresh_interval: default_refresh_interval(),
            refresh_behaviour: RefreshBehaviour::default(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl DictionaryConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.path {
            if !self.entries.is_empty() {
                return Err(config_error(
                    "The configuration options 'entries' and 'path' are mutually exclusive".to_string(),
                ));
            }
            DictionaryFormat::from_path(path).map_err(|e| config_error(e.to_string()))?;
        }

        if self.max_bytes == 0 {
            return Err(config_error("dictionary.max_bytes must be greater than 0".to_string()));
        }

        Ok(())
    }

    /// Periodic refresh is only meaningful for file sources
    pub fn refresh_enabled(&self) -> bool {
        self.path.is_some() && self.refresh_interval > 0
    }
}

fn default_refresh_interval() -> i64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

fn default_max_bytes() -> u64 {
    DEFAULT_DICTIONARY_MAX_BYTES
}
