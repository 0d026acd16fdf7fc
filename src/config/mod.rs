//! Configuration for a single translation rule.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support (`CONFIG_PATH`)
//! - Environment variable overrides (`TRANSLATE__` prefix)
//! - Section-wise validation
mod dictionary;
mod field;
mod matching;
pub use dictionary::*;
pub use field::*;
pub use matching::*;

#[cfg(test)]
mod field_test;

use std::env;
use std::fs;
use std::path::Path;

use ::config::Config;
use ::config::ConfigError;
use ::config::Environment;
use ::config::File;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::constants::CONFIG_ENV_PREFIX;
use crate::constants::CONFIG_PATH_ENV;
use crate::Error;
use crate::Result;

/// Main configuration container for one translation rule
///
/// Combines all section configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TranslateConfig {
    /// Source/target field references and fallback
    #[serde(default)]
    pub field: FieldConfig,
    /// Inline entries or file source plus refresh policy
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    /// Exact / regex match selection
    #[serde(default)]
    pub matching: MatchConfig,
}

impl TranslateConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `TRANSLATE__` prefix (highest priority)
    ///
    /// # Note
    /// Callers MUST call `validate()` before using the configuration.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("CONFIG_PATH", "config/translate.toml");
    /// std::env::set_var("TRANSLATE__FIELD__SOURCE", "[status]");
    /// let cfg = TranslateConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.dictionary.entries = match env::var(CONFIG_PATH_ENV) {
            Ok(config_path) => file_entries(&config_path)?.unwrap_or_default(),
            Err(_) => IndexMap::new(),
        };
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let mut config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;

        let mut entries = self.dictionary.entries.clone();
        entries.extend(file_entries(path)?.unwrap_or_default());
        config.dictionary.entries = entries;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    ///
    /// # Errors
    /// - Empty source field or malformed field references
    /// - Inline entries combined with a dictionary path
    /// - Unknown dictionary file extension
    /// - Malformed fallback template
    pub fn validate(self) -> Result<Self> {
        self.field.validate()?;
        self.dictionary.validate()?;
        Ok(self)
    }
}

#[derive(Deserialize, Default)]
struct EntriesFile {
    #[serde(default)]
    dictionary: EntriesSection,
}

#[derive(Deserialize, Default)]
struct EntriesSection {
    #[serde(default)]
    entries: Option<IndexMap<String, Value>>,
}

/// `[dictionary.entries]` read straight from the TOML file.
///
/// The layered loader lowercases every map key, which would corrupt
/// dictionary keys, so inline entries never come from it. They can only
/// be set from files or code, not from environment variables.
fn file_entries(path: &str) -> Result<Option<IndexMap<String, Value>>> {
    let exact = Path::new(path);
    let resolved = if exact.is_file() {
        exact.to_path_buf()
    } else {
        exact.with_extension("toml")
    };
    if !resolved.is_file() {
        return Ok(None);
    }

    let text = fs::read_to_string(&resolved)
        .map_err(|e| config_error(format!("failed to read {}: {e}", resolved.display())))?;
    let file: EntriesFile =
        toml::from_str(&text).map_err(|e| config_error(format!("{}: {e}", resolved.display())))?;
    Ok(file.dictionary.entries)
}

fn env_source() -> Environment {
    Environment::with_prefix(CONFIG_ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}

pub(crate) fn config_error(msg: String) -> Error {
    Error::Config(ConfigError::Message(msg))
}
