use serde::Deserialize;
use serde::Serialize;

use super::config_error;
use crate::FieldRef;
use crate::Result;
use crate::Template;

/// Deserialization applied to the rendered fallback before it is written
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FallbackFormat {
    /// Written as a string
    #[default]
    Plain,
    Json,
    Yaml,
}

/// Which record fields are read and written
///
/// ```toml
/// [field]
/// source = "[http][status]"
/// target = "[http][status_text]"
/// override = true
/// fallback = "unknown status %{[http][status]}"
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct FieldConfig {
    /// Field holding the value to look up. When `iterate_on` names a
    /// different field, this is relative to each object of that array.
    #[serde(default)]
    pub source: String,

    /// Destination; defaults to `<source>_translation`
    #[serde(default)]
    pub target: Option<String>,

    /// Field holding an array. Equal to `source` for an array of values,
    /// otherwise an array of objects translated one by one.
    #[serde(default)]
    pub iterate_on: Option<String>,

    /// Overwrite an existing destination value
    #[serde(default, rename = "override")]
    pub override_existing: bool,

    /// Template rendered when nothing matches; may reference `%{field}`
    #[serde(default)]
    pub fallback: Option<String>,

    #[serde(default)]
    pub fallback_format: FallbackFormat,
}

impl FieldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(config_error("field.source must be set".to_string()));
        }

        FieldRef::parse(&self.source).map_err(|e| config_error(e.to_string()))?;
        for reference in [&self.target, &self.iterate_on].into_iter().flatten() {
            FieldRef::parse(reference).map_err(|e| config_error(e.to_string()))?;
        }

        if let Some(fallback) = &self.fallback {
            Template::parse(fallback).map_err(|e| config_error(format!("field.fallback: {e}")))?;
        }

        Ok(())
    }
}
