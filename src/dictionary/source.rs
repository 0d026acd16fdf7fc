use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use serde_json::Value;
use tracing::trace;

use super::DictionarySource;
use crate::constants::UTF8_BOM;
use crate::utils::value::yaml_key_to_string;
use crate::utils::value::yaml_to_json;
use crate::DictionaryError;

/// File formats understood by [`FileSource`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DictionaryFormat {
    /// `.yml` / `.yaml`; values may be arbitrarily nested
    Yaml,
    /// `.json`; a single top-level object
    Json,
    /// `.csv`; two columns, key then value
    Csv,
}

impl DictionaryFormat {
    pub fn from_path(path: &Path) -> Result<Self, DictionaryError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        match ext {
            "yml" | "yaml" => Ok(DictionaryFormat::Yaml),
            "json" => Ok(DictionaryFormat::Json),
            "csv" => Ok(DictionaryFormat::Csv),
            _ => Err(DictionaryError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DictionaryFormat::Yaml => "yaml",
            DictionaryFormat::Json => "json",
            DictionaryFormat::Csv => "csv",
        }
    }
}

/// Dictionary file on local disk
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: DictionaryFormat,
    max_bytes: u64,
}

impl FileSource {
    pub fn new(
        path: impl Into<PathBuf>,
        max_bytes: u64,
    ) -> Result<Self, DictionaryError> {
        let path = path.into();
        let format = DictionaryFormat::from_path(&path)?;
        Ok(Self {
            path,
            format,
            max_bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DictionaryFormat {
        self.format
    }

    fn read_bytes(&self) -> Result<Vec<u8>, DictionaryError> {
        let size = fs::metadata(&self.path).map_err(|e| self.io_error(e))?.len();
        if size > self.max_bytes {
            return Err(DictionaryError::TooLarge {
                path: self.path.clone(),
                size,
                limit: self.max_bytes,
            });
        }

        let mut bytes = fs::read(&self.path).map_err(|e| self.io_error(e))?;
        if bytes.starts_with(UTF8_BOM) {
            bytes.drain(..UTF8_BOM.len());
        }
        Ok(bytes)
    }

    fn io_error(
        &self,
        e: io::Error,
    ) -> DictionaryError {
        if e.kind() == io::ErrorKind::NotFound {
            DictionaryError::Missing {
                path: self.path.clone(),
            }
        } else {
            DictionaryError::Io {
                path: self.path.clone(),
                source: e,
            }
        }
    }

    fn parse_error(
        &self,
        message: impl ToString,
    ) -> DictionaryError {
        DictionaryError::Parse {
            path: self.path.clone(),
            format: self.format.name(),
            message: message.to_string(),
        }
    }

    fn parse_yaml(
        &self,
        bytes: &[u8],
    ) -> Result<Vec<(String, Value)>, DictionaryError> {
        let doc: serde_yaml::Value = serde_yaml::from_slice(bytes).map_err(|e| self.parse_error(e))?;
        match doc {
            serde_yaml::Value::Null => Ok(Vec::new()),
            serde_yaml::Value::Mapping(mapping) => Ok(mapping
                .into_iter()
                .map(|(k, v)| (yaml_key_to_string(k), yaml_to_json(v)))
                .collect()),
            _ => Err(self.parse_error("top-level value must be a mapping")),
        }
    }

    fn parse_json(
        &self,
        bytes: &[u8],
    ) -> Result<Vec<(String, Value)>, DictionaryError> {
        match serde_json::from_slice::<Value>(bytes).map_err(|e| self.parse_error(e))? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            _ => Err(self.parse_error("top-level value must be an object")),
        }
    }

    fn parse_csv(
        &self,
        bytes: &[u8],
    ) -> Result<Vec<(String, Value)>, DictionaryError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut pairs = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| self.parse_error(e))?;
            let Some(key) = row.get(0) else {
                continue;
            };
            let value = row.get(1).map_or(Value::Null, |v| Value::String(v.to_string()));
            pairs.push((key.to_string(), value));
        }
        Ok(pairs)
    }
}

impl DictionarySource for FileSource {
    fn read(&self) -> Result<Vec<(String, Value)>, DictionaryError> {
        let bytes = self.read_bytes()?;
        let pairs = match self.format {
            DictionaryFormat::Yaml => self.parse_yaml(&bytes)?,
            DictionaryFormat::Json => self.parse_json(&bytes)?,
            DictionaryFormat::Csv => self.parse_csv(&bytes)?,
        };
        trace!(path = %self.path.display(), entries = pairs.len(), "parsed dictionary file");
        Ok(pairs)
    }

    fn modified(&self) -> Result<SystemTime, DictionaryError> {
        fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| self.io_error(e))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
