//! Record updates driven by dictionary lookups.
//!
//! One [`FieldUpdater`] exists per configured translation rule. The shape is
//! chosen once from the field configuration and never changes:
//!
//! | `iterate_on`      | shape                                      |
//! |-------------------|--------------------------------------------|
//! | unset             | [`SingleValueUpdate`]                      |
//! | equal to `source` | [`ArrayOfValuesUpdate`]                    |
//! | any other field   | [`ArrayOfMapsUpdate`] (`source` is relative) |
//!
//! Updaters are immutable after construction and shared by every worker.

mod array_of_maps;
mod array_of_values;
mod single_value;
pub use array_of_maps::*;
pub use array_of_values::*;
pub use single_value::*;

#[cfg(test)]
mod update_test;

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::utils::value::to_lookup_string;
use crate::utils::value::yaml_to_json;
use crate::DictionaryStore;
use crate::FallbackFormat;
use crate::FieldConfig;
use crate::FieldRef;
use crate::Record;
use crate::RecordError;
use crate::Result;
use crate::Template;

/// Value written when nothing matches
#[derive(Clone, Debug)]
pub struct Fallback {
    template: Template,
    format: FallbackFormat,
}

impl Fallback {
    pub fn new(
        template: Template,
        format: FallbackFormat,
    ) -> Self {
        Self { template, format }
    }

    /// Renders the template against `record`, then deserializes the text
    /// according to the configured format.
    pub fn render(
        &self,
        record: &dyn Record,
    ) -> std::result::Result<Value, RecordError> {
        let text = self.template.render(record);
        match self.format {
            FallbackFormat::Plain => Ok(Value::String(text)),
            FallbackFormat::Json => serde_json::from_str(&text).map_err(|e| RecordError::Fallback {
                format: "json",
                message: e.to_string(),
            }),
            FallbackFormat::Yaml => serde_yaml::from_str::<serde_yaml::Value>(&text)
                .map(yaml_to_json)
                .map_err(|e| RecordError::Fallback {
                    format: "yaml",
                    message: e.to_string(),
                }),
        }
    }
}

/// Static configuration of one translation rule
#[derive(Clone, Debug)]
pub struct UpdateSpec {
    pub source: FieldRef,
    pub iterate_on: Option<FieldRef>,
    pub target: FieldRef,
    pub override_existing: bool,
    pub fallback: Option<Fallback>,
    pub store: Arc<DictionaryStore>,
}

impl UpdateSpec {
    /// Resolves field references; `target` defaults to `<source>_translation`.
    pub fn from_config(
        config: &FieldConfig,
        store: Arc<DictionaryStore>,
    ) -> Result<Self> {
        let source = FieldRef::parse(&config.source)?;
        let target = match &config.target {
            Some(target) => FieldRef::parse(target)?,
            None => source.default_target(),
        };
        let iterate_on = config.iterate_on.as_deref().map(FieldRef::parse).transpose()?;
        let fallback = config
            .fallback
            .as_deref()
            .map(|text| Template::parse(text).map(|t| Fallback::new(t, config.fallback_format)))
            .transpose()?;

        Ok(Self {
            source,
            iterate_on,
            target,
            override_existing: config.override_existing,
            fallback,
            store,
        })
    }

    /// Dictionary lookup of a record value in its string form
    pub(crate) fn lookup(
        &self,
        value: &Value,
    ) -> Option<Value> {
        let key = to_lookup_string(value);
        let found = self.store.fetch(&key);
        trace!(%key, matched = found.is_some(), "dictionary lookup");
        found
    }

    pub(crate) fn render_fallback(
        &self,
        record: &dyn Record,
    ) -> Result<Option<Value>> {
        match &self.fallback {
            Some(fallback) => Ok(Some(fallback.render(record)?)),
            None => Ok(None),
        }
    }

    /// `true` when an existing value at `target` blocks the write
    pub(crate) fn target_blocked(
        &self,
        record: &dyn Record,
        target: &FieldRef,
    ) -> bool {
        !self.override_existing && record.includes(target)
    }
}

/// The three record shapes, selected once at construction
#[derive(Debug)]
pub enum FieldUpdater {
    SingleValue(SingleValueUpdate),
    ArrayOfValues(ArrayOfValuesUpdate),
    ArrayOfMaps(ArrayOfMapsUpdate),
}

impl FieldUpdater {
    pub fn new(spec: UpdateSpec) -> Self {
        match &spec.iterate_on {
            None => FieldUpdater::SingleValue(SingleValueUpdate::new(spec)),
            Some(iterate_on) if *iterate_on == spec.source => {
                FieldUpdater::ArrayOfValues(ArrayOfValuesUpdate::new(spec))
            }
            Some(_) => FieldUpdater::ArrayOfMaps(ArrayOfMapsUpdate::new(spec)),
        }
    }

    pub fn spec(&self) -> &UpdateSpec {
        match self {
            FieldUpdater::SingleValue(u) => u.spec(),
            FieldUpdater::ArrayOfValues(u) => u.spec(),
            FieldUpdater::ArrayOfMaps(u) => u.spec(),
        }
    }

    /// Whether `update` should run at all for this record
    pub fn test_for_inclusion(
        &self,
        record: &dyn Record,
    ) -> bool {
        match self {
            FieldUpdater::SingleValue(u) => u.test_for_inclusion(record),
            FieldUpdater::ArrayOfValues(u) => u.test_for_inclusion(record),
            FieldUpdater::ArrayOfMaps(u) => u.test_for_inclusion(record),
        }
    }

    /// Returns `true` when at least one destination value was written
    pub fn update(
        &self,
        record: &mut dyn Record,
    ) -> Result<bool> {
        match self {
            FieldUpdater::SingleValue(u) => u.update(record),
            FieldUpdater::ArrayOfValues(u) => u.update(record),
            FieldUpdater::ArrayOfMaps(u) => u.update(record),
        }
    }
}
