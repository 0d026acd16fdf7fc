use serde_json::Value;

use super::UpdateSpec;
use crate::Record;
use crate::Result;

/// Translates every element of an array field into a parallel array.
///
/// The destination always has the source's length. Unmatched positions
/// hold the fallback, or null when none is configured. A scalar source is
/// treated as a one-element array.
#[derive(Debug)]
pub struct ArrayOfValuesUpdate {
    spec: UpdateSpec,
}

impl ArrayOfValuesUpdate {
    pub fn new(spec: UpdateSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &UpdateSpec {
        &self.spec
    }

    pub fn test_for_inclusion(
        &self,
        record: &dyn Record,
    ) -> bool {
        record.includes(&self.spec.source) && !self.spec.target_blocked(record, &self.spec.target)
    }

    pub fn update(
        &self,
        record: &mut dyn Record,
    ) -> Result<bool> {
        let items = match record.get(&self.spec.source) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(value) => vec![value],
        };

        // Same text for every position; the template only sees the record
        let fallback = self.spec.render_fallback(&*record)?.unwrap_or(Value::Null);

        let translated = items
            .iter()
            .map(|item| self.spec.lookup(item).unwrap_or_else(|| fallback.clone()))
            .collect::<Vec<_>>();
        let any = translated.iter().any(|v| !v.is_null());

        record.set(&self.spec.target, Value::Array(translated))?;
        Ok(any)
    }
}
