use serde_json::Value;
use tracing::trace;

use super::UpdateSpec;
use crate::Record;
use crate::Result;

/// Translates one scalar field.
///
/// When the source holds an array only its first element is looked up.
#[derive(Debug)]
pub struct SingleValueUpdate {
    spec: UpdateSpec,
}

impl SingleValueUpdate {
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
        let value = match record.get(&self.spec.source) {
            Some(Value::Array(items)) => items.into_iter().next().unwrap_or(Value::Null),
            Some(value) => value,
            None => Value::Null,
        };

        if let Some(found) = self.spec.lookup(&value) {
            record.set(&self.spec.target, found)?;
            return Ok(true);
        }

        match self.spec.render_fallback(&*record)? {
            Some(fallback) => {
                trace!(target_field = %self.spec.target, "no match, writing fallback");
                record.set(&self.spec.target, fallback)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
