use serde_json::Value;
use tracing::trace;
use tracing::warn;

use super::UpdateSpec;
use crate::FieldRef;
use crate::Record;
use crate::Result;

/// Translates a field inside every object of an array.
///
/// `source` and `target` are relative to each element of `iterate_on`:
/// with `iterate_on = [hits]` and `source = [code]` element *i* is read at
/// `[hits][i][code]` and written at `[hits][i][<target>]`.
#[derive(Debug)]
pub struct ArrayOfMapsUpdate {
    spec: UpdateSpec,
    base: FieldRef,
}

impl ArrayOfMapsUpdate {
    pub fn new(spec: UpdateSpec) -> Self {
        let base = spec.iterate_on.clone().unwrap_or_else(|| spec.source.clone());
        Self { spec, base }
    }

    pub fn spec(&self) -> &UpdateSpec {
        &self.spec
    }

    /// Only the array needs to exist; the override check is per object.
    pub fn test_for_inclusion(
        &self,
        record: &dyn Record,
    ) -> bool {
        record.includes(&self.base)
    }

    /// Either every object is updated or the record is left as it was:
    /// all lookups and fallbacks are resolved before the first write, and
    /// the original array is restored if a write fails.
    pub fn update(
        &self,
        record: &mut dyn Record,
    ) -> Result<bool> {
        let original = match record.get(&self.base) {
            Some(Value::Array(items)) => items,
            _ => {
                trace!(field = %self.base, "iterate_on field is not an array");
                return Ok(false);
            }
        };

        let mut writes = Vec::new();
        for index in 0..original.len() {
            let element = self.base.index(index);
            let source = element.join(&self.spec.source);
            let target = element.join(&self.spec.target);

            if self.spec.target_blocked(&*record, &target) {
                continue;
            }

            let found = record.get(&source).and_then(|value| self.spec.lookup(&value));
            let value = match found {
                Some(value) => value,
                None => match self.spec.render_fallback(&*record)? {
                    Some(fallback) => fallback,
                    None => continue,
                },
            };
            writes.push((target, value));
        }

        for (target, value) in &writes {
            if let Err(e) = record.set(target, value.clone()) {
                if let Err(restore) = record.set(&self.base, Value::Array(original)) {
                    warn!(field = %self.base, error = %restore, "failed to restore array after write error");
                }
                return Err(e);
            }
        }

        Ok(!writes.is_empty())
    }
}
