use serde_json::Map;
use serde_json::Value;

use super::FieldRef;
use super::Record;
use crate::RecordError;
use crate::Result;

/// JSON-object backed record
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    fields: Map<String, Value>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one JSON object; any other top-level value is rejected
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let fields: Map<String, Value> = serde_json::from_str(text)?;
        Ok(Self { fields })
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Borrowing lookup
    pub fn get_ref(
        &self,
        field: &FieldRef,
    ) -> Option<&Value> {
        let (first, rest) = field.segments().split_first()?;
        let mut current = self.fields.get(first)?;
        for segment in rest {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl From<Map<String, Value>> for Event {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl Record for Event {
    fn get(
        &self,
        field: &FieldRef,
    ) -> Option<Value> {
        self.get_ref(field).cloned()
    }

    fn set(
        &mut self,
        field: &FieldRef,
        value: Value,
    ) -> Result<()> {
        let mut root = Value::Object(std::mem::take(&mut self.fields));
        let result = set_path(&mut root, field.segments(), value, field);
        if let Value::Object(fields) = root {
            self.fields = fields;
        }
        result.map_err(Into::into)
    }

    fn includes(
        &self,
        field: &FieldRef,
    ) -> bool {
        self.get_ref(field).is_some()
    }
}

fn set_path(
    container: &mut Value,
    segments: &[String],
    value: Value,
    field: &FieldRef,
) -> std::result::Result<(), RecordError> {
    let Some((head, rest)) = segments.split_first() else {
        *container = value;
        return Ok(());
    };

    let conflict = || RecordError::PathConflict {
        field: field.to_string(),
        segment: head.clone(),
    };

    match container {
        Value::Object(map) => {
            let child = map.entry(head.clone()).or_insert(Value::Null);
            set_path(child, rest, value, field)
        }
        Value::Array(items) => {
            let index = head.parse::<usize>().map_err(|_| conflict())?;
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            set_path(&mut items[index], rest, value, field)
        }
        Value::Null => {
            *container = Value::Object(Map::new());
            set_path(container, segments, value, field)
        }
        _ => Err(conflict()),
    }
}
