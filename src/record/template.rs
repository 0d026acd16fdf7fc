use super::FieldRef;
use super::Record;
use crate::utils::value::to_lookup_string;
use crate::RecordError;

#[derive(Clone, Debug, PartialEq)]
enum Part {
    Literal(String),
    Field { raw: String, field: FieldRef },
}

/// `%{field}` interpolation, parsed once and rendered per record
///
/// A reference that is absent from the record is left verbatim, so
/// `"%{missing}"` renders as `"%{missing}"`.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    pub fn parse(text: &str) -> std::result::Result<Self, RecordError> {
        let mut parts = Vec::new();
        let mut rest = text;

        while let Some(start) = rest.find("%{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                break;
            };
            if start > 0 {
                parts.push(Part::Literal(rest[..start].to_string()));
            }
            let raw = &rest[start..start + 2 + end + 1];
            parts.push(Part::Field {
                raw: raw.to_string(),
                field: FieldRef::parse(&after[..end])?,
            });
            rest = &after[end + 1..];
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_string()));
        }

        Ok(Self { parts })
    }

    pub fn render(
        &self,
        record: &dyn Record,
    ) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Field { raw, field } => match record.get(field) {
                    Some(value) => out.push_str(&to_lookup_string(&value)),
                    None => out.push_str(raw),
                },
            }
        }
        out
    }
}
