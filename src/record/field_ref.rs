use std::fmt;

use crate::constants::DEFAULT_TARGET_SUFFIX;
use crate::RecordError;

/// Parsed field reference
///
/// Accepts the bracket form `[a][b][0]` or a bare top-level name `a`;
/// both normalise to the bracket form when displayed. Numeric segments
/// address array elements when the value at that level is an array.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    segments: Vec<String>,
}

impl FieldRef {
    pub fn parse(reference: &str) -> std::result::Result<Self, RecordError> {
        let reference = reference.trim();
        let invalid = || RecordError::InvalidReference(reference.to_string());

        if reference.is_empty() {
            return Err(invalid());
        }

        if !reference.starts_with('[') {
            if reference.contains('[') || reference.contains(']') {
                return Err(invalid());
            }
            return Ok(Self {
                segments: vec![reference.to_string()],
            });
        }

        let mut segments = Vec::new();
        let mut rest = reference;
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[').ok_or_else(invalid)?;
            let end = inner.find(']').ok_or_else(invalid)?;
            let segment = &inner[..end];
            if segment.is_empty() || segment.contains('[') {
                return Err(invalid());
            }
            segments.push(segment.to_string());
            rest = &inner[end + 1..];
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// `self` followed by every segment of `child`
    pub fn join(
        &self,
        child: &FieldRef,
    ) -> FieldRef {
        let mut segments = self.segments.clone();
        segments.extend(child.segments.iter().cloned());
        FieldRef { segments }
    }

    /// `self[index]`
    pub fn index(
        &self,
        index: usize,
    ) -> FieldRef {
        let mut segments = self.segments.clone();
        segments.push(index.to_string());
        FieldRef { segments }
    }

    /// Sibling of this field with `_translation` appended to the last segment
    pub fn default_target(&self) -> FieldRef {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            last.push_str(DEFAULT_TARGET_SUFFIX);
        }
        FieldRef { segments }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "[{segment}]")?;
        }
        Ok(())
    }
}
