//! Annotation data model
//!
//! A record is immutable once written to the companion document, except for
//! `note`, which may only be amended by rewriting the whole record. The
//! `location` field is an opaque renderer-defined token (EPUB CFI range) and
//! is never parsed by this crate.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single highlight annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Unique, time-derived identifier
    pub id: String,
    /// Opaque canonical location token (CFI range)
    pub cfi: String,
    /// The highlighted text, immutable once created
    pub text: String,
    /// Colour key joining this record to a configured section
    pub color: String,
    /// Optional user note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Creation time in milliseconds since the epoch
    pub timestamp: i64,
}

impl AnnotationRecord {
    /// Create a record for a fresh selection, stamped with the current time
    pub fn new(cfi: &str, text: &str, color: &str) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: now.to_string(),
            cfi: cfi.to_string(),
            text: text.to_string(),
            color: color.to_string(),
            note: None,
            timestamp: now,
        }
    }

    /// Attach a note, dropping empty input
    pub fn with_note(mut self, note: &str) -> Self {
        if !note.is_empty() {
            self.note = Some(note.to_string());
        }
        self
    }
}

/// One entry of the colour-mapping table
///
/// The colour value is both the visual fill and the join key between a record
/// and its destination section. Section headings must be unique across the
/// table; they anchor block removal during reconciliation by exact match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMapping {
    pub color: String,
    pub section_heading: String,
    /// Placeholder template; `None` falls back to the default rendering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl ColorMapping {
    pub fn new(color: &str, section_heading: &str) -> Self {
        Self {
            color: color.to_string(),
            section_heading: section_heading.to_string(),
            template: None,
        }
    }

    pub fn with_template(mut self, template: &str) -> Self {
        self.template = Some(template.to_string());
        self
    }

    /// Destination for colours with no configured mapping
    pub fn fallback() -> Self {
        Self::new("#ffeb3b", "## Highlights")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_time_derived() {
        let record = AnnotationRecord::new("epubcfi(/6/4!/4/2,/1:0,/1:5)", "Hello", "#ffeb3b");
        assert_eq!(record.id, record.timestamp.to_string());
        assert!(record.note.is_none());
    }

    #[test]
    fn test_with_note_drops_empty() {
        let record = AnnotationRecord::new("loc", "Hello", "#ffeb3b").with_note("");
        assert!(record.note.is_none());

        let record = AnnotationRecord::new("loc", "Hello", "#ffeb3b").with_note("remember this");
        assert_eq!(record.note.as_deref(), Some("remember this"));
    }

    #[test]
    fn test_record_serialization_shape() {
        let record = AnnotationRecord {
            id: "1".to_string(),
            cfi: "loc1".to_string(),
            text: "Hi".to_string(),
            color: "#ffeb3b".to_string(),
            note: None,
            timestamp: 1,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"id\":\"1\""));
        assert!(json.contains("\"cfi\":\"loc1\""));
        // absent note is omitted entirely
        assert!(!json.contains("note"));
    }
}
