//! Marker-line codec
//!
//! Records are embedded in the companion note as HTML comments invisible in
//! the rendered view:
//!
//! ```text
//! <!-- EPUB_ANNOTATION: {"id":"1","cfi":"...","text":"...","color":"#ffeb3b","timestamp":1} -->
//! ```
//!
//! The payload is compact JSON, so embedded newlines in `text` or `note` are
//! escaped inside the string literal and a marker always occupies exactly one
//! line. One malformed marker never aborts the parse; it is logged and the
//! remaining markers are still recovered.

use tracing::warn;

use super::types::AnnotationRecord;

/// Prefix of an embedded annotation marker line
pub const MARKER_PREFIX: &str = "<!-- EPUB_ANNOTATION:";
const MARKER_SUFFIX: &str = "-->";

/// Extract every embedded annotation record, in document order
pub fn parse_markers(content: &str) -> Vec<AnnotationRecord> {
    let mut records = Vec::new();

    for line in content.lines() {
        let Some(payload) = marker_payload(line) else {
            continue;
        };
        match serde_json::from_str::<AnnotationRecord>(payload) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed annotation marker: {}", e),
        }
    }

    records
}

/// Serialize a record into its canonical one-line marker
pub fn marker_line(record: &AnnotationRecord) -> String {
    // serde_json never emits raw newlines in compact mode, so the marker
    // cannot split across lines
    let payload =
        serde_json::to_string(record).expect("annotation record serializes to JSON");
    format!("{} {} {}", MARKER_PREFIX, payload, MARKER_SUFFIX)
}

/// True when the line is (or is intended to be) an annotation marker
pub fn is_marker_line(line: &str) -> bool {
    line.trim_start().starts_with(MARKER_PREFIX)
}

fn marker_payload(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix(MARKER_PREFIX)?;
    let payload = rest.strip_suffix(MARKER_SUFFIX)?;
    Some(payload.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("marginalia=debug")
            .with_test_writer()
            .try_init();
    }

    fn record(id: &str) -> AnnotationRecord {
        AnnotationRecord {
            id: id.to_string(),
            cfi: format!("epubcfi(/6/4!/4/2,/1:0,/1:{})", id.len()),
            text: "highlighted words".to_string(),
            color: "#ffeb3b".to_string(),
            note: None,
            timestamp: 1,
        }
    }

    #[test]
    fn test_round_trip() {
        let original = record("42").with_note("a thought");
        let line = marker_line(&original);
        let parsed = parse_markers(&line);
        assert_eq!(parsed, vec![original]);
    }

    #[test]
    fn test_marker_is_single_line_even_with_newlines() {
        let mut r = record("1");
        r.text = "first line\nsecond line".to_string();
        r.note = Some("note with\nbreak".to_string());

        let line = marker_line(&r);
        assert!(!line.contains('\n'));

        let parsed = parse_markers(&line);
        assert_eq!(parsed, vec![r]);
    }

    #[test]
    fn test_parse_preserves_document_order() {
        let doc = format!(
            "intro text\n{}\nprose in between\n{}\n",
            marker_line(&record("first")),
            marker_line(&record("second"))
        );
        let parsed = parse_markers(&doc);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].id, "first");
        assert_eq!(parsed[1].id, "second");
    }

    #[test]
    fn test_malformed_marker_is_skipped_not_fatal() {
        init_tracing();
        let doc = format!(
            "{}\n<!-- EPUB_ANNOTATION: {{not json}} -->\n{}\n",
            marker_line(&record("a")),
            marker_line(&record("b"))
        );
        let parsed = parse_markers(&doc);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].id, "a");
        assert_eq!(parsed[1].id, "b");
    }

    #[test]
    fn test_parse_tolerates_indented_markers() {
        let line = format!("   {}", marker_line(&record("indented")));
        let parsed = parse_markers(&line);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "indented");
    }

    #[test]
    fn test_non_marker_comments_ignored() {
        let doc = "<!-- a regular html comment -->\nsome text\n";
        assert!(parse_markers(doc).is_empty());
    }

    #[test]
    fn test_serialize_parse_is_stable_across_cycles() {
        let original = record("7").with_note("keep");
        let once = marker_line(&original);
        let twice = marker_line(&parse_markers(&once)[0]);
        assert_eq!(once, twice);
    }
}
