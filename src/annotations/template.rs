//! Template rendering of annotation records
//!
//! A small placeholder language turns a record into the prose line that sits
//! above its marker. Rendering is pure and total: missing fields become empty
//! strings and unrecognized placeholders are left verbatim, so a broken
//! template can never lose an annotation.

use crate::annotations::AnnotationRecord;

/// Scheme used for `{{link}}` deep links back into the reader
pub const DEEP_LINK_SCHEME: &str = "marginalia";

/// Render a record through `template`, falling back to `- <text>[ - <note>]`
///
/// Recognized placeholders:
/// - `{{text}}` - the highlighted text
/// - `{{note}}` - the note, or empty
/// - `{{link}}` - deep link to the annotation, or empty without a locator
pub fn render(
    template: Option<&str>,
    record: &AnnotationRecord,
    companion_locator: Option<&str>,
) -> String {
    let Some(template) = template else {
        return default_rendering(record);
    };

    let note = record.note.as_deref().unwrap_or("");
    let link = companion_locator
        .map(|locator| deep_link(locator, &record.cfi))
        .unwrap_or_default();

    template
        .replace("{{text}}", &record.text)
        .replace("{{note}}", note)
        .replace("{{link}}", &link)
}

/// Deep link addressing one annotation inside one companion document
pub fn deep_link(companion_locator: &str, location: &str) -> String {
    format!(
        "{}://annotation?document={}&location={}",
        DEEP_LINK_SCHEME,
        urlencoding::encode(companion_locator),
        urlencoding::encode(location)
    )
}

fn default_rendering(record: &AnnotationRecord) -> String {
    match record.note.as_deref() {
        Some(note) if !note.is_empty() => format!("- {} - {}", record.text, note),
        _ => format!("- {}", record.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AnnotationRecord {
        AnnotationRecord {
            id: "1".to_string(),
            cfi: "epubcfi(/6/4!/4/2,/1:0,/1:5)".to_string(),
            text: "Hi".to_string(),
            color: "#ffeb3b".to_string(),
            note: None,
            timestamp: 1,
        }
    }

    #[test]
    fn test_default_rendering_without_note() {
        assert_eq!(render(None, &record(), None), "- Hi");
    }

    #[test]
    fn test_default_rendering_with_note() {
        let r = record().with_note("my note");
        assert_eq!(render(None, &r, None), "- Hi - my note");
    }

    #[test]
    fn test_text_and_note_placeholders() {
        let r = record().with_note("nb");
        assert_eq!(render(Some("> {{text}} ({{note}})"), &r, None), "> Hi (nb)");
    }

    #[test]
    fn test_missing_note_renders_empty() {
        assert_eq!(render(Some("{{text}}:{{note}}"), &record(), None), "Hi:");
    }

    #[test]
    fn test_unrecognized_placeholder_passes_through() {
        assert_eq!(
            render(Some("{{text}} {{page}}"), &record(), None),
            "Hi {{page}}"
        );
    }

    #[test]
    fn test_link_requires_locator() {
        assert_eq!(render(Some("{{link}}"), &record(), None), "");
    }

    #[test]
    fn test_link_is_escaped() {
        let rendered = render(Some("{{link}}"), &record(), Some("Notes/My Book.md"));
        assert_eq!(
            rendered,
            "marginalia://annotation?document=Notes%2FMy%20Book.md\
             &location=epubcfi%28%2F6%2F4%21%2F4%2F2%2C%2F1%3A0%2C%2F1%3A5%29"
        );
    }

    #[test]
    fn test_rendering_is_total() {
        // every combination of present/absent note and locator yields a string
        for note in [None, Some("n")] {
            for locator in [None, Some("a.md")] {
                let mut r = record();
                r.note = note.map(str::to_string);
                let out = render(Some("{{text}}|{{note}}|{{link}}|{{oops}}"), &r, locator);
                assert!(out.contains("Hi"));
                assert!(out.contains("{{oops}}"));
            }
        }
    }
}
