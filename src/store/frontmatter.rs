//! Frontmatter metadata codec
//!
//! The filesystem store keeps a document's metadata block as a leading fence
//! of `key: value` lines:
//!
//! ```text
//! ---
//! epub-file: "[[My Book.epub]]"
//! epub-progress: epubcfi(/6/4!/4/2/1:0)
//! ---
//! ```
//!
//! Edits preserve the document body and unrelated keys byte-for-byte. Values
//! are stored quoted when they contain characters that would otherwise be
//! misread (`:` followed by space, leading/trailing whitespace).

use std::collections::BTreeMap;

const FENCE: &str = "---";

/// Parse the metadata block at the top of `content`
pub fn parse_metadata(content: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let Some(block) = frontmatter_block(content) else {
        return map;
    };

    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), unquote(value.trim()));
    }
    map
}

/// Read a single metadata field
pub fn get_metadata_field(content: &str, key: &str) -> Option<String> {
    parse_metadata(content).remove(key)
}

/// Return `content` with `key` set to `value` in the metadata block,
/// creating the block when absent and leaving the body untouched
pub fn set_metadata_field(content: &str, key: &str, value: &str) -> String {
    let rendered = format!("{}: {}", key, quote_if_needed(value));

    match frontmatter_block(content) {
        Some(block) => {
            let mut lines: Vec<String> = Vec::new();
            let mut replaced = false;
            for line in block.lines() {
                let is_target = line
                    .split_once(':')
                    .map(|(k, _)| k.trim() == key)
                    .unwrap_or(false);
                if is_target {
                    lines.push(rendered.clone());
                    replaced = true;
                } else {
                    lines.push(line.to_string());
                }
            }
            if !replaced {
                lines.push(rendered);
            }

            let body = &content[block_end_offset(content)..];
            format!("{}\n{}\n{}\n{}", FENCE, lines.join("\n"), FENCE, body)
        }
        None => format!("{}\n{}\n{}\n{}", FENCE, rendered, FENCE, content),
    }
}

/// The text between the opening and closing fences, when present
fn frontmatter_block(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---\n")?;
    let end = closing_fence_offset(rest)?;
    Some(&rest[..end])
}

/// Byte offset of the first body character after the closing fence
fn block_end_offset(content: &str) -> usize {
    let prefix_len = "---\n".len();
    let rest = &content[prefix_len..];
    let end = closing_fence_offset(rest).unwrap_or(0);
    let after_block = &rest[end..];
    let fence_len = if after_block.starts_with("---\n") {
        "---\n".len()
    } else {
        // fence at end of file without trailing newline
        FENCE.len()
    };
    prefix_len + end + fence_len
}

fn closing_fence_offset(rest: &str) -> Option<usize> {
    if rest.starts_with("---\n") || rest == FENCE {
        return Some(0);
    }
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches('\n') == FENCE {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

fn unquote(value: &str) -> String {
    let v = value.trim();
    if v.len() >= 2 && v.starts_with('"') && v.ends_with('"') {
        v[1..v.len() - 1].to_string()
    } else {
        v.to_string()
    }
}

fn quote_if_needed(value: &str) -> String {
    if value.contains(": ") || value != value.trim() || value.starts_with('"') {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_block() {
        let doc = "---\nepub-file: book.epub\nepub-progress: loc1\n---\nBody\n";
        let meta = parse_metadata(doc);
        assert_eq!(meta.get("epub-file").map(String::as_str), Some("book.epub"));
        assert_eq!(meta.get("epub-progress").map(String::as_str), Some("loc1"));
    }

    #[test]
    fn test_no_block_means_empty() {
        assert!(parse_metadata("just a body\n").is_empty());
        assert!(parse_metadata("").is_empty());
    }

    #[test]
    fn test_set_creates_block_when_absent() {
        let out = set_metadata_field("Body\n", "epub-progress", "loc1");
        assert_eq!(out, "---\nepub-progress: loc1\n---\nBody\n");
        assert_eq!(get_metadata_field(&out, "epub-progress").as_deref(), Some("loc1"));
    }

    #[test]
    fn test_set_updates_existing_key_and_preserves_others() {
        let doc = "---\nepub-file: book.epub\nepub-progress: old\n---\nBody\n";
        let out = set_metadata_field(doc, "epub-progress", "new");
        assert_eq!(get_metadata_field(&out, "epub-progress").as_deref(), Some("new"));
        assert_eq!(get_metadata_field(&out, "epub-file").as_deref(), Some("book.epub"));
        assert!(out.ends_with("---\nBody\n"));
    }

    #[test]
    fn test_set_appends_new_key_to_existing_block() {
        let doc = "---\nepub-file: book.epub\n---\nBody\n";
        let out = set_metadata_field(doc, "epub-annotations", "3");
        assert_eq!(get_metadata_field(&out, "epub-annotations").as_deref(), Some("3"));
        assert!(out.contains("epub-file: book.epub"));
        assert!(out.ends_with("Body\n"));
    }

    #[test]
    fn test_body_preserved_exactly() {
        let doc = "---\nk: v\n---\nline1\n\n  indented\n";
        let out = set_metadata_field(doc, "k", "w");
        assert!(out.ends_with("---\nline1\n\n  indented\n"));
    }

    #[test]
    fn test_wikilink_value_round_trips() {
        let out = set_metadata_field("Body\n", "epub-file", "[[My Book.epub]]");
        assert_eq!(
            get_metadata_field(&out, "epub-file").as_deref(),
            Some("[[My Book.epub]]")
        );
    }

    #[test]
    fn test_quoted_values() {
        let out = set_metadata_field("", "k", "a: b");
        assert!(out.contains("k: \"a: b\""));
        assert_eq!(get_metadata_field(&out, "k").as_deref(), Some("a: b"));
    }

    #[test]
    fn test_set_is_idempotent() {
        let once = set_metadata_field("Body\n", "k", "v");
        let twice = set_metadata_field(&once, "k", "v");
        assert_eq!(once, twice);
    }
}
