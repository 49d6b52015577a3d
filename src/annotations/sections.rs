//! Colour-keyed section reconciliation
//!
//! Rewrites the generated portion of a companion document from a record set
//! while leaving the reader's own prose untouched. Two paths exist:
//!
//! - `reorganize`: full rebuild, idempotent, used by the explicit command
//! - `insert`: incremental append of one new record, used on every selection
//!
//! Both produce documents from which `parse_markers` recovers exactly the
//! expected record set. The two paths are plain read-modify-write against the
//! host store, which has no transaction primitive; a concurrent insert and
//! reorganize can overwrite each other's write. That race is accepted: both
//! are user-initiated and only the newest annotation is at stake, never the
//! source prose.

use tracing::debug;

use super::codec::{is_marker_line, marker_line};
use super::template::render;
use super::types::{AnnotationRecord, ColorMapping};

/// Rebuild every colour-keyed section from `records`
///
/// Previously generated blocks are removed at their exact heading anchors,
/// stray markers are stripped, and sections are re-appended in mapping
/// order. A mapping with no matching records produces no heading.
pub fn reorganize(
    content: &str,
    mappings: &[ColorMapping],
    records: &[AnnotationRecord],
    companion_locator: Option<&str>,
) -> String {
    let mut lines: Vec<&str> = content.lines().collect();

    // blocks first: rendered entries are recognized by the marker on the
    // line below them, which stripping would erase
    for mapping in mappings {
        remove_generated_blocks(&mut lines, &mapping.section_heading);
    }
    lines.retain(|line| !is_marker_line(line));

    let mut out = lines.join("\n").trim_end().to_string();

    for mapping in mappings {
        let matching: Vec<&AnnotationRecord> = records
            .iter()
            .filter(|r| r.color == mapping.color)
            .collect();
        if matching.is_empty() {
            continue;
        }

        debug!(
            "Rebuilding section {:?} with {} record(s)",
            mapping.section_heading,
            matching.len()
        );

        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&mapping.section_heading);
        for record in matching {
            out.push_str("\n\n");
            out.push_str(&entry_text(record, mapping, companion_locator));
        }
    }

    out.push('\n');
    out
}

/// Insert one freshly created record without rebuilding the whole document
///
/// If the mapping's heading already exists the entry lands directly under it
/// (newest first, matching the section's growth order); otherwise a new
/// heading block is appended at document end.
pub fn insert(
    content: &str,
    record: &AnnotationRecord,
    mapping: &ColorMapping,
    companion_locator: Option<&str>,
) -> String {
    let entry = entry_text(record, mapping, companion_locator);
    let heading = mapping.section_heading.as_str();

    let lines: Vec<&str> = content.lines().collect();
    if let Some(at) = lines.iter().position(|line| line.trim_end() == heading) {
        let mut out = String::new();
        for line in &lines[..=at] {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&entry);
        out.push('\n');
        for line in &lines[at + 1..] {
            out.push_str(line);
            out.push('\n');
        }
        return out;
    }

    let body = content.trim_end();
    if body.is_empty() {
        format!("{}\n\n{}\n", heading, entry)
    } else {
        format!("{}\n\n{}\n\n{}\n", body, heading, entry)
    }
}

/// Rendered prose line(s) plus the marker that makes the record recoverable
fn entry_text(
    record: &AnnotationRecord,
    mapping: &ColorMapping,
    companion_locator: Option<&str>,
) -> String {
    let rendered = render(mapping.template.as_deref(), record, companion_locator);
    format!("{}\n{}", rendered, marker_line(record))
}

/// Remove every block anchored at an exact `heading` line
///
/// A generated block is the heading plus the contiguous run of blank lines,
/// marker lines, and rendered entry lines (identified by the marker sitting
/// directly below them, whatever template shape produced them). The first
/// line of any other shape ends the block, so reader prose directly under a
/// heading survives.
fn remove_generated_blocks(lines: &mut Vec<&str>, heading: &str) {
    while let Some(at) = lines.iter().position(|line| line.trim_end() == heading) {
        let mut end = at + 1;
        while end < lines.len() && is_generated_at(lines, end) {
            end += 1;
        }
        lines.drain(at..end);
    }
}

fn is_generated_at(lines: &[&str], at: usize) -> bool {
    let line = lines[at];
    if line.trim().is_empty() || is_marker_line(line) {
        return true;
    }
    lines.get(at + 1).is_some_and(|next| is_marker_line(next))
}
