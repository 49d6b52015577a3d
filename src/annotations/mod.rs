//! Annotation records and the companion-document codec
//!
//! The companion note is the sole durable store. Each annotation lives in the
//! note twice: once as human-editable prose rendered from a template, and once
//! as a hidden single-line marker carrying the full structured record. This
//! module provides:
//!
//! - `types`: the record and colour-mapping data model
//! - `codec`: marker-line parse/serialize (round-trip safe)
//! - `template`: placeholder rendering of a record into prose
//! - `sections`: idempotent colour-keyed section reconciliation

mod codec;
mod sections;
mod template;
mod types;

pub use codec::{is_marker_line, marker_line, parse_markers, MARKER_PREFIX};
pub use sections::{insert, reorganize};
pub use template::{deep_link, render, DEEP_LINK_SCHEME};
pub use types::{AnnotationRecord, ColorMapping};
