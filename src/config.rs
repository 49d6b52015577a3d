//! Settings persisted by the host
//!
//! The host application owns storage of these values; the core only reads
//! them. Property names address fields in the companion document's metadata
//! block, and the colour mapping list drives both the colour picker and the
//! section layout produced by the reconciler.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::annotations::ColorMapping;

/// Milliseconds to wait after the last resize signal before restoring position
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Metadata key holding the link to the EPUB document
    pub epub_link_property: String,
    /// Metadata key holding the last reading position (CFI)
    pub progress_property: String,
    /// Metadata key holding annotation bookkeeping (record count)
    pub annotations_property: String,
    /// Ordered colour mappings; order defines section creation order
    pub color_mappings: Vec<ColorMapping>,
    /// Resize settle delay in milliseconds
    pub settle_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            epub_link_property: "epub-file".to_string(),
            progress_property: "epub-progress".to_string(),
            annotations_property: "epub-annotations".to_string(),
            color_mappings: vec![ColorMapping {
                color: "#ffeb3b".to_string(),
                section_heading: "## Highlights".to_string(),
                template: None,
            }],
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl Settings {
    /// Mapping whose colour exactly matches `color`, if configured
    pub fn mapping_for_color(&self, color: &str) -> Option<&ColorMapping> {
        self.color_mappings.iter().find(|m| m.color == color)
    }

    /// Colour applied to new highlights before the user picks one
    pub fn initial_color(&self) -> String {
        self.color_mappings
            .first()
            .map(|m| m.color.clone())
            .unwrap_or_else(|| "#ffeb3b".to_string())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
