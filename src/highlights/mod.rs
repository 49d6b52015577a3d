//! Highlight synchronizer
//!
//! Bridges the record set in the companion note and the overlay highlights in
//! the renderer. On load, every parsed record is replayed as an overlay; on a
//! new selection, a record is built from the currently selected colour and
//! appended to the note via the incremental insert path. The in-memory record
//! list is a cache of the note and may be rebuilt at any time.

use tracing::{debug, warn};

use crate::annotations::{self, AnnotationRecord, ColorMapping};
use crate::config::Settings;
use crate::error::Result;
use crate::rendition::{HighlightStyle, Rendition};
use crate::store::VaultStore;

/// Per-view highlight state
pub struct HighlightSync {
    selected_color: String,
    records: Vec<AnnotationRecord>,
}

impl HighlightSync {
    pub fn new(settings: &Settings) -> Self {
        Self {
            selected_color: settings.initial_color(),
            records: Vec::new(),
        }
    }

    /// Replace the cached record set (after a load or reorganize)
    pub fn set_records(&mut self, records: Vec<AnnotationRecord>) {
        self.records = records;
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    /// Colour applied to records created from now on
    pub fn set_selected_color(&mut self, color: &str) {
        self.selected_color = color.to_string();
    }

    pub fn selected_color(&self) -> &str {
        &self.selected_color
    }

    /// Replay every cached record as an overlay
    ///
    /// A record whose location no longer resolves (the document was edited
    /// since) is skipped; the remaining overlays still appear.
    pub fn replay(&self, rendition: &dyn Rendition) {
        for record in &self.records {
            let style = HighlightStyle::for_color(&record.color);
            if let Err(e) = rendition.add_highlight(&record.cfi, &style) {
                debug!("Could not display highlight {}: {}", record.id, e);
            }
        }
    }

    /// Build a record for a fresh selection using the selected colour
    ///
    /// Returns `None` for empty selections.
    pub fn begin_record(&self, cfi_range: &str, text: &str) -> Option<AnnotationRecord> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(AnnotationRecord::new(cfi_range, trimmed, &self.selected_color))
    }

    /// Persist a confirmed record into the companion note and the overlay
    pub async fn commit(
        &mut self,
        record: AnnotationRecord,
        rendition: &dyn Rendition,
        store: &dyn VaultStore,
        settings: &Settings,
        companion_path: &str,
    ) -> Result<()> {
        let style = HighlightStyle::for_color(&record.color);
        if let Err(e) = rendition.add_highlight(&record.cfi, &style) {
            // the overlay is cosmetic; the durable write still proceeds
            warn!("Could not display new highlight {}: {}", record.id, e);
        }

        let mapping = settings
            .mapping_for_color(&record.color)
            .cloned()
            .unwrap_or_else(ColorMapping::fallback);

        let content = store.read_text(companion_path).await?;
        let updated = annotations::insert(&content, &record, &mapping, Some(companion_path));
        store.write_text(companion_path, &updated).await?;

        self.records.push(record);
        self.mirror_count(store, settings, companion_path).await;
        Ok(())
    }

    /// Rebuild every colour-keyed section of the companion note
    pub async fn reorganize(
        &mut self,
        store: &dyn VaultStore,
        settings: &Settings,
        companion_path: &str,
    ) -> Result<()> {
        let content = store.read_text(companion_path).await?;
        let records = annotations::parse_markers(&content);
        let updated = annotations::reorganize(
            &content,
            &settings.color_mappings,
            &records,
            Some(companion_path),
        );
        store.write_text(companion_path, &updated).await?;

        self.records = records;
        self.mirror_count(store, settings, companion_path).await;
        Ok(())
    }

    /// Mirror the record count into the annotations metadata key
    ///
    /// Bookkeeping only; the note body stays authoritative, so a failure here
    /// is logged and dropped.
    async fn mirror_count(
        &self,
        store: &dyn VaultStore,
        settings: &Settings,
        companion_path: &str,
    ) {
        let count = self.records.len().to_string();
        if let Err(e) = store
            .set_metadata_field(companion_path, &settings.annotations_property, &count)
            .await
        {
            warn!("Failed to update {}: {}", settings.annotations_property, e);
        }
    }
}
