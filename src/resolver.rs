//! Document link resolution
//!
//! The companion note names its EPUB in a metadata field, either as a
//! wikilink (`[[My Book.epub]]`) or as a plain path. Resolution failures are
//! terminal for the view: they are reported once, with no retry.

use tracing::debug;

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::store::VaultStore;

/// Resolve the document path linked from `companion_path`'s metadata
pub async fn resolve_document(
    store: &dyn VaultStore,
    settings: &Settings,
    companion_path: &str,
) -> Result<String> {
    let metadata = store.get_metadata(companion_path).await?;
    let link = metadata
        .get(&settings.epub_link_property)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            AppError::Resolution(format!(
                "{} has no {} property",
                companion_path, settings.epub_link_property
            ))
        })?;

    let link_text = if let Some(inner) = wikilink_target(&link) {
        debug!("Resolving wikilink: {}", inner);
        inner
    } else {
        debug!("Treating as plain path: {}", link);
        link.as_str()
    };

    store
        .resolve_link(link_text, companion_path)
        .await?
        .ok_or_else(|| AppError::Resolution(format!("cannot resolve {:?}", link)))
}

/// Resolve the linked document and read its raw bytes for the renderer
pub async fn load_document_bytes(
    store: &dyn VaultStore,
    settings: &Settings,
    companion_path: &str,
) -> Result<(String, Vec<u8>)> {
    let path = resolve_document(store, settings, companion_path).await?;
    let bytes = store.read_binary(&path).await?;
    Ok((path, bytes))
}

/// The inner target of a `[[...]]` wikilink, stripping any `|alias`
fn wikilink_target(link: &str) -> Option<&str> {
    let inner = link.strip_prefix("[[")?.strip_suffix("]]")?;
    let target = inner.split('|').next().unwrap_or(inner).trim();
    (!target.is_empty()).then_some(target)
}
