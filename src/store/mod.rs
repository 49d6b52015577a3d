//! Host document store collaborator
//!
//! The host owns all durable storage: companion note text, the metadata block
//! attached to each note, and link resolution. The core holds no durable
//! state of its own; everything in memory is a cache rebuilt from the store.

mod frontmatter;
mod fs;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

pub use frontmatter::{get_metadata_field, parse_metadata, set_metadata_field};
pub use fs::FileVault;

/// Host store interface
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Raw bytes of a stored document (the EPUB container)
    async fn read_binary(&self, path: &str) -> Result<Vec<u8>>;

    /// UTF-8 text of a stored document
    async fn read_text(&self, path: &str) -> Result<String>;

    /// Replace a document's text
    async fn write_text(&self, path: &str, text: &str) -> Result<()>;

    /// The key-value metadata block attached to a document
    async fn get_metadata(&self, path: &str) -> Result<BTreeMap<String, String>>;

    /// Set one field of a document's metadata block
    async fn set_metadata_field(&self, path: &str, key: &str, value: &str) -> Result<()>;

    /// Resolve a link reference (wikilink text or plain path) to a concrete
    /// document path, using `context_path` as the resolution origin
    async fn resolve_link(&self, link_text: &str, context_path: &str) -> Result<Option<String>>;
}
