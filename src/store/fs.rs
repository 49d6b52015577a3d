//! Filesystem-backed vault store
//!
//! Maps store paths to files under a root directory. Metadata lives inside
//! the documents themselves as a frontmatter block. Wikilink resolution
//! follows the host convention: a bare name matches any file in the vault
//! with that basename, with or without the `.epub` extension.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AppError, Result};

use super::frontmatter;
use super::VaultStore;

/// `VaultStore` over a directory tree
pub struct FileVault {
    root: PathBuf,
}

impl FileVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn absolute(&self, path: &str) -> PathBuf {
        self.root.join(normalize(path))
    }

    /// Depth-first search for a file whose name matches `name` (exactly, or
    /// with `.epub` appended)
    async fn find_by_name(&self, name: &str) -> Result<Option<String>> {
        let with_ext = format!("{}.epub", name);
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| AppError::Store(format!("cannot list {}: {}", dir.display(), e)))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| AppError::Store(e.to_string()))?
            {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                let file_name = entry.file_name();
                let file_name = file_name.to_string_lossy();
                if file_name == name || file_name == with_ext {
                    return Ok(Some(relative_to(&path, &self.root)));
                }
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl VaultStore for FileVault {
    async fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(self.absolute(path))
            .await
            .map_err(|e| AppError::Store(format!("read {}: {}", path, e)))
    }

    async fn read_text(&self, path: &str) -> Result<String> {
        tokio::fs::read_to_string(self.absolute(path))
            .await
            .map_err(|e| AppError::Store(format!("read {}: {}", path, e)))
    }

    async fn write_text(&self, path: &str, text: &str) -> Result<()> {
        let absolute = self.absolute(path);
        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Store(e.to_string()))?;
        }
        tokio::fs::write(absolute, text)
            .await
            .map_err(|e| AppError::Store(format!("write {}: {}", path, e)))
    }

    async fn get_metadata(&self, path: &str) -> Result<std::collections::BTreeMap<String, String>> {
        let content = self.read_text(path).await?;
        Ok(frontmatter::parse_metadata(&content))
    }

    async fn set_metadata_field(&self, path: &str, key: &str, value: &str) -> Result<()> {
        let content = self.read_text(path).await?;
        let updated = frontmatter::set_metadata_field(&content, key, value);
        self.write_text(path, &updated).await
    }

    async fn resolve_link(&self, link_text: &str, context_path: &str) -> Result<Option<String>> {
        let candidate = normalize(link_text);

        // paths resolve relative to the vault root, then relative to the
        // linking document's directory
        if self.absolute(&candidate).is_file() {
            return Ok(Some(candidate));
        }
        if let Some(parent) = Path::new(context_path).parent() {
            let sibling = parent.join(&candidate);
            if self.root.join(&sibling).is_file() {
                return Ok(Some(sibling.to_string_lossy().into_owned()));
            }
        }

        // bare names search the whole vault by basename
        if !candidate.contains('/') {
            debug!("Resolving wikilink by basename: {}", candidate);
            return self.find_by_name(&candidate).await;
        }

        Ok(None)
    }
}

/// Collapse `./` segments and backslashes into the canonical store form
fn normalize(path: &str) -> String {
    path.trim()
        .replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn relative_to(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn vault_with(files: &[(&str, &str)]) -> (TempDir, FileVault) {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let absolute = dir.path().join(path);
            tokio::fs::create_dir_all(absolute.parent().unwrap())
                .await
                .unwrap();
            tokio::fs::write(absolute, content).await.unwrap();
        }
        let vault = FileVault::new(dir.path());
        (dir, vault)
    }

    #[tokio::test]
    async fn test_read_write_text() {
        let (_dir, vault) = vault_with(&[("note.md", "hello\n")]).await;
        assert_eq!(vault.read_text("note.md").await.unwrap(), "hello\n");

        vault.write_text("sub/new.md", "created\n").await.unwrap();
        assert_eq!(vault.read_text("sub/new.md").await.unwrap(), "created\n");
    }

    #[tokio::test]
    async fn test_read_missing_is_store_error() {
        let (_dir, vault) = vault_with(&[]).await;
        let err = vault.read_text("missing.md").await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }

    #[tokio::test]
    async fn test_metadata_round_trip() {
        let (_dir, vault) = vault_with(&[("note.md", "Body\n")]).await;

        vault
            .set_metadata_field("note.md", "epub-progress", "loc1")
            .await
            .unwrap();
        let meta = vault.get_metadata("note.md").await.unwrap();
        assert_eq!(meta.get("epub-progress").map(String::as_str), Some("loc1"));

        // body survives
        assert!(vault.read_text("note.md").await.unwrap().ends_with("Body\n"));
    }

    #[tokio::test]
    async fn test_resolve_plain_path() {
        let (_dir, vault) = vault_with(&[("books/novel.epub", "zip")]).await;
        let resolved = vault
            .resolve_link("books/novel.epub", "note.md")
            .await
            .unwrap();
        assert_eq!(resolved.as_deref(), Some("books/novel.epub"));
    }

    #[tokio::test]
    async fn test_resolve_relative_to_context() {
        let (_dir, vault) = vault_with(&[("shelf/novel.epub", "zip")]).await;
        let resolved = vault
            .resolve_link("novel.epub", "shelf/note.md")
            .await
            .unwrap();
        assert_eq!(resolved.as_deref(), Some("shelf/novel.epub"));
    }

    #[tokio::test]
    async fn test_resolve_bare_name_searches_vault() {
        let (_dir, vault) = vault_with(&[("deep/nested/My Book.epub", "zip")]).await;
        let resolved = vault.resolve_link("My Book", "note.md").await.unwrap();
        assert_eq!(resolved.as_deref(), Some("deep/nested/My Book.epub"));
    }

    #[tokio::test]
    async fn test_resolve_unknown_is_none() {
        let (_dir, vault) = vault_with(&[]).await;
        assert!(vault
            .resolve_link("nowhere.epub", "note.md")
            .await
            .unwrap()
            .is_none());
    }
}
