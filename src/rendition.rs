//! Renderer collaborator interface
//!
//! The book-rendering engine is external; the core only requires page
//! navigation by canonical location token, a selection signal, and a
//! highlight-overlay API. Implementations wrap the host's rendering engine
//! and forward its events as `RenditionEvent`s into the session loop.

use async_trait::async_trait;

use crate::error::Result;

/// Overlay translucency applied to every highlight
pub const HIGHLIGHT_OPACITY: f32 = 0.3;

/// A rendered book instance
#[async_trait]
pub trait Rendition: Send + Sync {
    /// Navigate to a location token, or to the default entry point when `None`
    async fn display(&self, location: Option<&str>) -> Result<()>;

    /// Advance one page in spine order
    async fn next(&self) -> Result<()>;

    /// Go back one page in spine order
    async fn prev(&self) -> Result<()>;

    /// Add a highlight overlay over a location range
    fn add_highlight(&self, cfi_range: &str, style: &HighlightStyle) -> Result<()>;

    /// Page progression direction from the book's metadata
    fn reading_direction(&self) -> ReadingDirection {
        ReadingDirection::Ltr
    }
}

/// Visual style of a highlight overlay
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightStyle {
    pub fill: String,
    pub opacity: f32,
}

impl HighlightStyle {
    /// Standard overlay for a record colour
    pub fn for_color(color: &str) -> Self {
        Self {
            fill: color.to_string(),
            opacity: HIGHLIGHT_OPACITY,
        }
    }
}

/// Page progression direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Signals emitted by the renderer, delivered to the session loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenditionEvent {
    /// Displayed page changed; carries the new location token
    Relocated(String),
    /// Rendition or container size changed
    Resized,
    /// View entered the viewport after being hidden
    BecameVisible,
    /// Reader selected text; carries the location range and the selection
    Selected { cfi_range: String, text: String },
}
