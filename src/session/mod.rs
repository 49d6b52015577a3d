//! Reader session
//!
//! One session per open view. It owns all mutable per-view state (tracker,
//! highlight cache, selected colour, settle timer) and is the single place
//! where renderer events, host commands, and timer expiry meet. Everything
//! arrives through one channel and is processed sequentially, so no two
//! handlers ever interleave; the only concurrency is the restorative
//! navigation, which runs as a spawned task and reports back through the same
//! channel as `RestoreSettled`.
//!
//! Dropping the run loop (channel closed or `Close` received) discards the
//! settle deadline, so no timer can fire after teardown. A restore task that
//! outlives the loop finds the channel gone and its completion signal is
//! silently dropped.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::annotations::parse_markers;
use crate::config::Settings;
use crate::error::Result;
use crate::highlights::HighlightSync;
use crate::position::{PositionTracker, TrackerAction, TrackerEvent};
use crate::rendition::{ReadingDirection, Rendition, RenditionEvent};
use crate::store::VaultStore;

/// Longest selection excerpt shown in the note prompt
const PROMPT_EXCERPT_CHARS: usize = 100;

/// UI collaborator: notices and the note prompt
///
/// Thin wrappers around host chrome; no algorithmic content.
#[async_trait]
pub trait SessionUi: Send + Sync {
    /// Show a transient, non-blocking notice
    fn notify(&self, message: &str);

    /// Ask for an optional note on a new highlight
    ///
    /// `None` means the user cancelled and the highlight is discarded;
    /// `Some` confirms, possibly with an empty note.
    async fn request_note(&self, excerpt: &str) -> Option<String>;
}

/// Everything the session loop reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Rendition(RenditionEvent),
    /// User picked a highlight colour
    SetColor(String),
    /// User invoked the reorganize command
    Reorganize,
    PageForward,
    PageBackward,
    /// A restorative navigation finished (internal)
    RestoreSettled,
    Close,
}

/// Host-side handle for feeding events and commands into a running session
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    pub fn send(&self, event: RenditionEvent) {
        let _ = self.tx.send(SessionEvent::Rendition(event));
    }

    pub fn set_color(&self, color: &str) {
        let _ = self.tx.send(SessionEvent::SetColor(color.to_string()));
    }

    pub fn reorganize(&self) {
        let _ = self.tx.send(SessionEvent::Reorganize);
    }

    pub fn page_forward(&self) {
        let _ = self.tx.send(SessionEvent::PageForward);
    }

    pub fn page_backward(&self) {
        let _ = self.tx.send(SessionEvent::PageBackward);
    }

    pub fn close(&self) {
        let _ = self.tx.send(SessionEvent::Close);
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let _ = self.tx.send(SessionEvent::Close);
    }
}

/// Per-view state holder
pub struct ReaderSession {
    settings: Settings,
    companion_path: String,
    store: Arc<dyn VaultStore>,
    rendition: Arc<dyn Rendition>,
    ui: Arc<dyn SessionUi>,
    tracker: PositionTracker,
    highlights: HighlightSync,
    settle_deadline: Option<Instant>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl ReaderSession {
    /// Open a session: replay stored highlights and restore the saved position
    pub async fn open(
        settings: Settings,
        companion_path: &str,
        store: Arc<dyn VaultStore>,
        rendition: Arc<dyn Rendition>,
        ui: Arc<dyn SessionUi>,
    ) -> Result<(Self, SessionHandle)> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut session = Self {
            highlights: HighlightSync::new(&settings),
            settings,
            companion_path: companion_path.to_string(),
            store,
            rendition,
            ui,
            tracker: PositionTracker::new(),
            settle_deadline: None,
            events_tx: events_tx.clone(),
            events_rx,
        };

        session.load_annotations().await;
        session.load_saved_position().await?;

        Ok((session, SessionHandle { tx: events_tx }))
    }

    /// Process events until the view closes
    pub async fn run(mut self) {
        loop {
            let event = if let Some(deadline) = self.settle_deadline {
                tokio::select! {
                    maybe = self.events_rx.recv() => match maybe {
                        Some(event) => event,
                        None => break,
                    },
                    _ = tokio::time::sleep_until(deadline) => {
                        self.settle_deadline = None;
                        let actions = self.tracker.handle(TrackerEvent::ResizeSettled);
                        self.apply(actions).await;
                        continue;
                    }
                }
            } else {
                match self.events_rx.recv().await {
                    Some(event) => event,
                    None => break,
                }
            };

            if matches!(event, SessionEvent::Close) {
                break;
            }
            self.dispatch(event).await;
        }
        debug!("Reader session for {} closed", self.companion_path);
    }

    /// Last known authoritative location
    pub fn current_location(&self) -> Option<&str> {
        self.tracker.current()
    }

    async fn dispatch(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Rendition(RenditionEvent::Relocated(location)) => {
                let actions = self.tracker.handle(TrackerEvent::Relocated(location));
                self.apply(actions).await;
            }
            SessionEvent::Rendition(RenditionEvent::Resized) => {
                let actions = self.tracker.handle(TrackerEvent::ResizeDetected);
                self.apply(actions).await;
            }
            SessionEvent::Rendition(RenditionEvent::BecameVisible) => {
                let actions = self.tracker.handle(TrackerEvent::BecameVisible);
                self.apply(actions).await;
            }
            SessionEvent::Rendition(RenditionEvent::Selected { cfi_range, text }) => {
                self.handle_selection(&cfi_range, &text).await;
            }
            SessionEvent::SetColor(color) => {
                self.highlights.set_selected_color(&color);
            }
            SessionEvent::Reorganize => {
                if let Err(e) = self
                    .highlights
                    .reorganize(self.store.as_ref(), &self.settings, &self.companion_path)
                    .await
                {
                    error!("Failed to reorganize annotations: {}", e);
                    self.ui.notify("Failed to reorganize annotations");
                }
            }
            SessionEvent::PageForward => {
                let result = match self.rendition.reading_direction() {
                    ReadingDirection::Ltr => self.rendition.next().await,
                    ReadingDirection::Rtl => self.rendition.prev().await,
                };
                if let Err(e) = result {
                    debug!("Page forward failed: {}", e);
                }
            }
            SessionEvent::PageBackward => {
                let result = match self.rendition.reading_direction() {
                    ReadingDirection::Ltr => self.rendition.prev().await,
                    ReadingDirection::Rtl => self.rendition.next().await,
                };
                if let Err(e) = result {
                    debug!("Page backward failed: {}", e);
                }
            }
            SessionEvent::RestoreSettled => {
                let actions = self.tracker.handle(TrackerEvent::RestoreSettled);
                self.apply(actions).await;
            }
            SessionEvent::Close => {}
        }
    }

    async fn apply(&mut self, actions: Vec<TrackerAction>) {
        for action in actions {
            match action {
                TrackerAction::Persist(location) => {
                    if let Err(e) = self
                        .store
                        .set_metadata_field(
                            &self.companion_path,
                            &self.settings.progress_property,
                            &location,
                        )
                        .await
                    {
                        warn!("Failed to save reading progress: {}", e);
                    }
                }
                TrackerAction::StartSettleTimer => {
                    self.settle_deadline = Some(Instant::now() + self.settings.settle_delay());
                }
                TrackerAction::Restore(location) => {
                    // runs concurrently so that relocations emitted by the
                    // navigation itself are still seen while Restoring
                    let rendition = Arc::clone(&self.rendition);
                    let tx = self.events_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = rendition.display(Some(&location)).await {
                            warn!("Failed to restore position to {}: {}", location, e);
                        }
                        let _ = tx.send(SessionEvent::RestoreSettled);
                    });
                }
            }
        }
    }

    async fn load_annotations(&mut self) {
        match self.store.read_text(&self.companion_path).await {
            Ok(content) => {
                let records = parse_markers(&content);
                debug!(
                    "Loaded {} annotation(s) from {}",
                    records.len(),
                    self.companion_path
                );
                self.highlights.set_records(records);
                self.highlights.replay(self.rendition.as_ref());
            }
            Err(e) => {
                warn!("Failed to load annotations: {}", e);
            }
        }
    }

    async fn load_saved_position(&mut self) -> Result<()> {
        let metadata = self.store.get_metadata(&self.companion_path).await?;
        let saved = metadata
            .get(&self.settings.progress_property)
            .filter(|v| !v.is_empty());

        match saved {
            Some(location) => {
                debug!("Found saved progress: {}", location);
                match self.rendition.display(Some(location)).await {
                    Ok(()) => self.tracker.adopt(location),
                    Err(e) => {
                        warn!("Failed to display saved location {}: {}", location, e);
                        self.ui.notify("Could not restore last reading position.");
                        self.rendition.display(None).await?;
                    }
                }
            }
            None => {
                self.rendition.display(None).await?;
            }
        }
        Ok(())
    }

    async fn handle_selection(&mut self, cfi_range: &str, text: &str) {
        let Some(record) = self.highlights.begin_record(cfi_range, text) else {
            return;
        };

        let excerpt = excerpt(&record.text);
        let Some(note) = self.ui.request_note(&excerpt).await else {
            debug!("Highlight cancelled");
            return;
        };

        let record = record.with_note(&note);
        match self
            .highlights
            .commit(
                record,
                self.rendition.as_ref(),
                self.store.as_ref(),
                &self.settings,
                &self.companion_path,
            )
            .await
        {
            Ok(()) => self.ui.notify("Highlight saved!"),
            Err(e) => {
                error!("Failed to save highlight: {}", e);
                self.ui.notify("Failed to save highlight");
            }
        }
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= PROMPT_EXCERPT_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(PROMPT_EXCERPT_CHARS).collect();
    format!("{}...", truncated)
}
