//! Position tracker state machine
//!
//! Pure event-to-action core: no timers, no I/O. The owning session executes
//! the returned actions (persist the location, arm the settle timer, issue a
//! restorative navigation) and feeds completion back in as events. Keeping
//! the machine synchronous makes every interleaving testable without a
//! runtime.

use tracing::debug;

/// Tracker state
///
/// `Restoring` and `Resizing` are momentary guards, never persisted; only the
/// current location survives the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    /// A programmatic navigation back to the saved location is in flight
    Restoring,
    /// A resize settle timer is pending
    Resizing,
}

/// Signals fed into the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// Renderer reported a new displayed location
    Relocated(String),
    /// Container or rendition size changed
    ResizeDetected,
    /// View entered the viewport after being hidden
    BecameVisible,
    /// The settle timer fired
    ResizeSettled,
    /// The restorative navigation finished, successfully or not
    RestoreSettled,
}

/// Side effects the owner must execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerAction {
    /// Write the location to the companion document's metadata block
    Persist(String),
    /// (Re)arm the resize settle timer
    StartSettleTimer,
    /// Navigate the renderer back to the location; feed `RestoreSettled`
    /// back in when it completes
    Restore(String),
}

/// State machine reconciling relocate/resize/visibility signals
#[derive(Debug)]
pub struct PositionTracker {
    state: TrackerState,
    current: Option<String>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self {
            state: TrackerState::Idle,
            current: None,
        }
    }

    /// Adopt a location without persisting it (initial restore from storage)
    pub fn adopt(&mut self, location: &str) {
        self.current = Some(location.to_string());
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Last known authoritative location
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Apply one event, returning the actions the owner must run
    pub fn handle(&mut self, event: TrackerEvent) -> Vec<TrackerAction> {
        match event {
            TrackerEvent::Relocated(location) => self.on_relocated(location),
            TrackerEvent::ResizeDetected => self.on_resize_detected(),
            TrackerEvent::BecameVisible => self.on_became_visible(),
            TrackerEvent::ResizeSettled => self.on_resize_settled(),
            TrackerEvent::RestoreSettled => {
                debug!("Restore settled, returning to idle");
                self.state = TrackerState::Idle;
                vec![]
            }
        }
    }

    fn on_relocated(&mut self, location: String) -> Vec<TrackerAction> {
        // A relocation caused by our own restore, or by mid-resize churn, is
        // a transient value and must not overwrite the saved position
        if self.state != TrackerState::Idle {
            debug!(
                "Ignoring relocation to {} while {:?}",
                location, self.state
            );
            return vec![];
        }
        debug!("Page relocated to {}", location);
        self.current = Some(location.clone());
        vec![TrackerAction::Persist(location)]
    }

    fn on_resize_detected(&mut self) -> Vec<TrackerAction> {
        // Nothing to restore before the first known location
        if self.current.is_none() {
            return vec![];
        }
        self.state = TrackerState::Resizing;
        vec![TrackerAction::StartSettleTimer]
    }

    fn on_resize_settled(&mut self) -> Vec<TrackerAction> {
        if self.state != TrackerState::Resizing {
            return vec![];
        }
        match self.current.clone() {
            Some(location) => {
                debug!("Resize settled, restoring position to {}", location);
                self.state = TrackerState::Restoring;
                vec![TrackerAction::Restore(location)]
            }
            None => {
                self.state = TrackerState::Idle;
                vec![]
            }
        }
    }

    fn on_became_visible(&mut self) -> Vec<TrackerAction> {
        // A restore already in flight is not re-triggered
        if self.state == TrackerState::Restoring {
            return vec![];
        }
        match self.current.clone() {
            Some(location) => {
                debug!("View became visible, restoring position to {}", location);
                self.state = TrackerState::Restoring;
                vec![TrackerAction::Restore(location)]
            }
            None => vec![],
        }
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}
