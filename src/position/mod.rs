//! Reading-position tracking
//!
//! Viewers re-measure and re-paginate on container-size changes and on
//! visibility transitions, silently resetting the displayed page. The tracker
//! reconciles the renderer's relocate/resize/visible signals into a single
//! authoritative location and decides when to persist it and when to snap the
//! view back, without ever mistaking its own corrective navigation for user
//! navigation.

mod tracker;

pub use tracker::{PositionTracker, TrackerAction, TrackerEvent, TrackerState};
