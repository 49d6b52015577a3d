//! EPUB reading companion for a markdown vault
//!
//! A companion note in the vault links to an EPUB and accumulates reading
//! state: annotations as marker comments in the note body, progress and
//! bookkeeping as frontmatter metadata. This crate supplies the pieces a
//! host embeds around a renderer:
//!
//! - [`annotations`]: the marker codec, the entry templates, and the
//!   colour-keyed section reconciler for the note body
//! - [`position`]: the state machine deciding when a relocation is user
//!   movement worth persisting and when it is noise to correct
//! - [`highlights`]: synchronisation between note records and renderer
//!   overlays
//! - [`session`]: the per-view event loop tying the above to a renderer,
//!   a vault store, and host UI
//! - [`store`]: the vault abstraction plus a filesystem implementation
//!   and the frontmatter metadata codec
//! - [`resolver`]: turning the note's link property into a document path

pub mod annotations;
pub mod config;
pub mod error;
pub mod highlights;
pub mod position;
pub mod rendition;
pub mod resolver;
pub mod session;
pub mod store;

pub use config::Settings;
pub use error::{AppError, Result};
pub use session::{ReaderSession, SessionHandle};
