//! Filesystem side of playback.
//!
//! Owns how a folder becomes a play queue, which image in it counts as the
//! album cover, and how a single queue entry is opened for the engine.

mod cover;
mod model;
mod scan;
mod source;

pub use cover::{CoverCandidate, CoverPriority, ImageKind, select_cover};
pub use model::{Resolved, TrackStream};
pub use scan::{list_entries, walk_queue};
pub use source::{UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TITLE, resolve};
