//! Audio-related small types and handles.
//!
//! Commands sent to the worker, the transport state it owns, and the
//! now-playing record it publishes for polling readers.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::library::CoverCandidate;
use crate::tags::TrackMetadata;

/// Upper bound of the volume scale.
pub const MAX_VOLUME: u8 = 100;

pub fn clamp_volume(v: u8) -> u8 {
    v.min(MAX_VOLUME)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayCommand {
    /// Start playback if stopped.
    Play,
    /// Stop playback if playing.
    Stop,
    /// Play when stopped, stop when playing.
    Toggle,
    /// Skip forward to the next playable queue entry.
    Next,
    /// Step back to the previous playable queue entry.
    Previous,
    /// Set the volume in percent; values above 100 are clamped.
    SetVolume(u8),
    /// Replace the queue and cover with the contents of a directory.
    LoadDirectory(PathBuf),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
}

/// State the worker publishes after every command and tick.
#[derive(Debug, Clone, Default)]
pub struct NowPlaying {
    pub metadata: TrackMetadata,
    pub cover: CoverCandidate,
    /// Whether the current queue entry resolved to a playable stream.
    pub is_audio: bool,
    /// Dirty flag: set by the worker, cleared by the reader.
    pub updated: bool,
    pub state: TransportState,
    pub volume: u8,
    /// Elapsed seconds of the current track.
    pub position: f32,
}

pub type NowPlayingHandle = Arc<Mutex<NowPlaying>>;

/// Lock the shared record, recovering the data from a poisoned mutex.
pub(crate) fn lock(handle: &NowPlayingHandle) -> MutexGuard<'_, NowPlaying> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Copy the record and clear its dirty flag in one critical section, so a
/// publish can never land between the read and the clear.
pub(crate) fn take_update(handle: &NowPlayingHandle) -> Option<NowPlaying> {
    let mut np = lock(handle);
    if !np.updated {
        return None;
    }
    np.updated = false;
    Some(np.clone())
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("command channel is full; command dropped")]
    Full,
    #[error("playback worker is not running")]
    Disconnected,
}
