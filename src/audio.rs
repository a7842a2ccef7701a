//! Playback command worker.
//!
//! A single thread consumes [`PlayCommand`]s from a bounded channel and
//! drives a [`PlaybackEngine`]. It is the only writer of the now-playing
//! record; readers poll it through [`AudioPlayer`] and clear the dirty flag
//! once they have consumed an update.

mod engine;
mod player;
mod queue;
mod sink;
mod thread;
mod types;

pub use engine::PlaybackEngine;
pub use player::AudioPlayer;
pub use types::{MAX_VOLUME, NowPlaying, PlayCommand, SubmitError, TransportState};

#[cfg(test)]
mod tests;
