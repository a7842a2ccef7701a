//! Seams between the worker and whatever produces sound.

use std::path::{Path, PathBuf};

use crate::library::TrackStream;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to open audio output: {0}")]
    Output(String),
}

/// Opens queue entries on behalf of an engine.
///
/// Passed into every navigation call so the engine can report track
/// transitions back to its owner without holding a reference to it.
pub trait TrackSource {
    /// Close `previous`, then open `path`. Returns the playable stream and
    /// whether the entry is audio; non-audio entries come back empty.
    fn resolve(&mut self, path: &Path, previous: TrackStream) -> (TrackStream, bool);

    /// The engine could not play what `resolve` just accepted for `path`;
    /// anything reported for it must be withdrawn.
    fn reject(&mut self, path: &Path);
}

/// A player that walks a queue of paths.
pub trait PlaybackEngine {
    fn clear(&mut self);

    fn enqueue(&mut self, path: PathBuf);

    /// Open the first playable entry and start it. False when nothing in
    /// the queue is playable.
    fn begin(&mut self, source: &mut dyn TrackSource) -> bool;

    /// Resume, or restart the queue when nothing is loaded. False when no
    /// sound will come out.
    fn play(&mut self, source: &mut dyn TrackSource) -> bool;

    fn stop(&mut self);

    fn next(&mut self, source: &mut dyn TrackSource);

    fn previous(&mut self, source: &mut dyn TrackSource);

    /// Gain in `0.0..=1.0`.
    fn set_volume(&mut self, gain: f32);

    /// Idle tick. Moves on to the next entry once the current one has
    /// drained. Returns whether the engine is still playing.
    fn pump(&mut self, source: &mut dyn TrackSource) -> bool;

    /// Elapsed seconds of the current track.
    fn position(&self) -> f32;
}
