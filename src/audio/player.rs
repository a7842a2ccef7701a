use std::path::PathBuf;
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::Settings;
use crate::library::CoverCandidate;
use crate::tags::TrackMetadata;

use super::engine::{EngineError, PlaybackEngine};
use super::sink::RodioEngine;
use super::thread::{WorkerConfig, spawn_audio_thread};
use super::types::{
    NowPlaying, NowPlayingHandle, PlayCommand, SubmitError, TransportState, clamp_volume, lock,
    take_update,
};

/// Producer side of the playback worker.
///
/// Submitting never blocks: when the channel is full the command is dropped
/// and [`SubmitError::Full`] comes back. Results are read by polling.
pub struct AudioPlayer {
    tx: SyncSender<PlayCommand>,
    now_playing: NowPlayingHandle,
    join: JoinHandle<()>,
}

impl AudioPlayer {
    /// Spawn the worker on the default audio output.
    pub fn new(settings: &Settings) -> Self {
        Self::with_engine(RodioEngine::open, settings)
    }

    pub fn with_engine<E, F>(make_engine: F, settings: &Settings) -> Self
    where
        E: PlaybackEngine,
        F: FnOnce() -> Result<E, EngineError> + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel::<PlayCommand>(settings.audio.command_capacity.max(1));
        let now_playing: NowPlayingHandle = Arc::new(Mutex::new(NowPlaying::default()));

        let join = spawn_audio_thread(
            make_engine,
            rx,
            now_playing.clone(),
            WorkerConfig {
                library: settings.library.clone(),
                volume: clamp_volume(settings.audio.volume),
                tick: Duration::from_millis(settings.audio.tick_ms.max(1)),
            },
        );

        Self {
            tx,
            now_playing,
            join,
        }
    }

    pub fn submit(&self, cmd: PlayCommand) -> Result<(), SubmitError> {
        self.tx.try_send(cmd).map_err(|e| match e {
            TrySendError::Full(_) => SubmitError::Full,
            TrySendError::Disconnected(_) => SubmitError::Disconnected,
        })
    }

    pub fn play(&self) -> Result<(), SubmitError> {
        self.submit(PlayCommand::Play)
    }

    pub fn stop(&self) -> Result<(), SubmitError> {
        self.submit(PlayCommand::Stop)
    }

    pub fn toggle(&self) -> Result<(), SubmitError> {
        self.submit(PlayCommand::Toggle)
    }

    pub fn next(&self) -> Result<(), SubmitError> {
        self.submit(PlayCommand::Next)
    }

    pub fn previous(&self) -> Result<(), SubmitError> {
        self.submit(PlayCommand::Previous)
    }

    pub fn load_directory(&self, dir: impl Into<PathBuf>) -> Result<(), SubmitError> {
        self.submit(PlayCommand::LoadDirectory(dir.into()))
    }

    /// Clamp `v` to `0..=100` and hand it to the worker.
    pub fn set_volume(&self, v: u8) -> Result<(), SubmitError> {
        self.submit(PlayCommand::SetVolume(clamp_volume(v)))
    }

    /// Volume as last applied by the worker.
    pub fn volume(&self) -> u8 {
        lock(&self.now_playing).volume
    }

    pub fn metadata(&self) -> TrackMetadata {
        lock(&self.now_playing).metadata.clone()
    }

    pub fn cover(&self) -> CoverCandidate {
        lock(&self.now_playing).cover.clone()
    }

    pub fn is_audio(&self) -> bool {
        lock(&self.now_playing).is_audio
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.now_playing).state == TransportState::Playing
    }

    /// Elapsed seconds of the current track.
    pub fn position(&self) -> f32 {
        lock(&self.now_playing).position
    }

    pub fn has_update(&self) -> bool {
        lock(&self.now_playing).updated
    }

    pub fn clear_update(&self) {
        lock(&self.now_playing).updated = false;
    }

    /// The published record if it changed since the last take, clearing the
    /// dirty flag under the same lock.
    pub fn take_update(&self) -> Option<NowPlaying> {
        take_update(&self.now_playing)
    }

    /// Close the channel and wait for the worker to stop the engine and exit.
    pub fn shutdown(self) {
        drop(self.tx);
        let _ = self.join.join();
    }
}
