use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::LibrarySettings;
use crate::library::{self, CoverCandidate, TrackStream, list_entries, select_cover, walk_queue};
use crate::tags::TrackMetadata;

use super::engine::{EngineError, PlaybackEngine, TrackSource};
use super::types::{
    MAX_VOLUME, NowPlaying, NowPlayingHandle, PlayCommand, TransportState, clamp_volume, lock,
};

/// Runs the track source adapter and publishes every result.
pub(super) struct Publisher {
    handle: NowPlayingHandle,
}

impl TrackSource for Publisher {
    fn resolve(&mut self, path: &Path, previous: TrackStream) -> (TrackStream, bool) {
        let resolved = library::resolve(path, previous);
        let mut np = lock(&self.handle);
        np.metadata = resolved.metadata;
        np.is_audio = resolved.is_audio;
        np.updated = true;
        (resolved.stream, resolved.is_audio)
    }

    fn reject(&mut self, path: &Path) {
        debug!(path = %path.display(), "track rejected by engine");
        let mut np = lock(&self.handle);
        np.metadata = TrackMetadata::default();
        np.is_audio = false;
        np.updated = true;
    }
}

/// Single consumer of the command channel. Owns the engine, the transport
/// state and every file handle opened on its behalf.
pub(super) struct Worker<E> {
    engine: E,
    tracks: Publisher,
    state: TransportState,
    volume: u8,
    library: LibrarySettings,
}

impl<E: PlaybackEngine> Worker<E> {
    pub(super) fn new(
        engine: E,
        handle: NowPlayingHandle,
        library: LibrarySettings,
        volume: u8,
    ) -> Self {
        let mut worker = Self {
            engine,
            tracks: Publisher { handle },
            state: TransportState::Stopped,
            volume: 0,
            library,
        };
        worker.set_volume(volume);
        worker
    }

    fn publish(&self, f: impl FnOnce(&mut NowPlaying)) {
        let mut np = lock(&self.tracks.handle);
        f(&mut np);
        np.state = self.state;
        np.volume = self.volume;
        np.position = self.engine.position();
    }

    pub(super) fn handle(&mut self, cmd: PlayCommand) {
        debug!(?cmd, "command");
        match cmd {
            PlayCommand::Play => self.play(),
            PlayCommand::Stop => self.stop(),
            PlayCommand::Toggle => match self.state {
                TransportState::Playing => self.stop(),
                TransportState::Stopped => self.play(),
            },
            PlayCommand::Next => self.engine.next(&mut self.tracks),
            PlayCommand::Previous => self.engine.previous(&mut self.tracks),
            PlayCommand::SetVolume(v) => self.set_volume(v),
            PlayCommand::LoadDirectory(dir) => self.load_directory(&dir),
        }
        self.publish(|_| {});
    }

    /// Idle pump between commands.
    pub(super) fn tick(&mut self) {
        let still_playing = self.engine.pump(&mut self.tracks);
        if self.state == TransportState::Playing && !still_playing {
            debug!("queue finished");
            self.state = TransportState::Stopped;
        }
        self.publish(|_| {});
    }

    fn play(&mut self) {
        if self.state == TransportState::Stopped {
            if self.engine.play(&mut self.tracks) {
                self.state = TransportState::Playing;
            } else {
                debug!("nothing to play");
            }
        }
    }

    fn stop(&mut self) {
        if self.state == TransportState::Playing {
            self.engine.stop();
            self.state = TransportState::Stopped;
        }
    }

    fn set_volume(&mut self, v: u8) {
        self.volume = clamp_volume(v);
        self.engine
            .set_volume(f32::from(self.volume) / f32::from(MAX_VOLUME));
    }

    fn load_directory(&mut self, dir: &Path) {
        info!(dir = %dir.display(), "loading directory");
        self.stop();
        self.engine.clear();
        self.publish(|np| {
            np.metadata = TrackMetadata::default();
            np.cover = CoverCandidate::default();
            np.is_audio = false;
            np.updated = true;
        });

        let entries = match list_entries(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), %err, "cannot open directory");
                return;
            }
        };

        let cover = select_cover(
            entries
                .iter()
                .map(|name| dir.join(name).to_string_lossy().into_owned()),
        );
        debug!(cover = %cover.path, "cover selected");
        self.publish(|np| {
            np.cover = cover;
            np.updated = true;
        });

        let queue = walk_queue(dir, &self.library);
        info!(entries = queue.len(), "queue built");
        for path in queue {
            self.engine.enqueue(path);
        }

        if self.engine.begin(&mut self.tracks) {
            self.state = TransportState::Playing;
        } else {
            warn!(dir = %dir.display(), "no playable track found");
        }
        self.publish(|np| np.updated = true);
    }

    fn run(mut self, rx: Receiver<PlayCommand>, tick: Duration) {
        self.publish(|_| {});
        // Ticks are due every `tick` whether or not commands keep arriving.
        let mut next_tick = Instant::now() + tick;
        loop {
            let wait = next_tick.saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok(cmd) => self.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            if Instant::now() >= next_tick {
                self.tick();
                next_tick = Instant::now() + tick;
            }
        }
        self.stop();
        self.engine.stop();
        self.publish(|_| {});
        debug!("audio worker exiting");
    }
}

/// Settings the worker needs once it is running.
pub(super) struct WorkerConfig {
    pub(super) library: LibrarySettings,
    pub(super) volume: u8,
    pub(super) tick: Duration,
}

/// Spawn the worker. The engine is built on the worker thread itself since
/// output streams are generally not `Send`.
pub(super) fn spawn_audio_thread<E, F>(
    make_engine: F,
    rx: Receiver<PlayCommand>,
    handle: NowPlayingHandle,
    config: WorkerConfig,
) -> JoinHandle<()>
where
    E: PlaybackEngine,
    F: FnOnce() -> Result<E, EngineError> + Send + 'static,
{
    thread::spawn(move || {
        let engine = match make_engine() {
            Ok(engine) => engine,
            Err(err) => {
                warn!(%err, "audio worker not started");
                return;
            }
        };
        Worker::new(engine, handle, config.library, config.volume).run(rx, config.tick);
    })
}
