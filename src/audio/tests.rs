use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tempfile::tempdir;

use super::engine::{EngineError, PlaybackEngine, TrackSource};
use super::queue::{Direction, PlayQueue};
use super::thread::Worker;
use super::types::{
    NowPlaying, NowPlayingHandle, PlayCommand, SubmitError, TransportState, take_update,
};
use super::AudioPlayer;
use crate::config::{LibrarySettings, Settings};
use crate::library::{ImageKind, TrackStream};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Clear,
    Enqueue(PathBuf),
    Begin,
    Play,
    Stop,
    Next,
    Previous,
    Volume(f32),
}

/// Refuses the listed paths after they resolve, like a decoder that cannot
/// read them.
struct Refusing<'a> {
    inner: &'a mut dyn TrackSource,
    unplayable: &'a [PathBuf],
}

impl TrackSource for Refusing<'_> {
    fn resolve(&mut self, path: &Path, previous: TrackStream) -> (TrackStream, bool) {
        let (mut stream, is_audio) = self.inner.resolve(path, previous);
        if is_audio && self.unplayable.iter().any(|p| p == path) {
            stream.close();
            self.inner.reject(path);
            return (stream, false);
        }
        (stream, is_audio)
    }

    fn reject(&mut self, path: &Path) {
        self.inner.reject(path);
    }
}

/// Engine without a device: records calls and walks a real [`PlayQueue`].
struct Recording {
    calls: Arc<Mutex<Vec<Call>>>,
    drained: Arc<AtomicBool>,
    queue: PlayQueue,
    held: TrackStream,
    playing: bool,
    unplayable: Vec<PathBuf>,
}

impl Recording {
    fn new() -> (Self, Arc<Mutex<Vec<Call>>>, Arc<AtomicBool>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let drained = Arc::new(AtomicBool::new(false));
        let engine = Self {
            calls: calls.clone(),
            drained: drained.clone(),
            queue: PlayQueue::default(),
            held: TrackStream::empty(),
            playing: false,
            unplayable: Vec::new(),
        };
        (engine, calls, drained)
    }

    fn refusing(mut self, path: PathBuf) -> Self {
        self.unplayable.push(path);
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn step(&mut self, source: &mut dyn TrackSource, dir: Direction) -> bool {
        let previous = std::mem::take(&mut self.held);
        let mut source = Refusing {
            inner: source,
            unplayable: &self.unplayable,
        };
        match self.queue.advance(&mut source, previous, dir) {
            Some(stream) => {
                self.held = stream;
                true
            }
            None => false,
        }
    }
}

impl PlaybackEngine for Recording {
    fn clear(&mut self) {
        self.record(Call::Clear);
        self.queue.clear();
        self.held.close();
        self.playing = false;
    }

    fn enqueue(&mut self, path: PathBuf) {
        self.record(Call::Enqueue(path.clone()));
        self.queue.push(path);
    }

    fn begin(&mut self, source: &mut dyn TrackSource) -> bool {
        self.record(Call::Begin);
        let previous = std::mem::take(&mut self.held);
        let mut source = Refusing {
            inner: source,
            unplayable: &self.unplayable,
        };
        match self.queue.begin(&mut source, previous) {
            Some(stream) => {
                self.held = stream;
                self.playing = true;
            }
            None => self.playing = false,
        }
        self.playing
    }

    fn play(&mut self, _source: &mut dyn TrackSource) -> bool {
        self.record(Call::Play);
        if self.held.is_open() {
            self.playing = true;
        }
        self.playing
    }

    fn stop(&mut self) {
        self.record(Call::Stop);
        self.playing = false;
    }

    fn next(&mut self, source: &mut dyn TrackSource) {
        self.record(Call::Next);
        self.step(source, Direction::Forward);
    }

    fn previous(&mut self, source: &mut dyn TrackSource) {
        self.record(Call::Previous);
        self.step(source, Direction::Backward);
    }

    fn set_volume(&mut self, gain: f32) {
        self.record(Call::Volume(gain));
    }

    fn pump(&mut self, source: &mut dyn TrackSource) -> bool {
        if self.playing && self.drained.swap(false, Ordering::SeqCst) {
            if !self.step(source, Direction::Forward) {
                self.playing = false;
            }
        }
        self.playing
    }

    fn position(&self) -> f32 {
        0.0
    }
}

fn wav_bytes(title: &str) -> Vec<u8> {
    let mut value = title.as_bytes().to_vec();
    value.push(0);
    if value.len() % 2 == 1 {
        value.push(0);
    }
    let mut list = b"INFO".to_vec();
    list.extend_from_slice(b"INAM");
    list.extend_from_slice(&(value.len() as u32).to_le_bytes());
    list.extend_from_slice(&value);

    let mut out = b"RIFF\x00\x00\x00\x00WAVEfmt ".to_vec();
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&44_100u32.to_le_bytes());
    out.extend_from_slice(&176_400u32.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"LIST");
    out.extend_from_slice(&(list.len() as u32).to_le_bytes());
    out.extend_from_slice(&list);
    out.extend_from_slice(b"data");
    out.extend_from_slice(&176_400u32.to_le_bytes());
    out
}

fn worker() -> (
    Worker<Recording>,
    NowPlayingHandle,
    Arc<Mutex<Vec<Call>>>,
    Arc<AtomicBool>,
) {
    let (engine, calls, drained) = Recording::new();
    let handle: NowPlayingHandle = Arc::new(Mutex::new(NowPlaying::default()));
    let w = Worker::new(engine, handle.clone(), LibrarySettings::default(), 10);
    (w, handle, calls, drained)
}

fn worker_with(engine: Recording) -> (Worker<Recording>, NowPlayingHandle) {
    let handle: NowPlayingHandle = Arc::new(Mutex::new(NowPlaying::default()));
    let w = Worker::new(engine, handle.clone(), LibrarySettings::default(), 10);
    (w, handle)
}

fn snapshot(handle: &NowPlayingHandle) -> NowPlaying {
    handle.lock().unwrap().clone()
}

fn album(dir: &Path, titles: &[&str], extra: &[&str]) {
    for (i, t) in titles.iter().enumerate() {
        fs::write(dir.join(format!("{:02}.wav", i + 1)), wav_bytes(t)).unwrap();
    }
    for name in extra {
        fs::write(dir.join(name), b"x").unwrap();
    }
}

#[test]
fn initial_volume_is_applied_to_engine() {
    let (_w, _h, calls, _) = worker();
    assert_eq!(calls.lock().unwrap().as_slice(), &[Call::Volume(0.1)]);
}

#[test]
fn play_without_loaded_track_stays_stopped() {
    let (mut w, h, calls, _) = worker();
    w.handle(PlayCommand::Play);
    assert_eq!(snapshot(&h).state, TransportState::Stopped);
    assert_eq!(calls.lock().unwrap().last(), Some(&Call::Play));
}

#[test]
fn stop_and_toggle_follow_transport_state() {
    let dir = tempdir().unwrap();
    album(dir.path(), &["One"], &[]);
    let (mut w, h, calls, _) = worker();

    w.handle(PlayCommand::LoadDirectory(dir.path().to_path_buf()));
    assert_eq!(snapshot(&h).state, TransportState::Playing);

    // Play while playing is ignored.
    calls.lock().unwrap().clear();
    w.handle(PlayCommand::Play);
    assert!(calls.lock().unwrap().is_empty());

    w.handle(PlayCommand::Toggle);
    assert_eq!(snapshot(&h).state, TransportState::Stopped);
    // Stop while stopped is ignored.
    w.handle(PlayCommand::Stop);
    assert_eq!(calls.lock().unwrap().as_slice(), &[Call::Stop]);

    w.handle(PlayCommand::Toggle);
    assert_eq!(snapshot(&h).state, TransportState::Playing);
    assert_eq!(calls.lock().unwrap().last(), Some(&Call::Play));
}

#[test]
fn next_and_previous_are_forwarded_without_changing_state() {
    let (mut w, h, calls, _) = worker();
    w.handle(PlayCommand::Next);
    w.handle(PlayCommand::Previous);
    assert_eq!(snapshot(&h).state, TransportState::Stopped);
    let calls = calls.lock().unwrap();
    assert_eq!(&calls[1..], &[Call::Next, Call::Previous]);
}

#[test]
fn next_publishes_metadata_of_the_new_track() {
    let dir = tempdir().unwrap();
    album(dir.path(), &["First", "Second"], &["notes.txt"]);
    let (mut w, h, _, _) = worker();

    w.handle(PlayCommand::LoadDirectory(dir.path().to_path_buf()));
    assert_eq!(snapshot(&h).metadata.title, "First");

    w.handle(PlayCommand::Next);
    assert_eq!(snapshot(&h).metadata.title, "Second");
    assert_eq!(snapshot(&h).state, TransportState::Playing);

    // Only notes.txt lies ahead; the current track's metadata is restored.
    w.handle(PlayCommand::Next);
    let np = snapshot(&h);
    assert_eq!(np.metadata.title, "Second");
    assert!(np.is_audio);

    w.handle(PlayCommand::Previous);
    assert_eq!(snapshot(&h).metadata.title, "First");
}

#[test]
fn set_volume_clamps_and_normalizes() {
    let (mut w, h, calls, _) = worker();
    w.handle(PlayCommand::SetVolume(250));
    assert_eq!(snapshot(&h).volume, 100);
    w.handle(PlayCommand::SetVolume(50));
    assert_eq!(snapshot(&h).volume, 50);
    let calls = calls.lock().unwrap();
    assert_eq!(&calls[1..], &[Call::Volume(1.0), Call::Volume(0.5)]);
}

#[test]
fn load_directory_sequence_and_cover() {
    let dir = tempdir().unwrap();
    album(dir.path(), &["Opening"], &["cover.png", "Cover.jpg"]);
    let (mut w, h, calls, _) = worker();

    w.handle(PlayCommand::LoadDirectory(dir.path().to_path_buf()));

    let np = snapshot(&h);
    assert!(np.updated);
    assert!(np.is_audio);
    assert_eq!(np.state, TransportState::Playing);
    assert_eq!(np.metadata.title, "Opening");
    assert_eq!(np.metadata.artist, crate::library::UNKNOWN_ARTIST);
    assert_eq!(np.metadata.duration, 1.0);
    assert_eq!(np.cover.kind, ImageKind::Jpg);
    assert_eq!(
        np.cover.path,
        dir.path().join("Cover.jpg").to_string_lossy()
    );

    let calls = calls.lock().unwrap();
    assert_eq!(calls[1], Call::Clear);
    assert_eq!(
        &calls[2..5],
        &[
            Call::Enqueue(dir.path().join("01.wav")),
            Call::Enqueue(dir.path().join("Cover.jpg")),
            Call::Enqueue(dir.path().join("cover.png")),
        ]
    );
    assert_eq!(calls[5], Call::Begin);
}

#[test]
fn second_load_discards_everything_from_the_first() {
    let a = tempdir().unwrap();
    album(a.path(), &["From A"], &["AlbumArtSmall.jpg"]);
    let b = tempdir().unwrap();
    album(b.path(), &[], &["cover.png", "readme.txt"]);
    let (mut w, h, _, _) = worker();

    w.handle(PlayCommand::LoadDirectory(a.path().to_path_buf()));
    assert_eq!(snapshot(&h).metadata.title, "From A");
    h.lock().unwrap().updated = false;

    w.handle(PlayCommand::LoadDirectory(b.path().to_path_buf()));
    let np = snapshot(&h);
    assert!(np.updated);
    assert!(!np.is_audio);
    assert_eq!(np.state, TransportState::Stopped);
    assert_eq!(np.metadata, crate::tags::TrackMetadata::default());
    assert_eq!(np.cover.kind, ImageKind::Png);
    assert_eq!(np.cover.path, b.path().join("cover.png").to_string_lossy());
}

#[test]
fn unreadable_directory_leaves_empty_queue_and_dirty_flag() {
    let a = tempdir().unwrap();
    album(a.path(), &["Before"], &["Cover.jpg"]);
    let (mut w, h, calls, _) = worker();
    w.handle(PlayCommand::LoadDirectory(a.path().to_path_buf()));
    h.lock().unwrap().updated = false;
    calls.lock().unwrap().clear();

    w.handle(PlayCommand::LoadDirectory(a.path().join("missing")));
    let np = snapshot(&h);
    assert!(np.updated);
    assert!(!np.is_audio);
    assert_eq!(np.state, TransportState::Stopped);
    assert_eq!(np.metadata.title, "");
    assert!(np.cover.is_none());
    assert_eq!(calls.lock().unwrap().as_slice(), &[Call::Stop, Call::Clear]);
}

#[test]
fn tick_advances_and_stops_at_end_of_queue() {
    let dir = tempdir().unwrap();
    album(dir.path(), &["One", "Two"], &[]);
    let (mut w, h, _, drained) = worker();
    w.handle(PlayCommand::LoadDirectory(dir.path().to_path_buf()));

    w.tick();
    assert_eq!(snapshot(&h).metadata.title, "One");

    drained.store(true, Ordering::SeqCst);
    w.tick();
    assert_eq!(snapshot(&h).metadata.title, "Two");
    assert_eq!(snapshot(&h).state, TransportState::Playing);

    drained.store(true, Ordering::SeqCst);
    w.tick();
    assert_eq!(snapshot(&h).state, TransportState::Stopped);
}

#[test]
fn undecodable_only_track_reads_as_no_media() {
    let dir = tempdir().unwrap();
    album(dir.path(), &["Broken"], &[]);
    let (engine, _, _) = Recording::new();
    let (mut w, h) = worker_with(engine.refusing(dir.path().join("01.wav")));

    w.handle(PlayCommand::LoadDirectory(dir.path().to_path_buf()));
    let np = snapshot(&h);
    assert_eq!(np.state, TransportState::Stopped);
    assert!(!np.is_audio);
    assert!(np.updated);
    assert_eq!(np.metadata, crate::tags::TrackMetadata::default());
}

#[test]
fn undecodable_next_track_keeps_the_current_one_published() {
    let dir = tempdir().unwrap();
    album(dir.path(), &["Good", "Broken"], &[]);
    let (engine, _, drained) = Recording::new();
    let (mut w, h) = worker_with(engine.refusing(dir.path().join("02.wav")));

    w.handle(PlayCommand::LoadDirectory(dir.path().to_path_buf()));
    w.handle(PlayCommand::Next);
    let np = snapshot(&h);
    assert_eq!(np.metadata.title, "Good");
    assert!(np.is_audio);

    // Running off the end leaves the last playable track on display.
    drained.store(true, Ordering::SeqCst);
    w.tick();
    let np = snapshot(&h);
    assert_eq!(np.state, TransportState::Stopped);
    assert_eq!(np.metadata.title, "Good");
}

#[test]
fn take_update_never_loses_a_publish() {
    let first = tempdir().unwrap();
    album(first.path(), &["First"], &[]);
    let second = tempdir().unwrap();
    album(second.path(), &["Second"], &["cover.png"]);
    let (mut w, h, _, _) = worker();

    w.handle(PlayCommand::LoadDirectory(first.path().to_path_buf()));
    let taken = take_update(&h).unwrap();
    assert_eq!(taken.metadata.title, "First");
    assert!(!taken.updated);
    assert!(take_update(&h).is_none());

    // A load lands while an older update is still pending.
    h.lock().unwrap().updated = true;
    w.handle(PlayCommand::LoadDirectory(second.path().to_path_buf()));
    let taken = take_update(&h).unwrap();
    assert_eq!(taken.metadata.title, "Second");
    assert_eq!(taken.cover.kind, ImageKind::Png);
    assert!(take_update(&h).is_none());
    assert!(!snapshot(&h).updated);
}

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn full_channel_drops_commands_without_blocking() {
    let mut settings = Settings::default();
    settings.audio.command_capacity = 4;

    // Hold the worker inside engine construction so nothing is drained.
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let player = AudioPlayer::with_engine(
        move || {
            let _ = release_rx.recv();
            Ok(Recording::new().0)
        },
        &settings,
    );

    let started = Instant::now();
    let results: Vec<_> = (0..10).map(|_| player.next()).collect();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 4);
    assert!(results[4..].iter().all(|r| *r == Err(SubmitError::Full)));

    release_tx.send(()).unwrap();
    player.shutdown();
}

#[test]
fn player_polls_and_clears_update_flag() {
    let dir = tempdir().unwrap();
    album(dir.path(), &["Polled"], &["cover.jpg"]);
    let player = AudioPlayer::with_engine(|| Ok(Recording::new().0), &Settings::default());

    player.set_volume(200).unwrap();
    player.load_directory(dir.path()).unwrap();
    assert!(wait_for(|| player.is_audio() && player.volume() == 100));

    assert!(player.has_update());
    assert_eq!(player.metadata().title, "Polled");
    assert_eq!(player.cover().kind, ImageKind::Jpg);
    assert!(player.is_playing());
    assert_eq!(player.position(), 0.0);
    player.clear_update();
    assert!(!player.has_update());
    assert!(player.take_update().is_none());

    player.stop().unwrap();
    assert!(wait_for(|| !player.is_playing()));
    player.shutdown();
}

#[test]
fn steady_commands_do_not_hold_back_auto_advance() {
    let dir = tempdir().unwrap();
    album(dir.path(), &["One", "Two"], &[]);
    let mut settings = Settings::default();
    settings.audio.tick_ms = 50;
    let (engine, _, drained) = Recording::new();
    let player = AudioPlayer::with_engine(move || Ok(engine), &settings);

    player.load_directory(dir.path()).unwrap();
    assert!(wait_for(|| player.metadata().title == "One"));
    drained.store(true, Ordering::SeqCst);

    // Commands arrive far more often than the tick interval.
    let deadline = Instant::now() + Duration::from_secs(5);
    while player.metadata().title != "Two" && Instant::now() < deadline {
        let _ = player.set_volume(20);
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(player.metadata().title, "Two");
    player.shutdown();
}

#[test]
fn failed_engine_disconnects_the_channel() {
    let player = AudioPlayer::with_engine(
        || -> Result<Recording, EngineError> { Err(EngineError::Output("no device".into())) },
        &Settings::default(),
    );
    assert!(wait_for(|| player.play() == Err(SubmitError::Disconnected)));
    player.shutdown();
}
