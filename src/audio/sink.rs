//! `rodio`-backed [`PlaybackEngine`].
//!
//! One `Sink` per track. Each resolved stream is decoded before it counts as
//! playable, so files rodio cannot decode are stepped over like any other
//! non-audio entry.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::library::TrackStream;

use super::engine::{EngineError, PlaybackEngine, TrackSource};
use super::queue::{Direction, PlayQueue};

type FileDecoder = Decoder<BufReader<File>>;

/// Wraps the caller's source and decodes every stream it accepts.
struct Decoding<'a> {
    inner: &'a mut dyn TrackSource,
    decoded: Option<FileDecoder>,
}

impl<'a> Decoding<'a> {
    fn new(inner: &'a mut dyn TrackSource) -> Self {
        Self {
            inner,
            decoded: None,
        }
    }
}

impl TrackSource for Decoding<'_> {
    fn resolve(&mut self, path: &Path, previous: TrackStream) -> (TrackStream, bool) {
        let (stream, is_audio) = self.inner.resolve(path, previous);
        if !is_audio {
            return (stream, false);
        }
        let Some(file) = stream.into_file() else {
            self.inner.reject(path);
            return (TrackStream::empty(), false);
        };
        match Decoder::new(BufReader::new(file)) {
            Ok(decoder) => {
                self.decoded = Some(decoder);
                (TrackStream::empty(), true)
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "cannot decode track, skipping");
                self.inner.reject(path);
                (TrackStream::empty(), false)
            }
        }
    }

    fn reject(&mut self, path: &Path) {
        self.inner.reject(path);
    }
}

pub struct RodioEngine {
    stream: OutputStream,
    sink: Option<Sink>,
    queue: PlayQueue,
    playing: bool,
    gain: f32,
}

impl RodioEngine {
    /// Open the default output device.
    pub fn open() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::Output(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which garbles the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            queue: PlayQueue::default(),
            playing: false,
            gain: 1.0,
        })
    }

    /// Swap in a fresh sink for `decoder`, paused unless currently playing.
    fn load(&mut self, decoder: FileDecoder) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.gain);
        sink.append(decoder);
        if self.playing {
            sink.play();
        } else {
            sink.pause();
        }
        self.sink = Some(sink);
        debug!(
            index = ?self.queue.cursor(),
            path = ?self.queue.current(),
            "track loaded"
        );
    }

    fn step(&mut self, source: &mut dyn TrackSource, dir: Direction) -> bool {
        let mut decoding = Decoding::new(source);
        let found = self
            .queue
            .advance(&mut decoding, TrackStream::empty(), dir)
            .is_some();
        match decoding.decoded {
            Some(decoder) if found => {
                self.load(decoder);
                true
            }
            _ => false,
        }
    }

    fn drained(&self) -> bool {
        self.sink.as_ref().is_none_or(|s| s.empty())
    }
}

impl PlaybackEngine for RodioEngine {
    fn clear(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.queue.clear();
        self.playing = false;
    }

    fn enqueue(&mut self, path: PathBuf) {
        self.queue.push(path);
    }

    fn begin(&mut self, source: &mut dyn TrackSource) -> bool {
        debug!(entries = self.queue.len(), "starting queue");
        let mut decoding = Decoding::new(source);
        let found = self.queue.begin(&mut decoding, TrackStream::empty()).is_some();
        match decoding.decoded {
            Some(decoder) if found => {
                self.playing = true;
                self.load(decoder);
                true
            }
            _ => {
                if let Some(sink) = self.sink.take() {
                    sink.stop();
                }
                self.playing = false;
                false
            }
        }
    }

    fn play(&mut self, source: &mut dyn TrackSource) -> bool {
        if self.drained() {
            return self.begin(source);
        }
        if let Some(sink) = &self.sink {
            sink.play();
        }
        self.playing = true;
        true
    }

    fn stop(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.playing = false;
    }

    fn next(&mut self, source: &mut dyn TrackSource) {
        self.step(source, Direction::Forward);
    }

    fn previous(&mut self, source: &mut dyn TrackSource) {
        self.step(source, Direction::Backward);
    }

    fn set_volume(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.gain);
        }
    }

    fn pump(&mut self, source: &mut dyn TrackSource) -> bool {
        if self.playing && self.drained() && !self.step(source, Direction::Forward) {
            // End of the queue.
            self.sink = None;
            self.playing = false;
        }
        self.playing
    }

    fn position(&self) -> f32 {
        self.sink
            .as_ref()
            .map_or(0.0, |s| s.get_pos().as_secs_f32())
    }
}
