//! Application model types: `App` and time formatting helpers.

use std::path::PathBuf;

use tracing::debug;

use crate::audio::{MAX_VOLUME, NowPlaying, SubmitError, TransportState};
use crate::library::{CoverCandidate, ImageKind};
use crate::tags::TrackMetadata;

/// Format seconds as `MM:SS`. Negative or non-finite input shows `00:00`.
pub fn format_mmss(secs: f32) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// What the UI shows; a copy of the worker's state as of the last poll.
#[derive(Debug, Clone)]
pub struct App {
    /// Directory given on the command line; `r` reloads it.
    pub dir: PathBuf,
    pub metadata: TrackMetadata,
    pub cover: CoverCandidate,
    pub is_audio: bool,
    pub playing: bool,
    pub position: f32,
    pub volume: u8,
    /// Last submit failure, shown in the status line.
    pub notice: Option<String>,
}

impl App {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            metadata: TrackMetadata::default(),
            cover: CoverCandidate::default(),
            is_audio: false,
            playing: false,
            position: 0.0,
            volume: 0,
            notice: None,
        }
    }

    /// Take metadata and cover from a snapshot. Called only when the
    /// worker's dirty flag was set.
    pub fn apply_update(&mut self, np: NowPlaying) {
        self.metadata = np.metadata;
        self.cover = np.cover;
        self.is_audio = np.is_audio;
        self.sync_transport(np.state == TransportState::Playing, np.position, np.volume);
    }

    /// Per-frame refresh of the fields that change without an update.
    pub fn sync_transport(&mut self, playing: bool, position: f32, volume: u8) {
        self.playing = playing;
        self.position = position;
        self.volume = volume;
    }

    /// Record the outcome of a command submission.
    pub fn report(&mut self, result: Result<(), SubmitError>) {
        match result {
            Ok(()) => self.notice = None,
            Err(err) => {
                debug!(%err, "command not delivered");
                self.notice = Some(err.to_string());
            }
        }
    }

    pub fn volume_up(&self, step: u8) -> u8 {
        self.volume.saturating_add(step).min(MAX_VOLUME)
    }

    pub fn volume_down(&self, step: u8) -> u8 {
        self.volume.saturating_sub(step)
    }

    pub fn has_media(&self) -> bool {
        self.is_audio
    }

    pub fn now_playing_lines(&self) -> Vec<String> {
        if !self.has_media() {
            return vec!["no media".to_string()];
        }
        vec![
            format!("Title: {}", self.metadata.title),
            format!("Artist: {}", self.metadata.artist),
            format!("Album: {}", self.metadata.album),
        ]
    }

    /// `elapsed / total`; total is `--:--` when the duration is unknown.
    pub fn time_text(&self) -> String {
        let total = if self.has_media() && self.metadata.duration > 0.0 {
            format_mmss(self.metadata.duration)
        } else {
            "--:--".to_string()
        };
        format!("{} / {}", format_mmss(self.position), total)
    }

    pub fn cover_text(&self) -> String {
        if self.cover.is_none() {
            return "none".to_string();
        }
        let kind = match self.cover.kind {
            ImageKind::Png => "PNG",
            _ => "JPG",
        };
        format!("{} ({})", self.cover.path, kind)
    }

    pub fn status_text(&self) -> String {
        let mut parts = vec![
            if self.playing { "Playing" } else { "Stopped" }.to_string(),
            format!("Vol: {}%", self.volume),
            format!("Dir: {}", self.dir.display()),
        ];
        if let Some(notice) = &self.notice {
            parts.push(notice.clone());
        }
        parts.join(" • ")
    }
}
