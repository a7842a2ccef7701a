use std::fs::File;

use crate::tags::TrackMetadata;

/// A byte stream the playback engine can decode. The empty stream stands in
/// for entries that are not audio, so a queue walk can step over them.
#[derive(Debug, Default)]
pub struct TrackStream {
    file: Option<File>,
}

impl TrackStream {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Release the underlying handle, if any.
    pub fn close(&mut self) {
        self.file = None;
    }

    pub fn into_file(self) -> Option<File> {
        self.file
    }
}

impl From<File> for TrackStream {
    fn from(file: File) -> Self {
        Self { file: Some(file) }
    }
}

/// Outcome of resolving one queue entry.
#[derive(Debug, Default)]
pub struct Resolved {
    pub stream: TrackStream,
    pub metadata: TrackMetadata,
    pub is_audio: bool,
}

impl Resolved {
    /// The fallback for non-audio or unreadable entries: empty stream, empty
    /// metadata.
    pub fn skipped() -> Self {
        Self::default()
    }
}
