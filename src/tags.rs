//! Best-effort tag extraction for the formats the player understands.
//!
//! Each extractor takes a seekable byte source and returns whatever it could
//! determine. A bad signature, a short read or a size that runs past the end
//! of the file stops that extractor early; the fields gathered up to that
//! point are still returned and the failure is only logged.

use std::io::{Read, Seek};
use std::path::Path;

mod flac;
mod id3v1;
mod id3v2;
mod mpeg;
mod reader;
mod wav;

pub use flac::read_flac;
pub use id3v1::read_id3v1;
pub use id3v2::read_mp3;
pub use wav::read_wav;


/// Display metadata for one track. Empty strings mean "unknown"; a zero
/// duration means the length could not be determined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    pub artist: String,
    pub title: String,
    pub album: String,
    /// Length in seconds.
    pub duration: f32,
}

impl TrackMetadata {
    /// Copy over only the text fields that are still empty here.
    pub fn fill_missing_from(&mut self, other: TrackMetadata) {
        if self.title.is_empty() {
            self.title = other.title;
        }
        if self.artist.is_empty() {
            self.artist = other.artist;
        }
        if self.album.is_empty() {
            self.album = other.album;
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Flac,
    Wav,
}

impl AudioFormat {
    /// Classify `path` by its lowercase extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Some(Self::Mp3),
            "flac" => Some(Self::Flac),
            "wav" => Some(Self::Wav),
            _ => None,
        }
    }
}

/// Run the extractor matching `format` over `reader`.
pub fn read_metadata<R: Read + Seek>(format: AudioFormat, reader: &mut R) -> TrackMetadata {
    match format {
        AudioFormat::Mp3 => read_mp3(reader),
        AudioFormat::Flac => read_flac(reader),
        AudioFormat::Wav => read_wav(reader),
    }
}
