//! Turning a queue entry into a playable stream plus display metadata.

use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::Path;

use tracing::{debug, warn};

use crate::tags::{AudioFormat, TrackMetadata, read_metadata};

use super::model::{Resolved, TrackStream};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Close `previous`, then open `path` and read its tags.
///
/// Files whose extension is not `mp3`, `flac` or `wav`, and files that cannot
/// be opened, come back as [`Resolved::skipped`] with `is_audio == false`.
/// For audio files every empty text field is replaced with its placeholder.
pub fn resolve(path: &Path, mut previous: TrackStream) -> Resolved {
    previous.close();

    let Some(format) = AudioFormat::from_path(path) else {
        debug!(path = %path.display(), "not an audio file");
        return Resolved::skipped();
    };

    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to open track");
            return Resolved::skipped();
        }
    };

    let mut reader = BufReader::new(file);
    let mut metadata = read_metadata(format, &mut reader);
    fill_placeholders(&mut metadata);

    // Hand the same handle to the engine, rewound to the first byte.
    let mut file = reader.into_inner();
    if let Err(err) = file.rewind() {
        warn!(path = %path.display(), %err, "failed to rewind track");
        return Resolved::skipped();
    }

    Resolved {
        stream: TrackStream::from(file),
        metadata,
        is_audio: true,
    }
}

fn fill_placeholders(meta: &mut TrackMetadata) {
    for (field, placeholder) in [
        (&mut meta.title, UNKNOWN_TITLE),
        (&mut meta.artist, UNKNOWN_ARTIST),
        (&mut meta.album, UNKNOWN_ALBUM),
    ] {
        if field.is_empty() {
            *field = placeholder.to_string();
        }
    }
}
