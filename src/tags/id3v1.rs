use std::io::{Read, Seek};

use tracing::debug;

use super::TrackMetadata;
use super::id3v2::latin1;
use super::reader::{Result, TagError, TagReader};

const TAG_LEN: u64 = 128;

/// Read the fixed 128-byte ID3v1 block at the end of an MP3 file.
pub fn read_id3v1<R: Read + Seek>(reader: &mut R) -> TrackMetadata {
    let mut meta = TrackMetadata::default();
    if let Err(err) = parse(reader, &mut meta) {
        debug!(%err, "no usable id3v1 tag");
    }
    meta
}

fn parse<R: Read + Seek>(reader: &mut R, meta: &mut TrackMetadata) -> Result<()> {
    let mut r = TagReader::new(reader)?;
    if r.len() < TAG_LEN {
        return Err(TagError::Truncated {
            declared: TAG_LEN,
            remaining: r.len(),
        });
    }
    r.seek_to(r.len() - TAG_LEN)?;
    let block = r.array::<128>()?;
    if &block[..3] != b"TAG" {
        return Err(TagError::BadMagic("TAG"));
    }

    meta.title = field(&block[3..33]);
    meta.artist = field(&block[33..63]);
    meta.album = field(&block[63..93]);
    Ok(())
}

/// A fixed-width field, cut at the first NUL. A field with no NUL fills its
/// whole width, so only then is trailing space padding dropped.
fn field(raw: &[u8]) -> String {
    let text = latin1(raw);
    if raw.contains(&0) {
        text
    } else {
        text.trim_end_matches(' ').to_string()
    }
}
