//! ID3v2 text frames, with ID3v1 and a frame-header duration estimate as
//! fallbacks for MP3 files.

use std::io::{Read, Seek};

use tracing::{debug, trace};

use super::TrackMetadata;
use super::id3v1::read_id3v1;
use super::mpeg::estimate_duration;
use super::reader::{Result, TagError, TagReader};

const HEADER_LEN: u64 = 10;
/// Frames larger than this are never loaded; they are seeked over.
const MAX_FRAME_LEN: u32 = 512;

/// Decode a 4-byte synchsafe integer (7 significant bits per byte, MSB first).
pub fn synchsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

/// Extract metadata from an MP3 file.
pub fn read_mp3<R: Read + Seek>(reader: &mut R) -> TrackMetadata {
    let mut meta = TrackMetadata::default();

    let tag_size = match read_tag(reader, &mut meta) {
        Ok(size) => size,
        Err(err) => {
            debug!(%err, "id3v2 tag incomplete");
            None
        }
    };

    // With a tag present, the audio frames (and so the bitrate) start after it.
    let audio_start = tag_size.map_or(0, |size| HEADER_LEN + u64::from(size));
    meta.duration = estimate_duration(reader, audio_start);

    if meta.title.is_empty() || meta.artist.is_empty() || meta.album.is_empty() {
        meta.fill_missing_from(read_id3v1(reader));
    }
    meta
}

/// Returns the declared tag size, or `None` when the file has no ID3v2 tag.
fn read_tag<R: Read + Seek>(reader: &mut R, meta: &mut TrackMetadata) -> Result<Option<u32>> {
    let mut r = TagReader::new(reader)?;
    let header = match r.array::<10>() {
        Ok(h) => h,
        Err(_) => return Ok(None),
    };
    if &header[..3] != b"ID3" {
        return Ok(None);
    }
    let size = synchsafe([header[6], header[7], header[8], header[9]]);
    // The declared size still locates the audio when the frame walk fails.
    if let Err(err) = read_frames(&mut r, size, meta) {
        debug!(%err, "id3v2 frames incomplete");
    }
    Ok(Some(size))
}

fn read_frames<R: Read + Seek>(
    r: &mut TagReader<'_, R>,
    tag_size: u32,
    meta: &mut TrackMetadata,
) -> Result<()> {
    let tag_end = HEADER_LEN + u64::from(tag_size);
    let mut pos = HEADER_LEN;

    while pos < tag_end && pos + HEADER_LEN < r.len() {
        r.seek_to(pos)?;
        let id = r.array::<4>()?;
        if id[0] == 0 {
            // padding
            break;
        }
        let size = r.u32_be()?;
        r.skip(2)?; // flags

        let field = match &id {
            b"TIT2" => Some(&mut meta.title),
            b"TPE1" => Some(&mut meta.artist),
            b"TALB" => Some(&mut meta.album),
            _ => None,
        };

        if size > MAX_FRAME_LEN {
            trace!(frame = %String::from_utf8_lossy(&id), size, "skipping oversized frame");
        } else if let Some(field) = field {
            let payload = r.bytes(u64::from(size))?;
            *field = decode_text(&payload);
        }

        pos = pos
            .checked_add(HEADER_LEN + u64::from(size))
            .ok_or(TagError::Malformed("frame size"))?;
    }
    Ok(())
}

/// Decode a text-frame payload: one encoding byte followed by the string.
fn decode_text(payload: &[u8]) -> String {
    let Some((&encoding, text)) = payload.split_first() else {
        return String::new();
    };
    match encoding {
        0 => latin1(text),
        1 => match text {
            [0xFF, 0xFE, rest @ ..] => utf16(rest, true),
            [0xFE, 0xFF, rest @ ..] => utf16(rest, false),
            _ => utf16(text, false),
        },
        2 => utf16(text, false),
        3 => String::from_utf8_lossy(text)
            .trim_end_matches('\0')
            .to_string(),
        _ => String::new(),
    }
}

/// ISO-8859-1 up to the first NUL. Every byte maps to the code point of the
/// same value.
pub(super) fn latin1(text: &[u8]) -> String {
    text.iter()
        .take_while(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect()
}

/// UTF-16 code units up to the first NUL unit. Surrogate halves are not
/// paired up; each one becomes U+FFFD.
fn utf16(text: &[u8], little_endian: bool) -> String {
    text.chunks_exact(2)
        .map(|unit| {
            let pair = [unit[0], unit[1]];
            if little_endian {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            }
        })
        .take_while(|&unit| unit != 0)
        .map(|unit| char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
