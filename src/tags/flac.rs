//! FLAC metadata blocks: STREAMINFO for the duration and VORBIS_COMMENT for
//! the text fields.

use std::io::{Read, Seek};

use tracing::debug;

use super::TrackMetadata;
use super::reader::{Result, TagError, TagReader};

const STREAMINFO: u8 = 0;
const VORBIS_COMMENT: u8 = 4;
const STREAMINFO_LEN: u32 = 34;
/// Longer comments are cut to this many bytes before matching.
const MAX_COMMENT_LEN: u32 = 256;

/// The audio parameters carried by a STREAMINFO block.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u8,
    pub bits_per_sample: u8,
    pub total_samples: u64,
}

impl StreamInfo {
    /// Unpack the bit fields stored at bytes 10..18 of the block body.
    pub fn parse(buf: &[u8; 34]) -> Self {
        let sample_rate =
            (u32::from(buf[10]) << 12) | (u32::from(buf[11]) << 4) | (u32::from(buf[12]) >> 4);
        let channels = ((buf[12] >> 1) & 0x07) + 1;
        let bits_per_sample = (((buf[12] & 0x01) << 4) | (buf[13] >> 4)) + 1;
        let total_samples = (u64::from(buf[13] & 0x0F) << 32)
            | (u64::from(buf[14]) << 24)
            | (u64::from(buf[15]) << 16)
            | (u64::from(buf[16]) << 8)
            | u64::from(buf[17]);

        Self {
            sample_rate,
            channels,
            bits_per_sample,
            total_samples,
        }
    }

    /// Seconds, or 0 when the sample rate is unknown.
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (self.total_samples as f64 / f64::from(self.sample_rate)) as f32
    }
}

/// Extract metadata from a FLAC file.
pub fn read_flac<R: Read + Seek>(reader: &mut R) -> TrackMetadata {
    let mut meta = TrackMetadata::default();
    if let Err(err) = parse(reader, &mut meta) {
        debug!(%err, "flac metadata incomplete");
    }
    meta
}

fn parse<R: Read + Seek>(reader: &mut R, meta: &mut TrackMetadata) -> Result<()> {
    let mut r = TagReader::new(reader)?;
    r.expect_magic(b"fLaC")?;

    loop {
        let header = r.array::<4>()?;
        let last = header[0] & 0x80 != 0;
        let block_type = header[0] & 0x7F;
        let size = u32::from_be_bytes([0, header[1], header[2], header[3]]);

        match block_type {
            STREAMINFO => {
                if size < STREAMINFO_LEN {
                    return Err(TagError::Malformed("STREAMINFO block"));
                }
                let info = StreamInfo::parse(&r.array::<34>()?);
                debug!(
                    sample_rate = info.sample_rate,
                    channels = info.channels,
                    bits = info.bits_per_sample,
                    "flac stream info"
                );
                meta.duration = info.duration();
                r.skip(u64::from(size - STREAMINFO_LEN))?;
            }
            VORBIS_COMMENT => return read_comments(&mut r, meta),
            _ => r.skip(u64::from(size))?,
        }

        if last {
            return Ok(());
        }
    }
}

fn read_comments<R: Read + Seek>(r: &mut TagReader<'_, R>, meta: &mut TrackMetadata) -> Result<()> {
    let vendor_len = u64::from(r.u32_le()?);
    r.ensure(vendor_len)?;
    r.skip(vendor_len)?;

    let count = r.u32_le()?;
    for _ in 0..count {
        let len = r.u32_le()?;
        r.ensure(u64::from(len))?;
        let keep = len.min(MAX_COMMENT_LEN);
        let raw = r.bytes(u64::from(keep))?;
        r.skip(u64::from(len - keep))?;

        let entry = String::from_utf8_lossy(&raw);
        let Some((key, value)) = entry.split_once('=') else {
            continue;
        };
        let field = if key.eq_ignore_ascii_case("TITLE") {
            &mut meta.title
        } else if key.eq_ignore_ascii_case("ARTIST") {
            &mut meta.artist
        } else if key.eq_ignore_ascii_case("ALBUM") {
            &mut meta.album
        } else {
            continue;
        };
        *field = value.to_string();
    }
    Ok(())
}
