//! RIFF/WAVE: PCM format header, `data` chunk length and `LIST/INFO` text.

use std::io::{Read, Seek};

use tracing::debug;

use super::TrackMetadata;
use super::reader::{Result, TagError, TagReader};

const FORMAT_PCM: u16 = 1;
/// Offset of the `fmt ` chunk's size field in a canonical header.
const FMT_SIZE_OFFSET: u64 = 16;
/// Offset of the `fmt ` chunk body.
const FMT_BODY_OFFSET: u64 = 20;

#[derive(Debug, Copy, Clone)]
struct PcmFormat {
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    bits_per_sample: u16,
}

impl PcmFormat {
    fn duration(&self, data_len: u32) -> f32 {
        if self.byte_rate == 0 {
            return 0.0;
        }
        (f64::from(data_len) / f64::from(self.byte_rate)) as f32
    }
}

/// Extract metadata from a WAV file.
pub fn read_wav<R: Read + Seek>(reader: &mut R) -> TrackMetadata {
    let mut meta = TrackMetadata::default();
    if let Err(err) = parse(reader, &mut meta) {
        debug!(%err, "wav metadata incomplete");
    }
    meta
}

fn parse<R: Read + Seek>(reader: &mut R, meta: &mut TrackMetadata) -> Result<()> {
    let mut r = TagReader::new(reader)?;
    r.expect_magic(b"RIFF")?;

    r.seek_to(FMT_SIZE_OFFSET)?;
    let fmt_len = r.u32_le()?;
    if r.u16_le()? != FORMAT_PCM {
        return Err(TagError::Unsupported("non-PCM WAV"));
    }
    let format = PcmFormat {
        channels: r.u16_le()?,
        sample_rate: r.u32_le()?,
        byte_rate: r.u32_le()?,
        bits_per_sample: {
            r.skip(2)?; // block align
            r.u16_le()?
        },
    };
    debug!(
        channels = format.channels,
        sample_rate = format.sample_rate,
        bits = format.bits_per_sample,
        "wav format"
    );

    r.seek_to(FMT_BODY_OFFSET + u64::from(fmt_len) + u64::from(fmt_len % 2))?;
    while r.remaining()? >= 8 {
        let id = r.array::<4>()?;
        let size = r.u32_le()?;
        match &id {
            b"data" => {
                meta.duration = format.duration(size);
                return Ok(());
            }
            b"LIST" => read_list(&mut r, size, meta)?,
            _ => r.skip(u64::from(size) + u64::from(size % 2))?,
        }
    }
    Ok(())
}

/// Read a `LIST` chunk body of `size` bytes; only the `INFO` kind is parsed.
fn read_list<R: Read + Seek>(
    r: &mut TagReader<'_, R>,
    size: u32,
    meta: &mut TrackMetadata,
) -> Result<()> {
    let start = r.position()?;
    let end = start + u64::from(size);

    if size >= 4 && &r.array::<4>()? == b"INFO" {
        while r.position()? + 8 <= end {
            let id = r.array::<4>()?;
            let len = r.u32_le()?;
            let declared = u64::from(len);
            let remaining = end.saturating_sub(r.position()?);
            if declared > remaining {
                return Err(TagError::Truncated {
                    declared,
                    remaining,
                });
            }
            let raw = r.bytes(declared)?;
            let value = String::from_utf8_lossy(&raw)
                .trim_end_matches('\0')
                .to_string();

            match &id {
                b"INAM" => meta.title = value,
                b"IART" => meta.artist = value,
                b"IPRD" => meta.album = value,
                _ => {}
            }

            if len % 2 == 1 {
                r.skip(1)?;
            }
        }
    }

    r.seek_to(end + u64::from(size % 2))
}
