//! Constant-bitrate duration estimate from the first MPEG audio frame header.
//!
//! Only the first valid header inside a 1 KiB window is inspected and the
//! whole remaining file is assumed to share its bitrate. Variable-bitrate
//! files therefore get an approximate length.

use std::io::{Read, Seek};

use tracing::debug;

use super::reader::{Result, TagReader};

const SCAN_LEN: u64 = 1024;
/// Assumed when no frame header is found in the scan window.
const DEFAULT_BITRATE: u32 = 128_000;

const SAMPLE_RATES_V1: [u32; 3] = [44_100, 48_000, 32_000];
const SAMPLE_RATES_V2: [u32; 3] = [22_050, 24_000, 16_000];
const SAMPLE_RATES_V25: [u32; 3] = [11_025, 12_000, 8_000];

// Layer III bitrates in kbit/s; index 0 is "free format". Layer I and II
// frames are read with these tables too.
const BITRATES_V1: [u32; 15] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320,
];
const BITRATES_V2: [u32; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg1,
    Mpeg2,
    Mpeg25,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: MpegVersion,
    pub sample_rate: u32,
    /// Bits per second.
    pub bitrate: u32,
}

impl FrameHeader {
    /// Decode the two bytes following the 0xFF sync byte. Returns `None` for
    /// reserved version, sample-rate or bitrate codes.
    fn decode(b1: u8, b2: u8) -> Option<Self> {
        let version = match (b1 >> 3) & 0x03 {
            3 => MpegVersion::Mpeg1,
            2 => MpegVersion::Mpeg2,
            0 => MpegVersion::Mpeg25,
            _ => return None,
        };
        let (rates, bitrates) = match version {
            MpegVersion::Mpeg1 => (&SAMPLE_RATES_V1, &BITRATES_V1),
            MpegVersion::Mpeg2 => (&SAMPLE_RATES_V2, &BITRATES_V2),
            MpegVersion::Mpeg25 => (&SAMPLE_RATES_V25, &BITRATES_V2),
        };
        let sample_rate = *rates.get(usize::from((b2 >> 2) & 0x03))?;
        let kbps = *bitrates.get(usize::from(b2 >> 4))?;
        Some(Self {
            version,
            sample_rate,
            bitrate: kbps * 1000,
        })
    }
}

/// Find the first frame sync (0xFF then a byte with its top three bits set)
/// that is followed by a decodable header.
pub fn find_frame_header(buf: &[u8]) -> Option<FrameHeader> {
    buf.windows(3).find_map(|w| match w {
        &[0xFF, b1, b2] if b1 & 0xE0 == 0xE0 => FrameHeader::decode(b1, b2),
        _ => None,
    })
}

/// Estimate the play time in seconds of the audio that begins at `start`.
pub fn estimate_duration<R: Read + Seek>(reader: &mut R, start: u64) -> f32 {
    match estimate(reader, start) {
        Ok(secs) => secs,
        Err(err) => {
            debug!(%err, "mp3 duration estimate failed");
            0.0
        }
    }
}

fn estimate<R: Read + Seek>(reader: &mut R, start: u64) -> Result<f32> {
    let mut r = TagReader::new(reader)?;
    r.seek_to(start)?;
    let head = r.read_up_to(SCAN_LEN)?;
    let header = find_frame_header(&head);
    if let Some(h) = &header {
        debug!(version = ?h.version, sample_rate = h.sample_rate, bitrate = h.bitrate, "mpeg frame header");
    }
    let bitrate = header.map_or(DEFAULT_BITRATE, |h| h.bitrate);
    if bitrate == 0 {
        return Ok(0.0);
    }
    let bits = r.len().saturating_sub(start) as f64 * 8.0;
    Ok((bits / f64::from(bitrate)) as f32)
}
