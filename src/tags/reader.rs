//! Bounded reads over a seekable tag source.
//!
//! `TagReader` remembers the total length of the underlying source so that
//! every declared size can be checked against what is actually left before a
//! buffer is allocated for it.

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum TagError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("missing {0} signature")]
    BadMagic(&'static str),

    #[error("declared size {declared} exceeds the {remaining} bytes left")]
    Truncated { declared: u64, remaining: u64 },

    #[error("malformed {0}")]
    Malformed(&'static str),

    #[error("unsupported {0}")]
    Unsupported(&'static str),
}

pub(crate) type Result<T> = std::result::Result<T, TagError>;

pub(crate) struct TagReader<'a, R> {
    inner: &'a mut R,
    len: u64,
}

impl<'a, R: Read + Seek> TagReader<'a, R> {
    /// Wrap `inner`, measuring its length and rewinding it to the start.
    pub fn new(inner: &'a mut R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, len })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    pub fn remaining(&mut self) -> Result<u64> {
        Ok(self.len.saturating_sub(self.position()?))
    }

    /// Fail with `Truncated` unless at least `n` bytes are left.
    pub fn ensure(&mut self, n: u64) -> Result<()> {
        let remaining = self.remaining()?;
        if n > remaining {
            return Err(TagError::Truncated {
                declared: n,
                remaining,
            });
        }
        Ok(())
    }

    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn skip(&mut self, n: u64) -> Result<()> {
        let pos = self.position()?;
        let target = pos.checked_add(n).ok_or(TagError::Truncated {
            declared: n,
            remaining: self.len.saturating_sub(pos),
        })?;
        self.seek_to(target)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read exactly `n` bytes after checking that they exist.
    pub fn bytes(&mut self, n: u64) -> Result<Vec<u8>> {
        self.ensure(n)?;
        let n = usize::try_from(n).map_err(|_| TagError::Malformed("length"))?;
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read up to `n` bytes; a short result means the source ended.
    pub fn read_up_to(&mut self, n: u64) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        (&mut *self.inner).take(n).read_to_end(&mut buf)?;
        Ok(buf)
    }

    pub fn expect_magic<const N: usize>(&mut self, magic: &'static [u8; N]) -> Result<()> {
        let found = self.array::<N>()?;
        if &found != magic {
            let name = std::str::from_utf8(magic).unwrap_or("format");
            return Err(TagError::BadMagic(name));
        }
        Ok(())
    }

    pub fn u16_le(&mut self) -> Result<u16> {
        Ok(self.inner.read_u16::<LittleEndian>()?)
    }

    pub fn u32_le(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    pub fn u32_be(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<BigEndian>()?)
    }
}
