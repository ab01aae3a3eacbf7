//! MSB-first bit stream over a byte buffer, plus the matching writer used by the encoder.

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    #[error("Not enough bits: needed {needed}, {remaining} left")]
    Exhausted { needed: usize, remaining: usize },

    #[error("At most 8 bits per field, {requested} requested")]
    TooWide { requested: u8 },

    #[error("No NUL terminator before the end of the stream")]
    MissingTerminator,

    #[error("Writing bits failed: {0:?}")]
    Write(io::ErrorKind),
}

impl From<io::Error> for BitError {
    fn from(err: io::Error) -> Self {
        BitError::Write(err.kind())
    }
}

/// Cursor location, reported in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BitPosition {
    pub byte: usize,
    pub bit: u8,
}

impl fmt::Display for BitPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "byte {} bit {}", self.byte, self.bit)
    }
}

/// Number of bits needed to index `count` distinct values: `ceil(log2(count))`,
/// zero when there is nothing to choose from.
pub fn disambiguation_bits(count: usize) -> u8 {
    if count <= 1 {
        0
    } else {
        (usize::BITS - (count - 1).leading_zeros()) as u8
    }
}

#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    buf: &'a [u8],
    byte: usize,
    bit: u8,
    remaining: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            byte: 0,
            bit: 0,
            remaining: buf.len() * 8,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining_bits(&self) -> usize {
        self.remaining
    }

    pub fn position(&self) -> BitPosition {
        BitPosition {
            byte: self.byte,
            bit: self.bit,
        }
    }

    /// Next `n` bits (n <= 8) without advancing the cursor.
    pub fn peek(&self, n: u8) -> Result<u8, BitError> {
        if n > 8 {
            return Err(BitError::TooWide { requested: n });
        }
        if self.remaining < usize::from(n) {
            return Err(BitError::Exhausted {
                needed: usize::from(n),
                remaining: self.remaining,
            });
        }
        if n == 0 {
            return Ok(0);
        }

        // Two-byte window so a field may straddle a byte boundary.
        let hi = u16::from(self.buf[self.byte]) << 8;
        let lo = if self.bit + n > 8 {
            u16::from(self.buf[self.byte + 1])
        } else {
            0
        };
        let window = (hi | lo) << self.bit;
        Ok((window >> (16 - n)) as u8)
    }

    pub fn read(&mut self, n: u8) -> Result<u8, BitError> {
        let value = self.peek(n)?;
        self.advance(n);
        Ok(value)
    }

    pub fn read_bit(&mut self) -> Result<bool, BitError> {
        Ok(self.read(1)? == 1)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, BitError> {
        if self.remaining < n * 8 {
            return Err(BitError::Exhausted {
                needed: n * 8,
                remaining: self.remaining,
            });
        }
        (0..n).map(|_| self.read(8)).collect()
    }

    /// Scan forward in 8-bit steps from the cursor (which need not be byte-aligned)
    /// for `value`, without consuming anything. Returns the distance in bytes.
    pub fn find_byte(&self, value: u8) -> Result<Option<usize>, BitError> {
        let mut probe = self.clone();
        let mut distance = 0;
        while probe.remaining >= 8 {
            if probe.peek(8)? == value {
                return Ok(Some(distance));
            }
            probe.advance(8);
            distance += 1;
        }
        Ok(None)
    }

    /// Read a NUL-terminated byte string. The terminator is consumed but not returned.
    pub fn read_cstring(&mut self) -> Result<Vec<u8>, BitError> {
        let len = self.find_byte(0)?.ok_or(BitError::MissingTerminator)?;
        let mut bytes = self.read_bytes(len + 1)?;
        bytes.pop();
        Ok(bytes)
    }

    fn advance(&mut self, n: u8) {
        let bits = self.bit + n;
        self.byte += usize::from(bits / 8);
        self.bit = bits % 8;
        self.remaining -= usize::from(n);
    }
}

/// MSB-first bit sink over any writer, counting the bits written so far.
pub struct BitWriter<W: Write> {
    inner: bitbit::BitWriter<W>,
    len: usize,
}

impl<W: Write> BitWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            inner: bitbit::BitWriter::new(out),
            len: 0,
        }
    }

    pub fn bit_len(&self) -> usize {
        self.len
    }

    /// Write the low `n` bits of `value` (n <= 8), most significant first.
    pub fn write(&mut self, n: u8, value: u8) -> Result<(), BitError> {
        if n > 8 {
            return Err(BitError::TooWide { requested: n });
        }
        if n > 0 {
            let mask = (1u32 << n) - 1;
            self.inner.write_bits(u32::from(value) & mask, usize::from(n))?;
            self.len += usize::from(n);
        }
        Ok(())
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<(), BitError> {
        self.write(1, u8::from(bit))
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BitError> {
        bytes.iter().try_for_each(|&b| self.write(8, b))
    }

    /// Zero-fill the last byte and flush it. Returns the number of bits written
    /// before padding.
    pub fn finish(mut self) -> Result<usize, BitError> {
        if self.len % 8 != 0 {
            self.inner.pad_to_byte()?;
        }
        Ok(self.len)
    }
}

/// Run `fill` against a fresh writer and return the padded bytes.
pub fn pack_bits<F>(fill: F) -> Result<Vec<u8>, BitError>
where
    F: FnOnce(&mut BitWriter<&mut Vec<u8>>) -> Result<(), BitError>,
{
    let mut buf = Vec::new();
    {
        let mut writer = BitWriter::new(&mut buf);
        fill(&mut writer)?;
        writer.finish()?;
    }
    Ok(buf)
}
