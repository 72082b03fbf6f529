//! Bounds-checked sequential reads out of a byte slice.

use thiserror::Error;

/// Byte order of multi-byte integers.
///
/// Every BMFont file seen so far is little-endian.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

impl Endian {
    pub(crate) fn u16_from(self, raw: [u8; 2]) -> u16 {
        match self {
            Endian::Little => u16::from_le_bytes(raw),
            Endian::Big => u16::from_be_bytes(raw),
        }
    }

    pub(crate) fn u32_from(self, raw: [u8; 4]) -> u32 {
        match self {
            Endian::Little => u32::from_le_bytes(raw),
            Endian::Big => u32::from_be_bytes(raw),
        }
    }

    pub(crate) fn u16_to(self, value: u16) -> [u8; 2] {
        match self {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        }
    }

    pub(crate) fn u32_to(self, value: u32) -> [u8; 4] {
        match self {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        }
    }
}

/// A read that could not be satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Fewer bytes were left than the read needed.
    #[error("unexpected end of data: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        /// Bytes the read asked for.
        needed: usize,
        /// Bytes that were left.
        available: usize,
    },
    /// No zero byte was found within the allowed length.
    #[error("string is not null terminated within {max} bytes")]
    MissingTerminator {
        /// Maximum number of bytes searched, terminator included.
        max: usize,
    },
    /// A string is not valid UTF-8.
    #[error("string is not valid UTF-8 after {valid_up_to} bytes")]
    InvalidUtf8 {
        /// Length of the valid prefix.
        valid_up_to: usize,
    },
}

fn decode(bytes: &[u8]) -> Result<String, ReadError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|err| ReadError::InvalidUtf8 {
            valid_up_to: err.valid_up_to(),
        })
}

/// A cursor over a byte slice.
///
/// Every read either consumes exactly the bytes it asked for or fails without
/// moving the cursor. [`Reader::position`] reports the absolute offset of the
/// next byte, which includes the base offset a sub-reader was created with.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
    order: Endian,
}

impl<'a> Reader<'a> {
    /// Create a reader at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8], order: Endian) -> Self {
        Reader {
            data,
            pos: 0,
            base: 0,
            order,
        }
    }

    /// Create a reader over `data`, which starts at `base` in some outer buffer.
    #[must_use]
    pub fn with_base(data: &'a [u8], base: usize, order: Endian) -> Self {
        Reader {
            data,
            pos: 0,
            base,
            order,
        }
    }

    /// Absolute offset of the next unread byte.
    #[must_use]
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Number of bytes left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// `true` once every byte was consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        let bytes = self
            .data
            .get(self.pos..)
            .and_then(|rest| rest.get(..n))
            .ok_or(ReadError::UnexpectedEof {
                needed: n,
                available: self.remaining(),
            })?;
        self.pos += n;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut raw = [0; N];
        raw.copy_from_slice(self.read_bytes(N)?);
        Ok(raw)
    }

    /// Read one unsigned byte.
    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        self.read_array::<1>().map(|[b]| b)
    }

    /// Read one signed byte.
    pub fn read_i8(&mut self) -> Result<i8, ReadError> {
        self.read_array::<1>().map(|[b]| i8::from_ne_bytes([b]))
    }

    /// Read one byte of packed flags, left for the caller to mask.
    pub fn read_bits(&mut self) -> Result<u8, ReadError> {
        self.read_u8()
    }

    /// Read an unsigned 16-bit integer.
    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        let raw = self.read_array()?;
        Ok(self.order.u16_from(raw))
    }

    /// Read a signed 16-bit integer.
    pub fn read_i16(&mut self) -> Result<i16, ReadError> {
        self.read_u16().map(|v| i16::from_ne_bytes(v.to_ne_bytes()))
    }

    /// Read an unsigned 32-bit integer.
    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        let raw = self.read_array()?;
        Ok(self.order.u32_from(raw))
    }

    /// Read a signed 32-bit integer.
    pub fn read_i32(&mut self) -> Result<i32, ReadError> {
        self.read_u32().map(|v| i32::from_ne_bytes(v.to_ne_bytes()))
    }

    /// Read bytes up to a zero byte, looking at no more than `max` bytes.
    ///
    /// The terminator is consumed but not returned. Fails when there is no
    /// terminator among the first `max` bytes; the cursor does not move then.
    pub fn read_null_terminated(&mut self, max: usize) -> Result<&'a [u8], ReadError> {
        let data: &'a [u8] = self.data;
        let rest = &data[self.pos..];
        let window = &rest[..max.min(rest.len())];
        match window.iter().position(|&b| b == 0) {
            Some(len) => {
                self.pos += len + 1;
                Ok(&window[..len])
            }
            None if window.len() < max => Err(ReadError::UnexpectedEof {
                needed: max,
                available: window.len(),
            }),
            None => Err(ReadError::MissingTerminator { max }),
        }
    }

    /// Read a null terminated UTF-8 string; see [`Reader::read_null_terminated`].
    pub fn read_null_string(&mut self, max: usize) -> Result<String, ReadError> {
        let start = self.pos;
        let bytes = self.read_null_terminated(max)?;
        decode(bytes).map_err(|err| {
            self.pos = start;
            err
        })
    }

    /// Read exactly `n` bytes as UTF-8 text, including any trailing terminator.
    pub fn read_fixed_string(&mut self, n: usize) -> Result<String, ReadError> {
        let start = self.pos;
        let bytes = self.read_bytes(n)?;
        decode(bytes).map_err(|err| {
            self.pos = start;
            err
        })
    }
}
