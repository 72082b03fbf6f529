//! Sequential fixed-width writes into any [`std::io::Write`].

use std::io::{self, Write};

use crate::reader::Endian;

/// Writes integers and strings in a fixed byte order.
///
/// Each call hands its bytes straight to the destination; the first failing
/// write should abort whatever is being serialized.
#[derive(Debug)]
pub struct Writer<W> {
    dst: W,
    order: Endian,
    written: usize,
}

impl<W: Write> Writer<W> {
    /// Wrap `dst`.
    pub fn new(dst: W, order: Endian) -> Self {
        Writer {
            dst,
            order,
            written: 0,
        }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.written
    }

    /// Unwrap the destination.
    pub fn into_inner(self) -> W {
        self.dst
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.dst.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    /// Write one unsigned byte.
    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_bytes(&[value])
    }

    /// Write one signed byte.
    pub fn write_i8(&mut self, value: i8) -> io::Result<()> {
        self.write_bytes(&value.to_ne_bytes())
    }

    /// Write one byte of flags the caller already packed.
    pub fn write_bits(&mut self, bits: u8) -> io::Result<()> {
        self.write_u8(bits)
    }

    /// Write an unsigned 16-bit integer.
    pub fn write_u16(&mut self, value: u16) -> io::Result<()> {
        let raw = self.order.u16_to(value);
        self.write_bytes(&raw)
    }

    /// Write a signed 16-bit integer.
    pub fn write_i16(&mut self, value: i16) -> io::Result<()> {
        self.write_u16(u16::from_ne_bytes(value.to_ne_bytes()))
    }

    /// Write an unsigned 32-bit integer.
    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        let raw = self.order.u32_to(value);
        self.write_bytes(&raw)
    }

    /// Write a signed 32-bit integer.
    pub fn write_i32(&mut self, value: i32) -> io::Result<()> {
        self.write_u32(u32::from_ne_bytes(value.to_ne_bytes()))
    }

    /// Write the bytes of `s` without a terminator.
    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// Write the bytes of `s` followed by a single zero byte.
    pub fn write_null_str(&mut self, s: &str) -> io::Result<()> {
        self.write_str(s)?;
        self.write_u8(0)
    }
}
