//! Byte codec: sticky-validity readers and writers for the wire format
//!
//! Every entity parses through a [`WireRead`] implementation. A reader's
//! validity flag drops to false on the first under-read and stays false; from
//! then on every read yields a default value, so a composite parse can run to
//! completion and inspect a single flag at the end instead of threading
//! errors through each field.
//!
//! Varint layout (CompactSize):
//! - value < 0xfd: single byte
//! - value <= 0xffff: 0xfd + 2 bytes little-endian
//! - value <= 0xffffffff: 0xfe + 4 bytes little-endian
//! - otherwise: 0xff + 8 bytes little-endian

use crate::config::WireLimits;
use crate::error::{Result, WireError};
use crate::types::{Hash, NULL_HASH};
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use log::{trace, warn};
use std::io::{self, Read, Write};

/// Number of bytes `value` occupies as a varint
pub fn varint_size(value: u64) -> usize {
    if value < 0xfd {
        1
    } else if value <= 0xffff {
        3
    } else if value <= 0xffff_ffff {
        5
    } else {
        9
    }
}

/// Encode `value` as a varint
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut writer = Writer::new(Vec::with_capacity(varint_size(value)));
    writer.write_varint(value);
    writer.into_inner()
}

/// Read side of the codec.
///
/// Implementors supply raw byte transfer and the validity flag; all typed
/// reads are provided and honour the sticky-failure contract.
pub trait WireRead {
    /// Fill `buf` entirely. Returns false if the source ran short.
    fn read_raw(&mut self, buf: &mut [u8]) -> bool;

    /// Read exactly `len` bytes into a new buffer, or `None` if the source ran short.
    fn read_raw_vec(&mut self, len: usize) -> Option<Vec<u8>>;

    /// False once any read has failed
    fn is_valid(&self) -> bool;

    /// Permanently mark the reader as failed
    fn invalidate(&mut self);

    /// Bytes consumed so far
    fn position(&self) -> usize;

    /// Limits applied to length-prefixed fields
    fn limits(&self) -> &WireLimits;

    fn read_array<const N: usize>(&mut self) -> [u8; N] {
        let mut buf = [0u8; N];
        if !self.is_valid() {
            return buf;
        }
        if !self.read_raw(&mut buf) {
            trace!("under-read of {} bytes at position {}", N, self.position());
            self.invalidate();
            return [0u8; N];
        }
        buf
    }

    fn read_u8(&mut self) -> u8 {
        self.read_array::<1>()[0]
    }

    fn read_u16_le(&mut self) -> u16 {
        LittleEndian::read_u16(&self.read_array::<2>())
    }

    fn read_u16_be(&mut self) -> u16 {
        BigEndian::read_u16(&self.read_array::<2>())
    }

    fn read_u32_le(&mut self) -> u32 {
        LittleEndian::read_u32(&self.read_array::<4>())
    }

    fn read_u64_le(&mut self) -> u64 {
        LittleEndian::read_u64(&self.read_array::<8>())
    }

    fn read_hash(&mut self) -> Hash {
        if !self.is_valid() {
            return NULL_HASH;
        }
        self.read_array::<32>()
    }

    /// Non-canonical encodings (e.g. 0xfd 0x01 0x00) are accepted.
    fn read_varint(&mut self) -> u64 {
        match self.read_u8() {
            0xfd => self.read_u16_le() as u64,
            0xfe => self.read_u32_le() as u64,
            0xff => self.read_u64_le(),
            n => n as u64,
        }
    }

    fn read_bytes(&mut self, len: usize) -> Vec<u8> {
        if !self.is_valid() {
            return Vec::new();
        }
        if len > self.limits().max_bytes_length {
            warn!(
                "byte field of {} exceeds limit of {}",
                len,
                self.limits().max_bytes_length
            );
            self.invalidate();
            return Vec::new();
        }
        match self.read_raw_vec(len) {
            Some(bytes) => bytes,
            None => {
                trace!("under-read of {} bytes at position {}", len, self.position());
                self.invalidate();
                Vec::new()
            }
        }
    }

    /// Varint length followed by that many bytes
    fn read_var_bytes(&mut self) -> Vec<u8> {
        let len = self.read_varint();
        match usize::try_from(len) {
            Ok(len) => self.read_bytes(len),
            Err(_) => {
                self.invalidate();
                Vec::new()
            }
        }
    }

    /// Varint length followed by UTF-8 text
    fn read_string(&mut self) -> String {
        let len = self.read_varint();
        if !self.is_valid() {
            return String::new();
        }
        let max = self.limits().max_string_length;
        if len > max as u64 {
            warn!("string field of {} exceeds limit of {}", len, max);
            self.invalidate();
            return String::new();
        }
        let bytes = self.read_bytes(len as usize);
        if !self.is_valid() {
            return String::new();
        }
        match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                trace!("invalid utf-8 text ending at position {}", self.position());
                self.invalidate();
                String::new()
            }
        }
    }
}

/// Reader over a materialized buffer
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    position: usize,
    valid: bool,
    limits: WireLimits,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, WireLimits::default())
    }

    pub fn with_limits(data: &'a [u8], limits: WireLimits) -> Self {
        Self {
            data,
            position: 0,
            valid: true,
            limits,
        }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl WireRead for SliceReader<'_> {
    fn read_raw(&mut self, buf: &mut [u8]) -> bool {
        if buf.len() > self.remaining() {
            return false;
        }
        let end = self.position + buf.len();
        buf.copy_from_slice(&self.data[self.position..end]);
        self.position = end;
        true
    }

    fn read_raw_vec(&mut self, len: usize) -> Option<Vec<u8>> {
        // Checked before allocating so a hostile length cannot force a large buffer.
        if len > self.remaining() {
            return None;
        }
        let end = self.position + len;
        let bytes = self.data[self.position..end].to_vec();
        self.position = end;
        Some(bytes)
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn invalidate(&mut self) {
        self.valid = false;
    }

    fn position(&self) -> usize {
        self.position
    }

    fn limits(&self) -> &WireLimits {
        &self.limits
    }
}

/// Reader over a byte stream, consumed strictly forward.
///
/// I/O errors are indistinguishable from a short stream.
#[derive(Debug)]
pub struct StreamReader<R: Read> {
    inner: R,
    position: usize,
    valid: bool,
    limits: WireLimits,
}

impl<R: Read> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limits(inner, WireLimits::default())
    }

    pub fn with_limits(inner: R, limits: WireLimits) -> Self {
        Self {
            inner,
            position: 0,
            valid: true,
            limits,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> WireRead for StreamReader<R> {
    /// Bytes taken from the stream count toward `position` even when the
    /// read comes up short.
    fn read_raw(&mut self, buf: &mut [u8]) -> bool {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        self.position += filled;
        filled == buf.len()
    }

    fn read_raw_vec(&mut self, len: usize) -> Option<Vec<u8>> {
        // Grows with the data actually delivered rather than the declared length.
        let mut bytes = Vec::new();
        let result = self
            .inner
            .by_ref()
            .take(len as u64)
            .read_to_end(&mut bytes);
        self.position += bytes.len();
        if result.is_err() || bytes.len() != len {
            return None;
        }
        Some(bytes)
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn invalidate(&mut self) {
        self.valid = false;
    }

    fn position(&self) -> usize {
        self.position
    }

    fn limits(&self) -> &WireLimits {
        &self.limits
    }
}

/// Writer with a sticky first I/O error.
///
/// Writes after a failure are skipped; the error surfaces from [`Writer::finish`].
/// Writing into a `Vec<u8>` never fails.
#[derive(Debug)]
pub struct Writer<W: Write> {
    inner: W,
    error: Option<io::Error>,
    written: usize,
}

impl<W: Write> Writer<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            error: None,
            written: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Bytes successfully written so far
    pub fn written(&self) -> usize {
        self.written
    }

    fn apply<F>(&mut self, len: usize, op: F)
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        if self.error.is_some() {
            return;
        }
        match op(&mut self.inner) {
            Ok(()) => self.written += len,
            Err(e) => self.error = Some(e),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.apply(1, |w| w.write_u8(value));
    }

    pub fn write_u16_le(&mut self, value: u16) {
        self.apply(2, |w| w.write_u16::<LittleEndian>(value));
    }

    pub fn write_u16_be(&mut self, value: u16) {
        self.apply(2, |w| w.write_u16::<BigEndian>(value));
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.apply(4, |w| w.write_u32::<LittleEndian>(value));
    }

    pub fn write_u64_le(&mut self, value: u64) {
        self.apply(8, |w| w.write_u64::<LittleEndian>(value));
    }

    pub fn write_hash(&mut self, hash: &Hash) {
        self.write_bytes(hash);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.apply(bytes.len(), |w| w.write_all(bytes));
    }

    pub fn write_varint(&mut self, value: u64) {
        if value < 0xfd {
            self.write_u8(value as u8);
        } else if value <= 0xffff {
            self.write_u8(0xfd);
            self.write_u16_le(value as u16);
        } else if value <= 0xffff_ffff {
            self.write_u8(0xfe);
            self.write_u32_le(value as u32);
        } else {
            self.write_u8(0xff);
            self.write_u64_le(value);
        }
    }

    /// Varint length followed by the bytes
    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    /// Varint length followed by the UTF-8 bytes
    pub fn write_string(&mut self, text: &str) {
        self.write_var_bytes(text.as_bytes());
    }

    /// Return the sink, discarding any recorded error.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Flush and return the sink, or the first error encountered.
    pub fn finish(mut self) -> Result<W> {
        if let Some(e) = self.error.take() {
            return Err(WireError::Io(e));
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}
