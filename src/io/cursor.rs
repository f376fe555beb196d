//! Refillable byte window over a seekable channel
//!
//! Directory parsing, deferred array loading and pixel copying all pull their
//! bytes through one [`ByteCursor`]. A request names a file offset and a
//! minimum byte count; bytes already buffered past that offset are kept and
//! moved to the front of the buffer instead of being read again.

use log::trace;
use std::io::{ErrorKind, SeekFrom};

use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};

/// Position-tracked byte window over a random-access channel
///
/// The window covers file offsets `origin..origin + valid`; the read head sits
/// somewhere inside it. A cursor has a single owner: every component that
/// needs bytes borrows it mutably for the duration of its work.
pub struct ByteCursor<R> {
    /// Underlying channel
    input: R,
    /// Backing storage, its length is the current capacity
    buffer: Vec<u8>,
    /// File offset of `buffer[0]`
    origin: u64,
    /// Number of valid bytes at the start of `buffer`
    valid: usize,
    /// Read head, relative to `origin`
    head: usize,
    /// Channel position if known, to skip redundant seeks
    stream_position: Option<u64>,
    /// Byte order used by the typed read helpers
    byte_order: ByteOrder,
}

impl<R: SeekableReader> ByteCursor<R> {
    /// Creates a cursor with a freshly allocated buffer of `capacity` bytes
    pub fn new(input: R, capacity: usize) -> Self {
        Self::with_buffer(input, vec![0u8; capacity.max(16)])
    }

    /// Creates a cursor reusing an existing buffer
    ///
    /// The buffer's current length is taken as the capacity; its contents are
    /// considered stale.
    pub fn with_buffer(input: R, mut buffer: Vec<u8>) -> Self {
        if buffer.len() < 16 {
            buffer.resize(16, 0);
        }
        ByteCursor {
            input,
            buffer,
            origin: 0,
            valid: 0,
            head: 0,
            stream_position: None,
            byte_order: ByteOrder::LittleEndian,
        }
    }

    /// Releases the channel and the buffer
    pub fn into_parts(self) -> (R, Vec<u8>) {
        (self.input, self.buffer)
    }

    /// Sets the byte order for subsequent typed reads
    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Byte order used for typed reads
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// File offset of the read head
    pub fn position(&self) -> u64 {
        self.origin + self.head as u64
    }

    /// Number of bytes available from the read head without a refill
    pub fn available(&self) -> usize {
        self.valid - self.head
    }

    /// Current buffer capacity in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Makes at least `min` bytes starting at file offset `position` available
    ///
    /// On return the read head is at `position`. Up to `max_hint` bytes may be
    /// fetched to serve later requests without another channel read. When
    /// `position` lies inside the current window the bytes from `position` on
    /// are kept; otherwise the window is discarded and the channel
    /// repositioned. The buffer grows if `min` exceeds its capacity.
    ///
    /// Fails with [`TiffError::EndOfStream`] if the channel ends first.
    pub fn ensure(&mut self, position: u64, min: usize, max_hint: usize) -> TiffResult<()> {
        let window_end = self.origin + self.valid as u64;

        if position >= self.origin && position <= window_end {
            let offset = (position - self.origin) as usize;
            if self.valid - offset >= min {
                self.head = offset;
                return Ok(());
            }

            trace!("Compacting cursor: keeping {} bytes from offset {}", self.valid - offset, position);
            self.buffer.copy_within(offset..self.valid, 0);
            self.valid -= offset;
        } else {
            trace!("Resetting cursor window to offset {}", position);
            self.valid = 0;
        }

        self.origin = position;
        self.head = 0;

        if min > self.buffer.len() {
            trace!("Growing cursor buffer from {} to {} bytes", self.buffer.len(), min);
            self.buffer.resize(min, 0);
        }

        let target = min.max(max_hint).min(self.buffer.len());
        self.fill(min, target)
    }

    /// Reads from the channel until `target` bytes are valid or it is exhausted
    fn fill(&mut self, min: usize, target: usize) -> TiffResult<()> {
        let fill_from = self.origin + self.valid as u64;
        if self.stream_position != Some(fill_from) {
            self.input.seek(SeekFrom::Start(fill_from))?;
            self.stream_position = Some(fill_from);
        }

        while self.valid < target {
            let count = match self.input.read(&mut self.buffer[self.valid..target]) {
                Ok(0) => break,
                Ok(count) => count,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.stream_position = None;
                    return Err(TiffError::IoError(e));
                }
            };
            self.valid += count;
        }
        self.stream_position = Some(self.origin + self.valid as u64);

        if self.valid < min {
            return Err(TiffError::EndOfStream {
                position: self.origin,
                needed: min,
                available: self.valid,
            });
        }

        Ok(())
    }

    /// Consumes `len` bytes from the read head
    pub fn read_bytes(&mut self, len: usize) -> TiffResult<&[u8]> {
        if len > self.available() {
            return Err(TiffError::EndOfStream {
                position: self.position(),
                needed: len,
                available: self.available(),
            });
        }
        let start = self.head;
        self.head += len;
        Ok(&self.buffer[start..start + len])
    }

    /// Returns the buffered bytes from the read head without consuming them
    pub fn peek(&self) -> &[u8] {
        &self.buffer[self.head..self.valid]
    }

    /// Advances the read head by `len` bytes
    pub fn skip(&mut self, len: usize) -> TiffResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Reads a u16 at the read head
    pub fn read_u16(&mut self) -> TiffResult<u16> {
        let order = self.byte_order;
        self.read_bytes(2).map(|b| order.read_u16(b))
    }

    /// Reads a u32 at the read head
    pub fn read_u32(&mut self) -> TiffResult<u32> {
        let order = self.byte_order;
        self.read_bytes(4).map(|b| order.read_u32(b))
    }

    /// Reads a u64 at the read head
    pub fn read_u64(&mut self) -> TiffResult<u64> {
        let order = self.byte_order;
        self.read_bytes(8).map(|b| order.read_u64(b))
    }

    /// Reads a 4-byte (classic) or 8-byte (BigTIFF) unsigned word
    pub fn read_word(&mut self, big_tiff: bool) -> TiffResult<u64> {
        if big_tiff {
            self.read_u64()
        } else {
            self.read_u32().map(u64::from)
        }
    }
}
