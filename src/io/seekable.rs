//! Seekable reader trait and implementations
//!
//! This module provides a unified trait for the random-access channels
//! the TIFF reader pulls bytes from.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
///
/// Files, in-memory cursors and anything else that supports positioned reads
/// can back a [`ByteCursor`](crate::io::cursor::ByteCursor).
pub trait SeekableReader: Read + Seek {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek> SeekableReader for T {}
