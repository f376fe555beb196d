//! I/O utilities for file handling
//!
//! This module provides the byte-order aware decoding helpers and the
//! refillable byte window every other component reads through.

pub mod seekable;
pub mod byte_order;
pub mod cursor;
