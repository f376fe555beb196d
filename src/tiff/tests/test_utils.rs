//! In-memory TIFF/BigTIFF writer for tests
//!
//! Lays files out as header, then per directory: pixel blocks, the directory
//! itself, and any array values too long for the inline slot.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian, WriteBytesExt};
use std::io::Cursor;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{field_types, tags};
use crate::tiff::types::FileFormat;

/// One directory entry to be written
#[derive(Debug, Clone)]
pub struct TestEntry {
    pub tag: u16,
    pub field_type: u16,
    pub values: Vec<u64>,
}

impl TestEntry {
    pub fn new(tag: u16, field_type: u16, values: Vec<u64>) -> Self {
        TestEntry { tag, field_type, values }
    }

    pub fn short(tag: u16, value: u64) -> Self {
        TestEntry::new(tag, field_types::SHORT, vec![value])
    }

    pub fn long(tag: u16, value: u64) -> Self {
        TestEntry::new(tag, field_types::LONG, vec![value])
    }
}

/// A directory plus the pixel blocks its offsets array points at
#[derive(Debug, Clone)]
pub struct TestDirectory {
    pub entries: Vec<TestEntry>,
    pub blocks: Vec<Vec<u8>>,
    /// Tag that receives the block offsets, none to leave them out
    pub offsets_tag: Option<u16>,
}

impl TestDirectory {
    pub fn without_entry(mut self, tag: u16) -> Self {
        self.entries.retain(|e| e.tag != tag);
        self
    }

    pub fn without_offsets(mut self) -> Self {
        self.offsets_tag = None;
        self
    }

    pub fn with_entry(mut self, entry: TestEntry) -> Self {
        self.entries.retain(|e| e.tag != entry.tag);
        self.entries.push(entry);
        self
    }
}

/// Encodes a value with the given byte order, truncated to `size` bytes
fn put(out: &mut Vec<u8>, order: ByteOrder, size: usize, value: u64) {
    match (order, size) {
        (_, 1) => out.write_u8(value as u8),
        (ByteOrder::LittleEndian, 2) => out.write_u16::<LittleEndian>(value as u16),
        (ByteOrder::BigEndian, 2) => out.write_u16::<BigEndian>(value as u16),
        (ByteOrder::LittleEndian, 4) => out.write_u32::<LittleEndian>(value as u32),
        (ByteOrder::BigEndian, 4) => out.write_u32::<BigEndian>(value as u32),
        (ByteOrder::LittleEndian, _) => out.write_u64::<LittleEndian>(value),
        (ByteOrder::BigEndian, _) => out.write_u64::<BigEndian>(value),
    }
    .unwrap();
}

/// Overwrites a word previously written at `at`
fn patch(out: &mut [u8], order: ByteOrder, big_tiff: bool, at: usize, value: u64) {
    match (order, big_tiff) {
        (ByteOrder::LittleEndian, false) => LittleEndian::write_u32(&mut out[at..at + 4], value as u32),
        (ByteOrder::BigEndian, false) => BigEndian::write_u32(&mut out[at..at + 4], value as u32),
        (ByteOrder::LittleEndian, true) => LittleEndian::write_u64(&mut out[at..at + 8], value),
        (ByteOrder::BigEndian, true) => BigEndian::write_u64(&mut out[at..at + 8], value),
    }
}

fn field_size(field_type: u16) -> usize {
    match field_type {
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT | field_types::IFD => 4,
        field_types::LONG8 | field_types::SLONG8 | field_types::DOUBLE | field_types::IFD8 => 8,
        _ => 1,
    }
}

/// Serializes `directories` into a complete file
pub fn write_tiff(format: FileFormat, directories: &[TestDirectory]) -> Vec<u8> {
    let order = format.byte_order;
    let word = format.word_size();
    let mut out = Vec::new();

    let marker = match order {
        ByteOrder::LittleEndian => *b"II",
        ByteOrder::BigEndian => *b"MM",
    };
    out.extend_from_slice(&marker);
    if format.big_tiff {
        put(&mut out, order, 2, 43);
        put(&mut out, order, 2, 8);
        put(&mut out, order, 2, 0);
    } else {
        put(&mut out, order, 2, 42);
    }
    let mut pointer_at = out.len();
    put(&mut out, order, word, 0);

    for directory in directories {
        let mut positions = Vec::new();
        for block in &directory.blocks {
            positions.push(out.len() as u64);
            out.extend_from_slice(block);
        }

        let offsets_type = if format.big_tiff { field_types::LONG8 } else { field_types::LONG };
        let mut entries = directory.entries.clone();
        if let Some(tag) = directory.offsets_tag {
            entries.push(TestEntry::new(tag, offsets_type, positions));
        }
        entries.sort_by_key(|e| e.tag);

        if out.len() % 2 == 1 {
            out.push(0);
        }
        let directory_at = out.len();
        patch(&mut out, order, format.big_tiff, pointer_at, directory_at as u64);

        let mut overflow_at = directory_at + format.count_size() + entries.len() * format.entry_size() + word;
        let mut overflow = Vec::new();

        put(&mut out, order, format.count_size(), entries.len() as u64);
        for entry in &entries {
            let size = field_size(entry.field_type);
            let mut value_bytes = Vec::new();
            for &value in &entry.values {
                put(&mut value_bytes, order, size, value);
            }

            put(&mut out, order, 2, entry.tag as u64);
            put(&mut out, order, 2, entry.field_type as u64);
            put(&mut out, order, word, entry.values.len() as u64);
            if value_bytes.len() <= word {
                value_bytes.resize(word, 0);
                out.extend_from_slice(&value_bytes);
            } else {
                put(&mut out, order, word, overflow_at as u64);
                overflow_at += value_bytes.len();
                overflow.extend_from_slice(&value_bytes);
            }
        }

        pointer_at = out.len();
        put(&mut out, order, word, 0);
        out.extend_from_slice(&overflow);
    }

    out
}

/// Splits an image into row-major blocks of `block_width` x `block_height`
///
/// Tiles are padded to full size; strips (`pad == false`) are cut at the
/// image bottom.
#[allow(clippy::too_many_arguments)]
pub fn blocks(
    width: u32,
    height: u32,
    block_width: u32,
    block_height: u32,
    bands: u32,
    sample_size: usize,
    order: ByteOrder,
    pad: bool,
    value: impl Fn(u32, u32, u32) -> u64,
) -> Vec<Vec<u8>> {
    let mut result = Vec::new();
    for by in (0..height).step_by(block_height as usize) {
        for bx in (0..width).step_by(block_width as usize) {
            let rows = if pad { block_height } else { block_height.min(height - by) };
            let mut block = Vec::new();
            for y in by..by + rows {
                for x in bx..bx + block_width {
                    for band in 0..bands {
                        let sample = if x < width && y < height { value(x, y, band) } else { 0 };
                        put(&mut block, order, sample_size, sample);
                    }
                }
            }
            result.push(block);
        }
    }
    result
}

/// Uncompressed chunky tiled directory with one entry per mandatory tag
#[allow(clippy::too_many_arguments)]
pub fn tiled_directory(
    format: FileFormat,
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    bands: u32,
    bits: u16,
    value: impl Fn(u32, u32, u32) -> u64,
) -> TestDirectory {
    let sample_size = bits as usize / 8;
    TestDirectory {
        entries: vec![
            TestEntry::long(tags::IMAGE_WIDTH, width as u64),
            TestEntry::long(tags::IMAGE_LENGTH, height as u64),
            TestEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, vec![bits as u64; bands as usize]),
            TestEntry::short(tags::COMPRESSION, 1),
            TestEntry::short(tags::PHOTOMETRIC_INTERPRETATION, 2),
            TestEntry::short(tags::SAMPLES_PER_PIXEL, bands as u64),
            TestEntry::short(tags::PLANAR_CONFIGURATION, 1),
            TestEntry::short(tags::TILE_WIDTH, tile_width as u64),
            TestEntry::short(tags::TILE_LENGTH, tile_height as u64),
        ],
        blocks: blocks(width, height, tile_width, tile_height, bands, sample_size, format.byte_order, true, value),
        offsets_tag: Some(tags::TILE_OFFSETS),
    }
}

/// Stripped variant of [`tiled_directory`]
pub fn stripped_directory(
    format: FileFormat,
    width: u32,
    height: u32,
    rows_per_strip: u32,
    bands: u32,
    value: impl Fn(u32, u32, u32) -> u64,
) -> TestDirectory {
    TestDirectory {
        entries: vec![
            TestEntry::long(tags::IMAGE_WIDTH, width as u64),
            TestEntry::long(tags::IMAGE_LENGTH, height as u64),
            TestEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, vec![8; bands as usize]),
            TestEntry::short(tags::COMPRESSION, 1),
            TestEntry::short(tags::PHOTOMETRIC_INTERPRETATION, 2),
            TestEntry::short(tags::SAMPLES_PER_PIXEL, bands as u64),
            TestEntry::long(tags::ROWS_PER_STRIP, rows_per_strip as u64),
        ],
        blocks: blocks(width, height, width, rows_per_strip, bands, 1, format.byte_order, false, value),
        offsets_tag: Some(tags::STRIP_OFFSETS),
    }
}

/// Opens the bytes as an in-memory reader input
pub fn input(bytes: Vec<u8>) -> Cursor<Vec<u8>> {
    Cursor::new(bytes)
}

/// All four combinations of variant and byte order
pub fn all_formats() -> [FileFormat; 4] {
    [
        FileFormat::new(false, ByteOrder::LittleEndian),
        FileFormat::new(false, ByteOrder::BigEndian),
        FileFormat::new(true, ByteOrder::LittleEndian),
        FileFormat::new(true, ByteOrder::BigEndian),
    ]
}
