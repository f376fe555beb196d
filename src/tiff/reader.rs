//! TIFF/BigTIFF file reader
//!
//! A [`TiffReader`] owns its input and a single [`ByteCursor`]. Opening is
//! lazy: the header is parsed on first use, directories are discovered one
//! pointer at a time, and only the selected image's descriptor is cached.
//!
//! The reader moves through `Closed -> Opened -> DirectorySelected -> Reading`.
//! Any error leaves it in a consistent but possibly stale state; calling
//! [`TiffReader::close`] and setting the input again recovers.

use log::{debug, info};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::extractor::listener::{ReadListener, ReadStatus};
use crate::extractor::param::ReadParam;
use crate::extractor::pixel_copy;
use crate::extractor::raster::Raster;
use crate::extractor::tile_locator;
use crate::io::byte_order::ByteOrder;
use crate::io::cursor::ByteCursor;
use crate::io::seekable::SeekableReader;
use crate::tiff::config::ReaderConfig;
use crate::tiff::deferred::resolve_arrays;
use crate::tiff::descriptor::ImageDescriptor;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::header;
use crate::tiff::ifd::scan_directory;
use crate::tiff::types::{FileFormat, SampleKind};

/// Offsets of the directories discovered so far
#[derive(Debug)]
struct DirectoryIndex {
    offsets: Vec<u64>,
    seen: HashSet<u64>,
    /// Set once a zero next-directory pointer has been read
    complete: bool,
}

impl DirectoryIndex {
    fn new(first_offset: u64) -> Self {
        let mut index = DirectoryIndex { offsets: Vec::new(), seen: HashSet::new(), complete: first_offset == 0 };
        if first_offset != 0 {
            index.offsets.push(first_offset);
            index.seen.insert(first_offset);
        }
        index
    }

    /// Records the next pointer read from directory `from`
    ///
    /// Only the pointer of the last known directory extends the chain.
    fn record(&mut self, from: usize, next: u64, max_directories: usize) -> TiffResult<()> {
        if self.complete || from + 1 != self.offsets.len() {
            return Ok(());
        }

        if next == 0 {
            debug!("Directory chain ends after {} directories", self.offsets.len());
            self.complete = true;
            return Ok(());
        }

        if self.offsets.len() >= max_directories {
            return Err(TiffError::FormatError(format!(
                "Directory chain longer than {} entries",
                max_directories
            )));
        }
        if !self.seen.insert(next) {
            return Err(TiffError::FormatError(format!("Directory chain loops back to offset {}", next)));
        }

        debug!("Directory #{} at offset {}", self.offsets.len(), next);
        self.offsets.push(next);
        Ok(())
    }
}

/// State of an opened input
struct OpenFile<R> {
    cursor: ByteCursor<R>,
    format: FileFormat,
    index: DirectoryIndex,
    current: Option<(usize, ImageDescriptor)>,
}

enum State<R> {
    Closed,
    /// Input set but header not yet parsed
    Pending(R),
    Open(Box<OpenFile<R>>),
}

/// Reader for uncompressed, chunky TIFF and BigTIFF images
///
/// Only RGB photometric interpretation (2) is accepted. Grayscale files,
/// including single-band BlackIsZero (1), are refused with
/// [`TiffError::UnsupportedValue`] naming `photometricInterpretation`.
pub struct TiffReader<R> {
    config: ReaderConfig,
    state: State<R>,
    /// Cursor buffer kept across `close` for reuse
    spare_buffer: Vec<u8>,
}

impl<R> Default for TiffReader<R> {
    fn default() -> Self {
        Self::with_config(ReaderConfig::default())
    }
}

impl<R> TiffReader<R> {
    /// Creates a closed reader with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a closed reader
    pub fn with_config(config: ReaderConfig) -> Self {
        TiffReader { config, state: State::Closed, spare_buffer: Vec::new() }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl TiffReader<File> {
    /// Opens a file and parses its header
    ///
    /// # Arguments
    /// * `path` - Path to the TIFF or BigTIFF file
    /// * `config` - Reader configuration
    ///
    /// # Returns
    /// A reader positioned before the first directory, or the first error met
    pub fn open_path<P: AsRef<Path>>(path: P, config: ReaderConfig) -> TiffResult<Self> {
        info!("Opening TIFF file: {}", path.as_ref().display());
        let file = File::open(path)?;
        let mut reader = TiffReader::with_config(config);
        reader.set_input(file);
        reader.open()?;
        Ok(reader)
    }
}

impl<R: SeekableReader> TiffReader<R> {
    /// Creates a reader over `input` with the default configuration
    pub fn from_reader(input: R) -> Self {
        let mut reader = Self::new();
        reader.set_input(input);
        reader
    }

    /// Replaces the input, discarding every cached offset and descriptor
    pub fn set_input(&mut self, input: R) {
        self.close();
        self.state = State::Pending(input);
    }

    /// Releases the input and returns to the closed state
    ///
    /// The cursor buffer is kept and reused by the next input.
    pub fn close(&mut self) {
        if let State::Open(file) = std::mem::replace(&mut self.state, State::Closed) {
            let (_, buffer) = file.cursor.into_parts();
            self.spare_buffer = buffer;
        }
    }

    /// Parses the header on first use
    fn open(&mut self) -> TiffResult<&mut OpenFile<R>> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(file) => self.state = State::Open(file),
            State::Pending(input) => {
                let buffer = std::mem::take(&mut self.spare_buffer);
                let mut cursor = if buffer.len() >= self.config.buffer_capacity {
                    ByteCursor::with_buffer(input, buffer)
                } else {
                    ByteCursor::new(input, self.config.buffer_capacity)
                };

                let (format, first_offset) = header::read_header(&mut cursor)?;
                info!("Opened {} file, first directory at {}", format, first_offset);

                self.state = State::Open(Box::new(OpenFile {
                    cursor,
                    format,
                    index: DirectoryIndex::new(first_offset),
                    current: None,
                }));
            }
            State::Closed => return Err(TiffError::UnsupportedOperation("No input set".to_string())),
        }

        match &mut self.state {
            State::Open(file) => Ok(file.as_mut()),
            _ => Err(TiffError::UnsupportedOperation("No input set".to_string())),
        }
    }

    /// Whether the input uses 64-bit offsets
    pub fn is_big_tiff(&mut self) -> TiffResult<bool> {
        Ok(self.open()?.format.big_tiff)
    }

    /// Byte order declared by the header
    pub fn byte_order(&mut self) -> TiffResult<ByteOrder> {
        Ok(self.open()?.format.byte_order)
    }

    /// Number of images in the file
    ///
    /// With `allow_search` the whole directory chain is walked if needed.
    /// Without it, `None` is returned unless the chain end is already known.
    pub fn image_count(&mut self, allow_search: bool) -> TiffResult<Option<usize>> {
        let max_directories = self.config.max_directories;
        let file = self.open()?;

        if !file.index.complete && !allow_search {
            return Ok(None);
        }
        while !file.index.complete {
            file.walk_next(max_directories)?;
        }

        Ok(Some(file.index.offsets.len()))
    }

    /// Makes `index` the active image and returns its descriptor
    pub fn select_image(&mut self, index: usize) -> TiffResult<&ImageDescriptor> {
        let max_directories = self.config.max_directories;
        self.open()?.select(index, max_directories)
    }

    /// Descriptor of image `index`
    pub fn descriptor(&mut self, index: usize) -> TiffResult<&ImageDescriptor> {
        self.select_image(index)
    }

    pub fn width(&mut self, index: usize) -> TiffResult<u32> {
        Ok(self.select_image(index)?.width)
    }

    pub fn height(&mut self, index: usize) -> TiffResult<u32> {
        Ok(self.select_image(index)?.height)
    }

    pub fn tile_width(&mut self, index: usize) -> TiffResult<u32> {
        Ok(self.select_image(index)?.tile_width)
    }

    pub fn tile_height(&mut self, index: usize) -> TiffResult<u32> {
        Ok(self.select_image(index)?.tile_height)
    }

    pub fn sample_kind(&mut self, index: usize) -> TiffResult<SampleKind> {
        Ok(self.select_image(index)?.sample_kind)
    }

    pub fn band_count(&mut self, index: usize) -> TiffResult<u32> {
        Ok(self.select_image(index)?.samples_per_pixel)
    }

    /// Reads pixels of image `index` into a newly allocated raster
    ///
    /// An aborted read returns the partially filled raster.
    pub fn read<L: ReadListener + ?Sized>(
        &mut self,
        index: usize,
        param: &ReadParam,
        listener: &mut L,
    ) -> TiffResult<Raster> {
        let descriptor = self.select_image(index)?;
        let resolved = param.resolve(descriptor)?;
        let mut raster = Raster::allocate(
            resolved.dest_width,
            resolved.dest_height,
            descriptor.sample_kind,
            descriptor.samples_per_pixel,
        );

        self.read_into(index, param, &mut raster, listener)?;
        Ok(raster)
    }

    /// Reads pixels of image `index` into a caller-supplied raster
    ///
    /// The raster's size, band count and sample kind must match the request.
    pub fn read_into<L: ReadListener + ?Sized>(
        &mut self,
        index: usize,
        param: &ReadParam,
        raster: &mut Raster,
        listener: &mut L,
    ) -> TiffResult<ReadStatus> {
        let max_directories = self.config.max_directories;
        let file = self.open()?;
        file.select(index, max_directories)?;
        file.read_selected(param, raster, listener)
    }
}

impl<R: SeekableReader> OpenFile<R> {
    /// Reads the entry count of the directory at `offset`
    fn entry_count(&mut self, offset: u64) -> TiffResult<usize> {
        let count_size = self.format.count_size();
        self.cursor.ensure(offset, count_size, count_size)?;
        let count = if self.format.big_tiff {
            self.cursor.read_u64()?
        } else {
            self.cursor.read_u16()? as u64
        };

        usize::try_from(count)
            .ok()
            .filter(|count| count.checked_mul(self.format.entry_size()).is_some())
            .ok_or_else(|| TiffError::FormatError(format!("Directory at {} claims {} entries", offset, count)))
    }

    /// File offset just past the last entry of the directory at `offset`
    fn entries_end(&self, offset: u64, count: usize) -> TiffResult<u64> {
        u64::try_from(count * self.format.entry_size())
            .ok()
            .and_then(|len| len.checked_add(self.format.count_size() as u64))
            .and_then(|len| offset.checked_add(len))
            .ok_or_else(|| TiffError::FormatError(format!("Directory at {} claims {} entries", offset, count)))
    }

    /// Follows the next pointer of the last known directory
    fn walk_next(&mut self, max_directories: usize) -> TiffResult<()> {
        let last = self.index.offsets.len() - 1;
        let offset = self.index.offsets[last];

        let count = self.entry_count(offset)?;
        let word = self.format.word_size();
        let pointer_at = self.entries_end(offset, count)?;
        self.cursor.ensure(pointer_at, word, word)?;
        let next = self.cursor.read_word(self.format.big_tiff)?;

        self.index.record(last, next, max_directories)
    }

    /// Offset of directory `index`, walking the chain as far as needed
    fn directory_offset(&mut self, index: usize, max_directories: usize) -> TiffResult<u64> {
        while index >= self.index.offsets.len() {
            if self.index.complete {
                return Err(TiffError::IndexOutOfBounds {
                    what: "image",
                    index,
                    limit: self.index.offsets.len(),
                });
            }
            self.walk_next(max_directories)?;
        }

        Ok(self.index.offsets[index])
    }

    /// Parses a whole directory into a descriptor
    fn parse_directory(&mut self, offset: u64) -> TiffResult<ImageDescriptor> {
        let count = self.entry_count(offset)?;
        let entries_len = count * self.format.entry_size();
        debug!("Parsing directory at {} with {} entries", offset, count);

        // Fail on a count the input cannot hold before the window grows
        let entries_end = self.entries_end(offset, count)?;
        if entries_len > 0 {
            self.cursor.ensure(entries_end - 1, 1, 1)?;
        }
        self.cursor.ensure(entries_end - entries_len as u64, entries_len, entries_len)?;
        let (mut builder, deferred) = {
            let entries = self.cursor.read_bytes(entries_len)?;
            scan_directory(entries, &self.format)?
        };

        if !deferred.is_empty() {
            debug!("Resolving {} out-of-line arrays", deferred.len());
        }
        for (target, values) in resolve_arrays(&mut self.cursor, deferred)? {
            builder.set_array(target, values);
        }

        builder.build()
    }

    fn select(&mut self, index: usize, max_directories: usize) -> TiffResult<&ImageDescriptor> {
        let cached = matches!(&self.current, Some((selected, _)) if *selected == index);
        if !cached {
            let offset = self.directory_offset(index, max_directories)?;
            let descriptor = self.parse_directory(offset)?;
            debug!("Selected image #{}:\n{}", index, descriptor);
            return Ok(&self.current.insert((index, descriptor)).1);
        }

        match &self.current {
            Some((_, descriptor)) => Ok(descriptor),
            None => Err(TiffError::IndexOutOfBounds { what: "image", index, limit: self.index.offsets.len() }),
        }
    }

    /// Locates and copies the tiles of the selected image
    fn read_selected<L: ReadListener + ?Sized>(
        &mut self,
        param: &ReadParam,
        raster: &mut Raster,
        listener: &mut L,
    ) -> TiffResult<ReadStatus> {
        let Some((index, descriptor)) = &self.current else {
            return Err(TiffError::UnsupportedOperation("No image selected".to_string()));
        };

        let resolved = param.resolve(descriptor)?;
        if raster.width != resolved.dest_width || raster.height != resolved.dest_height {
            return Err(TiffError::UnsupportedOperation(format!(
                "Destination is {}x{}, read produces {}x{}",
                raster.width, raster.height, resolved.dest_width, resolved.dest_height
            )));
        }

        let tiles =
            tile_locator::locate(descriptor, &resolved.source, resolved.x_subsampling, resolved.y_subsampling)?;
        info!(
            "Reading image #{} region {}x{}+{}+{} subsampled {},{} into {}x{} ({} tiles)",
            index,
            resolved.source.width,
            resolved.source.height,
            resolved.source.x,
            resolved.source.y,
            resolved.x_subsampling,
            resolved.y_subsampling,
            resolved.dest_width,
            resolved.dest_height,
            tiles.len()
        );

        pixel_copy::copy_tiles(
            &mut self.cursor,
            descriptor,
            &tiles,
            resolved.x_subsampling,
            resolved.y_subsampling,
            raster,
            listener,
        )
    }
}
