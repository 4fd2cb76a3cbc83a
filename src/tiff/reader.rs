//! TIFF file reader implementation
//!
//! Reads TIFF and BigTIFF files back from disk, using the Strategy pattern
//! for the two byte orders. Besides the IFD structure it decodes the tag
//! arrays and the single Float32 band that the grid writer produces.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, Cursor, SeekFrom};
use std::path::{Path, PathBuf};

use crate::compression::CompressionFactory;
use crate::io::seekable::SeekableReader;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler, LittleEndianHandler};
use crate::tiff::constants::{field_types, planar_config, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::tag_utils;

/// Upper bound on the IFD chain length, guarding against offset loops
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Byte order of the current file
    byte_order: ByteOrder,
    /// Current file path
    current_file: Option<PathBuf>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            byte_order: ByteOrder::default(),
            current_file: None,
            is_big_tiff: false,
        }
    }

    /// Opens the current file for reading
    pub(crate) fn create_reader(&self) -> TiffResult<BufReader<File>> {
        match &self.current_file {
            Some(path) => Ok(BufReader::new(File::open(path)?)),
            None => Err(TiffError::GenericError("No file path specified".to_string()))
        }
    }

    /// Returns the byte order handler, failing if no header has been read
    fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Loads a TIFF file from the given path
    pub fn load(&mut self, filepath: &Path) -> TiffResult<TIFF> {
        info!("Loading TIFF file: {}", filepath.display());
        self.current_file = Some(filepath.to_path_buf());

        let file = File::open(filepath)?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file); // 1MB buffer

        self.read(&mut reader)
    }

    /// Reads a TIFF file from the given reader
    ///
    /// Detects the byte order, checks for the BigTIFF variant and walks the
    /// IFD chain.
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        debug!("Reader::read starting");

        self.byte_order = format_utils::detect_byte_order(reader)?;
        let handler = self.byte_order.create_handler();

        let (is_big_tiff, _) = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        self.is_big_tiff = is_big_tiff;

        let first_ifd_offset = ifd_utils::read_ifd_offset(reader, is_big_tiff, handler.as_ref())?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        self.byte_order_handler = Some(handler);

        let mut tiff = TIFF::new(self.is_big_tiff, self.byte_order);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        info!("Read {} IFDs from TIFF file", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    fn read_ifd_chain(
        &self,
        reader: &mut dyn SeekableReader,
        first_ifd_offset: u64,
        file_size: u64
    ) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;
        let handler = self.handler()?;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            debug!("Reading IFD at offset: {}", ifd_offset);

            // The first IFD must be readable; later ones end the chain on error
            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if ifds.is_empty() => return Err(e),
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
            };

            let next_offset_position = ifd_offset + ifd_utils::calculate_ifd_size(&ifd, self.is_big_tiff);
            reader.seek(SeekFrom::Start(next_offset_position))?;
            let next_ifd_offset = ifd_utils::read_ifd_offset(reader, self.is_big_tiff, handler)?;
            debug!("Next IFD offset: {}", next_ifd_offset);

            ifds.push(ifd);

            if next_ifd_offset != 0 && validation::validate_ifd_offset(next_ifd_offset, file_size).is_err() {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }
            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads the IFD stored at `offset`
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let handler = self.handler()?;
        let entry_count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };
        debug!("IFD entry count: {}", entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            ifd.add_entry(self.read_ifd_entry(reader)?);
        }

        Ok(ifd)
    }

    /// Reads a single IFD entry
    ///
    /// Inline values are stored in canonical little-endian element order;
    /// external offsets are decoded with the file's byte order.
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let field_size = if self.is_big_tiff { 8 } else { 4 };
        let mut raw = [0u8; 8];
        reader.read_exact(&mut raw[..field_size])?;

        let mut entry = IFDEntry::new(tag, field_type, count, 0);
        entry.value_offset = if entry.is_inline(self.is_big_tiff) {
            tag_utils::canonical_inline_value(&raw[..field_size], entry.get_field_type_size(), self.byte_order)
        } else {
            let mut field = Cursor::new(&raw[..field_size]);
            ifd_utils::read_ifd_offset(&mut field, self.is_big_tiff, handler)?
        };

        Ok(entry)
    }

    /// Reads a tag's integer values, inline or external
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        if entry.is_inline(self.is_big_tiff) {
            return tag_utils::inline_values(entry, self.is_big_tiff);
        }

        self.check_range(reader, entry)?;
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let mut values = Vec::with_capacity(entry.count as usize);
        tag_utils::read_tag_value_array(reader, entry, self.handler()?, &mut values)?;
        Ok(values)
    }

    /// Reads a DOUBLE tag such as ModelPixelScale or ModelTiepoint
    pub fn read_f64_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        if entry.field_type != field_types::DOUBLE {
            return Err(TiffError::UnsupportedFieldType(entry.field_type));
        }

        if entry.is_inline(self.is_big_tiff) {
            // Only a single BigTIFF double fits inline
            let bytes = tag_utils::inline_bytes(entry, self.is_big_tiff);
            let mut cursor = Cursor::new(bytes);
            return Ok(vec![LittleEndianHandler.read_f64(&mut cursor)?]);
        }

        self.check_range(reader, entry)?;
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let handler = self.handler()?;
        (0..entry.count)
            .map(|_| handler.read_f64(reader).map_err(TiffError::from))
            .collect()
    }

    /// Reads an ASCII tag, with trailing NUL bytes removed
    pub fn read_ascii(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<String> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        let mut buffer = if entry.is_inline(self.is_big_tiff) {
            let mut bytes = tag_utils::inline_bytes(entry, self.is_big_tiff);
            bytes.truncate(entry.count as usize);
            bytes
        } else {
            self.check_range(reader, entry)?;
            reader.seek(SeekFrom::Start(entry.value_offset))?;
            let mut bytes = vec![0u8; entry.count as usize];
            reader.read_exact(&mut bytes)?;
            bytes
        };

        while buffer.last() == Some(&0) {
            buffer.pop();
        }

        String::from_utf8(buffer)
            .map_err(|e| TiffError::GenericError(format!("Invalid UTF-8 string: {}", e)))
    }

    /// Decodes the single Float32 band of an IFD in row-major order
    ///
    /// Strips may be uncompressed, deflate or zstd compressed. Tiled and
    /// multi-sample layouts are rejected.
    pub fn read_band_f32(&self, reader: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<Vec<f32>> {
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;

        if ifd.get_samples_per_pixel() != 1 {
            return Err(TiffError::UnsupportedLayout(format!(
                "{} samples per pixel", ifd.get_samples_per_pixel()
            )));
        }
        if ifd.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(planar_config::CHUNKY as u64)
            != planar_config::CHUNKY as u64 {
            return Err(TiffError::UnsupportedLayout("planar configuration".to_string()));
        }
        let format = ifd.get_tag_value(tags::SAMPLE_FORMAT).unwrap_or(1);
        let bits = self.read_tag_values(reader, ifd, tags::BITS_PER_SAMPLE)?;
        if format != sample_format::IEEEFP as u64 || bits.first() != Some(&32) {
            return Err(TiffError::UnsupportedLayout(format!(
                "sample format {} with {:?} bits", format, bits
            )));
        }
        if !ifd.has_tag(tags::STRIP_OFFSETS) {
            return Err(TiffError::UnsupportedLayout("raster is not stored in strips".to_string()));
        }

        let offsets = self.read_tag_values(reader, ifd, tags::STRIP_OFFSETS)?;
        let byte_counts = self.read_tag_values(reader, ifd, tags::STRIP_BYTE_COUNTS)?;
        if offsets.len() != byte_counts.len() {
            return Err(TiffError::GenericError(format!(
                "{} strip offsets but {} byte counts", offsets.len(), byte_counts.len()
            )));
        }

        let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1);
        let codec = CompressionFactory::create_handler(compression)?;
        debug!("Decoding {} strips with {} compression", offsets.len(), codec.name());

        let file_size = validation::get_file_size(reader)?;
        let mut raw = Vec::with_capacity((width * height * 4) as usize);
        for (&offset, &count) in offsets.iter().zip(byte_counts.iter()) {
            validation::validate_data_range(offset, count, file_size)?;
            reader.seek(SeekFrom::Start(offset))?;
            let mut strip = vec![0u8; count as usize];
            reader.read_exact(&mut strip)?;
            raw.extend(codec.decompress(&strip)?);
        }

        let pixel_count = (width * height) as usize;
        if raw.len() < pixel_count * 4 {
            return Err(TiffError::GenericError(format!(
                "Band holds {} bytes, expected {}", raw.len(), pixel_count * 4
            )));
        }

        let mut samples: &[u8] = &raw[..pixel_count * 4];
        Ok(self.handler()?.read_f32_vec(&mut samples, pixel_count)?)
    }

    /// Fails when an entry's external values lie outside the file
    fn check_range(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<()> {
        let file_size = validation::get_file_size(reader)?;
        validation::validate_data_range(entry.value_offset, entry.data_size(), file_size)
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }
}
