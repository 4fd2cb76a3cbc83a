//! Basic TIFF tag strategies
//!
//! Structure tags for a single-band Float32 image and its strip layout.

use crate::compression::CompressionHandler;
use crate::tiff::constants::{tags, field_types, photometric, planar_config, sample_format};
use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::utils::tiff_utils;
use super::{ExternalData, StripData};
use log::{debug, info};

/// Target uncompressed strip size, as used by libtiff
const STRIP_TARGET_BYTES: usize = 8192;

/// Adds basic TIFF tags to an IFD
pub struct BasicTagsBuilder;

impl BasicTagsBuilder {
    /// Add the tags describing a single-band 32-bit float image
    pub fn add_float_gray_tags(ifd: &mut IFD, width: u32, height: u32) {
        info!("Adding Float32 grayscale tags for {}x{} image", width, height);

        ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::LONG, 1, width as u64));
        ifd.add_entry(IFDEntry::new(tags::IMAGE_LENGTH, field_types::LONG, 1, height as u64));
        ifd.add_entry(IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 1, 32));
        ifd.add_entry(IFDEntry::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            field_types::SHORT,
            1,
            photometric::BLACK_IS_ZERO as u64)
        );
        ifd.add_entry(IFDEntry::new(tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1, 1));
        ifd.add_entry(IFDEntry::new(
            tags::PLANAR_CONFIGURATION,
            field_types::SHORT,
            1,
            planar_config::CHUNKY as u64)
        );
        ifd.add_entry(IFDEntry::new(
            tags::SAMPLE_FORMAT,
            field_types::SHORT,
            1,
            sample_format::IEEEFP as u64)
        );
    }

    /// Rows per strip for a row of `row_bytes` bytes
    pub fn rows_per_strip(row_bytes: usize, height: u32) -> u32 {
        let rows = (STRIP_TARGET_BYTES / row_bytes.max(1)).max(1) as u32;
        rows.min(height.max(1))
    }

    /// Split row-major Float32 samples into compressed strips
    ///
    /// Sets Compression, RowsPerStrip, StripByteCounts and a StripOffsets
    /// entry whose values the writer fills in once the layout is known.
    pub fn setup_float_strips(
        ifd: &mut IFD,
        external_data: &mut ExternalData,
        strip_data: &mut StripData,
        ifd_index: usize,
        samples: &[f32],
        width: u32,
        codec: &dyn CompressionHandler
    ) -> TiffResult<()> {
        let row_bytes = width as usize * 4;
        let height = if width == 0 { 0 } else { (samples.len() / width as usize) as u32 };
        let rows_per_strip = Self::rows_per_strip(row_bytes, height);

        let mut strips = Vec::new();
        for chunk in samples.chunks(rows_per_strip as usize * width.max(1) as usize) {
            let raw: Vec<u8> = chunk.iter().flat_map(|v| v.to_le_bytes()).collect();
            strips.push(codec.compress(&raw)?);
        }

        debug!("Encoded {} strips of {} rows with {} compression",
               strips.len(), rows_per_strip, codec.name());

        ifd.add_entry(IFDEntry::new(tags::COMPRESSION, field_types::SHORT, 1, codec.code() as u64));
        ifd.add_entry(IFDEntry::new(tags::ROWS_PER_STRIP, field_types::LONG, 1, rows_per_strip as u64));

        let byte_counts: Vec<u32> = strips.iter().map(|s| s.len() as u32).collect();
        tiff_utils::create_long_tag(ifd, external_data, ifd_index, tags::STRIP_BYTE_COUNTS, &byte_counts);

        // Placeholder offsets, patched by the writer
        let placeholder = vec![0u32; strips.len()];
        tiff_utils::create_long_tag(ifd, external_data, ifd_index, tags::STRIP_OFFSETS, &placeholder);

        strip_data.insert(ifd_index, strips);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::UncompressedHandler;

    #[test]
    fn test_rows_per_strip() {
        // 4 bytes per pixel, 1024 pixels per row: two rows per 8 KiB strip
        assert_eq!(BasicTagsBuilder::rows_per_strip(4096, 100), 2);
        // Tiny rasters use a single strip
        assert_eq!(BasicTagsBuilder::rows_per_strip(16, 4), 4);
        // Rows wider than the target still get one row per strip
        assert_eq!(BasicTagsBuilder::rows_per_strip(100_000, 10), 1);
    }

    #[test]
    fn test_strip_tags() {
        let mut ifd = IFD::new(0, 0);
        let mut external = ExternalData::new();
        let mut strips = StripData::new();
        let samples = vec![1.0f32; 3000 * 4];

        BasicTagsBuilder::add_float_gray_tags(&mut ifd, 3000, 4);
        BasicTagsBuilder::setup_float_strips(
            &mut ifd, &mut external, &mut strips, 0, &samples, 3000, &UncompressedHandler
        ).unwrap();

        // 12000 bytes per row: one row per strip
        assert_eq!(strips[&0].len(), 4);
        assert_eq!(ifd.get_entry(tags::STRIP_OFFSETS).unwrap().count, 4);
        assert_eq!(external[&(0, tags::STRIP_BYTE_COUNTS)].len(), 16);
        assert_eq!(ifd.get_tag_value(tags::SAMPLE_FORMAT), Some(3));
    }
}
