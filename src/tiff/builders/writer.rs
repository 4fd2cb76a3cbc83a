//! TIFF writing strategy
//!
//! Lays out a classic little-endian TIFF and streams it to any writer.
//! The layout is header, IFDs, external tag data, then strips, each block
//! aligned to 4 bytes. Strip offsets are only known once the layout is
//! computed, so they are patched in here.

use crate::tiff::constants::{header, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::utils::write_utils;
use super::{ExternalData, StripData};
use log::debug;
use std::collections::BTreeMap;
use std::io::Write;

/// Size of the classic TIFF header
const HEADER_SIZE: u64 = 8;

/// Largest offset a classic TIFF can address
const MAX_CLASSIC_OFFSET: u64 = u32::MAX as u64;

/// Handles writing TIFF files
pub struct WriterBuilder;

/// File positions of every block
struct Layout {
    ifd_offsets: Vec<u64>,
    external_offsets: BTreeMap<(usize, u16), u64>,
    strip_offsets: BTreeMap<usize, Vec<u64>>,
    total_size: u64,
}

impl WriterBuilder {
    /// Write a complete TIFF file
    pub fn write(
        ifds: &[IFD],
        strip_data: &StripData,
        external_data: &ExternalData,
        writer: &mut impl Write
    ) -> TiffResult<()> {
        let sorted_ifds = Self::prepare_sorted_ifds(ifds);
        let layout = Self::calculate_layout(&sorted_ifds, external_data, strip_data);

        if layout.total_size > MAX_CLASSIC_OFFSET {
            return Err(TiffError::GenericError(format!(
                "Raster of {} bytes exceeds the classic TIFF limit", layout.total_size
            )));
        }
        debug!("TIFF layout: {} IFDs, {} bytes", sorted_ifds.len(), layout.total_size);

        let external_data = Self::patch_strip_offsets(&sorted_ifds, external_data, &layout);

        Self::write_header(writer, layout.ifd_offsets.first().copied().unwrap_or(0))?;
        for (i, ifd) in sorted_ifds.iter().enumerate() {
            let next_offset = layout.ifd_offsets.get(i + 1).copied().unwrap_or(0);
            Self::write_ifd(writer, ifd, i, next_offset, &layout)?;
        }

        for data in external_data.values() {
            writer.write_all(data)?;
            write_utils::write_padding(writer, data.len())?;
        }

        for strips in strip_data.values() {
            for strip in strips {
                writer.write_all(strip)?;
                write_utils::write_padding(writer, strip.len())?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Prepare sorted IFDs with unique tags
    fn prepare_sorted_ifds(ifds: &[IFD]) -> Vec<IFD> {
        ifds.iter().map(|ifd| {
            let mut sorted_ifd = ifd.clone();
            sorted_ifd.entries = write_utils::get_unique_sorted_entries(&ifd.entries);
            sorted_ifd
        }).collect()
    }

    /// Size of an IFD including its next-IFD offset
    fn calculate_ifd_size(ifd: &IFD) -> u64 {
        2 + 12 * ifd.entries.len() as u64 + 4
    }

    /// Assign a file position to every IFD, external value and strip
    fn calculate_layout(sorted_ifds: &[IFD], external_data: &ExternalData, strip_data: &StripData) -> Layout {
        let mut current_offset = HEADER_SIZE;

        let mut ifd_offsets = Vec::with_capacity(sorted_ifds.len());
        for ifd in sorted_ifds {
            ifd_offsets.push(current_offset);
            current_offset = write_utils::align_to_4_bytes(current_offset + Self::calculate_ifd_size(ifd));
        }

        let mut external_offsets = BTreeMap::new();
        for (key, data) in external_data {
            external_offsets.insert(*key, current_offset);
            current_offset = write_utils::align_to_4_bytes(current_offset + data.len() as u64);
        }

        let mut strip_offsets = BTreeMap::new();
        for (ifd_index, strips) in strip_data {
            let mut offsets = Vec::with_capacity(strips.len());
            for strip in strips {
                offsets.push(current_offset);
                current_offset = write_utils::align_to_4_bytes(current_offset + strip.len() as u64);
            }
            strip_offsets.insert(*ifd_index, offsets);
        }

        Layout {
            ifd_offsets,
            external_offsets,
            strip_offsets,
            total_size: current_offset,
        }
    }

    /// Replace placeholder StripOffsets arrays with the computed offsets
    fn patch_strip_offsets(sorted_ifds: &[IFD], external_data: &ExternalData, layout: &Layout) -> ExternalData {
        let mut patched = external_data.clone();

        for (ifd_index, _) in sorted_ifds.iter().enumerate() {
            let key = (ifd_index, tags::STRIP_OFFSETS);
            if let (Some(data), Some(offsets)) = (patched.get_mut(&key), layout.strip_offsets.get(&ifd_index)) {
                *data = offsets.iter().flat_map(|&o| (o as u32).to_le_bytes()).collect();
            }
        }

        patched
    }

    /// Write the header with the first IFD offset
    fn write_header(writer: &mut impl Write, first_ifd_offset: u64) -> TiffResult<()> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;
        writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
        writer.write_all(&(first_ifd_offset as u32).to_le_bytes())?;
        Ok(())
    }

    /// Write one IFD, resolving external and strip offsets
    fn write_ifd(
        writer: &mut impl Write,
        ifd: &IFD,
        ifd_index: usize,
        next_offset: u64,
        layout: &Layout
    ) -> TiffResult<()> {
        writer.write_all(&(ifd.entries.len() as u16).to_le_bytes())?;

        for entry in &ifd.entries {
            let inline_strip = match layout.strip_offsets.get(&ifd_index) {
                Some(offsets) if entry.tag == tags::STRIP_OFFSETS && offsets.len() == 1 => Some(offsets[0]),
                _ => None,
            };

            let value_offset = inline_strip
                .or_else(|| layout.external_offsets.get(&(ifd_index, entry.tag)).copied())
                .unwrap_or(entry.value_offset);

            writer.write_all(&entry.tag.to_le_bytes())?;
            writer.write_all(&entry.field_type.to_le_bytes())?;
            writer.write_all(&(entry.count as u32).to_le_bytes())?;
            writer.write_all(&(value_offset as u32).to_le_bytes())?;
        }

        writer.write_all(&(next_offset as u32).to_le_bytes())?;
        write_utils::write_padding(writer, Self::calculate_ifd_size(ifd) as usize)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::ifd::IFDEntry;
    use crate::tiff::constants::field_types;

    fn strip_ifd(strips: usize) -> (Vec<IFD>, ExternalData, StripData) {
        let mut ifd = IFD::new(0, 0);
        let mut external = ExternalData::new();
        let mut strip_data = StripData::new();

        ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::LONG, 1, 1));
        crate::utils::tiff_utils::create_long_tag(
            &mut ifd, &mut external, 0, tags::STRIP_OFFSETS, &vec![0; strips]);
        strip_data.insert(0, (0..strips).map(|i| vec![i as u8; 5]).collect());
        (vec![ifd], external, strip_data)
    }

    #[test]
    fn test_single_strip_offset_is_inline() {
        let (ifds, external, strips) = strip_ifd(1);
        let mut out = Vec::new();
        WriterBuilder::write(&ifds, &strips, &external, &mut out).unwrap();

        // Header, then IFD with two entries: 8 + 2 + 24 + 4 = 38, aligned to 40
        assert_eq!(&out[..4], &[0x49, 0x49, 42, 0]);
        assert_eq!(u32::from_le_bytes([out[4], out[5], out[6], out[7]]), 8);
        let strip_entry = &out[10 + 12..10 + 24];
        assert_eq!(u32::from_le_bytes([strip_entry[8], strip_entry[9], strip_entry[10], strip_entry[11]]), 40);
        assert_eq!(&out[40..45], &[0u8; 5]);
        assert_eq!(out.len(), 48);
    }

    #[test]
    fn test_multi_strip_offsets_are_patched() {
        let (ifds, external, strips) = strip_ifd(3);
        let mut out = Vec::new();
        WriterBuilder::write(&ifds, &strips, &external, &mut out).unwrap();

        // Offsets array sits at 40 (12 bytes), strips start at 52 every 8 bytes
        let offsets: Vec<u32> = out[40..52]
            .chunks(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(offsets, vec![52, 60, 68]);
        assert_eq!(out[60], 1);
        assert_eq!(out[68], 2);
    }

    #[test]
    fn test_output_is_deterministic() {
        let (ifds, external, strips) = strip_ifd(2);
        let mut first = Vec::new();
        let mut second = Vec::new();
        WriterBuilder::write(&ifds, &strips, &external, &mut first).unwrap();
        WriterBuilder::write(&ifds, &strips, &external, &mut second).unwrap();
        assert_eq!(first, second);
    }
}
