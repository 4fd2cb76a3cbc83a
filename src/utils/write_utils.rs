//! TIFF writing utilities
//!
//! Alignment and tag ordering helpers used when the raster is laid out on
//! disk.

use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFDEntry;
use std::collections::HashSet;
use std::io::Write;

/// Align an offset to the next 4-byte boundary
pub fn align_to_4_bytes(offset: u64) -> u64 {
    let remainder = offset % 4;
    if remainder == 0 {
        offset
    } else {
        offset + (4 - remainder)
    }
}

/// Write the padding bytes that follow a block of `data_len` bytes
pub fn write_padding(writer: &mut impl Write, data_len: usize) -> TiffResult<()> {
    let padding = calculate_padding(data_len);
    if padding > 0 {
        writer.write_all(&vec![0u8; padding])?;
    }
    Ok(())
}

/// IFD entries sorted by tag with duplicates removed
///
/// TIFF readers expect ascending tag order and a single entry per tag. The
/// last occurrence of a duplicated tag wins.
pub fn get_unique_sorted_entries(entries: &[IFDEntry]) -> Vec<IFDEntry> {
    let mut unique_entries = Vec::new();
    let mut seen_tags = HashSet::new();

    for entry in entries.iter().rev() {
        if seen_tags.insert(entry.tag) {
            unique_entries.push(entry.clone());
        }
    }

    unique_entries.sort_by_key(|entry| entry.tag);
    unique_entries
}

/// Padding required to align `data_len` bytes to a 4-byte boundary
pub fn calculate_padding(data_len: usize) -> usize {
    (4 - (data_len % 4)) % 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        assert_eq!(align_to_4_bytes(8), 8);
        assert_eq!(align_to_4_bytes(9), 12);
        assert_eq!(calculate_padding(5), 3);
        assert_eq!(calculate_padding(16), 0);
    }

    #[test]
    fn test_unique_sorted_entries_keep_last() {
        let entries = vec![
            IFDEntry::new(259, 3, 1, 1),
            IFDEntry::new(256, 4, 1, 10),
            IFDEntry::new(259, 3, 1, 8),
        ];

        let sorted = get_unique_sorted_entries(&entries);
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].tag, 256);
        assert_eq!(sorted[1].value_offset, 8);
    }
}
