//! TIFF utility functions
//!
//! Helpers for attaching tag data that does not fit inside an IFD entry.

use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::constants::field_types;
use crate::tiff::builders::ExternalData;

/// Create a tag entry whose values are stored outside the IFD
///
/// The entry's offset is a placeholder; the writer patches in the real file
/// offset of `data` once the layout is known.
pub fn create_external_tag(
    ifd: &mut IFD,
    external_data: &mut ExternalData,
    ifd_index: usize,
    tag: u16,
    field_type: u16,
    count: u64,
    data: Vec<u8>
) {
    ifd.add_entry(IFDEntry::new(tag, field_type, count, 0));
    external_data.insert((ifd_index, tag), data);
}

/// Store an array of doubles as an external DOUBLE tag
pub fn create_double_tag(
    ifd: &mut IFD,
    external_data: &mut ExternalData,
    ifd_index: usize,
    tag: u16,
    values: &[f64]
) {
    let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    create_external_tag(ifd, external_data, ifd_index, tag, field_types::DOUBLE, values.len() as u64, data);
}

/// Store a NUL-terminated ASCII tag, inline when it fits in four bytes
pub fn create_ascii_tag(
    ifd: &mut IFD,
    external_data: &mut ExternalData,
    ifd_index: usize,
    tag: u16,
    text: &str
) {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);

    if bytes.len() <= 4 {
        let mut packed = [0u8; 8];
        packed[..bytes.len()].copy_from_slice(&bytes);
        external_data.remove(&(ifd_index, tag));
        ifd.add_entry(IFDEntry::new(tag, field_types::ASCII, bytes.len() as u64, u64::from_le_bytes(packed)));
    } else {
        let count = bytes.len() as u64;
        create_external_tag(ifd, external_data, ifd_index, tag, field_types::ASCII, count, bytes);
    }
}

/// Store an array of SHORT values, inline when it fits in four bytes
pub fn create_short_tag(
    ifd: &mut IFD,
    external_data: &mut ExternalData,
    ifd_index: usize,
    tag: u16,
    values: &[u16]
) {
    if values.len() <= 2 {
        let mut packed = [0u8; 8];
        for (i, value) in values.iter().enumerate() {
            packed[i * 2..i * 2 + 2].copy_from_slice(&value.to_le_bytes());
        }
        external_data.remove(&(ifd_index, tag));
        ifd.add_entry(IFDEntry::new(tag, field_types::SHORT, values.len() as u64, u64::from_le_bytes(packed)));
    } else {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        create_external_tag(ifd, external_data, ifd_index, tag, field_types::SHORT, values.len() as u64, data);
    }
}

/// Store an array of LONG values, inline when a single value
pub fn create_long_tag(
    ifd: &mut IFD,
    external_data: &mut ExternalData,
    ifd_index: usize,
    tag: u16,
    values: &[u32]
) {
    if values.len() == 1 {
        external_data.remove(&(ifd_index, tag));
        ifd.add_entry(IFDEntry::new(tag, field_types::LONG, 1, values[0] as u64));
    } else {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        create_external_tag(ifd, external_data, ifd_index, tag, field_types::LONG, values.len() as u64, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::constants::tags;

    #[test]
    fn test_short_ascii_tag_is_inline() {
        let mut ifd = IFD::new(0, 0);
        let mut external = ExternalData::new();
        create_ascii_tag(&mut ifd, &mut external, 0, tags::GDAL_NODATA, "nan");

        let entry = ifd.get_entry(tags::GDAL_NODATA).unwrap();
        assert_eq!(entry.count, 4);
        assert!(external.is_empty());
        assert_eq!(&entry.value_offset.to_le_bytes()[..4], b"nan\0");
    }

    #[test]
    fn test_double_tag_is_external() {
        let mut ifd = IFD::new(0, 0);
        let mut external = ExternalData::new();
        create_double_tag(&mut ifd, &mut external, 0, tags::MODEL_PIXEL_SCALE_TAG, &[0.5, 0.25, 0.0]);

        assert_eq!(ifd.get_entry(tags::MODEL_PIXEL_SCALE_TAG).unwrap().count, 3);
        assert_eq!(external[&(0, tags::MODEL_PIXEL_SCALE_TAG)].len(), 24);
    }
}
