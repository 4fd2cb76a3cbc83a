//! TIFF tag utilities
//!
//! Value decoding and human-readable names for the tags the raster writer
//! emits.

use byteorder::ReadBytesExt;
use std::io::Cursor;

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler, LittleEndianHandler};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFDEntry;
use crate::tiff::constants::{field_types, tags};

/// Reads an array of integer tag values based on the field type
pub fn read_tag_value_array(
    reader: &mut dyn SeekableReader,
    entry: &IFDEntry,
    handler: &dyn ByteOrderHandler,
    values: &mut Vec<u64>
) -> TiffResult<()> {
    for _ in 0..entry.count {
        let value = match entry.field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => reader.read_u8()? as u64,
            field_types::SHORT | field_types::SSHORT => handler.read_u16(reader)? as u64,
            field_types::LONG | field_types::SLONG => handler.read_u32(reader)? as u64,
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => handler.read_u64(reader)?,
            _ => return Err(TiffError::UnsupportedFieldType(entry.field_type)),
        };

        values.push(value);
    }

    Ok(())
}

/// Re-packs a raw inline value field into little-endian element order
///
/// IFD entries keep inline values in this canonical form whatever the file's
/// byte order, so a single SHORT or LONG can be read straight from
/// `value_offset`.
pub fn canonical_inline_value(raw: &[u8], element_size: usize, byte_order: ByteOrder) -> u64 {
    let mut bytes = [0u8; 8];
    let len = raw.len().min(8);
    bytes[..len].copy_from_slice(&raw[..len]);

    if byte_order == ByteOrder::BigEndian && element_size > 1 {
        for element in bytes[..len].chunks_mut(element_size) {
            element.reverse();
        }
    }

    u64::from_le_bytes(bytes)
}

/// Bytes of an entry's inline value field
pub fn inline_bytes(entry: &IFDEntry, is_big_tiff: bool) -> Vec<u8> {
    let field_size = if is_big_tiff { 8 } else { 4 };
    entry.value_offset.to_le_bytes()[..field_size].to_vec()
}

/// Decodes integer values stored inline in an entry's value field
pub fn inline_values(entry: &IFDEntry, is_big_tiff: bool) -> TiffResult<Vec<u64>> {
    let mut cursor = Cursor::new(inline_bytes(entry, is_big_tiff));
    let mut values = Vec::with_capacity(entry.count as usize);
    read_tag_value_array(&mut cursor, entry, &LittleEndianHandler, &mut values)?;
    Ok(values)
}

/// Get the name of a TIFF tag
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::SOFTWARE => "Software",
        tags::SAMPLE_FORMAT => "SampleFormat",
        tags::MODEL_PIXEL_SCALE_TAG => "ModelPixelScale",
        tags::MODEL_TIEPOINT_TAG => "ModelTiepoint",
        tags::GEO_KEY_DIRECTORY_TAG => "GeoKeyDirectory",
        tags::GEO_DOUBLE_PARAMS_TAG => "GeoDoubleParams",
        tags::GEO_ASCII_PARAMS_TAG => "GeoAsciiParams",
        tags::GDAL_METADATA => "GDALMetadata",
        tags::GDAL_NODATA => "GDALNoData",
        _ => "Unknown",
    }
}

/// Get the name of a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_short_pair() {
        // Two SHORTs packed into a classic TIFF value field
        let entry = IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 2, 0x0020_0010);
        assert_eq!(inline_values(&entry, false).unwrap(), vec![16, 32]);
    }

    #[test]
    fn test_big_endian_fields_are_canonicalised() {
        // SHORT 8 followed by padding, as stored in a big-endian file
        assert_eq!(canonical_inline_value(&[0, 8, 0, 0], 2, ByteOrder::BigEndian), 8);
        // Two SHORTs keep their order
        assert_eq!(canonical_inline_value(&[0, 16, 0, 32], 2, ByteOrder::BigEndian), 0x0020_0010);
        // Little-endian fields are already canonical
        assert_eq!(canonical_inline_value(&[8, 0, 0, 0], 2, ByteOrder::LittleEndian), 8);
        // ASCII bytes never move
        assert_eq!(canonical_inline_value(b"nan\0", 1, ByteOrder::BigEndian).to_le_bytes()[..4], *b"nan\0");
    }

    #[test]
    fn test_inline_rejects_doubles() {
        let entry = IFDEntry::new(tags::MODEL_PIXEL_SCALE_TAG, field_types::DOUBLE, 1, 0);
        assert!(inline_values(&entry, true).is_err());
    }
}
