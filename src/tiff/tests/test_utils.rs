use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

/// Creates a test buffer with TIFF header and two dimension tags
pub fn create_test_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // TIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    // Sample IFD (at offset 8)
    buffer.write_u16::<LittleEndian>(2).unwrap();      // Entry count (2 entries)

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(800).unwrap();    // Value (width)

    // Entry 2: ImageLength/Height (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(600).unwrap();    // Value (height)

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u32::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Creates a test buffer with BigTIFF header and two dimension tags
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // BigTIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(43).unwrap();     // BigTIFF version
    buffer.write_u16::<LittleEndian>(8).unwrap();      // Offset size
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Reserved
    buffer.write_u64::<LittleEndian>(16).unwrap();     // IFD offset

    // Sample IFD (at offset 16)
    buffer.write_u64::<LittleEndian>(2).unwrap();      // Entry count (2 entries)

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(1024).unwrap();   // Value (width)

    // Entry 2: ImageLength/Height (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(768).unwrap();    // Value (height)

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u64::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Creates a big-endian 2x1 Float32 raster in a single uncompressed strip
pub fn create_big_endian_float_buffer(values: [f32; 2]) -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();
    let entries: [(u16, u16, u32); 6] = [
        (256, 4, 2),   // ImageWidth
        (257, 4, 1),   // ImageLength
        (258, 3, 32),  // BitsPerSample
        (273, 4, 0),   // StripOffsets, filled below
        (279, 4, 8),   // StripByteCounts
        (339, 3, 3),   // SampleFormat (IEEE float)
    ];
    let strip_offset = 8 + 2 + 12 * entries.len() as u32 + 4;

    buffer.write_u16::<BigEndian>(0x4D4D).unwrap(); // MM for big-endian
    buffer.write_u16::<BigEndian>(42).unwrap();
    buffer.write_u32::<BigEndian>(8).unwrap();

    buffer.write_u16::<BigEndian>(entries.len() as u16).unwrap();
    for (tag, field_type, value) in entries {
        buffer.write_u16::<BigEndian>(tag).unwrap();
        buffer.write_u16::<BigEndian>(field_type).unwrap();
        buffer.write_u32::<BigEndian>(1).unwrap();
        let value = if tag == 273 { strip_offset } else { value };
        // SHORT values occupy the first two bytes of the field
        if field_type == 3 {
            buffer.write_u16::<BigEndian>(value as u16).unwrap();
            buffer.write_u16::<BigEndian>(0).unwrap();
        } else {
            buffer.write_u32::<BigEndian>(value).unwrap();
        }
    }
    buffer.write_u32::<BigEndian>(0).unwrap();

    for v in values {
        buffer.write_f32::<BigEndian>(v).unwrap();
    }

    Cursor::new(buffer)
}
