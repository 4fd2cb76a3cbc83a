//! Tests for the TIFF types module

extern crate std;

use crate::io::byte_order::ByteOrder;
use crate::tiff::types::TIFF;
use crate::tiff::ifd::{IFD, IFDEntry};

#[test]
fn test_tiff_creation() {
    let tiff = TIFF::new(false, ByteOrder::LittleEndian);
    std::assert!(!tiff.is_big_tiff);
    std::assert_eq!(tiff.ifd_count(), 0);
    std::assert!(tiff.main_ifd().is_none());
}

#[test]
fn test_tiff_with_ifds() {
    let mut tiff = TIFF::new(true, ByteOrder::BigEndian);

    let mut main_ifd = IFD::new(0, 16);
    main_ifd.add_entry(IFDEntry::new(256, 4, 1, 1024));
    main_ifd.add_entry(IFDEntry::new(257, 4, 1, 768));
    tiff.ifds.push(main_ifd);

    std::assert!(tiff.is_big_tiff);
    std::assert_eq!(tiff.ifd_count(), 1);
    std::assert_eq!(tiff.main_ifd().and_then(IFD::get_dimensions), Some((1024, 768)));

    let description = tiff.to_string();
    std::assert!(description.contains("BigTIFF"));
    std::assert!(description.contains("Big Endian"));
}

#[test]
fn test_duplicate_tags_replace() {
    let mut ifd = IFD::new(0, 8);
    ifd.add_entry(IFDEntry::new(256, 4, 1, 10));
    ifd.add_entry(IFDEntry::new(256, 4, 1, 20));

    std::assert_eq!(ifd.entries.len(), 1);
    std::assert_eq!(ifd.get_tag_value(256), Some(20));
}
