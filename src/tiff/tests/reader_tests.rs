//! Tests for the TIFF reader

extern crate std;

use std::io::Cursor;

use crate::compression::CompressionFactory;
use crate::coordinate::{CoordinateSystem, GeoTransform};
use crate::tiff::builder::TiffBuilder;
use crate::tiff::constants::tags;
use crate::tiff::geo_key_parser::GeoKeyParser;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::utils::xml_utils::MetadataItem;
use super::test_utils::{create_big_endian_float_buffer, create_test_bigtiff_buffer, create_test_tiff_buffer};

fn build_raster(samples: &[f32], width: u32, height: u32, compression: &str) -> Vec<u8> {
    let mut builder = TiffBuilder::new();
    let index = builder.add_ifd(IFD::new(0, 0));
    let codec = CompressionFactory::get_handler_by_name(compression).unwrap();
    let transform = GeoTransform { origin_x: -120.0, origin_y: 0.3, pixel_width: 0.075, pixel_height: 0.1 };

    builder.set_float_band(index, samples, width, height, codec.as_ref()).unwrap();
    builder.set_geotransform(index, &transform).unwrap();
    builder.set_coordinate_system(index, &CoordinateSystem::WGS84).unwrap();
    builder.add_nodata_tag(index, "nan").unwrap();
    builder.add_gdal_metadata_tag(index, &[MetadataItem::dataset("SOURCE_DATASET", "L2_LST")]).unwrap();

    let mut out = Vec::new();
    builder.write_to(&mut out).unwrap();
    out
}

#[test]
fn test_read_classic_header() {
    let mut cursor = create_test_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    std::assert!(!tiff.is_big_tiff);
    std::assert_eq!(tiff.main_ifd().unwrap().get_dimensions(), Some((800, 600)));
}

#[test]
fn test_read_bigtiff_header() {
    let mut cursor = create_test_bigtiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    std::assert!(tiff.is_big_tiff);
    std::assert!(reader.is_big_tiff());
    std::assert_eq!(tiff.main_ifd().unwrap().get_dimensions(), Some((1024, 768)));
}

#[test]
fn test_read_big_endian_band() {
    let mut cursor = create_big_endian_float_buffer([301.25, -4.5]);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    // Inline SHORT values are canonicalised
    std::assert_eq!(ifd.get_tag_value(tags::SAMPLE_FORMAT), Some(3));
    std::assert_eq!(reader.read_band_f32(&mut cursor, ifd).unwrap(), std::vec![301.25, -4.5]);
}

#[test]
fn test_band_round_trip_per_compression() {
    // 2500 columns give one row per strip, so several strips are written
    let (width, height) = (2500u32, 3u32);
    let samples: std::vec::Vec<f32> = (0..width * height)
        .map(|i| if i % 7 == 0 { f32::NAN } else { 280.0 + i as f32 * 0.01 })
        .collect();

    for compression in ["none", "deflate", "zstd"] {
        let bytes = build_raster(&samples, width, height, compression);
        let mut cursor = Cursor::new(bytes);
        let mut reader = TiffReader::new();
        let tiff = reader.read(&mut cursor).unwrap();
        let ifd = tiff.main_ifd().unwrap();

        std::assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::STRIP_OFFSETS).unwrap().len(), 3);

        let band = reader.read_band_f32(&mut cursor, ifd).unwrap();
        std::assert_eq!(band.len(), samples.len(), "compression {}", compression);
        for (read, written) in band.iter().zip(samples.iter()) {
            std::assert!(read == written || (read.is_nan() && written.is_nan()));
        }
    }
}

#[test]
fn test_georeferencing_round_trip() {
    let bytes = build_raster(&[300.0; 4], 2, 2, "none");
    let mut cursor = Cursor::new(bytes);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    let info = GeoKeyParser::extract_geo_info(&reader, &mut cursor, ifd).unwrap();
    std::assert_eq!(info.epsg, Some(4326));
    std::assert_eq!(info.citation.as_deref(), Some("WGS 84|"));
    std::assert_eq!(
        info.transform,
        Some(GeoTransform { origin_x: -120.0, origin_y: 0.3, pixel_width: 0.075, pixel_height: 0.1 })
    );

    std::assert_eq!(reader.read_ascii(&mut cursor, ifd, tags::GDAL_NODATA).unwrap(), "nan");
    let metadata = reader.read_ascii(&mut cursor, ifd, tags::GDAL_METADATA).unwrap();
    std::assert!(metadata.contains("L2_LST"));
}

#[test]
fn test_truncated_file_fails() {
    let mut bytes = build_raster(&[300.0; 4], 2, 2, "none");
    bytes.truncate(40);
    let mut cursor = Cursor::new(bytes);
    let mut reader = TiffReader::new();

    // The IFD is cut short
    std::assert!(reader.read(&mut cursor).is_err());
}
