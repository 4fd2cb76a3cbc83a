//! GeoTIFF metadata and GeoKey parsing
//!
//! Interprets the georeferencing tags of a raster read back from disk:
//! the GeoKey directory, the pixel scale and tiepoint pair, and the ASCII
//! citation parameters.

use log::debug;

use crate::coordinate::GeoTransform;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{geo_keys, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// One entry of a GeoKey directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoKeyEntry {
    /// GeoKey identifier
    pub key_id: u16,
    /// Tag holding the value, or 0 when the value is inline
    pub tiff_tag_location: u16,
    /// Number of values
    pub count: u16,
    /// Inline value or index into the referenced tag
    pub value_offset: u16,
}

impl GeoKeyEntry {
    pub fn new(key_id: u16, tiff_tag_location: u16, count: u16, value_offset: u16) -> Self {
        GeoKeyEntry {
            key_id,
            tiff_tag_location,
            count,
            value_offset,
        }
    }

    /// The inline SHORT value, if the key stores one
    pub fn inline_value(&self) -> Option<u16> {
        (self.tiff_tag_location == 0).then_some(self.value_offset)
    }
}

/// Georeferencing recovered from a raster
#[derive(Debug, Clone, PartialEq)]
pub struct GeoInfo {
    /// Affine transform from ModelPixelScale and ModelTiepoint
    pub transform: Option<GeoTransform>,
    /// EPSG code of the geographic or projected system
    pub epsg: Option<u32>,
    /// Citation strings from GeoAsciiParams
    pub citation: Option<String>,
    /// Raw GeoKey directory entries
    pub keys: Vec<GeoKeyEntry>,
}

/// Get the name of a GeoKey
pub fn get_key_name(key_id: u16) -> &'static str {
    match key_id {
        geo_keys::GT_MODEL_TYPE => "GTModelTypeGeoKey",
        geo_keys::GT_RASTER_TYPE => "GTRasterTypeGeoKey",
        geo_keys::GT_CITATION => "GTCitationGeoKey",
        geo_keys::GEOGRAPHIC_TYPE => "GeographicTypeGeoKey",
        geo_keys::GEOG_CITATION => "GeogCitationGeoKey",
        geo_keys::GEOG_ANGULAR_UNITS => "GeogAngularUnitsGeoKey",
        geo_keys::PROJECTED_CS_TYPE => "ProjectedCSTypeGeoKey",
        _ => "Unknown",
    }
}

/// Parser for GeoTIFF geographic metadata
pub struct GeoKeyParser;

impl GeoKeyParser {
    /// Parse GeoKeyDirectory SHORT values into entries
    ///
    /// The directory starts with a four-value header
    /// (version, revision, minor revision, key count) followed by four
    /// values per key.
    pub fn parse_directory(values: &[u64]) -> TiffResult<Vec<GeoKeyEntry>> {
        if values.len() < 4 {
            return Err(TiffError::GenericError("Invalid GeoKey directory header".to_string()));
        }

        let num_keys = values[3] as usize;
        debug!("GeoKey directory: version={}, revision={}.{}, keys={}",
               values[0], values[1], values[2], num_keys);

        if values.len() < 4 + num_keys * 4 {
            return Err(TiffError::GenericError(format!(
                "GeoKey directory declares {} keys but holds {} values",
                num_keys, values.len()
            )));
        }

        let entries = values[4..4 + num_keys * 4]
            .chunks_exact(4)
            .map(|k| GeoKeyEntry::new(k[0] as u16, k[1] as u16, k[2] as u16, k[3] as u16))
            .inspect(|k| debug!("GeoKey: id={} ({}), location={}, count={}, value={}",
                                k.key_id, get_key_name(k.key_id), k.tiff_tag_location, k.count, k.value_offset))
            .collect();

        Ok(entries)
    }

    /// EPSG code declared by the directory
    ///
    /// A projected system takes precedence over its geographic base.
    pub fn epsg_code(keys: &[GeoKeyEntry]) -> Option<u32> {
        let lookup = |id: u16| keys.iter()
            .find(|k| k.key_id == id)
            .and_then(GeoKeyEntry::inline_value)
            .map(u32::from);

        lookup(geo_keys::PROJECTED_CS_TYPE).or_else(|| lookup(geo_keys::GEOGRAPHIC_TYPE))
    }

    /// Read all georeferencing of an IFD
    ///
    /// Missing tags leave the matching field empty; malformed ones are errors.
    pub fn extract_geo_info(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD
    ) -> TiffResult<GeoInfo> {
        let keys = if ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
            let values = tiff_reader.read_tag_values(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
            Self::parse_directory(&values)?
        } else {
            Vec::new()
        };

        let transform = if ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) && ifd.has_tag(tags::MODEL_TIEPOINT_TAG) {
            let scale = tiff_reader.read_f64_values(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
            let tiepoint = tiff_reader.read_f64_values(reader, ifd, tags::MODEL_TIEPOINT_TAG)?;
            Some(GeoTransform::from_model_tags(&scale, &tiepoint)?)
        } else {
            None
        };

        let citation = if ifd.has_tag(tags::GEO_ASCII_PARAMS_TAG) {
            Some(tiff_reader.read_ascii(reader, ifd, tags::GEO_ASCII_PARAMS_TAG)?)
        } else {
            None
        };

        Ok(GeoInfo {
            transform,
            epsg: Self::epsg_code(&keys),
            citation,
            keys,
        })
    }
}
