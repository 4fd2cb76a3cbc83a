//! Coordinate Reference System handling

use crate::tiff::constants::{epsg, geo_keys, geo_values, tags};
use crate::tiff::errors::{TiffError, TiffResult};

/// Identifier for the coordinate systems a raster can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// WGS 84 (EPSG:4326)
    WGS84,
    /// Other EPSG code
    Other(u32),
}

impl CoordinateSystem {
    /// Get the EPSG code for this coordinate system
    pub fn epsg_code(&self) -> u32 {
        match self {
            CoordinateSystem::WGS84 => epsg::WGS84 as u32,
            CoordinateSystem::Other(code) => *code,
        }
    }

    /// Get a description of this coordinate system
    pub fn description(&self) -> String {
        match self {
            CoordinateSystem::WGS84 => "WGS 84 (EPSG:4326)".to_string(),
            CoordinateSystem::Other(code) => format!("EPSG:{}", code),
        }
    }

    /// Citation stored in the GeoAsciiParams tag
    pub fn citation(&self) -> String {
        match self {
            CoordinateSystem::WGS84 => "WGS 84|".to_string(),
            CoordinateSystem::Other(code) => format!("EPSG:{}|", code),
        }
    }

    /// GeoKeyDirectory values declaring this system
    ///
    /// Only geographic systems can be written; the citation key points into
    /// the GeoAsciiParams string returned by [`citation`](Self::citation).
    pub fn geo_key_directory(&self) -> TiffResult<Vec<u16>> {
        let code = match self {
            CoordinateSystem::WGS84 => epsg::WGS84,
            CoordinateSystem::Other(code) => {
                return Err(TiffError::GenericError(format!(
                    "Cannot write GeoKeys for non-geographic EPSG:{}", code
                )));
            }
        };

        let citation_len = self.citation().len() as u16;
        let keys: [[u16; 4]; 5] = [
            [geo_keys::GT_MODEL_TYPE, 0, 1, geo_values::MODEL_TYPE_GEOGRAPHIC],
            [geo_keys::GT_RASTER_TYPE, 0, 1, geo_values::RASTER_PIXEL_IS_AREA],
            [geo_keys::GEOGRAPHIC_TYPE, 0, 1, code],
            [geo_keys::GEOG_CITATION, tags::GEO_ASCII_PARAMS_TAG, citation_len, 0],
            [geo_keys::GEOG_ANGULAR_UNITS, 0, 1, geo_values::ANGULAR_UNIT_DEGREE],
        ];

        // Header: version 1, revision 1.0, key count
        let mut directory = vec![1, 1, 0, keys.len() as u16];
        for key in keys.iter() {
            directory.extend_from_slice(key);
        }
        Ok(directory)
    }
}

/// Factory for creating coordinate systems
pub struct CoordinateSystemFactory;

impl CoordinateSystemFactory {
    /// Create a coordinate system from an EPSG code
    pub fn from_epsg(code: u32) -> CoordinateSystem {
        match code {
            4326 => CoordinateSystem::WGS84,
            _ => CoordinateSystem::Other(code),
        }
    }
}
