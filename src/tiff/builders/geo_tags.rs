//! GeoTIFF tag strategies
//!
//! The tags that turn the Float32 raster into a GeoTIFF: the affine
//! placement (pixel scale plus one tiepoint) and the GeoKey directory
//! naming the coordinate reference system.

use crate::coordinate::{CoordinateSystem, GeoTransform};
use crate::tiff::constants::tags;
use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFD;
use crate::utils::tiff_utils;
use super::ExternalData;
use log::{debug, info};

/// Handles GeoTIFF tags
pub struct GeoTagsBuilder;

impl GeoTagsBuilder {
    /// Add ModelPixelScale and ModelTiepoint tags for a north-up transform
    pub fn add_geotransform(
        ifd: &mut IFD,
        external_data: &mut ExternalData,
        ifd_index: usize,
        transform: &GeoTransform
    ) {
        info!("Adding geotransform {}", transform);

        tiff_utils::create_double_tag(
            ifd, external_data, ifd_index, tags::MODEL_PIXEL_SCALE_TAG, &transform.pixel_scale());
        tiff_utils::create_double_tag(
            ifd, external_data, ifd_index, tags::MODEL_TIEPOINT_TAG, &transform.tiepoint());
    }

    /// Add the GeoKey directory and citation for a coordinate system
    pub fn add_coordinate_system(
        ifd: &mut IFD,
        external_data: &mut ExternalData,
        ifd_index: usize,
        crs: &CoordinateSystem
    ) -> TiffResult<()> {
        info!("Adding GeoKeys for {}", crs.description());

        let directory = crs.geo_key_directory()?;
        debug!("GeoKey directory: {:?}", directory);

        tiff_utils::create_short_tag(ifd, external_data, ifd_index, tags::GEO_KEY_DIRECTORY_TAG, &directory);
        tiff_utils::create_ascii_tag(ifd, external_data, ifd_index, tags::GEO_ASCII_PARAMS_TAG, &crs.citation());
        Ok(())
    }
}
