//! Metadata tag strategies
//!
//! GDAL-specific extension tags: the no-data marker and the XML metadata
//! document, plus the Software tag.

use crate::tiff::constants::tags;
use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFD;
use crate::utils::tiff_utils;
use crate::utils::xml_utils::{self, MetadataItem};
use super::ExternalData;
use log::{debug, info};

/// Handles metadata tags in TIFF files
pub struct MetadataBuilder;

impl MetadataBuilder {
    /// Add a GDAL NoData tag to an IFD
    ///
    /// GDAL stores the value as ASCII text, e.g. `nan` for float rasters.
    pub fn add_nodata_tag(
        ifd: &mut IFD,
        external_data: &mut ExternalData,
        ifd_index: usize,
        nodata_value: &str
    ) {
        let nodata = nodata_value.trim();
        info!("Adding GDAL NoData tag: {}", nodata);
        tiff_utils::create_ascii_tag(ifd, external_data, ifd_index, tags::GDAL_NODATA, nodata);
    }

    /// Add the GDAL metadata tag holding the given items
    pub fn add_gdal_metadata_tag(
        ifd: &mut IFD,
        external_data: &mut ExternalData,
        ifd_index: usize,
        items: &[MetadataItem]
    ) -> TiffResult<()> {
        let metadata = xml_utils::build_gdal_metadata(items)?;
        debug!("GDAL metadata: {}", metadata);

        tiff_utils::create_ascii_tag(ifd, external_data, ifd_index, tags::GDAL_METADATA, &metadata);
        Ok(())
    }

    /// Add the Software tag
    pub fn add_software_tag(
        ifd: &mut IFD,
        external_data: &mut ExternalData,
        ifd_index: usize,
        software: &str
    ) {
        tiff_utils::create_ascii_tag(ifd, external_data, ifd_index, tags::SOFTWARE, software);
    }
}
