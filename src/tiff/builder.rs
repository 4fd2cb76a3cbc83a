//! TIFF file construction
//!
//! [`TiffBuilder`] assembles IFDs, tag data and strips, delegating each
//! concern to a strategy in `builders`, and streams the result to disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use log::{error, info};

use crate::compression::CompressionHandler;
use crate::coordinate::{CoordinateSystem, GeoTransform};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::utils::xml_utils::MetadataItem;

use crate::tiff::builders::{ExternalData, StripData};
use crate::tiff::builders::basic_tags::BasicTagsBuilder;
use crate::tiff::builders::geo_tags::GeoTagsBuilder;
use crate::tiff::builders::metadata_tags::MetadataBuilder;
use crate::tiff::builders::writer::WriterBuilder;

/// Builder for creating TIFF files
pub struct TiffBuilder {
    pub ifds: Vec<IFD>,
    strip_data: StripData,
    external_data: ExternalData,
}

impl Default for TiffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffBuilder {
    /// Create a new TIFF builder
    pub fn new() -> Self {
        TiffBuilder {
            ifds: Vec::new(),
            strip_data: StripData::new(),
            external_data: ExternalData::new(),
        }
    }

    /// Add an IFD to the TIFF
    pub fn add_ifd(&mut self, ifd: IFD) -> usize {
        let ifd_index = self.ifds.len();
        info!("Adding IFD #{} to TiffBuilder", ifd_index);
        self.ifds.push(ifd);
        ifd_index
    }

    fn ifd_mut(&mut self, ifd_index: usize) -> TiffResult<&mut IFD> {
        let count = self.ifds.len();
        self.ifds.get_mut(ifd_index).ok_or_else(|| {
            error!("Invalid IFD index {}, only have {} IFDs", ifd_index, count);
            TiffError::GenericError(format!("Invalid IFD index {}, only have {} IFDs", ifd_index, count))
        })
    }

    /// Store a row-major Float32 band as strips encoded with `codec`
    pub fn set_float_band(
        &mut self,
        ifd_index: usize,
        samples: &[f32],
        width: u32,
        height: u32,
        codec: &dyn CompressionHandler
    ) -> TiffResult<()> {
        if samples.len() != width as usize * height as usize {
            return Err(TiffError::GenericError(format!(
                "Band of {} samples does not fill {}x{}", samples.len(), width, height
            )));
        }

        self.ifd_mut(ifd_index)?;
        let ifd = &mut self.ifds[ifd_index];
        BasicTagsBuilder::add_float_gray_tags(ifd, width, height);
        BasicTagsBuilder::setup_float_strips(
            ifd,
            &mut self.external_data,
            &mut self.strip_data,
            ifd_index,
            samples,
            width,
            codec
        )
    }

    /// Place the raster with a north-up geotransform
    pub fn set_geotransform(&mut self, ifd_index: usize, transform: &GeoTransform) -> TiffResult<()> {
        self.ifd_mut(ifd_index)?;
        GeoTagsBuilder::add_geotransform(
            &mut self.ifds[ifd_index],
            &mut self.external_data,
            ifd_index,
            transform
        );
        Ok(())
    }

    /// Declare the raster's coordinate reference system
    pub fn set_coordinate_system(&mut self, ifd_index: usize, crs: &CoordinateSystem) -> TiffResult<()> {
        self.ifd_mut(ifd_index)?;
        GeoTagsBuilder::add_coordinate_system(
            &mut self.ifds[ifd_index],
            &mut self.external_data,
            ifd_index,
            crs
        )
    }

    /// Add a GDAL NoData tag to an IFD
    pub fn add_nodata_tag(&mut self, ifd_index: usize, nodata_value: &str) -> TiffResult<()> {
        self.ifd_mut(ifd_index)?;
        MetadataBuilder::add_nodata_tag(
            &mut self.ifds[ifd_index],
            &mut self.external_data,
            ifd_index,
            nodata_value
        );
        Ok(())
    }

    /// Add a GDAL metadata tag holding `items`
    pub fn add_gdal_metadata_tag(&mut self, ifd_index: usize, items: &[MetadataItem]) -> TiffResult<()> {
        self.ifd_mut(ifd_index)?;
        MetadataBuilder::add_gdal_metadata_tag(
            &mut self.ifds[ifd_index],
            &mut self.external_data,
            ifd_index,
            items
        )
    }

    /// Add the Software tag
    pub fn add_software_tag(&mut self, ifd_index: usize, software: &str) -> TiffResult<()> {
        self.ifd_mut(ifd_index)?;
        MetadataBuilder::add_software_tag(
            &mut self.ifds[ifd_index],
            &mut self.external_data,
            ifd_index,
            software
        );
        Ok(())
    }

    /// Stream the TIFF to any writer
    pub fn write_to(&self, writer: &mut impl Write) -> TiffResult<()> {
        WriterBuilder::write(&self.ifds, &self.strip_data, &self.external_data, writer)
    }

    /// Write the TIFF file to disk
    pub fn write(&self, output_path: &Path) -> TiffResult<()> {
        info!("Writing TIFF to {}", output_path.display());

        let file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        self.write_to(&mut writer)
    }
}
