//! GeoTIFF output for regridded rasters

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray::Array2;
use tempfile::NamedTempFile;

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::coordinate::{BoundingBox, CoordinateSystem, GeoTransform};
use crate::errors::{ConvertError, ConvertResult};
use crate::grid::interpolate::{LinearInterpolator, ScatteredInterpolator};
use crate::grid::regrid::{regrid, Regridded};
use crate::loader::LoadedScene;
use crate::tiff::errors::TiffResult;
use crate::tiff::{TiffBuilder, IFD};
use crate::utils::xml_utils::MetadataItem;

/// NoData marker written to the GDAL_NODATA tag
pub const NODATA: &str = "nan";

/// Unit of the temperature band
pub const TEMPERATURE_UNITS: &str = "K";

/// Descriptive values stored alongside the raster
#[derive(Debug, Clone, PartialEq)]
pub struct Annotations {
    pub mean_elevation_km: f64,
    pub dataset_key: String,
}

/// Outcome of a written raster
#[derive(Debug, Clone)]
pub struct GridReport {
    pub path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    pub bbox: BoundingBox,
    pub valid_cells: usize,
    /// No cell holds data
    pub degenerate: bool,
    pub mean_elevation_km: f64,
    pub dataset_key: String,
    pub compression: &'static str,
}

/// Regrids aligned arrays and writes them as a WGS84 GeoTIFF
pub struct GridWriter {
    codec: Box<dyn CompressionHandler>,
    crs: CoordinateSystem,
    interpolator: Box<dyn ScatteredInterpolator>,
}

impl GridWriter {
    /// Writer using the named strip compression
    pub fn new(compression: &str) -> ConvertResult<Self> {
        let codec = CompressionFactory::get_handler_by_name(compression)
            .map_err(|e| ConvertError::Config(e.to_string()))?;

        Ok(GridWriter {
            codec,
            crs: CoordinateSystem::WGS84,
            interpolator: Box::new(LinearInterpolator::new()),
        })
    }

    pub fn with_interpolator(mut self, interpolator: Box<dyn ScatteredInterpolator>) -> Self {
        self.interpolator = interpolator;
        self
    }

    pub fn compression(&self) -> &'static str {
        self.codec.name()
    }

    /// Regrid and write a loaded scene
    pub fn write_scene(&self, scene: &LoadedScene, output: &Path) -> ConvertResult<GridReport> {
        let annotations = Annotations {
            mean_elevation_km: scene.mean_elevation_km,
            dataset_key: scene.dataset_key.clone(),
        };
        self.write(&scene.temperature, &scene.latitude, &scene.longitude, &annotations, output)
    }

    /// Regrid `values` located at `latitude`/`longitude` and write them to `output`
    pub fn write(
        &self,
        values: &Array2<f64>,
        latitude: &Array2<f64>,
        longitude: &Array2<f64>,
        annotations: &Annotations,
        output: &Path,
    ) -> ConvertResult<GridReport> {
        let regridded = regrid(values, latitude, longitude, self.interpolator.as_ref())?;

        let builder = self.build(&regridded, annotations)
            .map_err(|e| ConvertError::raster_write(output, e))?;
        persist(&builder, output)?;

        info!("Wrote {}x{} raster to {} ({} valid cells, {} compression)",
              regridded.width(), regridded.height(), output.display(), regridded.valid_cells, self.codec.name());

        Ok(GridReport {
            path: output.to_path_buf(),
            width: regridded.width(),
            height: regridded.height(),
            transform: regridded.transform,
            bbox: regridded.bbox,
            valid_cells: regridded.valid_cells,
            degenerate: regridded.degenerate,
            mean_elevation_km: annotations.mean_elevation_km,
            dataset_key: annotations.dataset_key.clone(),
            compression: self.codec.name(),
        })
    }

    fn build(&self, regridded: &Regridded, annotations: &Annotations) -> TiffResult<TiffBuilder> {
        let (height, width) = regridded.raster.dim();
        let samples: Vec<f32> = regridded.raster.iter().map(|&v| v as f32).collect();

        let mut builder = TiffBuilder::new();
        let ifd_index = builder.add_ifd(IFD::new(0, 0));

        builder.set_float_band(ifd_index, &samples, width as u32, height as u32, self.codec.as_ref())?;
        builder.set_geotransform(ifd_index, &regridded.transform)?;
        builder.set_coordinate_system(ifd_index, &self.crs)?;
        builder.add_nodata_tag(ifd_index, NODATA)?;
        builder.add_gdal_metadata_tag(ifd_index, &metadata_items(annotations))?;
        builder.add_software_tag(ifd_index, &format!("hytes2tiff {}", env!("CARGO_PKG_VERSION")))?;

        debug!("Raster {}x{} georeferenced by {}", width, height, regridded.transform);
        Ok(builder)
    }
}

fn metadata_items(annotations: &Annotations) -> Vec<MetadataItem> {
    vec![
        MetadataItem::dataset("SOURCE_DATASET", annotations.dataset_key.as_str()),
        MetadataItem::dataset("MEAN_ELEVATION_KM", format!("{:.6}", annotations.mean_elevation_km)),
        MetadataItem::band(0, "DESCRIPTION", "land surface temperature", Some("description")),
        MetadataItem::band(0, "UNITTYPE", TEMPERATURE_UNITS, Some("unittype")),
    ]
}

/// Write through a scratch file in the destination directory
///
/// The scratch file is removed if anything fails before it is persisted.
fn persist(builder: &TiffBuilder, output: &Path) -> ConvertResult<()> {
    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut scratch = NamedTempFile::new_in(directory)
        .map_err(|e| ConvertError::raster_write(output, e))?;
    debug!("Writing scratch raster {}", scratch.path().display());

    {
        let mut writer = BufWriter::with_capacity(1024 * 1024, scratch.as_file_mut());
        builder.write_to(&mut writer).map_err(|e| ConvertError::raster_write(output, e))?;
        writer.flush().map_err(|e| ConvertError::raster_write(output, e))?;
    }

    scratch.persist(output).map_err(|e| ConvertError::raster_write(output, e.error))?;
    Ok(())
}
