//! Library entry points
//!
//! [`convert`] runs the whole pipeline for one product; [`inspect`] reads a
//! written raster back and summarises it.

use std::fmt;
use std::path::{Path, PathBuf};

use log::info;
use ndarray::Array2;

use crate::compression::CompressionFactory;
use crate::config::ConversionConfig;
use crate::coordinate::{BoundingBox, GeoTransform};
use crate::errors::{ConvertError, ConvertResult};
use crate::grid::{GridReport, GridWriter, LinearInterpolator};
use crate::io::seekable::SeekableReader;
use crate::loader::{DatasetSource, InputLoader, LoadedScene};
use crate::tiff::constants::tags;
use crate::tiff::{GeoKeyParser, TiffError, TiffReader, IFD};
use crate::utils::xml_utils::find_item;

/// Outcome of a conversion run
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// Shape of the temperature array as (rows, cols)
    pub input_shape: (usize, usize),
    /// The written raster
    pub output: GridReport,
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let output = &self.output;
        writeln!(f, "Output: {}", output.path.display())?;
        writeln!(f, "  Input shape: {}x{}", self.input_shape.0, self.input_shape.1)?;
        writeln!(f, "  Raster size: {}x{}", output.width, output.height)?;
        writeln!(f, "  Extent: {}", output.bbox)?;
        writeln!(f, "  Geotransform: {}", output.transform)?;
        writeln!(f, "  Dataset: {}", output.dataset_key)?;
        writeln!(f, "  Mean elevation: {:.3} km", output.mean_elevation_km)?;
        writeln!(f, "  Compression: {}", output.compression)?;
        write!(f, "  Valid cells: {}", output.valid_cells)?;
        if output.degenerate {
            write!(f, " (raster holds no data)")?;
        }
        Ok(())
    }
}

/// Convert one product as described by `config`
pub fn convert(config: &ConversionConfig) -> ConvertResult<ConversionReport> {
    let loader = InputLoader::new(&config.temperature_keys);
    let scene = loader.load(&config.data, &config.geolocation, &config.header)?;
    write_scene(config, scene)
}

/// Convert with an already opened temperature container
///
/// `config.data` is only used to name the output when it is a directory.
pub fn convert_with_source(config: &ConversionConfig, source: &dyn DatasetSource) -> ConvertResult<ConversionReport> {
    let loader = InputLoader::new(&config.temperature_keys);
    let scene = loader.load_with_source(source, &config.geolocation, &config.header)?;
    write_scene(config, scene)
}

fn write_scene(config: &ConversionConfig, scene: LoadedScene) -> ConvertResult<ConversionReport> {
    let writer = GridWriter::new(&config.compression)?
        .with_interpolator(Box::new(LinearInterpolator::new().with_progress(config.progress)));

    let output = config.output_path();
    info!("Converting {} into {}", config.data.display(), output.display());

    let report = writer.write_scene(&scene, &output)?;
    Ok(ConversionReport {
        input_shape: scene.shape(),
        output: report,
    })
}

/// Summary of a single-band Float32 GeoTIFF
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSummary {
    pub path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub transform: Option<GeoTransform>,
    /// Extent covered by the pixels
    pub bbox: Option<BoundingBox>,
    pub epsg: Option<u32>,
    pub citation: Option<String>,
    pub compression: String,
    pub nodata: Option<String>,
    /// `SOURCE_DATASET` item of the GDAL metadata
    pub source_dataset: Option<String>,
    /// Number of non-NaN cells
    pub valid_cells: usize,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl fmt::Display for RasterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_none = |v: Option<String>| v.unwrap_or_else(|| "none".to_string());

        writeln!(f, "Raster: {}", self.path.display())?;
        writeln!(f, "  Size: {}x{}", self.width, self.height)?;
        writeln!(f, "  Geotransform: {}", or_none(self.transform.map(|t| t.to_string())))?;
        writeln!(f, "  Extent: {}", or_none(self.bbox.map(|b| b.to_string())))?;
        writeln!(f, "  EPSG: {}", or_none(self.epsg.map(|c| c.to_string())))?;
        writeln!(f, "  Citation: {}", or_none(self.citation.clone()))?;
        writeln!(f, "  Compression: {}", self.compression)?;
        writeln!(f, "  NoData: {}", or_none(self.nodata.clone()))?;
        writeln!(f, "  Source dataset: {}", or_none(self.source_dataset.clone()))?;
        writeln!(f, "  Valid cells: {}", self.valid_cells)?;
        write!(f, "  Range: {} .. {}",
               or_none(self.min.map(|v| v.to_string())),
               or_none(self.max.map(|v| v.to_string())))
    }
}

/// A raster read back from disk
#[derive(Debug, Clone)]
pub struct InspectedRaster {
    pub summary: RasterSummary,
    /// First band, shape (height, width)
    pub band: Array2<f32>,
}

/// Summarise a GeoTIFF written by [`convert`]
pub fn inspect(path: &Path) -> ConvertResult<RasterSummary> {
    Ok(read_raster(path)?.summary)
}

/// Read the first band and georeferencing of a GeoTIFF
pub fn read_raster(path: &Path) -> ConvertResult<InspectedRaster> {
    read_raster_inner(path).map_err(|e| ConvertError::raster_read(path, e))
}

fn read_raster_inner(path: &Path) -> Result<InspectedRaster, TiffError> {
    let mut tiff_reader = TiffReader::new();
    let tiff = tiff_reader.load(path)?;
    let ifd = tiff.main_ifd()
        .ok_or_else(|| TiffError::GenericError("File holds no image".to_string()))?;
    let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
    let (width, height) = (width as usize, height as usize);

    let mut reader = tiff_reader.create_reader()?;
    let samples = tiff_reader.read_band_f32(&mut reader, ifd)?;
    let band = Array2::from_shape_vec((height, width), samples)
        .map_err(|e| TiffError::GenericError(format!("Band does not fill {}x{}: {}", width, height, e)))?;

    let geo = GeoKeyParser::extract_geo_info(&tiff_reader, &mut reader, ifd)?;
    let nodata = optional_ascii(&tiff_reader, &mut reader, ifd, tags::GDAL_NODATA)?;
    let metadata = optional_ascii(&tiff_reader, &mut reader, ifd, tags::GDAL_METADATA)?;

    let compression = ifd.get_tag_value(tags::COMPRESSION)
        .map_or(Ok("none"), |code| CompressionFactory::create_handler(code).map(|h| h.name()))?
        .to_string();

    let valid: Vec<f32> = band.iter().copied().filter(|v| !v.is_nan()).collect();
    let min = valid.iter().copied().reduce(f32::min);
    let max = valid.iter().copied().reduce(f32::max);

    let summary = RasterSummary {
        path: path.to_path_buf(),
        width,
        height,
        transform: geo.transform,
        bbox: geo.transform.map(|t| t.bounds(width, height)),
        epsg: geo.epsg,
        citation: geo.citation,
        compression,
        nodata,
        source_dataset: metadata.as_deref().and_then(|xml| find_item(xml, "SOURCE_DATASET")),
        valid_cells: valid.len(),
        min,
        max,
    };

    Ok(InspectedRaster { summary, band })
}

fn optional_ascii(
    tiff_reader: &TiffReader,
    reader: &mut dyn SeekableReader,
    ifd: &IFD,
    tag: u16,
) -> Result<Option<String>, TiffError> {
    if ifd.has_tag(tag) {
        Ok(Some(tiff_reader.read_ascii(reader, ifd, tag)?))
    } else {
        Ok(None)
    }
}
