//! Geolocation cube loading
//!
//! The geolocation binary holds `4 * samples * lines` raw 4-byte floats,
//! pixel-interleaved: for every line, for every column, one value per band.
//! Band 0 is latitude, band 1 longitude and band 2 elevation in metres;
//! band 3 is not used.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, info};
use ndarray::{Array2, Array3, Axis};

use crate::errors::{ConvertError, ConvertResult};
use crate::loader::header::{GeoHeader, GEO_BANDS, SAMPLE_BYTES};

/// Band index of latitude
pub const LATITUDE_BAND: usize = 0;
/// Band index of longitude
pub const LONGITUDE_BAND: usize = 1;
/// Band index of elevation
pub const ELEVATION_BAND: usize = 2;

/// Per-pixel geolocation, shape (lines, samples, bands)
#[derive(Debug, Clone, PartialEq)]
pub struct GeolocationCube {
    data: Array3<f64>,
}

impl GeolocationCube {
    /// Load the binary described by `header`
    ///
    /// The file must hold exactly the number of values the header declares
    /// after its `header offset`.
    pub fn load(path: &Path, header: &GeoHeader) -> ConvertResult<Self> {
        let expected = header.element_count()?;
        let expected_bytes = header.byte_count()?;
        let file_len = std::fs::metadata(path)
            .map_err(|e| ConvertError::input_read(path, e))?
            .len();
        let payload = file_len.saturating_sub(header.header_offset);

        if payload != expected_bytes {
            return Err(ConvertError::ShapeMismatch {
                expected,
                actual: usize::try_from(payload / SAMPLE_BYTES as u64).unwrap_or(usize::MAX),
            });
        }

        info!("Reading {} geolocation values from {}", expected, path.display());
        let file = File::open(path).map_err(|e| ConvertError::input_read(path, e))?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(header.header_offset))
            .map_err(|e| ConvertError::input_read(path, e))?;

        Self::from_reader(&mut reader, header)
            .map_err(|e| ConvertError::input_read(path, e))
    }

    /// Decode `header.element_count()` floats from a stream
    pub fn from_reader(reader: &mut dyn Read, header: &GeoHeader) -> std::io::Result<Self> {
        let count = header.element_count()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
        let handler = header.byte_order.create_handler();
        let samples = handler.read_f32_vec(reader, count)?;

        // The count was checked against the header, so the shape always fits
        Self::from_samples(samples, header)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Arrange pixel-interleaved samples into a (lines, samples, bands) cube
    pub fn from_samples(samples: Vec<f32>, header: &GeoHeader) -> ConvertResult<Self> {
        let expected = header.element_count()?;
        if samples.len() != expected {
            return Err(ConvertError::ShapeMismatch { expected, actual: samples.len() });
        }

        let actual = samples.len();
        let widened: Vec<f64> = samples.into_iter().map(f64::from).collect();
        let data = Array3::from_shape_vec((header.lines, header.samples, GEO_BANDS), widened)
            .map_err(|_| ConvertError::ShapeMismatch { expected, actual })?;

        debug!("Geolocation cube shape: {:?}", data.shape());
        Ok(GeolocationCube { data })
    }

    /// Shape as (lines, samples, bands)
    pub fn shape(&self) -> (usize, usize, usize) {
        let (rows, cols, bands) = self.data.dim();
        (rows, cols, bands)
    }

    /// One band as a (lines, samples) array
    pub fn band(&self, index: usize) -> Array2<f64> {
        self.data.index_axis(Axis(2), index).to_owned()
    }

    pub fn latitude(&self) -> Array2<f64> {
        self.band(LATITUDE_BAND)
    }

    pub fn longitude(&self) -> Array2<f64> {
        self.band(LONGITUDE_BAND)
    }

    /// Mean elevation in kilometres over finite cells
    ///
    /// NaN when the elevation band has no finite value.
    pub fn mean_elevation_km(&self) -> f64 {
        let elevation = self.data.index_axis(Axis(2), ELEVATION_BAND);
        let (sum, count) = elevation.iter()
            .filter(|v| v.is_finite())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64 / 1000.0
        }
    }
}
