//! Input loading
//!
//! Reads the three inputs of a HyTES Level-2 product (geolocation header,
//! geolocation binary and temperature container) and aligns them into a
//! [`LoadedScene`] the grid writer can consume.

pub mod header;
pub mod geolocation;
pub mod dataset;

use std::path::Path;

use log::{info, warn};
use ndarray::Array2;

use crate::errors::ConvertResult;

pub use dataset::{
    find_temperature, open_dataset, squeeze_to_2d, DatasetSource, MemoryDataset, DEFAULT_TEMPERATURE_KEYS,
};
pub use geolocation::GeolocationCube;
pub use header::GeoHeader;

/// Temperature and geolocation aligned on the same (rows, cols) shape
#[derive(Debug, Clone)]
pub struct LoadedScene {
    /// Surface temperature in Kelvin, NaN where missing
    pub temperature: Array2<f64>,
    /// Latitude in degrees
    pub latitude: Array2<f64>,
    /// Longitude in degrees
    pub longitude: Array2<f64>,
    /// Mean terrain elevation in kilometres
    pub mean_elevation_km: f64,
    /// Key the temperature dataset was read from
    pub dataset_key: String,
}

impl LoadedScene {
    pub fn shape(&self) -> (usize, usize) {
        self.temperature.dim()
    }
}

/// Loads a scene from its three input files
pub struct InputLoader {
    temperature_keys: Vec<String>,
}

impl InputLoader {
    /// Loader trying `keys` in order; the default keys when empty
    pub fn new(keys: &[String]) -> Self {
        let temperature_keys = if keys.is_empty() {
            DEFAULT_TEMPERATURE_KEYS.iter().map(|k| k.to_string()).collect()
        } else {
            keys.to_vec()
        };

        InputLoader { temperature_keys }
    }

    pub fn temperature_keys(&self) -> &[String] {
        &self.temperature_keys
    }

    /// Load from files, opening the data file through [`open_dataset`]
    pub fn load(&self, data: &Path, geolocation: &Path, header: &Path) -> ConvertResult<LoadedScene> {
        let cube = self.load_geolocation(geolocation, header)?;
        let source = open_dataset(data)?;
        self.assemble(cube, source.as_ref())
    }

    /// Load with an already opened temperature container
    pub fn load_with_source(
        &self,
        source: &dyn DatasetSource,
        geolocation: &Path,
        header: &Path,
    ) -> ConvertResult<LoadedScene> {
        let cube = self.load_geolocation(geolocation, header)?;
        self.assemble(cube, source)
    }

    fn load_geolocation(&self, geolocation: &Path, header: &Path) -> ConvertResult<GeolocationCube> {
        info!("Parsing geolocation header {}", header.display());
        let header = GeoHeader::from_file(header)?;
        GeolocationCube::load(geolocation, &header)
    }

    fn assemble(&self, cube: GeolocationCube, source: &dyn DatasetSource) -> ConvertResult<LoadedScene> {
        let mean_elevation_km = cube.mean_elevation_km();
        info!("Mean elevation: {:.3} km", mean_elevation_km);

        let (dataset_key, temperature) = find_temperature(source, &self.temperature_keys)?;
        let shape = temperature.dim();

        let latitude = resize_to(cube.latitude(), shape, "latitude");
        let longitude = resize_to(cube.longitude(), shape, "longitude");

        Ok(LoadedScene {
            temperature,
            latitude,
            longitude,
            mean_elevation_km,
            dataset_key,
        })
    }
}

/// Resize an array to `shape` the way numpy's `resize` does
///
/// The row-major flattened values are truncated, or repeated cyclically
/// when the target is larger. Returns the input untouched when the shape
/// already matches.
pub fn resize_to(array: Array2<f64>, shape: (usize, usize), name: &str) -> Array2<f64> {
    if array.dim() == shape {
        return array;
    }

    warn!("Resizing {} grid from {:?} to {:?}; values are truncated or repeated", name, array.dim(), shape);

    let flat: Vec<f64> = array.iter().copied().collect();
    let count = shape.0 * shape.1;
    if flat.is_empty() {
        return Array2::from_elem(shape, f64::NAN);
    }

    let values: Vec<f64> = flat.iter().copied().cycle().take(count).collect();
    Array2::from_shape_vec(shape, values).unwrap_or_else(|_| Array2::from_elem(shape, f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_resize_truncates() {
        let grid = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert_eq!(resize_to(grid, (2, 2), "latitude"), array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_resize_repeats_cyclically() {
        let grid = array![[1.0, 2.0], [3.0, 4.0]];
        let resized = resize_to(grid, (3, 3), "longitude");
        assert_eq!(resized, array![[1.0, 2.0, 3.0], [4.0, 1.0, 2.0], [3.0, 4.0, 1.0]]);
    }

    #[test]
    fn test_resize_same_shape() {
        let grid = array![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(resize_to(grid.clone(), (2, 2), "latitude"), grid);
    }

    #[test]
    fn test_default_keys() {
        let loader = InputLoader::new(&[]);
        assert_eq!(loader.temperature_keys(), ["l2_land_surface_temperature", "L2_LST"]);

        let custom = InputLoader::new(&["LST".to_string()]);
        assert_eq!(custom.temperature_keys(), ["LST"]);
    }
}
