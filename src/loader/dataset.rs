//! Temperature dataset access
//!
//! The Level-2 product is a keyed container (HDF5 / netCDF-4). The loader
//! only needs to list keys and read one array, expressed by the
//! [`DatasetSource`] trait. [`MemoryDataset`] serves library callers and
//! tests; `NetcdfDataset` reads real products through the default `netcdf`
//! feature.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray::{Array2, ArrayD, Ix2, IxDyn};

use crate::errors::{ConvertError, ConvertResult};

/// Temperature keys tried in order when none are configured
///
/// Newer products name the dataset `l2_land_surface_temperature`; it takes
/// precedence when a file carries both.
pub const DEFAULT_TEMPERATURE_KEYS: [&str; 2] = ["l2_land_surface_temperature", "L2_LST"];

/// A keyed container of n-dimensional arrays
pub trait DatasetSource {
    /// Path of the underlying file, for messages
    fn path(&self) -> &Path;

    /// Names of the arrays in the container
    fn keys(&self) -> Vec<String>;

    /// Read a whole array as f64
    fn read_array(&self, key: &str) -> ConvertResult<ArrayD<f64>>;
}

/// In-memory dataset container
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    path: PathBuf,
    arrays: BTreeMap<String, ArrayD<f64>>,
}

impl MemoryDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MemoryDataset {
            path: path.into(),
            arrays: BTreeMap::new(),
        }
    }

    /// Add an array under `key`, consuming and returning the container
    pub fn with_array<D: ndarray::Dimension>(mut self, key: &str, array: ndarray::Array<f64, D>) -> Self {
        self.insert(key, array);
        self
    }

    /// Add or replace an array
    pub fn insert<D: ndarray::Dimension>(&mut self, key: &str, array: ndarray::Array<f64, D>) {
        self.arrays.insert(key.to_string(), array.into_dyn());
    }
}

impl DatasetSource for MemoryDataset {
    fn path(&self) -> &Path {
        &self.path
    }

    fn keys(&self) -> Vec<String> {
        self.arrays.keys().cloned().collect()
    }

    fn read_array(&self, key: &str) -> ConvertResult<ArrayD<f64>> {
        self.arrays.get(key).cloned().ok_or_else(|| ConvertError::DatasetRead {
            path: self.path.clone(),
            reason: format!("no array named '{}'", key),
        })
    }
}

/// netCDF-4 / HDF5 container read through libnetcdf
#[cfg(feature = "netcdf")]
pub struct NetcdfDataset {
    path: PathBuf,
    file: netcdf::File,
}

#[cfg(feature = "netcdf")]
impl NetcdfDataset {
    pub fn open(path: &Path) -> ConvertResult<Self> {
        let file = netcdf::open(path).map_err(|e| ConvertError::DatasetRead {
            path: path.to_path_buf(),
            reason: format!("failed to open: {}", e),
        })?;

        Ok(NetcdfDataset {
            path: path.to_path_buf(),
            file,
        })
    }
}

#[cfg(feature = "netcdf")]
impl DatasetSource for NetcdfDataset {
    fn path(&self) -> &Path {
        &self.path
    }

    fn keys(&self) -> Vec<String> {
        self.file.variables().map(|v| v.name()).collect()
    }

    fn read_array(&self, key: &str) -> ConvertResult<ArrayD<f64>> {
        let read_error = |reason: String| ConvertError::DatasetRead {
            path: self.path.clone(),
            reason,
        };

        let variable = self.file.variable(key)
            .ok_or_else(|| read_error(format!("no variable named '{}'", key)))?;
        let shape: Vec<usize> = variable.dimensions().iter().map(|d| d.len()).collect();
        let values: Vec<f64> = variable.get_values(..)
            .map_err(|e| read_error(format!("failed to read '{}': {}", key, e)))?;

        ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|e| read_error(format!("'{}' does not match its dimensions: {}", key, e)))
    }
}

/// Open the Level-2 data file
///
/// A build without the `netcdf` feature has no reader for HDF5 containers
/// and fails with a dataset read error.
pub fn open_dataset(path: &Path) -> ConvertResult<Box<dyn DatasetSource>> {
    if !path.is_file() {
        return Err(ConvertError::input_read(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "data file not found"),
        ));
    }

    #[cfg(feature = "netcdf")]
    {
        Ok(Box::new(NetcdfDataset::open(path)?))
    }

    #[cfg(not(feature = "netcdf"))]
    {
        Err(ConvertError::DatasetRead {
            path: path.to_path_buf(),
            reason: "built without HDF5 support; rebuild with `--features netcdf`".to_string(),
        })
    }
}

/// Drop length-1 axes so that exactly two remain
///
/// Arrays that are already 2-D are left alone, so a single-line product
/// keeps its shape.
pub fn squeeze_to_2d(array: ArrayD<f64>) -> Option<Array2<f64>> {
    if array.ndim() == 2 {
        return array.into_dimensionality::<Ix2>().ok();
    }

    let kept: Vec<usize> = array.shape().iter().copied().filter(|&d| d != 1).collect();
    if kept.len() != 2 {
        return None;
    }

    let array = array.as_standard_layout().into_owned();
    array.into_shape(IxDyn(&kept)).ok()?.into_dimensionality::<Ix2>().ok()
}

/// Locate and read the temperature array
///
/// The first of `keys` present in the container wins. The array is squeezed
/// to 2-D and every value at or below zero becomes NaN, so zero fill never
/// reaches the raster as a temperature. Returns the key used and the
/// cleaned array.
pub fn find_temperature(source: &dyn DatasetSource, keys: &[String]) -> ConvertResult<(String, Array2<f64>)> {
    let available = source.keys();
    debug!("Datasets in {}: {:?}", source.path().display(), available);

    let key = keys.iter()
        .find(|k| available.contains(k))
        .ok_or_else(|| ConvertError::DatasetNotFound {
            path: source.path().to_path_buf(),
            keys: keys.to_vec(),
        })?;

    let raw = source.read_array(key)?;
    let raw_shape = raw.shape().to_vec();
    let mut temperature = squeeze_to_2d(raw).ok_or_else(|| ConvertError::DatasetRead {
        path: source.path().to_path_buf(),
        reason: format!("'{}' has shape {:?}, expected a 2-D array", key, raw_shape),
    })?;

    temperature.mapv_inplace(|v| if v <= 0.0 { f64::NAN } else { v });

    info!("Read temperature dataset '{}' with shape {:?}", key, temperature.dim());
    Ok((key.clone(), temperature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    fn keys() -> Vec<String> {
        DEFAULT_TEMPERATURE_KEYS.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_long_name_wins_over_short_name() {
        let source = MemoryDataset::new("scene.hdf5")
            .with_array("L2_LST", array![[1.0]])
            .with_array("l2_land_surface_temperature", array![[2.0, 3.0]]);

        let (key, temperature) = find_temperature(&source, &keys()).unwrap();
        assert_eq!(key, "l2_land_surface_temperature");
        assert_eq!(temperature, array![[2.0, 3.0]]);
    }

    #[test]
    fn test_configured_order_is_respected() {
        let source = MemoryDataset::new("scene.hdf5")
            .with_array("L2_LST", array![[1.0]])
            .with_array("l2_land_surface_temperature", array![[2.0]]);

        let order = vec!["L2_LST".to_string(), "l2_land_surface_temperature".to_string()];
        let (key, _) = find_temperature(&source, &order).unwrap();
        assert_eq!(key, "L2_LST");
    }

    #[test]
    fn test_fallback_key() {
        let source = MemoryDataset::new("scene.hdf5")
            .with_array("L2_LST", array![[290.0, -1.0], [-0.5, 291.0]]);

        let (key, temperature) = find_temperature(&source, &keys()).unwrap();
        assert_eq!(key, "L2_LST");
        assert_eq!(temperature[[0, 0]], 290.0);
        assert!(temperature[[0, 1]].is_nan());
        assert!(temperature[[1, 0]].is_nan());
        assert_eq!(temperature[[1, 1]], 291.0);
    }

    #[test]
    fn test_zero_fill_becomes_missing() {
        let source = MemoryDataset::new("scene.hdf5")
            .with_array("L2_LST", array![[0.0, 300.0], [-0.0, 1e-3]]);

        let (_, temperature) = find_temperature(&source, &keys()).unwrap();
        assert!(temperature[[0, 0]].is_nan());
        assert!(temperature[[1, 0]].is_nan());
        assert_eq!(temperature[[0, 1]], 300.0);
        assert_eq!(temperature[[1, 1]], 1e-3);
    }

    #[test]
    fn test_missing_keys_are_named() {
        let source = MemoryDataset::new("scene.hdf5").with_array("L2_Emissivity", array![[0.9]]);

        match find_temperature(&source, &keys()) {
            Err(ConvertError::DatasetNotFound { keys, .. }) => {
                assert_eq!(keys, vec!["l2_land_surface_temperature".to_string(), "L2_LST".to_string()]);
            }
            other => panic!("expected DatasetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_squeeze() {
        let cube = Array3::<f64>::zeros((1, 4, 3)).into_dyn();
        assert_eq!(squeeze_to_2d(cube).unwrap().dim(), (4, 3));

        let line = Array2::<f64>::zeros((1, 5)).into_dyn();
        assert_eq!(squeeze_to_2d(line).unwrap().dim(), (1, 5));

        let bands = Array3::<f64>::zeros((2, 4, 3)).into_dyn();
        assert!(squeeze_to_2d(bands).is_none());
    }

    #[test]
    fn test_three_dimensional_dataset_is_rejected() {
        let source = MemoryDataset::new("scene.hdf5").with_array("L2_LST", Array3::<f64>::zeros((2, 2, 2)));
        assert!(matches!(find_temperature(&source, &keys()), Err(ConvertError::DatasetRead { .. })));
    }

    #[cfg(feature = "netcdf")]
    fn write_product(path: &Path, key: &str, values: &[f32]) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("band", 1).unwrap();
        file.add_dimension("line", 2).unwrap();
        file.add_dimension("sample", 3).unwrap();
        let mut variable = file.add_variable::<f32>(key, &["band", "line", "sample"]).unwrap();
        variable.put_values(values, ..).unwrap();
    }

    #[cfg(feature = "netcdf")]
    #[test]
    fn test_read_product_through_netcdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene_L2.nc");
        write_product(&path, "L2_LST", &[290.0, 291.0, -5.0, 0.0, 294.5, 295.0]);

        let source = open_dataset(&path).unwrap();
        assert!(source.keys().contains(&"L2_LST".to_string()));

        let (key, temperature) = find_temperature(source.as_ref(), &keys()).unwrap();
        assert_eq!(key, "L2_LST");
        assert_eq!(temperature.dim(), (2, 3));
        assert_eq!(temperature[[0, 1]], 291.0);
        assert_eq!(temperature[[1, 1]], 294.5);
        assert!(temperature[[0, 2]].is_nan());
        assert!(temperature[[1, 0]].is_nan());
    }

    #[cfg(feature = "netcdf")]
    #[test]
    fn test_netcdf_product_without_temperature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene_L2.nc");
        write_product(&path, "L2_Emissivity", &[0.9; 6]);

        let source = open_dataset(&path).unwrap();
        assert!(matches!(
            find_temperature(source.as_ref(), &keys()),
            Err(ConvertError::DatasetNotFound { .. })
        ));
        assert!(matches!(source.read_array("L2_LST"), Err(ConvertError::DatasetRead { .. })));
    }

    #[cfg(feature = "netcdf")]
    #[test]
    fn test_unreadable_container() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not an hdf5 file").unwrap();
        assert!(matches!(open_dataset(file.path()), Err(ConvertError::DatasetRead { .. })));
    }

    #[cfg(not(feature = "netcdf"))]
    #[test]
    fn test_open_without_hdf5_support() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(open_dataset(file.path()), Err(ConvertError::DatasetRead { .. })));
        assert!(matches!(open_dataset(Path::new("/nonexistent.hdf5")), Err(ConvertError::InputRead { .. })));
    }
}
