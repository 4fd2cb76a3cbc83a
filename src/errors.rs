//! Conversion error taxonomy
//!
//! Every fatal condition of a conversion run maps onto one [`ConvertError`]
//! variant, and every variant maps onto a process exit code so the CLI can
//! report failures without inspecting message text.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::tiff::errors::TiffError;

/// Exit code for a successful run
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for header, shape, geolocation, config or input read failures
pub const EXIT_INPUT_PARSE: i32 = 1;
/// Exit code when no temperature dataset key is present
pub const EXIT_DATASET_NOT_FOUND: i32 = 2;
/// Exit code when the output raster cannot be written
pub const EXIT_OUTPUT_WRITE: i32 = 3;

/// Errors raised while converting a HyTES product into a GeoTIFF
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Header line without a separator, non-numeric value or missing key
    #[error("Invalid geolocation header {path} (line {line}): {reason}")]
    HeaderParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Geolocation binary size disagrees with the header dimensions
    #[error("Geolocation size mismatch: header declares {expected} values, file holds {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// No finite latitude/longitude pair to regrid from
    #[error("Geolocation holds no finite latitude/longitude values")]
    EmptyGeolocation,

    /// None of the temperature dataset keys exist in the data file
    #[error("Temperature dataset not found in {path}; tried keys: {}", .keys.join(", "))]
    DatasetNotFound { path: PathBuf, keys: Vec<String> },

    /// The data file could not be opened or a dataset could not be decoded
    #[error("Failed to read dataset from {path}: {reason}")]
    DatasetRead { path: PathBuf, reason: String },

    /// An input file could not be read
    #[error("Failed to read {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A written raster could not be read back
    #[error("Failed to read raster {path}: {source}")]
    RasterRead {
        path: PathBuf,
        #[source]
        source: TiffError,
    },

    /// The output raster could not be created or persisted
    #[error("Failed to write raster {path}: {source}")]
    RasterWrite {
        path: PathBuf,
        #[source]
        source: TiffError,
    },
}

impl ConvertError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::DatasetNotFound { .. } => EXIT_DATASET_NOT_FOUND,
            ConvertError::RasterWrite { .. } => EXIT_OUTPUT_WRITE,
            ConvertError::HeaderParse { .. }
            | ConvertError::ShapeMismatch { .. }
            | ConvertError::EmptyGeolocation
            | ConvertError::RasterRead { .. }
            | ConvertError::DatasetRead { .. }
            | ConvertError::InputRead { .. }
            | ConvertError::Config(_) => EXIT_INPUT_PARSE,
        }
    }

    /// Wrap a TIFF error raised while writing `path`
    pub fn raster_write(path: impl Into<PathBuf>, source: impl Into<TiffError>) -> Self {
        ConvertError::RasterWrite {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Wrap a TIFF error raised while reading `path`
    pub fn raster_read(path: impl Into<PathBuf>, source: impl Into<TiffError>) -> Self {
        ConvertError::RasterRead {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Wrap an I/O error raised while reading `path`
    pub fn input_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConvertError::InputRead {
            path: path.into(),
            source,
        }
    }
}

/// Result type for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let not_found = ConvertError::DatasetNotFound {
            path: PathBuf::from("scene.hdf5"),
            keys: vec!["L2_LST".to_string(), "l2_land_surface_temperature".to_string()],
        };
        assert_eq!(not_found.exit_code(), EXIT_DATASET_NOT_FOUND);

        let shape = ConvertError::ShapeMismatch { expected: 64, actual: 60 };
        assert_eq!(shape.exit_code(), EXIT_INPUT_PARSE);

        let write = ConvertError::raster_write("/nope/out.tif", TiffError::MissingDimensions);
        assert_eq!(write.exit_code(), EXIT_OUTPUT_WRITE);
    }

    #[test]
    fn test_messages_name_keys_and_paths() {
        let not_found = ConvertError::DatasetNotFound {
            path: PathBuf::from("scene.hdf5"),
            keys: vec!["L2_LST".to_string(), "l2_land_surface_temperature".to_string()],
        };
        let message = not_found.to_string();
        assert!(message.contains("L2_LST"));
        assert!(message.contains("l2_land_surface_temperature"));

        let write = ConvertError::raster_write("/nope/out.tif", TiffError::MissingDimensions);
        assert!(write.to_string().contains("/nope/out.tif"));
    }
}
