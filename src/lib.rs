//! Conversion of HyTES Level-2 land surface temperature products into
//! georeferenced rasters.
//!
//! The [`loader`] reads the geolocation header, the geolocation binary and
//! the temperature dataset; the [`grid`] module regrids the scattered
//! samples onto a regular WGS84 grid and writes a GeoTIFF through the
//! crate's own [`tiff`] writer.

pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod coordinate;
pub mod errors;
pub mod loader;
pub mod grid;
pub mod config;
pub mod api;
pub mod commands;

pub use crate::api::{convert, convert_with_source, inspect, read_raster, ConversionReport, RasterSummary};
pub use crate::config::{ConfigLayer, ConversionConfig};
pub use crate::errors::{ConvertError, ConvertResult};
pub use crate::loader::{DatasetSource, InputLoader, LoadedScene, MemoryDataset};
pub use crate::grid::{GridReport, GridWriter, LinearInterpolator, ScatteredInterpolator};
pub use coordinate::{BoundingBox, GeoTransform, Point, CoordinateSystem};
pub use tiff::TiffReader;
