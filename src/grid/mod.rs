//! Regridding and raster output
//!
//! Scattered per-pixel samples are triangulated, linearly interpolated onto
//! a regular latitude/longitude grid and written as a single-band GeoTIFF.

pub mod triangulation;
pub mod interpolate;
pub mod regrid;
pub mod writer;

pub use interpolate::{LinearInterpolator, Sample, ScatteredInterpolator};
pub use regrid::{linspace, orient_north_up, regrid, sanitize_border, RegularGrid, Regridded};
pub use triangulation::{Location, Triangulation};
pub use writer::{Annotations, GridReport, GridWriter};
