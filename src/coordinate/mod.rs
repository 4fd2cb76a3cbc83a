//! Coordinate handling for geospatial data
//!
//! This module provides the geographic primitives shared by the grid writer
//! and the raster inspector: points, bounding boxes, affine geotransforms and
//! the coordinate reference system written into the GeoKey directory.

mod bbox;
mod point;
mod transform;
mod crs;

// Re-export key types
pub use self::bbox::BoundingBox;
pub use self::point::Point;
pub use self::transform::GeoTransform;
pub use self::crs::{CoordinateSystem, CoordinateSystemFactory};
