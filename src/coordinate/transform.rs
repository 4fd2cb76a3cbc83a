//! Affine geotransform between pixel and world coordinates

use std::fmt;

use super::bbox::BoundingBox;
use crate::tiff::errors::{TiffError, TiffResult};

/// North-up affine geotransform
///
/// Equivalent to the six coefficients
/// `[origin_x, pixel_width, 0, origin_y, 0, -pixel_height]`, where the origin
/// is the outer corner of the top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// X coordinate of the top-left corner
    pub origin_x: f64,
    /// Y coordinate of the top-left corner
    pub origin_y: f64,
    /// Pixel size along X
    pub pixel_width: f64,
    /// Pixel size along Y (positive; rows run southwards)
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Geotransform covering `bbox` with `columns` x `rows` pixels
    pub fn from_extent(bbox: &BoundingBox, columns: usize, rows: usize) -> Self {
        GeoTransform {
            origin_x: bbox.min_x,
            origin_y: bbox.max_y,
            pixel_width: bbox.width() / columns as f64,
            pixel_height: bbox.height() / rows as f64,
        }
    }

    /// Rebuild a geotransform from ModelPixelScale and ModelTiepoint values
    ///
    /// Only a tiepoint anchored at raster position (0, 0) is supported.
    pub fn from_model_tags(pixel_scale: &[f64], tiepoint: &[f64]) -> TiffResult<Self> {
        if pixel_scale.len() < 2 || tiepoint.len() < 6 {
            return Err(TiffError::GenericError(format!(
                "Incomplete georeferencing: {} scale values, {} tiepoint values",
                pixel_scale.len(), tiepoint.len()
            )));
        }

        let (raster_x, raster_y) = (tiepoint[0], tiepoint[1]);
        Ok(GeoTransform {
            origin_x: tiepoint[3] - raster_x * pixel_scale[0],
            origin_y: tiepoint[4] + raster_y * pixel_scale[1],
            pixel_width: pixel_scale[0],
            pixel_height: pixel_scale[1],
        })
    }

    /// The six GDAL-ordered coefficients
    pub fn to_array(&self) -> [f64; 6] {
        [self.origin_x, self.pixel_width, 0.0, self.origin_y, 0.0, -self.pixel_height]
    }

    /// ModelPixelScale tag values
    pub fn pixel_scale(&self) -> [f64; 3] {
        [self.pixel_width, self.pixel_height, 0.0]
    }

    /// ModelTiepoint tag values tying raster (0, 0) to the origin
    pub fn tiepoint(&self) -> [f64; 6] {
        [0.0, 0.0, 0.0, self.origin_x, self.origin_y, 0.0]
    }

    /// Extent of a raster of the given size
    pub fn bounds(&self, columns: usize, rows: usize) -> BoundingBox {
        BoundingBox::new(
            self.origin_x,
            self.origin_y - rows as f64 * self.pixel_height,
            self.origin_x + columns as f64 * self.pixel_width,
            self.origin_y,
        )
    }
}

impl fmt::Display for GeoTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.to_array();
        write!(f, "[{}, {}, {}, {}, {}, {}]", c[0], c[1], c[2], c[3], c[4], c[5])
    }
}
