//! Bounding box structure for geographic extents

use std::fmt;
use ndarray::ArrayView2;

use super::point::Point;

/// A bounding box in a coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Extent of longitude and latitude arrays
    ///
    /// Each axis is reduced over its own finite values. Returns `None` when
    /// either array holds no finite value at all.
    pub fn from_coordinates(longitude: ArrayView2<f64>, latitude: ArrayView2<f64>) -> Option<Self> {
        let (min_x, max_x) = finite_range(longitude.iter().copied())?;
        let (min_y, max_y) = finite_range(latitude.iter().copied())?;
        Some(BoundingBox::new(min_x, min_y, max_x, max_y))
    }

    /// Extent of the points whose coordinates are both finite
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let finite: Vec<&Point> = points.iter().filter(|p| p.is_finite()).collect();
        let (min_x, max_x) = finite_range(finite.iter().map(|p| p.x))?;
        let (min_y, max_y) = finite_range(finite.iter().map(|p| p.y))?;
        Some(BoundingBox::new(min_x, min_y, max_x, max_y))
    }

    /// Get the width of the bounding box
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Get the height of the bounding box
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}, {:.6}, {:.6}]", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Minimum and maximum over the finite values of an iterator
fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_extent_ignores_nan() {
        let lon = array![[-120.0, f64::NAN], [-119.7, -119.9]];
        let lat = array![[0.0, 0.1], [f64::NAN, 0.3]];

        let bbox = BoundingBox::from_coordinates(lon.view(), lat.view()).unwrap();
        assert_eq!(bbox, BoundingBox::new(-120.0, 0.0, -119.7, 0.3));
        assert_eq!((bbox.width(), bbox.height()), (-119.7 - -120.0, 0.3));
    }

    #[test]
    fn test_extent_of_missing_coordinates() {
        let lon = array![[f64::NAN, f64::NAN]];
        let lat = array![[1.0, 2.0]];
        assert!(BoundingBox::from_coordinates(lon.view(), lat.view()).is_none());
    }
}
