//! Resampling of scattered samples onto a regular lat/lon grid

use log::{debug, info, warn};
use ndarray::{s, Array2};

use crate::coordinate::{BoundingBox, GeoTransform, Point};
use crate::errors::{ConvertError, ConvertResult};
use crate::grid::interpolate::{Sample, ScatteredInterpolator};

/// Evenly spaced longitudes and latitudes over a bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct RegularGrid {
    /// Longitude of grid row `i`
    pub lons: Vec<f64>,
    /// Latitude of grid column `j`
    pub lats: Vec<f64>,
}

impl RegularGrid {
    /// `n_lon` longitudes and `n_lat` latitudes spanning `bbox`, ends included
    pub fn new(bbox: &BoundingBox, n_lon: usize, n_lat: usize) -> Self {
        RegularGrid {
            lons: linspace(bbox.min_x, bbox.max_x, n_lon),
            lats: linspace(bbox.min_y, bbox.max_y, n_lat),
        }
    }

    /// Shape as (n_lon, n_lat)
    pub fn shape(&self) -> (usize, usize) {
        (self.lons.len(), self.lats.len())
    }

    /// Longitude array, `lon[i, j] = lons[i]`
    pub fn longitude(&self) -> Array2<f64> {
        Array2::from_shape_fn(self.shape(), |(i, _)| self.lons[i])
    }

    /// Latitude array, `lat[i, j] = lats[j]`
    pub fn latitude(&self) -> Array2<f64> {
        Array2::from_shape_fn(self.shape(), |(_, j)| self.lats[j])
    }
}

/// A regridded raster, north-up, with its georeferencing
#[derive(Debug, Clone)]
pub struct Regridded {
    /// Shape (n_lat, n_lon); row 0 is the northernmost latitude
    pub raster: Array2<f64>,
    pub transform: GeoTransform,
    pub bbox: BoundingBox,
    /// Number of non-NaN cells
    pub valid_cells: usize,
    /// Every cell is NaN
    pub degenerate: bool,
}

impl Regridded {
    pub fn width(&self) -> usize {
        self.raster.ncols()
    }

    pub fn height(&self) -> usize {
        self.raster.nrows()
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|k| if k == n - 1 { end } else { start + step * k as f64 })
                .collect()
        }
    }
}

/// Copy of `values` with the outermost rows and columns set to NaN
pub fn sanitize_border(values: &Array2<f64>) -> Array2<f64> {
    let mut sanitized = values.clone();
    let (rows, cols) = sanitized.dim();
    if rows == 0 || cols == 0 {
        return sanitized;
    }

    sanitized.row_mut(0).fill(f64::NAN);
    sanitized.row_mut(rows - 1).fill(f64::NAN);
    sanitized.column_mut(0).fill(f64::NAN);
    sanitized.column_mut(cols - 1).fill(f64::NAN);
    sanitized
}

/// Turn a (lon, lat) indexed array into north-up raster order
///
/// Flips the latitude axis then transposes, so output row `r` is latitude
/// index `n_lat - 1 - r` and column `c` is longitude index `c`.
pub fn orient_north_up(interpolated: Array2<f64>) -> Array2<f64> {
    interpolated
        .slice_move(s![.., ..;-1])
        .reversed_axes()
        .as_standard_layout()
        .into_owned()
}

/// Boustrophedon visiting order of a (rows, cols) array
///
/// Consecutive indices are always neighbours, which keeps point-location
/// walks short.
fn snake_order(rows: usize, cols: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..rows).flat_map(move |r| {
        (0..cols).map(move |c| if r % 2 == 0 { (r, c) } else { (r, cols - 1 - c) })
    })
}

/// Resample `values` located at (`longitude`, `latitude`) onto a regular grid
///
/// The grid has `values.nrows()` longitudes and `values.ncols()` latitudes
/// spanning the finite extent of the coordinates. The border of `values` is
/// treated as missing, as is any cell whose estimate is exactly zero.
pub fn regrid(
    values: &Array2<f64>,
    latitude: &Array2<f64>,
    longitude: &Array2<f64>,
    interpolator: &dyn ScatteredInterpolator,
) -> ConvertResult<Regridded> {
    let shape = values.dim();
    for coordinates in [latitude, longitude] {
        if coordinates.dim() != shape {
            return Err(ConvertError::ShapeMismatch {
                expected: values.len(),
                actual: coordinates.len(),
            });
        }
    }

    let bbox = BoundingBox::from_coordinates(longitude.view(), latitude.view())
        .ok_or(ConvertError::EmptyGeolocation)?;
    info!("Regridding {}x{} samples over {}", shape.0, shape.1, bbox);

    let (n_lon, n_lat) = shape;
    let grid = RegularGrid::new(&bbox, n_lon, n_lat);
    let sanitized = sanitize_border(values);

    let samples: Vec<Sample> = snake_order(shape.0, shape.1)
        .map(|idx| Sample::new(longitude[idx], latitude[idx], sanitized[idx]))
        .collect();
    let order: Vec<(usize, usize)> = snake_order(n_lon, n_lat).collect();
    let targets: Vec<Point> = order.iter()
        .map(|&(i, j)| Point::new(grid.lons[i], grid.lats[j]))
        .collect();

    debug!("Interpolating {} samples at {} targets with the {} interpolator",
           samples.len(), targets.len(), interpolator.name());
    let estimates = interpolator.interpolate(&samples, &targets);

    // Zero is never a valid temperature; an exact zero estimate is missing data
    let mut interpolated = Array2::from_elem((n_lon, n_lat), f64::NAN);
    for (&idx, value) in order.iter().zip(estimates) {
        if value != 0.0 {
            interpolated[idx] = value;
        }
    }

    let raster = orient_north_up(interpolated);
    let valid_cells = raster.iter().filter(|v| !v.is_nan()).count();
    let degenerate = valid_cells == 0;
    if degenerate {
        warn!("Interpolation produced no valid cells; the raster is entirely missing data");
    } else {
        debug!("{} of {} cells hold data", valid_cells, raster.len());
    }

    Ok(Regridded {
        transform: GeoTransform::from_extent(&bbox, n_lon, n_lat),
        raster,
        bbox,
        valid_cells,
        degenerate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::interpolate::LinearInterpolator;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_regular_grid_axes() {
        let grid = RegularGrid::new(&BoundingBox::new(-120.0, 0.0, -119.0, 2.0), 2, 3);
        assert_eq!(grid.longitude(), array![[-120.0, -120.0, -120.0], [-119.0, -119.0, -119.0]]);
        assert_eq!(grid.latitude(), array![[0.0, 1.0, 2.0], [0.0, 1.0, 2.0]]);
    }

    #[test]
    fn test_border_is_missing() {
        let values = Array2::from_elem((4, 5), 7.0);
        let sanitized = sanitize_border(&values);

        for ((r, c), v) in sanitized.indexed_iter() {
            let border = r == 0 || r == 3 || c == 0 || c == 4;
            assert_eq!(v.is_nan(), border, "cell ({}, {})", r, c);
        }
        // Input untouched
        assert!(values.iter().all(|&v| v == 7.0));
    }

    #[test]
    fn test_missing_border_stays_missing() {
        let mut values = Array2::from_elem((3, 3), f64::NAN);
        values[[1, 1]] = 1.0;
        let sanitized = sanitize_border(&values);
        assert_eq!(sanitized.iter().filter(|v| v.is_nan()).count(), 8);
    }

    #[test]
    fn test_north_up_orientation() {
        // interpolated[i, j]: lon index i, lat index j
        let interpolated = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let raster = orient_north_up(interpolated);
        assert_eq!(raster, array![[3.0, 6.0], [2.0, 5.0], [1.0, 4.0]]);
    }

    #[test]
    fn test_snake_order_visits_every_cell_once() {
        let order: Vec<_> = snake_order(3, 2).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 1), (1, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_regrid_planar_field() {
        // Lattice with longitude along rows and latitude along columns
        let n = 6;
        let longitude = Array2::from_shape_fn((n, n), |(i, _)| 10.0 + i as f64 * 0.2);
        let latitude = Array2::from_shape_fn((n, n), |(_, j)| 40.0 + j as f64 * 0.1);
        let values = Array2::from_shape_fn((n, n), |(i, j)| 280.0 + i as f64 + 2.0 * j as f64);

        let result = regrid(&values, &latitude, &longitude, &LinearInterpolator::new()).unwrap();
        assert_eq!(result.raster.dim(), (n, n));
        assert!(!result.degenerate);

        // Raster row r is latitude index n - 1 - r
        for r in 1..n - 1 {
            for c in 1..n - 1 {
                let j = n - 1 - r;
                assert_relative_eq!(result.raster[[r, c]], 280.0 + c as f64 + 2.0 * j as f64, epsilon = 1e-6);
            }
        }
        for c in 0..n {
            assert!(result.raster[[0, c]].is_nan());
            assert!(result.raster[[n - 1, c]].is_nan());
        }

        assert_relative_eq!(result.transform.origin_x, 10.0);
        assert_relative_eq!(result.transform.origin_y, 40.5, epsilon = 1e-12);
        assert_relative_eq!(result.transform.pixel_width, 1.0 / n as f64, epsilon = 1e-12);
        assert_relative_eq!(result.transform.pixel_height, 0.5 / n as f64, epsilon = 1e-12);
    }

    #[test]
    fn test_all_missing_is_degenerate() {
        let values = Array2::from_elem((3, 3), 300.0);
        let longitude = Array2::from_shape_fn((3, 3), |(i, _)| i as f64);
        let latitude = Array2::from_shape_fn((3, 3), |(_, j)| j as f64);

        // Only the centre sample survives the border
        let result = regrid(&values, &latitude, &longitude, &LinearInterpolator::new()).unwrap();
        assert_eq!(result.valid_cells, 1);

        let values = Array2::from_elem((2, 2), 300.0);
        let longitude = Array2::from_shape_fn((2, 2), |(i, _)| i as f64);
        let latitude = Array2::from_shape_fn((2, 2), |(_, j)| j as f64);
        let result = regrid(&values, &latitude, &longitude, &LinearInterpolator::new()).unwrap();
        assert!(result.degenerate);
        assert_eq!(result.valid_cells, 0);
    }

    #[test]
    fn test_zero_estimates_are_missing() {
        let n = 5;
        let mut values = Array2::from_elem((n, n), 300.0);
        values[[2, 2]] = 0.0;
        let longitude = Array2::from_shape_fn((n, n), |(i, _)| i as f64);
        let latitude = Array2::from_shape_fn((n, n), |(_, j)| j as f64);

        let result = regrid(&values, &latitude, &longitude, &LinearInterpolator::new()).unwrap();
        assert!(result.raster.iter().all(|&v| v != 0.0));
        assert!(result.raster[[2, 2]].is_nan());
        assert_relative_eq!(result.raster[[1, 2]], 300.0, epsilon = 1e-9);
        assert_eq!(result.valid_cells, 8);
    }

    #[test]
    fn test_shape_and_coordinate_errors() {
        let values = Array2::zeros((3, 3));
        let short = Array2::zeros((3, 2));
        assert!(matches!(
            regrid(&values, &short, &values, &LinearInterpolator::new()),
            Err(ConvertError::ShapeMismatch { expected: 9, actual: 6 })
        ));

        let nan = Array2::from_elem((3, 3), f64::NAN);
        assert!(matches!(
            regrid(&values, &nan, &nan, &LinearInterpolator::new()),
            Err(ConvertError::EmptyGeolocation)
        ));
    }
}
