//! Scattered-data interpolation

use log::{debug, info};

use crate::coordinate::{BoundingBox, Point};
use crate::grid::triangulation::Triangulation;
use crate::utils::progress::ProgressTracker;

/// Barycentric weight below which a vertex does not contribute
///
/// Absorbs the single-precision rounding of the geolocation, so a target
/// sitting on a vertex takes that vertex's value.
pub const NEGLIGIBLE_WEIGHT: f64 = 1e-4;

/// A known value at a scattered location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub point: Point,
    pub value: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Sample {
            point: Point::new(x, y),
            value,
        }
    }
}

/// Strategy for resampling scattered values at target points
pub trait ScatteredInterpolator {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Value at every target, NaN where it cannot be estimated
    fn interpolate(&self, samples: &[Sample], targets: &[Point]) -> Vec<f64>;
}

/// Piecewise-linear interpolation over a Delaunay triangulation
///
/// Targets outside the convex hull of the samples are NaN, as is any target
/// whose triangle has a contributing NaN vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator {
    show_progress: bool,
}

impl LinearInterpolator {
    pub fn new() -> Self {
        LinearInterpolator::default()
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn triangulate(&self, samples: &[Sample]) -> Option<(Triangulation, Vec<f64>)> {
        let points: Vec<Point> = samples.iter().map(|s| s.point).collect();
        let bounds = BoundingBox::from_points(&points)?;

        let mut triangulation = Triangulation::new(&bounds);
        let mut values = Vec::with_capacity(samples.len());

        let progress = ProgressTracker::with_visibility(samples.len() as u64, "Triangulating", self.show_progress);
        for (i, sample) in samples.iter().enumerate() {
            if triangulation.insert(sample.point.x, sample.point.y).is_some() {
                values.push(sample.value);
            }
            if i % 1024 == 1023 {
                progress.increment(1024);
            }
        }
        progress.increment(samples.len() as u64 % 1024);
        progress.finish();

        info!("Triangulated {} vertices into {} triangles ({} points skipped)",
              triangulation.vertex_count(), triangulation.triangle_count(), triangulation.skipped_count());
        Some((triangulation, values))
    }
}

impl ScatteredInterpolator for LinearInterpolator {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn interpolate(&self, samples: &[Sample], targets: &[Point]) -> Vec<f64> {
        let Some((mut triangulation, values)) = self.triangulate(samples) else {
            debug!("No finite sample coordinates; every target is missing");
            return vec![f64::NAN; targets.len()];
        };

        let progress = ProgressTracker::with_visibility(targets.len() as u64, "Interpolating", self.show_progress);
        let mut result = Vec::with_capacity(targets.len());

        for (i, target) in targets.iter().enumerate() {
            let value = triangulation.locate(target.x, target.y)
                .map_or(f64::NAN, |location| blend(&location.vertices, &location.weights, &values));
            result.push(value);

            if i % 1024 == 1023 {
                progress.increment(1024);
            }
        }
        progress.increment(targets.len() as u64 % 1024);
        progress.finish();

        result
    }
}

/// Weighted sum of the contributing vertex values
fn blend(vertices: &[usize; 3], weights: &[f64; 3], values: &[f64]) -> f64 {
    let mut total = 0.0;
    let mut weight_sum = 0.0;

    for (&vertex, &weight) in vertices.iter().zip(weights) {
        if weight < NEGLIGIBLE_WEIGHT {
            continue;
        }
        let value = values[vertex];
        if value.is_nan() {
            return f64::NAN;
        }
        total += weight * value;
        weight_sum += weight;
    }

    if weight_sum > 0.0 {
        total / weight_sum
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plane_samples() -> Vec<Sample> {
        // v = 2x + 3y + 1 sampled on a 5 x 5 lattice
        let mut samples = Vec::new();
        for row in 0..5 {
            for col in 0..5 {
                let (x, y) = (col as f64 * 0.25, row as f64 * 0.25);
                samples.push(Sample::new(x, y, 2.0 * x + 3.0 * y + 1.0));
            }
        }
        samples
    }

    #[test]
    fn test_reproduces_linear_field() {
        let targets = vec![Point::new(0.3, 0.7), Point::new(0.9, 0.1), Point::new(0.5, 0.5)];
        let result = LinearInterpolator::new().interpolate(&plane_samples(), &targets);

        for (target, value) in targets.iter().zip(result) {
            assert_relative_eq!(value, 2.0 * target.x + 3.0 * target.y + 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_outside_hull_is_nan() {
        let result = LinearInterpolator::new().interpolate(&plane_samples(), &[Point::new(1.5, 0.5)]);
        assert!(result[0].is_nan());
    }

    #[test]
    fn test_nan_vertex_poisons_its_triangles_only() {
        let mut samples = plane_samples();
        // Corner sample at (1, 1)
        samples[24].value = f64::NAN;

        let targets = vec![Point::new(0.9, 0.95), Point::new(1.0, 1.0), Point::new(0.25, 0.25)];
        let result = LinearInterpolator::new().interpolate(&samples, &targets);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_relative_eq!(result[2], 2.25, epsilon = 1e-9);
    }

    #[test]
    fn test_target_near_vertex_ignores_nan_neighbours() {
        let mut samples = plane_samples();
        for sample in samples.iter_mut() {
            if sample.point.x == 0.0 || sample.point.y == 0.0 {
                sample.value = f64::NAN;
            }
        }

        // A hair away from the valid vertex (0.25, 0.25)
        let result = LinearInterpolator::new().interpolate(&samples, &[Point::new(0.25 + 1e-7, 0.25 - 1e-7)]);
        assert_relative_eq!(result[0], 2.25, epsilon = 1e-5);
    }

    #[test]
    fn test_no_finite_samples() {
        let samples = vec![Sample::new(f64::NAN, 0.0, 1.0)];
        let result = LinearInterpolator::new().interpolate(&samples, &[Point::new(0.0, 0.0)]);
        assert!(result[0].is_nan());
    }

    #[test]
    fn test_blend_skips_negligible_weights() {
        let values = [10.0, f64::NAN, 20.0];
        assert_relative_eq!(blend(&[0, 1, 2], &[0.5, 1e-9, 0.5], &values), 15.0);
        assert!(blend(&[0, 1, 2], &[0.5, 0.25, 0.25], &values).is_nan());
    }
}
