//! Incremental Delaunay triangulation
//!
//! Bowyer-Watson insertion inside an enclosing super-triangle. Points are
//! mapped into the unit box with one uniform scale so the triangulation is
//! the same as in the original coordinates. Triangles store their
//! neighbours, so locating a point is a walk from the previously touched
//! triangle; feeding points in spatially coherent order keeps walks short.

use std::collections::HashMap;

use log::trace;

use crate::coordinate::BoundingBox;

/// Number of super-triangle vertices preceding the data vertices
const SUPER_VERTICES: usize = 3;

/// Squared distance (unit box) under which two points are the same vertex
const DUPLICATE_DISTANCE_SQ: f64 = 1e-24;

/// Slack on orientation tests for points on an edge or vertex
const EDGE_TOLERANCE: f64 = 1e-12;

/// Triangles examined around an edge or vertex before giving up
const FAN_LIMIT: usize = 64;

#[derive(Debug, Clone)]
struct Triangle {
    /// Vertex ids in counter-clockwise order
    v: [usize; 3],
    /// `n[i]` is the triangle across the edge opposite `v[i]`
    n: [Option<usize>; 3],
    alive: bool,
}

/// A query point's enclosing triangle and barycentric weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Insertion ordinals of the data vertices
    pub vertices: [usize; 3],
    /// Barycentric weights, summing to one
    pub weights: [f64; 3],
}

/// Delaunay triangulation of scattered points
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    triangles: Vec<Triangle>,
    free: Vec<usize>,
    last: usize,
    visited: Vec<u32>,
    in_cavity: Vec<u32>,
    epoch: u32,
    origin: [f64; 2],
    scale: f64,
    skipped: usize,
}

impl Triangulation {
    /// Empty triangulation covering `bounds`
    pub fn new(bounds: &BoundingBox) -> Self {
        let span = bounds.width().max(bounds.height());
        let scale = if span > 0.0 && span.is_finite() { span } else { 1.0 };

        let mut triangulation = Triangulation {
            points: vec![[-10.0, -10.0], [30.0, -10.0], [-10.0, 30.0]],
            triangles: Vec::new(),
            free: Vec::new(),
            last: 0,
            visited: Vec::new(),
            in_cavity: Vec::new(),
            epoch: 0,
            origin: [bounds.min_x, bounds.min_y],
            scale,
            skipped: 0,
        };
        triangulation.allocate(Triangle {
            v: [0, 1, 2],
            n: [None, None, None],
            alive: true,
        });
        triangulation
    }

    /// Number of data vertices inserted
    pub fn vertex_count(&self) -> usize {
        self.points.len() - SUPER_VERTICES
    }

    /// Number of points rejected as duplicates, non-finite or unplaceable
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Number of triangles between data vertices only
    pub fn triangle_count(&self) -> usize {
        (0..self.triangles.len())
            .filter(|&t| self.triangles[t].alive && self.is_data_triangle(t))
            .count()
    }

    /// Insert a point, returning its insertion ordinal
    ///
    /// Returns `None` when the point is not finite, duplicates an existing
    /// vertex or cannot be placed.
    pub fn insert(&mut self, x: f64, y: f64) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() {
            self.skipped += 1;
            return None;
        }

        let p = self.normalize(x, y);
        let Some(start) = self.locate_triangle(p) else {
            self.skipped += 1;
            return None;
        };

        let duplicate = self.triangles[start].v.iter()
            .any(|&v| distance_sq(self.points[v], p) < DUPLICATE_DISTANCE_SQ);
        if duplicate {
            trace!("Skipping duplicate point ({}, {})", x, y);
            self.skipped += 1;
            return None;
        }

        let mut cavity = self.cavity(start, p);
        let Some(boundary) = self.cavity_boundary(&mut cavity, p) else {
            trace!("Skipping point ({}, {}) on the outer boundary", x, y);
            self.skipped += 1;
            return None;
        };

        let id = self.points.len();
        self.points.push(p);

        for &t in &cavity {
            self.triangles[t].alive = false;
            self.free.push(t);
        }

        let mut created = Vec::with_capacity(boundary.len());
        for &(a, b, outside) in &boundary {
            let t = self.allocate(Triangle {
                v: [a, b, id],
                n: [None, None, outside],
                alive: true,
            });
            if let Some(o) = outside {
                self.relink(o, b, a, t);
            }
            created.push(t);
        }

        // The cavity boundary is a closed loop: [a, b, p] meets [b, c, p]
        let by_start: HashMap<usize, usize> = created.iter()
            .map(|&t| (self.triangles[t].v[0], t))
            .collect();
        for &t in &created {
            let b = self.triangles[t].v[1];
            if let Some(&next) = by_start.get(&b) {
                self.triangles[t].n[0] = Some(next);
                self.triangles[next].n[1] = Some(t);
            }
        }

        if let Some(&t) = created.first() {
            self.last = t;
        }
        Some(id - SUPER_VERTICES)
    }

    /// Find the triangle of data vertices enclosing a point
    ///
    /// Returns `None` outside the convex hull of the data.
    pub fn locate(&mut self, x: f64, y: f64) -> Option<Location> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        let p = self.normalize(x, y);
        let t = self.locate_triangle(p)?;
        let t = self.settle(t, p);
        self.last = t;

        let v = self.triangles[t].v;
        if v.iter().any(|&id| id < SUPER_VERTICES) {
            return None;
        }

        let [a, b, c] = v.map(|id| self.points[id]);
        let area = orient(a, b, c);
        if area <= 0.0 {
            return None;
        }

        Some(Location {
            vertices: v.map(|id| id - SUPER_VERTICES),
            weights: [
                orient(p, b, c) / area,
                orient(a, p, c) / area,
                orient(a, b, p) / area,
            ],
        })
    }

    fn normalize(&self, x: f64, y: f64) -> [f64; 2] {
        [(x - self.origin[0]) / self.scale, (y - self.origin[1]) / self.scale]
    }

    fn allocate(&mut self, triangle: Triangle) -> usize {
        if let Some(t) = self.free.pop() {
            self.triangles[t] = triangle;
            t
        } else {
            self.triangles.push(triangle);
            self.visited.push(0);
            self.in_cavity.push(0);
            self.triangles.len() - 1
        }
    }

    fn next_epoch(&mut self) -> u32 {
        if self.epoch == u32::MAX {
            self.visited.iter_mut().for_each(|m| *m = 0);
            self.in_cavity.iter_mut().for_each(|m| *m = 0);
            self.epoch = 0;
        }
        self.epoch += 1;
        self.epoch
    }

    /// Point the edge `from -> to` of triangle `o` at triangle `t`
    fn relink(&mut self, o: usize, from: usize, to: usize, t: usize) {
        let triangle = &mut self.triangles[o];
        for k in 0..3 {
            if triangle.v[(k + 1) % 3] == from && triangle.v[(k + 2) % 3] == to {
                triangle.n[k] = Some(t);
                return;
            }
        }
    }

    /// Walk towards `p`, falling back to a scan if the walk stalls
    fn locate_triangle(&self, p: [f64; 2]) -> Option<usize> {
        let mut t = if self.triangles.get(self.last).map_or(false, |t| t.alive) {
            self.last
        } else {
            self.triangles.iter().position(|t| t.alive)?
        };

        for _ in 0..self.triangles.len() + SUPER_VERTICES {
            let triangle = &self.triangles[t];
            let exit = (0..3).find(|&i| {
                let a = self.points[triangle.v[(i + 1) % 3]];
                let b = self.points[triangle.v[(i + 2) % 3]];
                orient(a, b, p) < 0.0
            });

            match exit {
                None => return Some(t),
                Some(i) => match triangle.n[i] {
                    Some(next) => t = next,
                    None => return None,
                },
            }
        }

        self.scan(p)
    }

    fn scan(&self, p: [f64; 2]) -> Option<usize> {
        (0..self.triangles.len()).find(|&t| self.triangles[t].alive && self.contains(t, p))
    }

    fn contains(&self, t: usize, p: [f64; 2]) -> bool {
        let triangle = &self.triangles[t];
        (0..3).all(|i| {
            let a = self.points[triangle.v[(i + 1) % 3]];
            let b = self.points[triangle.v[(i + 2) % 3]];
            orient(a, b, p) >= -EDGE_TOLERANCE
        })
    }

    fn is_data_triangle(&self, t: usize) -> bool {
        self.triangles[t].v.iter().all(|&v| v >= SUPER_VERTICES)
    }

    /// Prefer a data triangle when `p` sits on an edge or vertex shared with one
    fn settle(&self, start: usize, p: [f64; 2]) -> usize {
        if self.is_data_triangle(start) {
            return start;
        }

        let mut seen = vec![start];
        let mut pending = vec![start];
        while let Some(t) = pending.pop() {
            for nb in self.triangles[t].n.into_iter().flatten() {
                if seen.len() >= FAN_LIMIT || seen.contains(&nb) {
                    continue;
                }
                seen.push(nb);

                if self.contains(nb, p) {
                    if self.is_data_triangle(nb) {
                        return nb;
                    }
                    pending.push(nb);
                }
            }
        }

        start
    }

    /// Triangles whose circumcircle holds `p`, grown from `start`
    fn cavity(&mut self, start: usize, p: [f64; 2]) -> Vec<usize> {
        let epoch = self.next_epoch();
        self.visited[start] = epoch;
        self.in_cavity[start] = epoch;

        let mut cavity = vec![start];
        let mut pending = vec![start];
        while let Some(t) = pending.pop() {
            let neighbours = self.triangles[t].n;
            for nb in neighbours.into_iter().flatten() {
                if self.visited[nb] == epoch {
                    continue;
                }
                self.visited[nb] = epoch;

                let [a, b, c] = self.triangles[nb].v.map(|id| self.points[id]);
                if in_circle(a, b, c, p) > 0.0 {
                    self.in_cavity[nb] = epoch;
                    cavity.push(nb);
                    pending.push(nb);
                }
            }
        }

        cavity
    }

    /// Boundary edges `(a, b, outside)` of the cavity, each seeing `p` on its left
    ///
    /// Edges that fail the orientation test pull their outer triangle into
    /// the cavity until the cavity is star-shaped around `p`.
    fn cavity_boundary(&mut self, cavity: &mut Vec<usize>, p: [f64; 2]) -> Option<Vec<(usize, usize, Option<usize>)>> {
        let epoch = self.epoch;

        loop {
            let mut boundary = Vec::new();
            let mut grow = None;

            'triangles: for &t in cavity.iter() {
                let triangle = &self.triangles[t];
                for i in 0..3 {
                    let outside = triangle.n[i];
                    if outside.map_or(false, |o| self.in_cavity[o] == epoch) {
                        continue;
                    }

                    let a = triangle.v[(i + 1) % 3];
                    let b = triangle.v[(i + 2) % 3];
                    if orient(self.points[a], self.points[b], p) <= 0.0 {
                        grow = Some(outside?);
                        break 'triangles;
                    }
                    boundary.push((a, b, outside));
                }
            }

            match grow {
                Some(o) => {
                    self.in_cavity[o] = epoch;
                    cavity.push(o);
                }
                None => return Some(boundary),
            }
        }
    }
}

/// Twice the signed area of `abc`, positive when counter-clockwise
fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Positive when `d` lies inside the circumcircle of counter-clockwise `abc`
fn in_circle(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2]) -> f64 {
    let (adx, ady) = (a[0] - d[0], a[1] - d[1]);
    let (bdx, bdy) = (b[0] - d[0], b[1] - d[1]);
    let (cdx, cdy) = (c[0] - d[0], c[1] - d[1]);

    (adx * adx + ady * ady) * (bdx * cdy - cdx * bdy)
        + (bdx * bdx + bdy * bdy) * (cdx * ady - adx * cdy)
        + (cdx * cdx + cdy * cdy) * (adx * bdy - bdx * ady)
}

fn distance_sq(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Triangulation {
        let mut triangulation = Triangulation::new(&BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            assert!(triangulation.insert(x, y).is_some());
        }
        triangulation
    }

    #[test]
    fn test_square_has_two_triangles() {
        let triangulation = unit_square();
        assert_eq!(triangulation.vertex_count(), 4);
        assert_eq!(triangulation.triangle_count(), 2);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let mut triangulation = unit_square();
        let location = triangulation.locate(0.25, 0.6).unwrap();
        assert_relative_eq!(location.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(location.weights.iter().all(|&w| w >= 0.0));
    }

    #[test]
    fn test_vertex_query_has_unit_weight() {
        let mut triangulation = unit_square();
        let location = triangulation.locate(1.0, 1.0).unwrap();
        let at_vertex = location.vertices.iter()
            .zip(location.weights)
            .find(|(&v, _)| v == 2)
            .map(|(_, w)| w)
            .unwrap();
        assert_relative_eq!(at_vertex, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_outside_hull() {
        let mut triangulation = unit_square();
        assert!(triangulation.locate(1.5, 0.5).is_none());
        assert!(triangulation.locate(f64::NAN, 0.5).is_none());
    }

    #[test]
    fn test_duplicates_and_nan_are_skipped() {
        let mut triangulation = unit_square();
        assert!(triangulation.insert(1.0, 1.0).is_none());
        assert!(triangulation.insert(f64::NAN, 0.2).is_none());
        assert_eq!(triangulation.skipped_count(), 2);
        assert_eq!(triangulation.insert(0.5, 0.5), Some(4));
        assert_eq!(triangulation.triangle_count(), 4);
    }

    #[test]
    fn test_lattice_triangle_count() {
        // n x n lattice triangulates into 2 (n - 1)^2 triangles
        let n = 12;
        let mut triangulation = Triangulation::new(&BoundingBox::new(10.0, -5.0, 10.0 + (n - 1) as f64 * 0.1, -5.0 + (n - 1) as f64 * 0.1));
        for row in 0..n {
            for col in 0..n {
                let col = if row % 2 == 0 { col } else { n - 1 - col };
                triangulation.insert(10.0 + col as f64 * 0.1, -5.0 + row as f64 * 0.1);
            }
        }

        assert_eq!(triangulation.vertex_count(), n * n);
        assert_eq!(triangulation.triangle_count(), 2 * (n - 1) * (n - 1));
    }

    #[test]
    fn test_delaunay_property_on_scattered_points() {
        let mut triangulation = Triangulation::new(&BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        // Deterministic pseudo-random points
        let mut state = 12345u64;
        for _ in 0..300 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let x = (state >> 11) as f64 / (1u64 << 53) as f64;
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let y = (state >> 11) as f64 / (1u64 << 53) as f64;
            triangulation.insert(x, y);
        }

        assert_eq!(triangulation.vertex_count(), 300);
        for (t, triangle) in triangulation.triangles.iter().enumerate() {
            if !triangle.alive || !triangulation.is_data_triangle(t) {
                continue;
            }
            let [a, b, c] = triangle.v.map(|id| triangulation.points[id]);
            assert!(orient(a, b, c) > 0.0);
            for (id, &p) in triangulation.points.iter().enumerate().skip(SUPER_VERTICES) {
                if triangle.v.contains(&id) {
                    continue;
                }
                assert!(in_circle(a, b, c, p) <= 1e-9);
            }
        }
    }
}
