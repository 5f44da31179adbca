//! Synthetic point clouds with known values.
//!
//! All random generators are seeded so failures reproduce.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Points and values in the shape `SurfaceImageBuilder::set_points` takes:
/// `(lat, lon)` pairs plus a parallel value vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoints {
    pub points: Vec<(f64, f64)>,
    pub values: Vec<f64>,
}

impl SamplePoints {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Regular `n x n` lattice over the given ranges, valued by
/// `a + b*lat + c*lon`.
///
/// # Example
///
/// ```
/// use test_utils::planar_points;
///
/// let s = planar_points((0.0, 1.0), (0.0, 1.0), 3, (0.0, 1.0, 2.0));
/// assert_eq!(s.len(), 9);
/// assert_eq!(s.values[8], 3.0);
/// ```
pub fn planar_points(
    lat_range: (f64, f64),
    lon_range: (f64, f64),
    n: usize,
    (a, b, c): (f64, f64, f64),
) -> SamplePoints {
    let mut points = Vec::with_capacity(n * n);
    let mut values = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let lat = lerp(lat_range, i, n);
            let lon = lerp(lon_range, j, n);
            points.push((lat, lon));
            values.push(a + b * lat + c * lon);
        }
    }
    SamplePoints { points, values }
}

/// Points on `rings` concentric circles (plus the center) around
/// `center`, valued by distance from the center normalized to `[0, 1]`.
pub fn radial_points(center: (f64, f64), radius: f64, rings: usize, per_ring: usize) -> SamplePoints {
    let mut points = vec![center];
    let mut values = vec![0.0];
    for ring in 1..=rings {
        let r = radius * ring as f64 / rings as f64;
        for k in 0..per_ring {
            let theta = std::f64::consts::TAU * k as f64 / per_ring as f64;
            points.push((center.0 + r * theta.sin(), center.1 + r * theta.cos()));
            values.push(r / radius);
        }
    }
    SamplePoints { points, values }
}

/// `count` uniformly random points inside the ranges with values in
/// `[0, 1)`.
pub fn scattered_points(
    lat_range: (f64, f64),
    lon_range: (f64, f64),
    count: usize,
    seed: u64,
) -> SamplePoints {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(count);
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        points.push((
            rng.gen_range(lat_range.0..=lat_range.1),
            rng.gen_range(lon_range.0..=lon_range.1),
        ));
        values.push(rng.gen::<f64>());
    }
    SamplePoints { points, values }
}

fn lerp((min, max): (f64, f64), i: usize, n: usize) -> f64 {
    if n <= 1 {
        min
    } else {
        min + (max - min) * i as f64 / (n - 1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_points_corners() {
        let s = planar_points((10.0, 20.0), (30.0, 40.0), 4, (1.0, 0.0, 1.0));
        assert_eq!(s.points[0], (10.0, 30.0));
        assert_eq!(s.points[15], (20.0, 40.0));
        assert_eq!(s.values[15], 41.0);
    }

    #[test]
    fn test_radial_points_count() {
        let s = radial_points((0.0, 0.0), 1.0, 3, 8);
        assert_eq!(s.len(), 1 + 3 * 8);
        assert!(s.values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_scattered_points_seeded() {
        let a = scattered_points((0.0, 1.0), (0.0, 1.0), 20, 7);
        let b = scattered_points((0.0, 1.0), (0.0, 1.0), 20, 7);
        assert_eq!(a, b);
        assert!(a
            .points
            .iter()
            .all(|&(lat, lon)| (0.0..=1.0).contains(&lat) && (0.0..=1.0).contains(&lon)));
    }
}
