//! Synthetic boundary points along the edges of the grid domain.
//!
//! Cubic interpolation is undefined outside the convex hull of the known
//! points. Seeding the four edges with nearest-neighbour values extends
//! the hull to the full rectangle so the rendered image has no empty
//! border.

use crate::error::{SurfaceError, SurfaceResult};
use crate::grid::{GeoPoint, Grid};
use crate::kdtree::KdTree;
use crate::points::PointSet;

/// `n` evenly spaced samples from `start` to `end`, both inclusive.
///
/// `n == 1` yields `[start]`; `n == 0` yields nothing.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            // Pin the last sample so rounding never overshoots the range.
            out[n - 1] = end;
            out
        }
    }
}

/// Boundary ring for a grid with `per_side` samples on each axis.
///
/// Order: for every sampled longitude the bottom then top edge point,
/// then for every interior latitude the left then right edge point. The
/// four corners appear once each.
pub fn boundary_ring(grid: &Grid, per_side: usize) -> Vec<GeoPoint> {
    let (lat_min, lat_max) = grid.lat_range();
    let (lon_min, lon_max) = grid.lon_range();
    let lats = linspace(lat_min, lat_max, per_side);
    let lons = linspace(lon_min, lon_max, per_side);

    let (first_lat, last_lat) = match (lats.first(), lats.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Vec::new(),
    };
    let (first_lon, last_lon) = (lons[0], lons[lons.len() - 1]);

    let mut ring = Vec::with_capacity(4 * per_side);
    for &lon in &lons {
        ring.push(GeoPoint::new(first_lat, lon));
        ring.push(GeoPoint::new(last_lat, lon));
    }
    if lats.len() > 2 {
        for &lat in &lats[1..lats.len() - 1] {
            ring.push(GeoPoint::new(lat, first_lon));
            ring.push(GeoPoint::new(lat, last_lon));
        }
    }
    ring
}

/// Value every ring point by its nearest neighbour in `existing`.
pub fn nearest_values(existing: &PointSet, ring: &[GeoPoint]) -> SurfaceResult<Vec<f64>> {
    if existing.is_empty() {
        return Err(SurfaceError::insufficient_data(
            1,
            0,
            "boundary point synthesis",
        ));
    }

    let tree = KdTree::build(existing.points());
    let values = existing.values();
    ring.iter()
        .map(|p| {
            tree.nearest(p.lat, p.lon)
                .map(|n| values[n.index])
                .ok_or_else(|| SurfaceError::insufficient_data(1, 0, "boundary point synthesis"))
        })
        .collect()
}
