//! Regular lat/lon sampling grid.

use crate::error::{SurfaceError, SurfaceResult};
use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Squared Euclidean distance in degree space.
    pub fn distance_sq(&self, other: &GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat * dlat + dlon * dlon
    }
}

impl From<(f64, f64)> for GeoPoint {
    /// Interprets the tuple as `(lat, lon)`.
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// Fixed rectangular grid of sample coordinates.
///
/// Rows step latitude upward from `lat_range.0`, columns step longitude
/// eastward from `lon_range.0`. The upper bounds are extended by half a
/// step before counting so that rounding never drops the final row or
/// column: `rows = ceil((lat_max + res/2 - lat_min) / res)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    lat_range: (f64, f64),
    lon_range: (f64, f64),
    resolution: f64,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Create a new grid, failing fast on non-positive resolution or
    /// inverted ranges.
    pub fn new(lat_range: (f64, f64), lon_range: (f64, f64), resolution: f64) -> SurfaceResult<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(SurfaceError::invalid_argument(
                "resolution",
                format!("must be a positive finite number, got {}", resolution),
            ));
        }
        check_range("lat_range", lat_range)?;
        check_range("lon_range", lon_range)?;

        let rows = axis_len(lat_range, resolution)?;
        let cols = axis_len(lon_range, resolution)?;
        // Every cell becomes four RGBA bytes in the raster.
        if rows.checked_mul(cols).and_then(|n| n.checked_mul(4)).is_none() {
            return Err(SurfaceError::invalid_argument(
                "resolution",
                format!("grid of {} x {} cells is too large", rows, cols),
            ));
        }

        tracing::debug!(rows, cols, resolution, "Constructed sampling grid");

        Ok(Self {
            lat_range,
            lon_range,
            resolution,
            rows,
            cols,
        })
    }

    /// Number of latitude rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of longitude columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// A valid grid always has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn lat_range(&self) -> (f64, f64) {
        self.lat_range
    }

    pub fn lon_range(&self) -> (f64, f64) {
        self.lon_range
    }

    /// Latitude of a row.
    pub fn lat_at(&self, row: usize) -> f64 {
        self.lat_range.0 + row as f64 * self.resolution
    }

    /// Longitude of a column.
    pub fn lon_at(&self, col: usize) -> f64 {
        self.lon_range.0 + col as f64 * self.resolution
    }

    /// Coordinate of a cell, or `None` when out of bounds.
    pub fn coord(&self, row: usize, col: usize) -> Option<GeoPoint> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(GeoPoint::new(self.lat_at(row), self.lon_at(col)))
    }

    /// Latitude of every cell, row-major (`rows × cols`).
    pub fn grid_x(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len());
        for row in 0..self.rows {
            let lat = self.lat_at(row);
            out.extend(std::iter::repeat(lat).take(self.cols));
        }
        out
    }

    /// Longitude of every cell, row-major (`rows × cols`).
    pub fn grid_y(&self) -> Vec<f64> {
        let lons: Vec<f64> = (0..self.cols).map(|c| self.lon_at(c)).collect();
        let mut out = Vec::with_capacity(self.len());
        for _ in 0..self.rows {
            out.extend_from_slice(&lons);
        }
        out
    }

    /// All cell coordinates in row-major order.
    pub fn cell_coords(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        (0..self.rows).flat_map(move |row| {
            let lat = self.lat_at(row);
            (0..self.cols).map(move |col| GeoPoint::new(lat, self.lon_at(col)))
        })
    }
}

pub(crate) fn check_range(param: &str, (min, max): (f64, f64)) -> SurfaceResult<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(SurfaceError::invalid_argument(
            param,
            format!("bounds must be finite, got ({}, {})", min, max),
        ));
    }
    if max < min {
        return Err(SurfaceError::invalid_argument(
            param,
            format!("range is inverted: max {} < min {}", max, min),
        ));
    }
    Ok(())
}

/// Cells along one axis. Image dimensions are `u32`, so longer axes are
/// rejected.
fn axis_len((min, max): (f64, f64), resolution: f64) -> SurfaceResult<usize> {
    let n = (((max + resolution / 2.0) - min) / resolution).ceil();
    if !n.is_finite() || n > u32::MAX as f64 {
        return Err(SurfaceError::invalid_argument(
            "resolution",
            format!(
                "{} cells needed to span ({}, {}), at most {} allowed",
                n,
                min,
                max,
                u32::MAX
            ),
        ));
    }
    Ok(n as usize)
}
