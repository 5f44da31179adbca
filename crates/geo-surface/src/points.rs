//! Point set management: measured values plus synthetic boundary points.

use crate::error::{SurfaceError, SurfaceResult};
use crate::grid::GeoPoint;
use serde::{Deserialize, Serialize};

/// Where a stored point came from.
///
/// Interpolation treats both kinds identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Supplied by the caller through `set_points`.
    Measured,
    /// Synthesized along the grid edges.
    Boundary,
}

/// Index-aligned points, values and provenance tags.
///
/// NaN values are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<GeoPoint>,
    values: Vec<f64>,
    provenance: Vec<Provenance>,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set of measured points from `(lat, lon)` pairs and a
    /// parallel value slice, skipping every pair whose value is NaN.
    pub fn from_pairs(points: &[(f64, f64)], values: &[f64]) -> SurfaceResult<Self> {
        if points.len() != values.len() {
            return Err(SurfaceError::invalid_argument(
                "values",
                format!(
                    "expected {} values to match points, got {}",
                    points.len(),
                    values.len()
                ),
            ));
        }

        let mut set = Self::new();
        for (&point, &value) in points.iter().zip(values) {
            if value.is_nan() {
                continue;
            }
            set.push(GeoPoint::from(point), value, Provenance::Measured);
        }

        let dropped = points.len() - set.len();
        if dropped > 0 {
            tracing::debug!(dropped, kept = set.len(), "Dropped NaN-valued points");
        }

        Ok(set)
    }

    fn push(&mut self, point: GeoPoint, value: f64, provenance: Provenance) {
        self.points.push(point);
        self.values.push(value);
        self.provenance.push(provenance);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn provenance(&self) -> &[Provenance] {
        &self.provenance
    }

    /// Iterate `(point, value, provenance)` triples in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (GeoPoint, f64, Provenance)> + '_ {
        self.points
            .iter()
            .zip(&self.values)
            .zip(&self.provenance)
            .map(|((p, v), t)| (*p, *v, *t))
    }

    /// Append synthesized boundary points.
    ///
    /// Boundary values come from existing points, so NaN cannot occur
    /// here unless the caller passes it; such pairs are skipped to keep
    /// the no-NaN invariant.
    pub fn extend_boundary(&mut self, points: &[GeoPoint], values: &[f64]) {
        debug_assert_eq!(points.len(), values.len());
        for (&point, &value) in points.iter().zip(values) {
            if value.is_nan() {
                continue;
            }
            self.push(point, value, Provenance::Boundary);
        }
    }

    /// Number of synthesized boundary points.
    pub fn boundary_count(&self) -> usize {
        self.provenance
            .iter()
            .filter(|p| **p == Provenance::Boundary)
            .count()
    }

    /// Drop every boundary point. Returns how many were removed.
    pub fn retain_measured(&mut self) -> usize {
        let before = self.len();
        let mut kept = Self::new();
        for (point, value, provenance) in self.iter() {
            if provenance == Provenance::Measured {
                kept.push(point, value, provenance);
            }
        }
        *self = kept;
        before - self.len()
    }
}
