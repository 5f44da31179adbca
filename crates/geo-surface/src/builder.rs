//! The point-set to image pipeline.
//!
//! ```text
//! set_points -> [add_boundary_points] -> generate_image -> save_image
//! ```
//!
//! The grid is fixed at construction. Every call to `set_points` discards
//! the previous points and any generated image.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::boundary::{boundary_ring, nearest_values};
use crate::clough_tocher::CloughTocher;
use crate::colormap::{cividis, colormap_by_name, ColorMap};
use crate::config::SurfaceConfig;
use crate::error::{SurfaceError, SurfaceResult};
use crate::grid::Grid;
use crate::points::PointSet;
use crate::raster::{Raster, Surface};

/// How fitted values are brought into the color map's `[0, 1]` domain.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ValueScale {
    /// Values are already normalized.
    #[default]
    Identity,
    /// Linear map from `min..=max` onto `0..=1`.
    Range { min: f64, max: f64 },
}

impl ValueScale {
    /// Linear scale from `min..=max`. Both bounds must be finite with
    /// `max > min`.
    pub fn range(min: f64, max: f64) -> SurfaceResult<Self> {
        let scale = ValueScale::Range { min, max };
        scale.validate()?;
        Ok(scale)
    }

    pub fn validate(&self) -> SurfaceResult<()> {
        match *self {
            ValueScale::Identity => Ok(()),
            ValueScale::Range { min, max } => {
                if !min.is_finite() || !max.is_finite() || max <= min {
                    return Err(SurfaceError::invalid_argument(
                        "value_range",
                        format!("must be finite with max > min, got ({}, {})", min, max),
                    ));
                }
                Ok(())
            }
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            ValueScale::Identity => value,
            ValueScale::Range { min, max } => (value - min) / (max - min),
        }
    }
}

/// Fits a smooth surface through geo-located values and renders it.
pub struct SurfaceImageBuilder {
    grid: Grid,
    points: PointSet,
    color_map: Box<dyn ColorMap>,
    value_scale: ValueScale,
    surface: Option<Surface>,
    raster: Option<Raster>,
}

impl SurfaceImageBuilder {
    /// Builder over a grid spanning `lat_range` x `lon_range` at
    /// `resolution` degrees per cell. Ranges are `(min, max)`.
    pub fn new(
        lat_range: (f64, f64),
        lon_range: (f64, f64),
        resolution: f64,
    ) -> SurfaceResult<Self> {
        let grid = Grid::new(lat_range, lon_range, resolution)?;
        Ok(Self {
            grid,
            points: PointSet::new(),
            color_map: Box::new(cividis()),
            value_scale: ValueScale::Identity,
            surface: None,
            raster: None,
        })
    }

    /// Builder with grid, color map and value scale taken from `config`.
    pub fn from_config(config: &SurfaceConfig) -> SurfaceResult<Self> {
        config.validate()?;
        let mut builder = Self::new(config.lat_range, config.lon_range, config.resolution)?;
        builder.set_color_map(colormap_by_name(&config.color_map)?);
        if let Some((min, max)) = config.value_range {
            builder.set_value_scale(ValueScale::range(min, max)?)?;
        }
        Ok(builder)
    }

    /// Replace all points. `points` are `(lat, lon)` pairs, index-aligned
    /// with `values`. Pairs with a NaN value are skipped.
    ///
    /// Removes previous boundary points and any generated image.
    pub fn set_points(&mut self, points: &[(f64, f64)], values: &[f64]) -> SurfaceResult<()> {
        self.points = PointSet::from_pairs(points, values)?;
        self.invalidate();
        debug!(points = self.points.len(), "Points set");
        Ok(())
    }

    /// Add `count_per_side` evenly spaced points along every edge of the
    /// grid, each valued as its nearest existing point. Returns the number
    /// of points added.
    pub fn add_boundary_points(&mut self, count_per_side: usize) -> SurfaceResult<usize> {
        if self.points.is_empty() {
            return Err(SurfaceError::insufficient_data(
                1,
                0,
                "boundary point synthesis",
            ));
        }

        let ring = boundary_ring(&self.grid, count_per_side);
        let values = nearest_values(&self.points, &ring)?;
        self.points.extend_boundary(&ring, &values);
        debug!(
            added = ring.len(),
            total = self.points.len(),
            "Added boundary points"
        );
        Ok(ring.len())
    }

    /// Drop every synthesized boundary point. Returns how many were removed.
    pub fn remove_boundary_points(&mut self) -> usize {
        let removed = self.points.retain_measured();
        if removed > 0 {
            self.invalidate();
        }
        removed
    }

    /// Used by the next `generate_image`.
    pub fn set_color_map(&mut self, color_map: Box<dyn ColorMap>) {
        self.color_map = color_map;
    }

    /// Rejects ranges that are empty, inverted or not finite.
    pub fn set_value_scale(&mut self, scale: ValueScale) -> SurfaceResult<()> {
        scale.validate()?;
        self.value_scale = scale;
        Ok(())
    }

    /// Interpolate every grid cell and color the result.
    ///
    /// With `flip_y` the first image row is the maximum latitude. Cells
    /// outside the convex hull of the points get the color map's NaN
    /// color.
    pub fn generate_image(&mut self, flip_y: bool) -> SurfaceResult<()> {
        let interpolant = self.fit()?;

        let queries: Vec<(f64, f64)> = self
            .grid
            .cell_coords()
            .map(|cell| (cell.lat, cell.lon))
            .collect();
        let values = interpolant.evaluate_many(&queries);
        let mut surface = Surface::new(self.grid.rows(), self.grid.cols(), values)?;
        if flip_y {
            surface.flip_rows();
        }

        let nan_cells = surface.nan_count();
        if nan_cells > 0 {
            warn!(
                nan_cells,
                total_cells = self.grid.len(),
                "Surface does not cover the whole grid"
            );
        }

        let scale = self.value_scale;
        let raster = surface.colorize(self.color_map.as_ref(), |v| scale.apply(v));
        debug!(
            width = raster.width(),
            height = raster.height(),
            color_map = self.color_map.name(),
            "Generated surface image"
        );

        self.surface = Some(surface);
        self.raster = Some(raster);
        Ok(())
    }

    /// Fitted values at arbitrary query points.
    ///
    /// NOTE: queries are `(lon, lat)`, the reverse of `set_points`.
    /// Points outside the convex hull yield NaN. The stored image is not
    /// touched.
    pub fn get_fitted_values(&self, points: &[(f64, f64)]) -> SurfaceResult<Vec<f64>> {
        let interpolant = self.fit()?;
        let queries: Vec<(f64, f64)> = points.iter().map(|&(lon, lat)| (lat, lon)).collect();
        Ok(interpolant.evaluate_many(&queries))
    }

    /// Write the generated image as RGB, format chosen by extension.
    pub fn save_image(&self, path: impl AsRef<Path>) -> SurfaceResult<()> {
        self.generated()?.save(path)
    }

    /// The generated image as RGB PNG bytes.
    pub fn encode_png(&self) -> SurfaceResult<Vec<u8>> {
        self.generated()?.encode_png()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    pub fn color_map(&self) -> &dyn ColorMap {
        self.color_map.as_ref()
    }

    pub fn value_scale(&self) -> ValueScale {
        self.value_scale
    }

    fn fit(&self) -> SurfaceResult<CloughTocher> {
        let coords: Vec<[f64; 2]> = self.points.points().iter().map(|p| [p.lat, p.lon]).collect();
        CloughTocher::fit(&coords, self.points.values())
    }

    fn generated(&self) -> SurfaceResult<&Raster> {
        self.raster.as_ref().ok_or(SurfaceError::NoImageGenerated)
    }

    fn invalidate(&mut self) {
        self.surface = None;
        self.raster = None;
    }
}

impl fmt::Debug for SurfaceImageBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceImageBuilder")
            .field("grid", &self.grid)
            .field("points", &self.points.len())
            .field("color_map", &self.color_map.name())
            .field("value_scale", &self.value_scale)
            .field("generated", &self.raster.is_some())
            .finish()
    }
}

/// Build from `config`, set the points, add the configured boundary ring
/// and generate the image.
pub fn render_points(
    config: &SurfaceConfig,
    points: &[(f64, f64)],
    values: &[f64],
) -> SurfaceResult<SurfaceImageBuilder> {
    let mut builder = SurfaceImageBuilder::from_config(config)?;
    builder.set_points(points, values)?;
    if let Some(per_side) = config.boundary_points_per_side {
        builder.add_boundary_points(per_side)?;
    }
    builder.generate_image(config.flip_y)?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}

    #[test]
    fn test_builder_is_send() {
        assert_send::<SurfaceImageBuilder>();
    }

    #[test]
    fn test_value_scale() {
        assert_eq!(ValueScale::Identity.apply(0.3), 0.3);
        let scale = ValueScale::Range {
            min: 10.0,
            max: 20.0,
        };
        assert_eq!(scale.apply(15.0), 0.5);
        assert_eq!(scale.apply(10.0), 0.0);
        assert!(scale.apply(f64::NAN).is_nan());
    }

    #[test]
    fn test_value_range_must_be_non_empty() {
        assert!(ValueScale::range(0.0, 1.0).is_ok());
        for (min, max) in [(0.5, 0.5), (2.0, 1.0), (f64::NAN, 1.0), (0.0, f64::INFINITY)] {
            let err = ValueScale::range(min, max).unwrap_err();
            assert!(matches!(err, SurfaceError::InvalidArgument { .. }));
        }
    }

    #[test]
    fn test_set_points_clears_image() {
        let mut b = SurfaceImageBuilder::new((0.0, 1.0), (0.0, 1.0), 0.5).unwrap();
        b.set_points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)], &[0.1, 0.2, 0.3, 0.4])
            .unwrap();
        b.generate_image(true).unwrap();
        assert!(b.raster().is_some());

        b.set_points(&[(0.5, 0.5)], &[0.5]).unwrap();
        assert!(b.raster().is_none());
        assert!(b.surface().is_none());
    }
}
