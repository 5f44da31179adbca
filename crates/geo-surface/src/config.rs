//! Configuration for surface image generation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::builder::ValueScale;
use crate::colormap::colormap_by_name;
use crate::error::{SurfaceError, SurfaceResult};
use crate::grid::{check_range, Grid};

/// Everything needed to go from points to an image in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// `(min, max)` latitude in degrees.
    pub lat_range: (f64, f64),

    /// `(min, max)` longitude in degrees.
    pub lon_range: (f64, f64),

    /// Degrees per grid cell.
    pub resolution: f64,

    /// Synthetic boundary points per side, if any.
    pub boundary_points_per_side: Option<usize>,

    /// Built-in color map name.
    pub color_map: String,

    /// `(min, max)` of the fitted values mapped onto the color map. `None`
    /// passes values through unchanged.
    pub value_range: Option<(f64, f64)>,

    /// Put the maximum latitude in the first image row.
    pub flip_y: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            lat_range: (-90.0, 90.0),
            lon_range: (-180.0, 180.0),
            resolution: 1.0,
            boundary_points_per_side: None,
            color_map: "cividis".to_string(),
            value_range: None,
            flip_y: true,
        }
    }
}

impl SurfaceConfig {
    /// Load from `GEOSURFACE_*` environment variables over defaults.
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, "GEOSURFACE_LAT_MIN") {
            config.lat_range.0 = v;
        }
        if let Some(v) = parse_var(&lookup, "GEOSURFACE_LAT_MAX") {
            config.lat_range.1 = v;
        }
        if let Some(v) = parse_var(&lookup, "GEOSURFACE_LON_MIN") {
            config.lon_range.0 = v;
        }
        if let Some(v) = parse_var(&lookup, "GEOSURFACE_LON_MAX") {
            config.lon_range.1 = v;
        }
        if let Some(v) = parse_var(&lookup, "GEOSURFACE_RESOLUTION") {
            config.resolution = v;
        }
        if let Some(v) = parse_var(&lookup, "GEOSURFACE_BOUNDARY_POINTS") {
            config.boundary_points_per_side = Some(v);
        }
        if let Some(val) = lookup("GEOSURFACE_COLOR_MAP") {
            config.color_map = val;
        }

        let value_min: Option<f64> = parse_var(&lookup, "GEOSURFACE_VALUE_MIN");
        let value_max: Option<f64> = parse_var(&lookup, "GEOSURFACE_VALUE_MAX");
        match (value_min, value_max) {
            (Some(min), Some(max)) => config.value_range = Some((min, max)),
            (None, None) => {}
            _ => warn!("GEOSURFACE_VALUE_MIN and GEOSURFACE_VALUE_MAX must be set together, ignoring"),
        }

        if let Some(val) = lookup("GEOSURFACE_FLIP_Y") {
            config.flip_y = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    pub fn from_yaml_str(s: &str) -> SurfaceResult<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> SurfaceResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> SurfaceResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(SurfaceError::Config(format!(
                "unsupported config file extension: {}",
                path.display()
            ))),
        }
    }

    /// Validate the configuration, reporting the first invalid field.
    pub fn validate(&self) -> SurfaceResult<()> {
        check_range("lat_range", self.lat_range)?;
        check_range("lon_range", self.lon_range)?;
        // Also rejects bad resolutions and grids too large to render.
        Grid::new(self.lat_range, self.lon_range, self.resolution)?;

        if let Some((min, max)) = self.value_range {
            ValueScale::range(min, max)?;
        }

        colormap_by_name(&self.color_map)?;
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let val = lookup(key)?;
    match val.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %val, "Ignoring unparsable environment variable");
            None
        }
    }
}
