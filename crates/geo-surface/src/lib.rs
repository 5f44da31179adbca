//! Smooth raster images from sparse geo-located measurements.
//!
//! Pipeline:
//! - Point set management (NaN values dropped at ingestion)
//! - Boundary synthesis by nearest neighbour along the grid edges
//! - Clough-Tocher cubic interpolation on a Delaunay triangulation
//! - Color mapping and image export
//!
//! ```no_run
//! use geo_surface::SurfaceImageBuilder;
//!
//! # fn main() -> geo_surface::SurfaceResult<()> {
//! let mut builder = SurfaceImageBuilder::new((40.0, 42.0), (-75.0, -73.0), 0.01)?;
//! builder.set_points(&[(40.5, -74.5), (41.5, -74.0), (41.0, -73.5)], &[0.2, 0.7, 0.4])?;
//! builder.add_boundary_points(20)?;
//! builder.generate_image(true)?;
//! builder.save_image("out/surface.png")?;
//! # Ok(())
//! # }
//! ```

pub mod boundary;
pub mod builder;
pub mod clough_tocher;
pub mod colormap;
pub mod config;
pub mod error;
pub mod grid;
pub mod kdtree;
pub mod points;
pub mod raster;
pub mod triangulation;

pub use builder::{render_points, SurfaceImageBuilder, ValueScale};
pub use colormap::{cividis, colormap_by_name, grayscale, viridis, ColorMap, FnColorMap, Gradient, Rgba};
pub use config::SurfaceConfig;
pub use error::{SurfaceError, SurfaceResult};
pub use grid::{GeoPoint, Grid};
pub use points::{PointSet, Provenance};
pub use raster::{Raster, Surface};
