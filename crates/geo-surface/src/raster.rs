//! Fitted surfaces and their color-mapped rasters.

use std::io::Cursor;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage};
use tracing::info;

use crate::colormap::ColorMap;
use crate::error::{SurfaceError, SurfaceResult};

/// Interpolated scalar values, row-major, `rows x cols`. NaN marks cells
/// with no data.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Surface {
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> SurfaceResult<Self> {
        if values.len() != rows * cols {
            return Err(SurfaceError::invalid_argument(
                "values",
                format!(
                    "expected {} values for a {}x{} surface, got {}",
                    rows * cols,
                    rows,
                    cols,
                    values.len()
                ),
            ));
        }
        Ok(Self { rows, cols, values })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.values[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn nan_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Reverse the row order in place.
    pub fn flip_rows(&mut self) {
        if self.cols == 0 {
            return;
        }
        let rows = self.rows;
        for r in 0..rows / 2 {
            let (top, bottom) = self.values.split_at_mut((rows - 1 - r) * self.cols);
            top[r * self.cols..(r + 1) * self.cols].swap_with_slice(&mut bottom[..self.cols]);
        }
    }

    /// Color every cell. `scale` maps a fitted value to the colormap domain.
    pub fn colorize<F>(&self, color_map: &dyn ColorMap, scale: F) -> Raster
    where
        F: Fn(f64) -> f64,
    {
        let mut pixels = Vec::with_capacity(self.values.len() * 4);
        for &v in &self.values {
            pixels.extend_from_slice(&color_map.map(scale(v)).to_u8());
        }
        Raster {
            width: self.cols,
            height: self.rows,
            pixels,
        }
    }
}

/// RGBA8 pixels, one per surface cell. `width` is the column count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> SurfaceResult<Self> {
        if pixels.len() != width * height * 4 {
            return Err(SurfaceError::invalid_argument(
                "pixels",
                format!(
                    "expected {} bytes for {}x{} RGBA, got {}",
                    width * height * 4,
                    width,
                    height,
                    pixels.len()
                ),
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Drop the alpha channel.
    pub fn to_rgb_image(&self) -> SurfaceResult<RgbImage> {
        let rgb: Vec<u8> = self
            .pixels
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        let (width, height) = self.dimensions_u32()?;
        RgbImage::from_raw(width, height, rgb)
            .ok_or_else(|| SurfaceError::Encode("pixel buffer does not match dimensions".into()))
    }

    /// Write as RGB; the format follows the file extension. Parent
    /// directories are created as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> SurfaceResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.to_rgb_image()?.save(path)?;
        info!(
            path = %path.display(),
            width = self.width,
            height = self.height,
            "Saved surface image"
        );
        Ok(())
    }

    /// RGB PNG bytes.
    pub fn encode_png(&self) -> SurfaceResult<Vec<u8>> {
        let image = self.to_rgb_image()?;
        let mut out = Cursor::new(Vec::new());
        PngEncoder::new(&mut out).write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgb8,
        )?;
        Ok(out.into_inner())
    }

    fn dimensions_u32(&self) -> SurfaceResult<(u32, u32)> {
        let width = u32::try_from(self.width)
            .map_err(|_| SurfaceError::invalid_argument("width", "raster too wide to encode"))?;
        let height = u32::try_from(self.height)
            .map_err(|_| SurfaceError::invalid_argument("height", "raster too tall to encode"))?;
        Ok((width, height))
    }
}
