//! Color maps from normalized scalars to RGBA.
//!
//! A color map is a pure function of a value expected in `[0, 1]`.
//! Values below/above that range get the map's under/over colors and NaN
//! gets its "bad" color, which is transparent black unless overridden.

use crate::error::{SurfaceError, SurfaceResult};

/// Color with floating-point channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// 8-bit channels, `(c * 255) as u8` per channel.
    pub fn to_u8(&self) -> [u8; 4] {
        [
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b),
            channel_to_u8(self.a),
        ]
    }

    fn lerp(&self, other: &Rgba, t: f64) -> Rgba {
        let t_inv = 1.0 - t;
        Rgba::new(
            self.r * t_inv + other.r * t,
            self.g * t_inv + other.g * t,
            self.b * t_inv + other.b * t,
            self.a * t_inv + other.a * t,
        )
    }
}

fn channel_to_u8(c: f64) -> u8 {
    // Float-to-int `as` saturates at the type bounds and maps NaN to 0.
    (c.clamp(0.0, 1.0) * 255.0) as u8
}

/// Maps a normalized value to a color.
pub trait ColorMap: Send + Sync {
    /// Color for `value`; expected domain `[0, 1]`.
    fn map(&self, value: f64) -> Rgba;

    /// Name used in logs and config.
    fn name(&self) -> &str;
}

/// Linear gradient between evenly or explicitly positioned color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    name: String,
    /// `(position, color)`, sorted by position.
    stops: Vec<(f64, Rgba)>,
    under: Rgba,
    over: Rgba,
    bad: Rgba,
}

impl Gradient {
    /// Gradient from explicit `(position, color)` stops. Needs at least two
    /// stops with finite positions.
    pub fn new(name: impl Into<String>, mut stops: Vec<(f64, Rgba)>) -> SurfaceResult<Self> {
        if stops.len() < 2 {
            return Err(SurfaceError::invalid_argument(
                "stops",
                "a gradient needs at least 2 color stops",
            ));
        }
        if stops.iter().any(|(pos, _)| !pos.is_finite()) {
            return Err(SurfaceError::invalid_argument(
                "stops",
                "stop positions must be finite",
            ));
        }
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));

        let under = stops[0].1;
        let over = stops[stops.len() - 1].1;
        Ok(Self {
            name: name.into(),
            stops,
            under,
            over,
            bad: Rgba::transparent(),
        })
    }

    /// Gradient from hex colors spread evenly over `[0, 1]`.
    pub fn from_hex(name: impl Into<String>, hex_stops: &[&str]) -> SurfaceResult<Self> {
        let n = hex_stops.len();
        let mut stops = Vec::with_capacity(n);
        for (i, hex) in hex_stops.iter().enumerate() {
            let color = hex_to_rgba(hex).ok_or_else(|| {
                SurfaceError::invalid_argument("stops", format!("invalid hex color '{}'", hex))
            })?;
            let pos = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            stops.push((pos, color));
        }
        Self::new(name, stops)
    }

    /// Override the color for values below the first stop.
    pub fn with_under(mut self, color: Rgba) -> Self {
        self.under = color;
        self
    }

    /// Override the color for values above the last stop.
    pub fn with_over(mut self, color: Rgba) -> Self {
        self.over = color;
        self
    }

    /// Override the color for NaN.
    pub fn with_bad(mut self, color: Rgba) -> Self {
        self.bad = color;
        self
    }

    pub fn stops(&self) -> &[(f64, Rgba)] {
        &self.stops
    }
}

impl ColorMap for Gradient {
    fn map(&self, value: f64) -> Rgba {
        if value.is_nan() {
            return self.bad;
        }
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if value < first.0 {
            return self.under;
        }
        if value > last.0 {
            return self.over;
        }

        let upper = self
            .stops
            .iter()
            .position(|(pos, _)| *pos >= value)
            .unwrap_or(self.stops.len() - 1);
        if upper == 0 {
            return first.1;
        }
        let (p0, c0) = self.stops[upper - 1];
        let (p1, c1) = self.stops[upper];
        let span = p1 - p0;
        if span <= 0.0 {
            return c1;
        }
        c0.lerp(&c1, (value - p0) / span)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wraps a closure as a named color map.
pub struct FnColorMap<F> {
    name: String,
    f: F,
}

impl<F> FnColorMap<F>
where
    F: Fn(f64) -> Rgba + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> ColorMap for FnColorMap<F>
where
    F: Fn(f64) -> Rgba + Send + Sync,
{
    fn map(&self, value: f64) -> Rgba {
        (self.f)(value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> std::fmt::Debug for FnColorMap<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnColorMap").field("name", &self.name).finish()
    }
}

const CIVIDIS: [&str; 10] = [
    "#00224e", "#123570", "#3b496c", "#575d6d", "#707173", "#8a8678", "#a59c74", "#c3b369",
    "#e1cc55", "#fee838",
];

const VIRIDIS: [&str; 10] = [
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
    "#b5de2b", "#fde725",
];

/// Perceptually uniform dark blue to yellow, readable with color vision
/// deficiency. The default map.
pub fn cividis() -> Gradient {
    builtin("cividis", &CIVIDIS)
}

pub fn viridis() -> Gradient {
    builtin("viridis", &VIRIDIS)
}

/// Black to white.
pub fn grayscale() -> Gradient {
    builtin("grayscale", &["#000000", "#ffffff"])
}

fn builtin(name: &str, stops: &[&str]) -> Gradient {
    let colors: Vec<(f64, Rgba)> = stops
        .iter()
        .enumerate()
        .filter_map(|(i, hex)| {
            hex_to_rgba(hex).map(|c| (i as f64 / (stops.len() - 1) as f64, c))
        })
        .collect();
    let under = colors[0].1;
    let over = colors[colors.len() - 1].1;
    Gradient {
        name: name.to_string(),
        stops: colors,
        under,
        over,
        bad: Rgba::transparent(),
    }
}

/// Look up a built-in color map by name (case-insensitive).
pub fn colormap_by_name(name: &str) -> SurfaceResult<Box<dyn ColorMap>> {
    match name.to_lowercase().as_str() {
        "cividis" => Ok(Box::new(cividis())),
        "viridis" => Ok(Box::new(viridis())),
        "grayscale" | "greyscale" | "gray" | "grey" => Ok(Box::new(grayscale())),
        _ => Err(SurfaceError::invalid_argument(
            "color_map",
            format!("unknown color map '{}'", name),
        )),
    }
}

/// Parse `#rrggbb` (leading `#` optional) into an opaque color.
pub fn hex_to_rgba(hex: &str) -> Option<Rgba> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some(Rgba::opaque(
        r as f64 / 255.0,
        g as f64 / 255.0,
        b as f64 / 255.0,
    ))
}
