//! Named sequential color schemes and the value-to-color scale built on them.

use crate::error::AtlasError;
use crate::scale::{self, Extent};
use palette::{LinSrgb, Mix, Srgb};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

// Stops are sampled evenly along each scheme; colors in between are
// interpolated in linear RGB.

const VIRIDIS: &[&str] = &[
    "#440154", "#482878", "#3e4a89", "#31688e", "#26828e",
    "#1f9e89", "#35b779", "#6ece58", "#b5de2b", "#fde725",
];

const PLASMA: &[&str] = &[
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786",
    "#d8576b", "#ed7953", "#fb9f3a", "#fdca26", "#f0f921",
];

const MAGMA: &[&str] = &[
    "#000004", "#180f3d", "#440f76", "#721f81", "#9e2f7f",
    "#cd4071", "#f1605d", "#fd9668", "#feca8d", "#fcfdbf",
];

const INFERNO: &[&str] = &[
    "#000004", "#1b0c41", "#4a0c6b", "#781c6d", "#a52c60",
    "#cf4446", "#ed6925", "#fb9b06", "#f7d13d", "#fcffa4",
];

const CIVIDIS: &[&str] = &[
    "#00224e", "#123570", "#3b496c", "#575d6d", "#707173",
    "#8a8678", "#a59c74", "#c3b369", "#e1cc55", "#fdea45",
];

const WARM: &[&str] = &[
    "#6e40aa", "#963db3", "#bf3caf", "#e4419d", "#fe4b83",
    "#ff5e63", "#ff7847", "#fb9633", "#e2b72f", "#c6d63c", "#aff05b",
];

const COOL: &[&str] = &[
    "#6e40aa", "#6054c8", "#4c6edb", "#368ce1", "#23abd8",
    "#1ac7c2", "#1ddfa3", "#30ef82", "#52f667", "#7ff658", "#aff05b",
];

const BLUES: &[&str] = &[
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6",
    "#4292c6", "#2171b5", "#08519c", "#08306b",
];

const GREENS: &[&str] = &[
    "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476",
    "#41ab5d", "#238b45", "#006d2c", "#00441b",
];

const GREYS: &[&str] = &[
    "#ffffff", "#f0f0f0", "#d9d9d9", "#bdbdbd", "#969696",
    "#737373", "#525252", "#252525", "#000000",
];

const ORANGES: &[&str] = &[
    "#fff5eb", "#fee6ce", "#fdd0a2", "#fdae6b", "#fd8d3c",
    "#f16913", "#d94801", "#a63603", "#7f2704",
];

const PURPLES: &[&str] = &[
    "#fcfbfd", "#efedf5", "#dadaeb", "#bcbddc", "#9e9ac8",
    "#807dba", "#6a51a3", "#54278f", "#3f007d",
];

const REDS: &[&str] = &[
    "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a",
    "#ef3b2c", "#cb181d", "#a50f15", "#67000d",
];

const RDYLGN: &[&str] = &[
    "#a50026", "#d73027", "#f46d43", "#fdae61", "#fee08b",
    "#ffffbf", "#d9ef8b", "#a6d96a", "#66bd63", "#1a9850", "#006837",
];

const RDYLBU: &[&str] = &[
    "#a50026", "#d73027", "#f46d43", "#fdae61", "#fee090",
    "#ffffbf", "#e0f3f8", "#abd9e9", "#74add1", "#4575b4", "#313695",
];

const SPECTRAL: &[&str] = &[
    "#9e0142", "#d53e4f", "#f46d43", "#fdae61", "#fee08b",
    "#ffffbf", "#e6f598", "#abdda4", "#66c2a5", "#3288bd", "#5e4fa2",
];

/// The color schemes selectable from the color-scale control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Viridis,
    Plasma,
    Magma,
    Inferno,
    Cividis,
    Warm,
    Cool,
    Blues,
    Greens,
    Greys,
    Oranges,
    Purples,
    Reds,
    RdYlGn,
    RdYlBu,
    Spectral,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 16] = [
        ColorScheme::Viridis,
        ColorScheme::Plasma,
        ColorScheme::Magma,
        ColorScheme::Inferno,
        ColorScheme::Cividis,
        ColorScheme::Warm,
        ColorScheme::Cool,
        ColorScheme::Blues,
        ColorScheme::Greens,
        ColorScheme::Greys,
        ColorScheme::Oranges,
        ColorScheme::Purples,
        ColorScheme::Reds,
        ColorScheme::RdYlGn,
        ColorScheme::RdYlBu,
        ColorScheme::Spectral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColorScheme::Viridis => "viridis",
            ColorScheme::Plasma => "plasma",
            ColorScheme::Magma => "magma",
            ColorScheme::Inferno => "inferno",
            ColorScheme::Cividis => "cividis",
            ColorScheme::Warm => "warm",
            ColorScheme::Cool => "cool",
            ColorScheme::Blues => "blues",
            ColorScheme::Greens => "greens",
            ColorScheme::Greys => "greys",
            ColorScheme::Oranges => "oranges",
            ColorScheme::Purples => "purples",
            ColorScheme::Reds => "reds",
            ColorScheme::RdYlGn => "rdylgn",
            ColorScheme::RdYlBu => "rdylbu",
            ColorScheme::Spectral => "spectral",
        }
    }

    fn stops(&self) -> &'static [&'static str] {
        match self {
            ColorScheme::Viridis => VIRIDIS,
            ColorScheme::Plasma => PLASMA,
            ColorScheme::Magma => MAGMA,
            ColorScheme::Inferno => INFERNO,
            ColorScheme::Cividis => CIVIDIS,
            ColorScheme::Warm => WARM,
            ColorScheme::Cool => COOL,
            ColorScheme::Blues => BLUES,
            ColorScheme::Greens => GREENS,
            ColorScheme::Greys => GREYS,
            ColorScheme::Oranges => ORANGES,
            ColorScheme::Purples => PURPLES,
            ColorScheme::Reds => REDS,
            ColorScheme::RdYlGn => RDYLGN,
            ColorScheme::RdYlBu => RDYLBU,
            ColorScheme::Spectral => SPECTRAL,
        }
    }

    /// Color at position `t` in `[0, 1]`; out-of-range `t` is clamped.
    pub fn interpolate(&self, t: f64) -> String {
        let stops: Vec<LinSrgb<f32>> = self
            .stops()
            .iter()
            .filter_map(|hex| parse_to_srgb(hex))
            .map(|c| c.into_linear())
            .collect();

        match stops.len() {
            0 => return "#000000".to_string(),
            1 => return srgb_to_hex(&Srgb::from_linear(stops[0])),
            _ => {}
        }

        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) } as f32;
        let segments = stops.len() - 1;
        let position = t * segments as f32;
        let segment = (position.floor() as usize).min(segments - 1);
        let segment_t = position - segment as f32;

        let mixed = stops[segment].mix(stops[segment + 1], segment_t);
        srgb_to_hex(&Srgb::from_linear(mixed))
    }
}

impl FromStr for ColorScheme {
    type Err = AtlasError;

    /// Accepts both `viridis` and the `interpolateViridis` spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();
        let key = lower.strip_prefix("interpolate").unwrap_or(&lower);
        ColorScheme::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name() == key)
            .ok_or_else(|| AtlasError::UnknownColorScheme(trimmed.to_string()))
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_to_srgb(color: &str) -> Option<Srgb<f32>> {
    let parsed = csscolorparser::parse(color).ok()?;
    Some(Srgb::new(parsed.r as f32, parsed.g as f32, parsed.b as f32))
}

fn srgb_to_hex(color: &Srgb<f32>) -> String {
    let r = (color.red.clamp(0.0, 1.0) * 255.0).round() as u8;
    let g = (color.green.clamp(0.0, 1.0) * 255.0).round() as u8;
    let b = (color.blue.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Sequential scale: value domain in, scheme color out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub scheme: ColorScheme,
    pub domain: Extent,
}

impl ColorScale {
    pub fn new(scheme: ColorScheme, domain: Extent) -> Self {
        Self { scheme, domain }
    }

    /// Normalized position of `value`; a flat domain sits at the midpoint.
    pub fn position(&self, value: f64) -> f64 {
        if self.domain.is_degenerate() {
            0.5
        } else {
            (value - self.domain.min) / (self.domain.max - self.domain.min)
        }
    }

    pub fn color(&self, value: f64) -> String {
        self.scheme.interpolate(self.position(value))
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        scale::ticks(self.domain.min, self.domain.max, count)
    }
}
