use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use svg::node::element::Path;
use svg::node::element::path::Data;

use crate::geometry::primitives::SPolygon;

#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SvgDrawOptions {
    #[serde(default)]
    pub theme: SvgLayoutThemes,
    /// Draws the (possibly inflated) nesting shapes on top of the cut outlines
    #[serde(default)]
    pub nesting_shapes: bool,
    /// Draws the usable region of the sheet (after margin and spacing)
    #[serde(default)]
    pub usable_area: bool,
    /// Colors parts by the order they originate from
    #[serde(default)]
    pub color_by_order: bool,
}

impl Default for SvgDrawOptions {
    fn default() -> Self {
        Self {
            theme: SvgLayoutThemes::default(),
            nesting_shapes: false,
            usable_area: true,
            color_by_order: false,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum SvgLayoutThemes {
    #[default]
    EarthTones,
    Gray,
}

impl SvgLayoutThemes {
    pub fn theme(&self) -> SvgLayoutTheme {
        match self {
            SvgLayoutThemes::EarthTones => EARTH_TONES_THEME,
            SvgLayoutThemes::Gray => GRAY_THEME,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SvgLayoutTheme {
    pub stroke_width_multiplier: f64,
    pub sheet_fill: Color,
    pub part_fill: Color,
    pub usable_stroke: Color,
}

pub static EARTH_TONES_THEME: SvgLayoutTheme = SvgLayoutTheme {
    stroke_width_multiplier: 2.0,
    sheet_fill: Color(0xCC, 0x82, 0x4A),
    part_fill: Color(0xFF, 0xC8, 0x79),
    usable_stroke: Color(0x2D, 0x2D, 0x2D),
};

pub static GRAY_THEME: SvgLayoutTheme = SvgLayoutTheme {
    stroke_width_multiplier: 2.5,
    sheet_fill: Color(0xC3, 0xC3, 0xC3),
    part_fill: Color(0x8F, 0x8F, 0x8F),
    usable_stroke: Color(0x63, 0x63, 0x63),
};

/// RGB color, formatted as a hex string (`#RRGGBB`)
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub fn change_brightness(self, fraction: f64) -> Color {
        let scale = |c: u8| (c as f64 * fraction).clamp(0.0, 255.0) as u8;
        Color(scale(self.0), scale(self.1), scale(self.2))
    }

    pub fn blend(self, other: Color) -> Color {
        let mix = |a: u8, b: u8| ((a as u16 + b as u16) / 2) as u8;
        Color(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }

    /// Deterministic, well-spread color for group `i` (golden-angle hue stepping)
    pub fn from_index(i: usize) -> Color {
        let hue = (i as f64 * 137.508) % 360.0;
        let (s, l) = (0.55, 0.65);
        let c = (1.0 - (2.0 * l - 1.0_f64).abs()) * s;
        let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match (hue / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let to_u8 = |v: f64| ((v + m) * 255.0).round() as u8;
        Color(to_u8(r), to_u8(g), to_u8(b))
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        ensure!(hex.len() == 6, "invalid color: {s}");
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        Ok(Color(channel(0)?, channel(2)?, channel(4)?))
    }
}

pub fn simple_polygon_data(s_poly: &SPolygon) -> Data {
    let mut data = Data::new().move_to::<(f64, f64)>(s_poly.vertex(0).into());
    for i in 1..s_poly.n_vertices() {
        data = data.line_to::<(f64, f64)>(s_poly.vertex(i).into());
    }
    data.close()
}

pub fn data_to_path(data: Data, params: &[(&str, &str)]) -> Path {
    let mut path = Path::new();
    for param in params {
        path = path.set(param.0, param.1)
    }
    path.set("d", data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_roundtrip() {
        let c: Color = "#CC824A".parse().unwrap();
        assert_eq!(c, Color(0xCC, 0x82, 0x4A));
        assert_eq!(c.to_string(), "#CC824A");
        assert!("#12345".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
    }

    #[test]
    fn brightness_and_blend() {
        assert_eq!(Color(100, 50, 200).change_brightness(0.5), Color(50, 25, 100));
        assert_eq!(Color(0, 0, 0).blend(Color(255, 255, 255)), Color(127, 127, 127));
        assert_ne!(Color::from_index(0), Color::from_index(1));
    }
}
