//! Colors.

use core::fmt;

/// An RGBA color with components between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// Named colors, matched case-insensitively.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xffffff),
    ("red", 0xf44336),
    ("pink", 0xe91e63),
    ("purple", 0x9c27b0),
    ("deeppurple", 0x673ab7),
    ("indigo", 0x3f51b5),
    ("blue", 0x2196f3),
    ("lightblue", 0x03a9f4),
    ("cyan", 0x00bcd4),
    ("teal", 0x009688),
    ("green", 0x4caf50),
    ("lightgreen", 0x8bc34a),
    ("lime", 0xcddc39),
    ("yellow", 0xffeb3b),
    ("amber", 0xffc107),
    ("orange", 0xff9800),
    ("deeporange", 0xff5722),
    ("brown", 0x795548),
    ("grey", 0x9e9e9e),
    ("gray", 0x9e9e9e),
    ("bluegrey", 0x607d8b),
];

impl Color {
    /// Creates an opaque color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Color {
        Color::rgba8(r, g, b, 255)
    }

    /// Creates a color from 8-bit channels.
    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color {
            r: f64::from(r) / 255.,
            g: f64::from(g) / 255.,
            b: f64::from(b) / 255.,
            a: f64::from(a) / 255.,
        }
    }

    /// Parses a color from a `#hex` string or a color name.
    ///
    /// Accepted hex forms are `#rgb`, `#rrggbb` and `#rrggbbaa`.
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();
        match s.strip_prefix('#') {
            Some(hex) => Color::from_hex(hex),
            None => Color::from_name(s),
        }
    }

    fn from_hex(hex: &str) -> Option<Color> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    channels[i] = v * 16 + v;
                }
                Some(Color::rgb8(channels[0], channels[1], channels[2]))
            }
            6 => Some(Color::rgb8(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Color::rgba8(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)?,
            )),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Color> {
        let name = name.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, rgb)| Color::rgb8((rgb >> 16) as u8, (rgb >> 8) as u8, *rgb as u8))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = |v: f64| (v.clamp(0., 1.) * 255.).round() as u8;
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            c(self.r),
            c(self.g),
            c(self.b),
            c(self.a)
        )
    }
}
