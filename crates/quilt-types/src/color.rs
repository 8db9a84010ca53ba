//! RGBA colors and the conversions theme documents use for them.

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha channel.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Channels in `[r, g, b, a]` order, as packed into vertex data.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Build a color from 3 (opaque) or 4 channel values in 0..=255.
    pub fn from_channels(channels: &[i64]) -> Option<Self> {
        let c = |v: i64| u8::try_from(v).ok();
        match *channels {
            [r, g, b] => Some(Self::rgb(c(r)?, c(g)?, c(b)?)),
            [r, g, b, a] => Some(Self::rgba(c(r)?, c(g)?, c(b)?, c(a)?)),
            _ => None,
        }
    }

    /// Repeat this color once per vertex.
    pub fn repeat(self, count: usize) -> Vec<u8> {
        self.to_array().repeat(count)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Parse `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.strip_prefix('#')?;
    let channel = |i: usize| u8::from_str_radix(s.get(i..i + 2)?, 16).ok();
    match s.len() {
        6 => Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}
