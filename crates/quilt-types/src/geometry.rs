//! Integer geometry: texture regions, frame margins, content padding.
//!
//! All coordinates use a bottom-left origin with y growing upward, so a
//! region's `y` is the distance from the bottom edge of its parent texture.

use serde::Deserialize;

/// Largest pixel distance accepted from a theme document.
///
/// Positions and sizes are `i32` once they reach vertex data, so every
/// extent must fit.
pub const MAX_EXTENT: u32 = i32::MAX as u32;

/// `value` as a signed pixel distance, clamped to `i32::MAX`.
pub fn to_extent(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn check_extents(kind: &str, values: [u32; 4]) -> Result<[u32; 4], String> {
    match values.iter().find(|&&v| v > MAX_EXTENT) {
        Some(v) => Err(format!("{kind} value {v} exceeds {MAX_EXTENT}")),
        None => Ok(values),
    }
}

/// A rectangle within a texture, `[x, y, width, height]` in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "[u32; 4]")]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TryFrom<[u32; 4]> for Region {
    type Error = String;

    fn try_from(values: [u32; 4]) -> Result<Self, Self::Error> {
        let [x, y, width, height] = check_extents("region", values)?;
        Ok(Self::new(x, y, width, height))
    }
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether this region lies entirely inside a `width` x `height` area.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x
            .checked_add(self.width)
            .is_some_and(|right| right <= width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|top| top <= height)
    }
}

/// Fixed border widths of a nine-patch frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Margins {
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Distances from each outer edge of a `width` x `height` texture to the
    /// nearest edge of the inner `frame`.
    ///
    /// Returns `None` when the frame does not fit inside the texture, or the
    /// texture is larger than [`MAX_EXTENT`].
    pub fn from_frame(width: u32, height: u32, frame: Region) -> Option<Self> {
        if width > MAX_EXTENT || height > MAX_EXTENT || !frame.fits_within(width, height) {
            return None;
        }
        Some(Self {
            left: frame.x,
            right: width - frame.width - frame.x,
            top: height - frame.height - frame.y,
            bottom: frame.y,
        })
    }

    /// Total horizontal border (left + right).
    pub fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    /// Total vertical border (top + bottom).
    pub fn vertical(&self) -> u32 {
        self.top + self.bottom
    }
}

/// Inset between a frame's outer bounds and its content area.
///
/// Theme documents write padding as `[left, right, top, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "[u32; 4]")]
pub struct Padding {
    /// Left padding in pixels.
    pub left: u32,
    /// Right padding in pixels.
    pub right: u32,
    /// Top padding in pixels.
    pub top: u32,
    /// Bottom padding in pixels.
    pub bottom: u32,
}

impl TryFrom<[u32; 4]> for Padding {
    type Error = String;

    fn try_from(values: [u32; 4]) -> Result<Self, Self::Error> {
        let [left, right, top, bottom] = check_extents("padding", values)?;
        Ok(Self::new(left, right, top, bottom))
    }
}

impl Padding {
    /// Zero padding on all sides.
    pub const ZERO: Self = Self::uniform(0);

    /// Create uniform padding on all sides.
    pub const fn uniform(p: u32) -> Self {
        Self::new(p, p, p, p)
    }

    /// Create padding with individual side values.
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Total horizontal padding (left + right), saturating at `i32::MAX`.
    pub fn horizontal(&self) -> i32 {
        to_extent(self.left).saturating_add(to_extent(self.right))
    }

    /// Total vertical padding (top + bottom), saturating at `i32::MAX`.
    pub fn vertical(&self) -> i32 {
        to_extent(self.top).saturating_add(to_extent(self.bottom))
    }

    /// The rectangle left after insetting `(x, y, w, h)` by this padding.
    ///
    /// Bounds smaller than the padding yield a negative size. Arithmetic
    /// saturates instead of wrapping.
    pub fn inner_rect(&self, x: i32, y: i32, w: i32, h: i32) -> (i32, i32, i32, i32) {
        (
            x.saturating_add(to_extent(self.left)),
            y.saturating_add(to_extent(self.bottom)),
            w.saturating_sub(self.horizontal()),
            h.saturating_sub(self.vertical()),
        )
    }
}
