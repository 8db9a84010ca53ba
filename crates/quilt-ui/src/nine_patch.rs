//! Nine-patch (9-slice) geometry for scalable themed borders.

use quilt_types::backend::TexCoords;
use quilt_types::geometry::{Margins, to_extent};

/// Number of cells in the 3x3 grid.
pub const CELL_COUNT: usize = 9;

/// Vertices emitted for a full frame: four per cell.
pub const VERTEX_COUNT: usize = CELL_COUNT * 4;

/// Nine-patch layout for a frame texture.
///
/// The rectangle is divided into a 3x3 grid. Corners render at fixed size,
/// edges stretch in one dimension, and the center stretches in both. Every
/// cell is an independent quad so each can sample its own part of the
/// texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NinePatch {
    pub margins: Margins,
}

impl NinePatch {
    pub const fn new(margins: Margins) -> Self {
        Self { margins }
    }

    /// Column boundaries for a rectangle at `x` with width `w`.
    pub fn columns(&self, x: i32, w: i32) -> [i32; 4] {
        span(x, w, self.margins.left, self.margins.right)
    }

    /// Row boundaries for a rectangle at `y` with height `h`.
    pub fn rows(&self, y: i32, h: i32) -> [i32; 4] {
        span(y, h, self.margins.bottom, self.margins.top)
    }

    /// Vertex positions (`x, y` pairs) for the nine cells.
    ///
    /// Sizes smaller than the margins are not clamped; the inner cells then
    /// get negative extents.
    pub fn vertices(&self, x: i32, y: i32, w: i32, h: i32) -> Vec<i32> {
        grid(self.columns(x, w), self.rows(y, h))
    }

    /// Texture coordinates (`u, v` pairs) for the nine cells.
    ///
    /// Corners sample the outer texture's corners; edges and the center
    /// sample between the outer texture's edges and the inner (frame)
    /// texture's corners.
    pub fn tex_coords(outer: &TexCoords, inner: &TexCoords) -> Vec<f32> {
        let (u1, v1) = outer.lower_left();
        let (u4, v4) = outer.upper_right();
        let (u2, v2) = inner.lower_left();
        let (u3, v3) = inner.upper_right();
        grid([u1, u2, u3, u4], [v1, v2, v3, v4])
    }
}

/// Boundaries along one axis. Saturates at the `i32` range.
fn span(start: i32, len: i32, near: u32, far: u32) -> [i32; 4] {
    let end = start.saturating_add(len);
    [
        start,
        start.saturating_add(to_extent(near)),
        end.saturating_sub(to_extent(far)),
        end,
    ]
}

/// Emit the nine quads spanned by four column and four row boundaries,
/// bottom row first, each quad counter-clockwise from its lower-left corner.
fn grid<T: Copy>(xs: [T; 4], ys: [T; 4]) -> Vec<T> {
    let mut out = Vec::with_capacity(VERTEX_COUNT * 2);
    for row in 0..3 {
        let (y1, y2) = (ys[row], ys[row + 1]);
        for col in 0..3 {
            let (x1, x2) = (xs[col], xs[col + 1]);
            out.extend_from_slice(&[x1, y1, x2, y1, x2, y2, x1, y2]);
        }
    }
    out
}
