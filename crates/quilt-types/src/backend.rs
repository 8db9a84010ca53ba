//! Contract between quilt and the rendering backend.
//!
//! quilt never talks to a GPU. It describes geometry as flat vertex arrays
//! and hands them to a [`Batch`], which returns a [`VertexList`] handle the
//! caller owns until it deletes it. Textures are plain descriptions that
//! reference a backend-side [`TextureId`].

use crate::error::{QuiltError, Result};
use crate::geometry::Region;

/// Opaque handle to a texture uploaded to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Opaque handle to a caller-defined draw-order/state bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GroupId(pub u32);

/// The state a vertex list is drawn under.
///
/// Textured groups bind their texture with nearest-texel sampling so frame
/// edges do not bleed into neighbouring texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderGroup {
    pub parent: GroupId,
    pub texture: Option<TextureId>,
}

impl RenderGroup {
    pub const fn plain(parent: GroupId) -> Self {
        Self {
            parent,
            texture: None,
        }
    }

    pub const fn textured(parent: GroupId, texture: TextureId) -> Self {
        Self {
            parent,
            texture: Some(texture),
        }
    }
}

/// How consecutive vertices are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Every four vertices form one quad.
    Quads,
    /// Every two vertices form one line segment.
    Lines,
}

/// Per-vertex texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TexCoordData<'a> {
    None,
    /// Two floats per vertex.
    Uv(&'a [f32]),
    /// Three floats per vertex.
    Uvw(&'a [f32]),
}

/// Everything needed to allocate one vertex list.
#[derive(Debug, Clone, Copy)]
pub struct VertexData<'a> {
    pub primitive: Primitive,
    pub group: RenderGroup,
    /// `x, y` pairs.
    pub positions: &'a [i32],
    /// `r, g, b, a` per vertex.
    pub colors: &'a [u8],
    pub tex_coords: TexCoordData<'a>,
}

impl VertexData<'_> {
    /// Number of vertices described.
    pub fn count(&self) -> usize {
        self.positions.len() / 2
    }
}

/// A shared draw batch that many elements allocate vertex lists from.
pub trait Batch {
    /// Allocate a vertex list initialised with `data`.
    fn add(&mut self, data: VertexData<'_>) -> Result<Box<dyn VertexList>>;
}

/// One element's slice of a [`Batch`].
pub trait VertexList {
    /// Rewrite vertex positions in place. The vertex count is unchanged.
    fn set_positions(&mut self, positions: &[i32]);

    /// Release the allocation.
    fn delete(self: Box<Self>);
}

/// Uploads decoded pixel data to the backend.
pub trait TextureUpload {
    /// Upload `rgba_data` (rows bottom-up) and return the new texture's id.
    fn load_texture(&mut self, width: u32, height: u32, rgba_data: &[u8]) -> Result<TextureId>;
}

/// Texture coordinates of a texture's four corners.
///
/// Corners are stored lower-left, lower-right, upper-right, upper-left, each
/// as `[u, v, w]`. `w` is the layer coordinate and is `0.0` for 2D textures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexCoords(pub [[f32; 3]; 4]);

impl TexCoords {
    /// Coordinates spanning a whole texture.
    pub const FULL: Self = Self::span(0.0, 0.0, 1.0, 1.0);

    /// Axis-aligned span from `(u0, v0)` (lower-left) to `(u1, v1)`.
    pub const fn span(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self([
            [u0, v0, 0.0],
            [u1, v0, 0.0],
            [u1, v1, 0.0],
            [u0, v1, 0.0],
        ])
    }

    pub fn lower_left(&self) -> (f32, f32) {
        (self.0[0][0], self.0[0][1])
    }

    pub fn upper_right(&self) -> (f32, f32) {
        (self.0[2][0], self.0[2][1])
    }

    /// All four corners packed as 12 floats, three per vertex.
    pub fn packed(&self) -> [f32; 12] {
        let mut out = [0.0; 12];
        for (chunk, corner) in out.chunks_exact_mut(3).zip(self.0.iter()) {
            chunk.copy_from_slice(corner);
        }
        out
    }
}

/// A texture (or a sub-region of one) as seen by the geometry code.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    source: String,
    region: Option<Region>,
    tex_coords: TexCoords,
}

impl Texture {
    /// A whole texture named `source`.
    pub fn new(id: TextureId, source: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            source: source.into(),
            region: None,
            tex_coords: TexCoords::FULL,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Identifier of the file this texture was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Position of this texture within its source, if it is a sub-region.
    pub fn source_region(&self) -> Option<Region> {
        self.region
    }

    pub fn tex_coords(&self) -> &TexCoords {
        &self.tex_coords
    }

    /// Extract `region` (relative to this texture) as a new texture sharing
    /// the same backend id.
    pub fn region(&self, region: Region) -> Result<Texture> {
        if !region.fits_within(self.width, self.height) {
            return Err(QuiltError::Config(format!(
                "region [{}, {}, {}, {}] lies outside {}x{} texture `{}`",
                region.x, region.y, region.width, region.height, self.width, self.height, self.source
            )));
        }

        let (u0, v0) = self.tex_coords.lower_left();
        let (u1, v1) = self.tex_coords.upper_right();
        let du = (u1 - u0) / self.width.max(1) as f32;
        let dv = (v1 - v0) / self.height.max(1) as f32;
        let left = u0 + region.x as f32 * du;
        let bottom = v0 + region.y as f32 * dv;
        let right = left + region.width as f32 * du;
        let top = bottom + region.height as f32 * dv;

        let origin = self.region.map_or((0, 0), |r| (r.x, r.y));
        Ok(Texture {
            id: self.id,
            width: region.width,
            height: region.height,
            source: self.source.clone(),
            region: Some(Region::new(
                origin.0 + region.x,
                origin.1 + region.y,
                region.width,
                region.height,
            )),
            tex_coords: TexCoords::span(left, bottom, right, top),
        })
    }
}
