//! Live graphic elements: one on-screen rectangle bound to a draw batch.
//!
//! An element owns exactly one vertex list while it is loaded. Geometry is
//! always re-derived from the element's bounds (and, for frames, from the
//! fixed margins), so resizing only rewrites vertex positions; colors and
//! texture coordinates stay as they were uploaded.

use std::fmt;
use std::rc::Rc;

use quilt_types::backend::{
    Batch, GroupId, Primitive, RenderGroup, TexCoordData, Texture, VertexData, VertexList,
};
use quilt_types::error::Result;
use quilt_types::geometry::{Margins, Padding, to_extent};
use quilt_types::Color;

use crate::nine_patch::NinePatch;

/// What an element draws.
#[derive(Debug, Clone)]
pub enum ElementKind {
    /// Box outline with both diagonals, drawn as lines.
    Outline,
    /// A single quad, optionally sampling a whole texture.
    Quad { texture: Option<Rc<Texture>> },
    /// A nine-patch frame.
    Frame(FrameParts),
}

/// Everything a frame element needs beyond its bounds.
#[derive(Debug, Clone)]
pub struct FrameParts {
    /// The full frame texture; corners sample its corners.
    pub outer: Rc<Texture>,
    /// The stretchable inner region of `outer`.
    pub inner: Rc<Texture>,
    pub margins: Margins,
    pub padding: Padding,
}

/// One rectangle's rendering state.
///
/// Elements are created loaded by
/// [`GraphicTemplate::generate`](crate::template::GraphicTemplate::generate).
/// Dropping a loaded element releases its vertex list.
pub struct GraphicElement {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    color: Color,
    kind: ElementKind,
    group: Option<RenderGroup>,
    vertex_list: Option<Box<dyn VertexList>>,
}

impl GraphicElement {
    /// An unloaded element at the origin. Callers must `load` it before
    /// handing it out.
    pub(crate) fn new(kind: ElementKind, color: Color, width: i32, height: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
            color,
            kind,
            group: None,
            vertex_list: None,
        }
    }

    /// Allocate this element's vertex list in `batch`, drawn under `parent`.
    ///
    /// # Panics
    ///
    /// If the element is already loaded.
    pub fn load(&mut self, batch: &mut dyn Batch, parent: GroupId) -> Result<()> {
        assert!(self.vertex_list.is_none(), "graphic element loaded twice");

        let group = match &self.kind {
            ElementKind::Outline | ElementKind::Quad { texture: None } => {
                RenderGroup::plain(parent)
            }
            ElementKind::Quad {
                texture: Some(texture),
            } => RenderGroup::textured(parent, texture.id()),
            ElementKind::Frame(parts) => RenderGroup::textured(parent, parts.outer.id()),
        };

        let positions = self.vertices();
        let colors = self.color.repeat(positions.len() / 2);
        let packed;
        let frame_coords;
        let (primitive, tex_coords) = match &self.kind {
            ElementKind::Outline => (Primitive::Lines, TexCoordData::None),
            ElementKind::Quad { texture: None } => (Primitive::Quads, TexCoordData::None),
            ElementKind::Quad {
                texture: Some(texture),
            } => {
                packed = texture.tex_coords().packed();
                (Primitive::Quads, TexCoordData::Uvw(&packed))
            }
            ElementKind::Frame(parts) => {
                frame_coords =
                    NinePatch::tex_coords(parts.outer.tex_coords(), parts.inner.tex_coords());
                (Primitive::Quads, TexCoordData::Uv(&frame_coords))
            }
        };

        let list = batch.add(VertexData {
            primitive,
            group,
            positions: &positions,
            colors: &colors,
            tex_coords,
        })?;
        self.vertex_list = Some(list);
        self.group = Some(group);
        Ok(())
    }

    /// Vertex positions (`x, y` pairs) for the current bounds.
    pub fn vertices(&self) -> Vec<i32> {
        let (x1, y1) = (self.x, self.y);
        let (x2, y2) = (
            x1.saturating_add(self.width),
            y1.saturating_add(self.height),
        );
        match &self.kind {
            ElementKind::Outline => vec![
                x1, y1, x2, y1, x2, y1, x2, y2, // bottom, right
                x2, y2, x1, y2, x1, y2, x1, y1, // top, left
                x1, y1, x2, y2, x1, y2, x2, y1, // diagonals
            ],
            ElementKind::Quad { .. } => vec![x1, y1, x2, y1, x2, y2, x1, y2],
            ElementKind::Frame(parts) => {
                NinePatch::new(parts.margins).vertices(self.x, self.y, self.width, self.height)
            }
        }
    }

    /// Move and resize, rewriting vertex positions in place.
    ///
    /// # Panics
    ///
    /// If the element has been unloaded.
    pub fn update(&mut self, x: i32, y: i32, width: i32, height: i32) {
        assert!(self.vertex_list.is_some(), "graphic element updated after unload");
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        let positions = self.vertices();
        if let Some(list) = self.vertex_list.as_mut() {
            list.set_positions(&positions);
        }
    }

    /// Release the vertex list and forget the render group.
    ///
    /// # Panics
    ///
    /// If the element is not loaded.
    pub fn unload(&mut self) {
        assert!(self.vertex_list.is_some(), "graphic element unloaded twice");
        if let Some(list) = self.vertex_list.take() {
            list.delete();
        }
        self.group = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.vertex_list.is_some()
    }

    /// Area available to the element's content, as `(x, y, w, h)`.
    pub fn content_region(&self) -> (i32, i32, i32, i32) {
        match &self.kind {
            ElementKind::Frame(parts) => {
                parts
                    .padding
                    .inner_rect(self.x, self.y, self.width, self.height)
            }
            _ => (self.x, self.y, self.width, self.height),
        }
    }

    /// Content size this element would have at outer size `(width, height)`.
    pub fn content_size(&self, width: i32, height: i32) -> (i32, i32) {
        match &self.kind {
            ElementKind::Frame(parts) => (
                width.saturating_sub(parts.padding.horizontal()),
                height.saturating_sub(parts.padding.vertical()),
            ),
            _ => (width, height),
        }
    }

    /// Smallest outer size that fits `(content_width, content_height)`.
    ///
    /// Frames are never smaller than their outer texture; each axis is
    /// maximised independently. Sizes saturate at `i32::MAX`.
    pub fn needed_size(&self, content_width: i32, content_height: i32) -> (i32, i32) {
        match &self.kind {
            ElementKind::Frame(parts) => (
                content_width
                    .saturating_add(parts.padding.horizontal())
                    .max(to_extent(parts.outer.width())),
                content_height
                    .saturating_add(parts.padding.vertical())
                    .max(to_extent(parts.outer.height())),
            ),
            _ => (content_width, content_height),
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// The group this element draws under, while loaded.
    pub fn group(&self) -> Option<RenderGroup> {
        self.group
    }
}

impl Drop for GraphicElement {
    fn drop(&mut self) {
        if let Some(list) = self.vertex_list.take() {
            list.delete();
        }
    }
}

impl fmt::Debug for GraphicElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicElement")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color", &self.color)
            .field("kind", &self.kind)
            .field("group", &self.group)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
