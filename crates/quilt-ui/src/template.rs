//! Graphic templates: immutable factories for [`GraphicElement`]s.
//!
//! A template captures the texture and geometry parameters of one themed
//! graphic. Themes own templates; widgets call [`GraphicTemplate::generate`]
//! once per instance to get a live element in their own color.

use std::rc::Rc;

use quilt_types::backend::{Batch, GroupId, Texture};
use quilt_types::error::{QuiltError, Result};
use quilt_types::geometry::{Margins, Padding, Region, to_extent};
use quilt_types::Color;

use crate::element::{ElementKind, FrameParts, GraphicElement};

/// Any graphic a theme can hand to a widget.
#[derive(Debug, Clone)]
pub enum GraphicTemplate {
    /// Untextured placeholder outline.
    Outline(OutlineTemplate),
    /// A filled quad in the element color.
    Solid(SolidTemplate),
    /// A whole texture drawn as one quad.
    Texture(TextureTemplate),
    /// A nine-patch frame.
    Frame(FrameTemplate),
}

impl GraphicTemplate {
    /// Create a loaded element drawn in `color` under `group`.
    pub fn generate(
        &self,
        color: Color,
        batch: &mut dyn Batch,
        group: GroupId,
    ) -> Result<GraphicElement> {
        let (kind, width, height) = match self {
            Self::Outline(t) => (ElementKind::Outline, t.width, t.height),
            Self::Solid(t) => (ElementKind::Quad { texture: None }, t.width, t.height),
            Self::Texture(t) => (
                ElementKind::Quad {
                    texture: Some(Rc::clone(&t.texture)),
                },
                to_extent(t.width),
                to_extent(t.height),
            ),
            Self::Frame(t) => (
                ElementKind::Frame(FrameParts {
                    outer: Rc::clone(&t.texture),
                    inner: Rc::clone(&t.frame_texture),
                    margins: t.margins,
                    padding: t.padding,
                }),
                to_extent(t.texture.width()),
                to_extent(t.texture.height()),
            ),
        };
        let mut element = GraphicElement::new(kind, color, width, height);
        element.load(batch, group)?;
        Ok(element)
    }

    /// Natural width of the graphic.
    pub fn width(&self) -> i32 {
        match self {
            Self::Outline(t) => t.width,
            Self::Solid(t) => t.width,
            Self::Texture(t) => to_extent(t.width),
            Self::Frame(t) => to_extent(t.texture.width()),
        }
    }

    /// Natural height of the graphic.
    pub fn height(&self) -> i32 {
        match self {
            Self::Outline(t) => t.height,
            Self::Solid(t) => t.height,
            Self::Texture(t) => to_extent(t.height),
            Self::Frame(t) => to_extent(t.texture.height()),
        }
    }

    /// The texture this template samples, if any.
    pub fn texture(&self) -> Option<&Rc<Texture>> {
        match self {
            Self::Outline(_) | Self::Solid(_) => None,
            Self::Texture(t) => Some(&t.texture),
            Self::Frame(t) => Some(&t.texture),
        }
    }

    pub fn as_frame(&self) -> Option<&FrameTemplate> {
        match self {
            Self::Frame(t) => Some(t),
            _ => None,
        }
    }
}

impl From<OutlineTemplate> for GraphicTemplate {
    fn from(t: OutlineTemplate) -> Self {
        Self::Outline(t)
    }
}

impl From<SolidTemplate> for GraphicTemplate {
    fn from(t: SolidTemplate) -> Self {
        Self::Solid(t)
    }
}

impl From<TextureTemplate> for GraphicTemplate {
    fn from(t: TextureTemplate) -> Self {
        Self::Texture(t)
    }
}

impl From<FrameTemplate> for GraphicTemplate {
    fn from(t: FrameTemplate) -> Self {
        Self::Frame(t)
    }
}

/// Placeholder drawn where no texture is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineTemplate {
    pub width: i32,
    pub height: i32,
}

/// Flat-colored rectangle with no texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidTemplate {
    pub width: i32,
    pub height: i32,
}

/// A whole texture drawn as one quad.
#[derive(Debug, Clone)]
pub struct TextureTemplate {
    texture: Rc<Texture>,
    width: u32,
    height: u32,
}

impl TextureTemplate {
    /// Template sized to the texture.
    pub fn new(texture: Rc<Texture>) -> Self {
        let (width, height) = (texture.width(), texture.height());
        Self {
            texture,
            width,
            height,
        }
    }

    /// Template with an explicit natural size.
    pub fn with_size(texture: Rc<Texture>, width: u32, height: u32) -> Self {
        Self {
            texture,
            width,
            height,
        }
    }

    pub fn texture(&self) -> &Rc<Texture> {
        &self.texture
    }
}

/// A nine-patch frame cut from one texture.
#[derive(Debug, Clone)]
pub struct FrameTemplate {
    texture: Rc<Texture>,
    frame_texture: Rc<Texture>,
    margins: Margins,
    padding: Padding,
}

impl FrameTemplate {
    /// Build a frame whose stretchable inner area is `frame` (relative to
    /// `texture`).
    ///
    /// Fails when `frame` does not fit inside the texture.
    pub fn new(texture: Rc<Texture>, frame: Region, padding: Padding) -> Result<Self> {
        let margins =
            Margins::from_frame(texture.width(), texture.height(), frame).ok_or_else(|| {
                QuiltError::Config(format!(
                    "frame [{}, {}, {}, {}] does not fit in {}x{} texture `{}`",
                    frame.x,
                    frame.y,
                    frame.width,
                    frame.height,
                    texture.width(),
                    texture.height(),
                    texture.source()
                ))
            })?;
        let frame_texture = Rc::new(texture.region(frame)?);
        log::debug!(
            "frame template for `{}`: margins {margins:?}, padding {padding:?}",
            texture.source()
        );
        Ok(Self {
            texture,
            frame_texture,
            margins,
            padding,
        })
    }

    pub fn texture(&self) -> &Rc<Texture> {
        &self.texture
    }

    /// The stretchable inner region of the frame texture.
    pub fn frame_texture(&self) -> &Rc<Texture> {
        &self.frame_texture
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }
}
