//! Resource loaders: where theme documents and texture pixels come from.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use quilt_types::backend::{Texture, TextureId, TextureUpload};
use quilt_types::error::{QuiltError, Result};

/// Fetches theme documents and textures by name.
pub trait ResourceLoader {
    /// Load `filename` relative to `base` as a whole texture.
    fn load_texture(&mut self, base: &Path, filename: &str) -> Result<Texture>;

    /// Read the raw bytes of document `name` in `dir`.
    fn read_document(&mut self, dir: &Path, name: &str) -> Result<Vec<u8>>;
}

/// Decoded image data (RGBA pixels, rows top-down as stored in the file).
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel.
    pub pixels: Vec<u8>,
}

/// Decode a PNG into 8-bit RGBA.
pub fn decode_png(data: &[u8]) -> Result<DecodedImage> {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| QuiltError::Resource(format!("PNG header: {e}")))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| QuiltError::Resource(format!("PNG data: {e}")))?;
    buf.truncate(info.buffer_size());

    let pixels = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::Indexed => {
            return Err(QuiltError::Resource(
                "PNG palette was not expanded".to_string(),
            ));
        }
    };

    Ok(DecodedImage {
        width: info.width,
        height: info.height,
        pixels,
    })
}

/// Reverse row order so row 0 is the bottom of the image.
pub fn flip_rows(pixels: &[u8], width: u32) -> Vec<u8> {
    let stride = width as usize * 4;
    if stride == 0 {
        return Vec::new();
    }
    pixels.chunks_exact(stride).rev().flatten().copied().collect()
}

/// Loads PNG files from disk and uploads them through a [`TextureUpload`].
pub struct FsLoader<U: TextureUpload> {
    upload: U,
}

impl<U: TextureUpload> FsLoader<U> {
    pub fn new(upload: U) -> Self {
        Self { upload }
    }

    pub fn upload(&self) -> &U {
        &self.upload
    }

    pub fn into_inner(self) -> U {
        self.upload
    }
}

impl<U: TextureUpload> ResourceLoader for FsLoader<U> {
    fn load_texture(&mut self, base: &Path, filename: &str) -> Result<Texture> {
        let path = base.join(filename);
        let data = fs::read(&path)
            .map_err(|e| QuiltError::Resource(format!("{}: {e}", path.display())))?;
        let image = decode_png(&data).map_err(|e| match e {
            QuiltError::Resource(msg) => QuiltError::Resource(format!("{}: {msg}", path.display())),
            other => other,
        })?;
        let pixels = flip_rows(&image.pixels, image.width);
        let id = self.upload.load_texture(image.width, image.height, &pixels)?;
        log::debug!(
            "uploaded {} ({}x{}) as {id:?}",
            path.display(),
            image.width,
            image.height
        );
        Ok(Texture::new(id, filename, image.width, image.height))
    }

    fn read_document(&mut self, dir: &Path, name: &str) -> Result<Vec<u8>> {
        let path = dir.join(name);
        fs::read(&path).map_err(|e| QuiltError::Resource(format!("{}: {e}", path.display())))
    }
}

/// In-memory loader with registered texture sizes and documents.
///
/// Counts every texture load so callers can check caching.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    textures: HashMap<String, (u32, u32)>,
    documents: HashMap<String, Vec<u8>>,
    loads: Vec<(PathBuf, String)>,
    next_id: u32,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture named `name`.
    pub fn with_texture(mut self, name: impl Into<String>, width: u32, height: u32) -> Self {
        self.textures.insert(name.into(), (width, height));
        self
    }

    /// Register a document named `name`.
    pub fn with_document(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(name.into(), data.into());
        self
    }

    /// Number of times `filename` has been loaded.
    pub fn load_count(&self, filename: &str) -> usize {
        self.loads.iter().filter(|(_, f)| f == filename).count()
    }

    /// Every `(base, filename)` loaded so far, in order.
    pub fn loads(&self) -> &[(PathBuf, String)] {
        &self.loads
    }
}

impl ResourceLoader for MemoryLoader {
    fn load_texture(&mut self, base: &Path, filename: &str) -> Result<Texture> {
        let &(width, height) = self.textures.get(filename).ok_or_else(|| {
            QuiltError::Resource(format!("{}: no such texture", base.join(filename).display()))
        })?;
        self.loads.push((base.to_path_buf(), filename.to_string()));
        self.next_id += 1;
        Ok(Texture::new(TextureId(self.next_id), filename, width, height))
    }

    fn read_document(&mut self, dir: &Path, name: &str) -> Result<Vec<u8>> {
        self.documents.get(name).cloned().ok_or_else(|| {
            QuiltError::Resource(format!("{}: no such document", dir.join(name).display()))
        })
    }
}
