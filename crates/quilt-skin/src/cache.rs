//! Per-theme texture cache.
//!
//! Keyed by `(source, region)`: every image spec naming the same file and
//! region shares one [`Texture`]. Regions are cut from the cached whole
//! texture, so a file is loaded once no matter how many regions use it.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use quilt_types::backend::Texture;
use quilt_types::error::Result;
use quilt_types::geometry::Region;

use crate::loader::ResourceLoader;

/// Cache key: file name plus optional sub-region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureKey {
    pub source: String,
    pub region: Option<Region>,
}

impl TextureKey {
    pub fn new(source: impl Into<String>, region: Option<Region>) -> Self {
        Self {
            source: source.into(),
            region,
        }
    }
}

#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<TextureKey, Rc<Texture>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached texture for `source`/`region`, loading it through
    /// `loader` (relative to `base`) on a miss.
    pub fn get_or_load(
        &mut self,
        source: &str,
        region: Option<Region>,
        base: &Path,
        loader: &mut dyn ResourceLoader,
    ) -> Result<Rc<Texture>> {
        let key = TextureKey::new(source, region);
        if let Some(texture) = self.entries.get(&key) {
            return Ok(Rc::clone(texture));
        }

        let texture = match region {
            None => {
                log::debug!("texture cache miss: {source}");
                Rc::new(loader.load_texture(base, source)?)
            }
            Some(r) => {
                log::debug!(
                    "texture cache miss: {source} [{}, {}, {}, {}]",
                    r.x,
                    r.y,
                    r.width,
                    r.height
                );
                let whole = self.get_or_load(source, None, base, loader)?;
                Rc::new(whole.region(r)?)
            }
        };
        self.entries.insert(key, Rc::clone(&texture));
        Ok(texture)
    }

    pub fn get(&self, source: &str, region: Option<Region>) -> Option<&Rc<Texture>> {
        self.entries.get(&TextureKey::new(source, region))
    }

    pub fn contains(&self, source: &str, region: Option<Region>) -> bool {
        self.get(source, region).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TextureKey> {
        self.entries.keys()
    }

    /// Drop every entry. Templates already built keep their textures alive.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
