//! quilt-skin: themes for quilt.
//!
//! A [`Theme`] turns a nested JSON or TOML document into a [`ScopedStore`]
//! of style values. Lookups fall back through enclosing scopes, and
//! `image*` entries become [`quilt_ui::GraphicTemplate`]s whose textures are
//! shared through a per-theme [`TextureCache`].

pub mod cache;
pub mod config;
pub mod image;
pub mod loader;
pub mod scope;
pub mod theme;
pub mod value;

pub use cache::{TextureCache, TextureKey};
pub use config::{DocumentFormat, ThemeConfig};
pub use image::{ImageDef, ImageSpec};
pub use loader::{FsLoader, MemoryLoader, ResourceLoader};
pub use scope::{Item, KeyPath, Resolved, Scope, ScopeId, ScopedStore};
pub use theme::Theme;
pub use value::StyleValue;
