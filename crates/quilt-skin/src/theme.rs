//! Themes: a scoped style store whose `image*` entries are graphic templates.
//!
//! A theme is built from a nested mapping. Nested mappings become child
//! scopes, `image*` keys become templates backed by the theme's texture
//! cache, and everything else is kept as a [`StyleValue`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use quilt_types::error::{QuiltError, Result, display_path};
use quilt_types::Color;
use quilt_ui::{FrameTemplate, GraphicTemplate, TextureTemplate};

use crate::cache::TextureCache;
use crate::config::ThemeConfig;
use crate::image::{ImageSpec, is_image_key};
use crate::loader::ResourceLoader;
use crate::scope::{Item, KeyPath, Resolved, Scope, ScopedStore};
use crate::value::StyleValue;

type Table = BTreeMap<String, Item<StyleValue>>;

pub struct Theme<L: ResourceLoader> {
    store: ScopedStore<StyleValue>,
    textures: TextureCache,
    loader: L,
    resources_path: PathBuf,
}

impl<L: ResourceLoader> Theme<L> {
    /// Build a theme from `document`, loading images from `resources_path`.
    ///
    /// Fails on the first malformed entry; no partial theme is returned.
    pub fn new(
        document: &serde_json::Value,
        resources_path: impl Into<PathBuf>,
        loader: L,
    ) -> Result<Self> {
        let mut theme = Self {
            store: ScopedStore::new(),
            textures: TextureCache::new(),
            loader,
            resources_path: resources_path.into(),
        };
        theme.update(document)?;
        log::info!(
            "theme loaded from {}: {} entries, {} textures",
            theme.resources_path.display(),
            theme.root().len(),
            theme.textures.len()
        );
        Ok(theme)
    }

    /// Load `theme.json` from `dir`, with images relative to `dir`.
    pub fn from_directory(dir: impl AsRef<Path>, loader: L) -> Result<Self> {
        Self::from_directory_with(dir, &ThemeConfig::default(), loader)
    }

    pub fn from_directory_with(
        dir: impl AsRef<Path>,
        config: &ThemeConfig,
        mut loader: L,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        let data = loader.read_document(dir, &config.document)?;
        let document = config
            .format()
            .parse(&data)
            .map_err(|e| QuiltError::Config(format!("{}: {e}", config.document)))?;
        let resources = match &config.resources_path {
            Some(path) => dir.join(path),
            None => dir.to_path_buf(),
        };
        Self::new(&document, resources, loader)
    }

    /// Merge the top-level keys of `document` into the theme.
    ///
    /// Each named key is replaced as a whole; nested mappings are not merged
    /// with what was there before. Nothing changes if any entry fails.
    pub fn update(&mut self, document: &serde_json::Value) -> Result<()> {
        let serde_json::Value::Object(map) = document else {
            return Err(QuiltError::Config(
                "theme document must be a mapping".to_string(),
            ));
        };
        let table = self.build_table(map, &mut Vec::new())?;
        for (key, item) in table {
            self.store.insert(ScopedStore::<StyleValue>::ROOT, key, item);
        }
        Ok(())
    }

    fn build_table(
        &mut self,
        map: &serde_json::Map<String, serde_json::Value>,
        path: &mut Vec<String>,
    ) -> Result<Table> {
        let mut table = Table::new();
        for (key, value) in map {
            path.push(key.clone());
            let item = self.build_item(key, value, path);
            path.pop();
            table.insert(key.clone(), item?);
        }
        Ok(table)
    }

    fn build_item(
        &mut self,
        key: &str,
        value: &serde_json::Value,
        path: &mut Vec<String>,
    ) -> Result<Item<StyleValue>> {
        if is_image_key(key) {
            let key_path = display_path(path);
            let spec = ImageSpec::parse(value, &key_path)?;
            let template = self.image_template(&spec).map_err(|e| at_path(e, &key_path))?;
            return Ok(Item::Value(StyleValue::Template(template)));
        }
        match value {
            serde_json::Value::Object(map) => Ok(Item::Table(self.build_table(map, path)?)),
            other => Ok(Item::Value(StyleValue::from(other))),
        }
    }

    fn image_template(&mut self, spec: &ImageSpec) -> Result<GraphicTemplate> {
        let texture: Rc<_> = self.textures.get_or_load(
            spec.source(),
            spec.region(),
            &self.resources_path,
            &mut self.loader,
        )?;
        let template = match spec.frame() {
            Some(frame) => FrameTemplate::new(texture, frame, spec.padding())?.into(),
            None => TextureTemplate::new(texture).into(),
        };
        log::debug!("template from `{}`", spec.source());
        Ok(template)
    }

    pub fn root(&self) -> Scope<'_, StyleValue> {
        self.store.root()
    }

    pub fn store(&self) -> &ScopedStore<StyleValue> {
        &self.store
    }

    /// See [`Scope::get`].
    pub fn get<P: KeyPath + ?Sized>(&self, path: &P) -> Result<Option<Resolved<'_, StyleValue>>> {
        self.root().get(path)
    }

    /// See [`Scope::index`].
    pub fn index<P: KeyPath + ?Sized>(&self, path: &P) -> Result<Resolved<'_, StyleValue>> {
        self.root().index(path)
    }

    pub fn value<P: KeyPath + ?Sized>(&self, path: &P) -> Result<&StyleValue> {
        self.root().value(path)
    }

    pub fn scope<P: KeyPath + ?Sized>(&self, path: &P) -> Result<Scope<'_, StyleValue>> {
        self.root().scope(path)
    }

    /// Assign one entry. Values are stored as given; no image handling.
    pub fn set_path<P: KeyPath + ?Sized>(&mut self, path: &P, item: Item<StyleValue>) -> Result<()> {
        self.store.set_path(path, item)
    }

    pub fn template<P: KeyPath + ?Sized>(&self, path: &P) -> Result<&GraphicTemplate> {
        let value = self.value(path)?;
        value.as_template().ok_or_else(|| type_error(path, "template"))
    }

    pub fn color<P: KeyPath + ?Sized>(&self, path: &P) -> Result<Color> {
        let value = self.value(path)?;
        value.as_color().ok_or_else(|| type_error(path, "color"))
    }

    pub fn number<P: KeyPath + ?Sized>(&self, path: &P) -> Result<f64> {
        let value = self.value(path)?;
        value.as_f64().ok_or_else(|| type_error(path, "number"))
    }

    pub fn text<P: KeyPath + ?Sized>(&self, path: &P) -> Result<&str> {
        let value = self.value(path)?;
        value.as_str().ok_or_else(|| type_error(path, "text"))
    }

    pub fn resources_path(&self) -> &Path {
        &self.resources_path
    }

    /// Images loaded after this call resolve against `path`.
    pub fn set_resources_path(&mut self, path: impl Into<PathBuf>) {
        self.resources_path = path.into();
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

fn type_error<P: KeyPath + ?Sized>(path: &P, expected: &'static str) -> QuiltError {
    QuiltError::Type {
        path: display_path(&path.segments()),
        expected,
    }
}

/// Prefix config and resource messages with the key path they came from.
fn at_path(err: QuiltError, path: &str) -> QuiltError {
    match err {
        QuiltError::Config(msg) => QuiltError::Config(format!("{path}: {msg}")),
        QuiltError::Resource(msg) => QuiltError::Resource(format!("{path}: {msg}")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use quilt_types::geometry::{Margins, Padding};
    use serde_json::json;

    fn loader() -> MemoryLoader {
        MemoryLoader::new()
            .with_texture("button.png", 32, 32)
            .with_texture("atlas.png", 64, 64)
    }

    #[test]
    fn scalars_and_scopes() {
        let theme = Theme::new(
            &json!({
                "font": "Lucida Grande",
                "font_size": 12,
                "text_color": [255, 255, 255, 255],
                "button": {"text_color": "#000000"}
            }),
            "res",
            loader(),
        )
        .unwrap();
        assert_eq!(theme.text("font").unwrap(), "Lucida Grande");
        assert_eq!(theme.number(&["button", "font_size"]).unwrap(), 12.0);
        assert_eq!(theme.color("text_color").unwrap(), Color::WHITE);
        assert_eq!(theme.color(&["button", "text_color"]).unwrap(), Color::BLACK);
        assert!(theme.textures().is_empty());
    }

    #[test]
    fn image_string_is_texture_template() {
        let theme = Theme::new(&json!({"panel": {"image": "atlas.png"}}), "res", loader()).unwrap();
        let t = theme.template(&["panel", "image"]).unwrap();
        assert!(matches!(t, GraphicTemplate::Texture(_)));
        assert_eq!((t.width(), t.height()), (64, 64));
        assert_eq!(theme.loader().loads()[0].0, PathBuf::from("res"));
    }

    #[test]
    fn image_mapping_with_frame() {
        let theme = Theme::new(
            &json!({"image": {"source": "button.png", "frame": [6, 5, 20, 22], "padding": [1, 2, 3, 4]}}),
            "res",
            loader(),
        )
        .unwrap();
        let frame = theme.template("image").unwrap().as_frame().unwrap();
        assert_eq!(frame.margins(), Margins::new(6, 6, 5, 5));
        assert_eq!(frame.padding(), Padding::new(1, 2, 3, 4));
    }

    #[test]
    fn image_region_without_frame() {
        let theme = Theme::new(
            &json!({"image": {"source": "atlas.png", "region": [0, 32, 16, 8]}}),
            "res",
            loader(),
        )
        .unwrap();
        let t = theme.template("image").unwrap();
        assert!(matches!(t, GraphicTemplate::Texture(_)));
        assert_eq!((t.width(), t.height()), (16, 8));
    }

    #[test]
    fn frame_relative_to_region() {
        let theme = Theme::new(
            &json!({"image": {"source": "atlas.png", "region": [32, 32, 32, 32], "frame": [4, 4, 24, 24]}}),
            "res",
            loader(),
        )
        .unwrap();
        let frame = theme.template("image").unwrap().as_frame().unwrap();
        assert_eq!(frame.margins(), Margins::new(4, 4, 4, 4));
        assert_eq!(
            frame.frame_texture().source_region(),
            Some(quilt_types::Region::new(36, 36, 24, 24))
        );
    }

    #[test]
    fn frame_outside_texture_names_key_path() {
        let err = Theme::new(
            &json!({"button": {"image_down": {"source": "button.png", "frame": [8, 8, 30, 30]}}}),
            "res",
            loader(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, QuiltError::Config(ref m) if m.starts_with("button.image_down:")));
    }

    #[test]
    fn missing_texture_names_key_path() {
        let err = Theme::new(&json!({"image": "nope.png"}), "res", loader())
            .err()
            .unwrap();
        assert!(matches!(err, QuiltError::Resource(ref m) if m.starts_with("image:")));
    }

    #[test]
    fn document_must_be_mapping() {
        let err = Theme::new(&json!([1, 2]), "res", loader()).err().unwrap();
        assert!(matches!(err, QuiltError::Config(_)));
    }

    #[test]
    fn typed_lookups_report_kind() {
        let theme = Theme::new(&json!({"font": "Arial", "image": "atlas.png"}), "res", loader())
            .unwrap();
        assert!(matches!(
            theme.color("font"),
            Err(QuiltError::Type { ref path, expected: "color" }) if path == "font"
        ));
        assert!(matches!(theme.template("font"), Err(QuiltError::Type { .. })));
        assert!(matches!(theme.number("image"), Err(QuiltError::Type { .. })));
        assert!(matches!(theme.number("size"), Err(QuiltError::KeyNotFound(_))));
    }

    #[test]
    fn update_replaces_whole_subtrees() {
        let mut theme = Theme::new(
            &json!({"font": "Arial", "button": {"a": 1, "b": 2}}),
            "res",
            loader(),
        )
        .unwrap();
        theme.update(&json!({"button": {"a": 10}})).unwrap();
        assert_eq!(theme.number(&["button", "a"]).unwrap(), 10.0);
        assert!(theme.get(&["button", "b"]).unwrap().is_none());
        assert_eq!(theme.text("font").unwrap(), "Arial");
    }

    #[test]
    fn repeated_updates_reuse_scopes() {
        let mut theme = Theme::new(&json!({}), "res", loader()).unwrap();
        for _ in 0..1000 {
            theme.update(&json!({"button": {"a": {"b": 1}}})).unwrap();
        }
        assert_eq!(theme.store().scope_count(), 3);
        assert_eq!(theme.number(&["button", "a", "b"]).unwrap(), 1.0);
    }

    #[test]
    fn replaced_template_releases_texture() {
        let mut theme = Theme::new(
            &json!({"button": {"down": {"image": "button.png"}}}),
            "res",
            loader(),
        )
        .unwrap();
        let texture = Rc::clone(theme.textures().get("button.png", None).unwrap());
        let held = Rc::strong_count(&texture);
        theme.update(&json!({"button": {"down": {}}})).unwrap();
        assert_eq!(Rc::strong_count(&texture), held - 1);
    }

    #[test]
    fn mappings_inside_lists_load() {
        let theme = Theme::new(
            &json!({"fonts": [{"name": "Arial", "size": 12}, "Courier"]}),
            "res",
            MemoryLoader::new(),
        )
        .unwrap();
        let fonts = theme.value("fonts").unwrap().as_list().unwrap();
        let first = fonts[0].as_map().unwrap();
        assert_eq!(first["name"].as_str(), Some("Arial"));
        assert_eq!(first["size"].as_f64(), Some(12.0));
        assert_eq!(fonts[1].as_str(), Some("Courier"));
        assert!(theme.get(&["fonts", "name"]).is_err());
    }

    #[test]
    fn failed_update_changes_nothing() {
        let mut theme = Theme::new(&json!({"font": "Arial"}), "res", loader()).unwrap();
        let err = theme
            .update(&json!({"font": "Helvetica", "image": 7}))
            .unwrap_err();
        assert!(matches!(err, QuiltError::Config(_)));
        assert_eq!(theme.text("font").unwrap(), "Arial");
    }

    #[test]
    fn resources_path_applies_to_later_loads() {
        let mut theme = Theme::new(&json!({}), "res", loader()).unwrap();
        theme.set_resources_path("other");
        assert_eq!(theme.resources_path(), Path::new("other"));
        theme.update(&json!({"image": "atlas.png"})).unwrap();
        assert_eq!(theme.loader().loads()[0].0, PathBuf::from("other"));
    }

    #[test]
    fn from_directory_reads_document() {
        let loader = loader().with_document("theme.json", br#"{"image": "button.png"}"#.to_vec());
        let theme = Theme::from_directory("themes/default", loader).unwrap();
        assert!(theme.template("image").is_ok());
        assert_eq!(theme.resources_path(), Path::new("themes/default"));
    }

    #[test]
    fn from_directory_with_config() {
        let loader = loader().with_document("dark.toml", b"[label]\nfont_size = 10\n".to_vec());
        let config = ThemeConfig {
            document: "dark.toml".into(),
            resources_path: Some("images".into()),
        };
        let theme = Theme::from_directory_with("themes", &config, loader).unwrap();
        assert_eq!(theme.number(&["label", "font_size"]).unwrap(), 10.0);
        assert_eq!(theme.resources_path(), Path::new("themes/images"));
    }

    #[test]
    fn from_directory_bad_document() {
        let loader = loader().with_document("theme.json", b"{".to_vec());
        let err = Theme::from_directory(".", loader).err().unwrap();
        assert!(matches!(err, QuiltError::Config(ref m) if m.starts_with("theme.json:")));
    }
}
