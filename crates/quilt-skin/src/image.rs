//! Image specifications found under `image*` keys.
//!
//! ```json
//! "image": "panel.png"
//! "image_up": {
//!     "source": "button.png",
//!     "region": [0, 0, 32, 32],
//!     "frame": [6, 6, 20, 20],
//!     "padding": [4, 4, 2, 2]
//! }
//! ```

use serde::Deserialize;

use quilt_types::error::{QuiltError, Result};
use quilt_types::geometry::{Padding, Region};

/// Whether `key` names an image specification.
pub fn is_image_key(key: &str) -> bool {
    key.starts_with("image")
}

/// The mapping form of an image specification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageDef {
    pub source: String,
    /// Sub-region of `source` to use instead of the whole file.
    #[serde(default)]
    pub region: Option<Region>,
    /// Stretchable area of the (region) texture. Presence makes a frame.
    #[serde(default)]
    pub frame: Option<Region>,
    /// `[left, right, top, bottom]`; only meaningful with `frame`.
    #[serde(default)]
    pub padding: Option<Padding>,
}

/// A parsed `image*` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSpec {
    /// A bare filename: the whole texture.
    File(String),
    Detailed(ImageDef),
}

impl ImageSpec {
    /// Parse the value stored at `path`.
    pub fn parse(value: &serde_json::Value, path: &str) -> Result<Self> {
        match value {
            serde_json::Value::String(file) => Ok(Self::File(file.clone())),
            serde_json::Value::Object(_) => ImageDef::deserialize(value)
                .map(Self::Detailed)
                .map_err(|e| QuiltError::Config(format!("{path}: {e}"))),
            other => {
                log::warn!("{path}: image value is neither a filename nor a mapping: {other}");
                Err(QuiltError::Config(format!(
                    "{path}: expected a filename or an image mapping"
                )))
            }
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Self::File(file) => file,
            Self::Detailed(def) => &def.source,
        }
    }

    pub fn region(&self) -> Option<Region> {
        match self {
            Self::File(_) => None,
            Self::Detailed(def) => def.region,
        }
    }

    pub fn frame(&self) -> Option<Region> {
        match self {
            Self::File(_) => None,
            Self::Detailed(def) => def.frame,
        }
    }

    /// Frame padding, zero when absent.
    pub fn padding(&self) -> Padding {
        match self {
            Self::File(_) => Padding::ZERO,
            Self::Detailed(def) => def.padding.unwrap_or(Padding::ZERO),
        }
    }
}
