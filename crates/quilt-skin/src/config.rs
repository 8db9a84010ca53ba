//! Theme directory configuration.

use std::path::PathBuf;

use serde::Deserialize;

use quilt_types::error::{QuiltError, Result};

/// How a theme directory is laid out.
///
/// ```toml
/// document = "theme.toml"
/// resources_path = "images"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThemeConfig {
    /// File name of the theme document inside the directory.
    #[serde(default = "default_document")]
    pub document: String,
    /// Directory images are loaded from. Defaults to the theme directory.
    #[serde(default)]
    pub resources_path: Option<PathBuf>,
}

fn default_document() -> String {
    "theme.json".to_string()
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            document: default_document(),
            resources_path: None,
        }
    }
}

impl ThemeConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| QuiltError::Config(format!("theme config: {e}")))
    }

    pub fn format(&self) -> DocumentFormat {
        DocumentFormat::from_name(&self.document)
    }
}

/// Syntax of a theme document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// TOML for `*.toml`, JSON otherwise.
    pub fn from_name(name: &str) -> Self {
        if name.ends_with(".toml") {
            Self::Toml
        } else {
            Self::Json
        }
    }

    /// Parse `data` into the nested mapping a theme is built from.
    pub fn parse(self, data: &[u8]) -> Result<serde_json::Value> {
        match self {
            Self::Json => Ok(serde_json::from_slice(data)?),
            Self::Toml => {
                let text = std::str::from_utf8(data)
                    .map_err(|e| QuiltError::Config(format!("theme document: {e}")))?;
                Ok(toml::from_str(text)?)
            }
        }
    }
}
