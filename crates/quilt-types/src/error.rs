//! Error types for quilt.

use std::io;

/// Errors produced by the quilt theme and graphics crates.
#[derive(Debug, thiserror::Error)]
pub enum QuiltError {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("empty path")]
    EmptyPath,

    #[error("not a scope: {0}")]
    NotAScope(String),

    #[error("not a value: {0}")]
    NotAValue(String),

    #[error("type error at {path}: expected {expected}")]
    Type { path: String, expected: &'static str },

    #[error("config error: {0}")]
    Config(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, QuiltError>;

/// Join path segments the way they are written in error messages.
pub fn display_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(".")
}
