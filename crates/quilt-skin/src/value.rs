//! Leaf values held in a theme.

use std::collections::BTreeMap;

use quilt_types::color::parse_hex_color;
use quilt_types::Color;
use quilt_ui::GraphicTemplate;

/// A non-scope entry of a theme.
#[derive(Debug, Clone)]
pub enum StyleValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<StyleValue>),
    /// A mapping found inside a list. Only mappings outside lists become
    /// scopes; these stay plain data with no inherited lookup.
    Map(BTreeMap<String, StyleValue>),
    /// Built from an `image*` key.
    Template(GraphicTemplate),
}

impl StyleValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The number, if it is integral.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64()
            .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
            .map(|n| n as i64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[StyleValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, StyleValue>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_template(&self) -> Option<&GraphicTemplate> {
        match self {
            Self::Template(t) => Some(t),
            _ => None,
        }
    }

    /// Interpret as a color: `[r, g, b]`, `[r, g, b, a]` or a hex string.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Text(s) => parse_hex_color(s),
            Self::List(items) => {
                let channels = items
                    .iter()
                    .map(StyleValue::as_i64)
                    .collect::<Option<Vec<_>>>()?;
                Color::from_channels(&channels)
            }
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Template(_) => "template",
        }
    }
}

impl From<&serde_json::Value> for StyleValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Color> for StyleValue {
    fn from(c: Color) -> Self {
        Self::List(
            c.to_array()
                .iter()
                .map(|&ch| Self::Number(f64::from(ch)))
                .collect(),
        )
    }
}

impl From<GraphicTemplate> for StyleValue {
    fn from(t: GraphicTemplate) -> Self {
        Self::Template(t)
    }
}
