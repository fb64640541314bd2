//! Stylesheet system for plot colors
//!
//! Renderer code refers to colors by symbolic token (`cq-subject`,
//! `cell-high`, `axis-line`, ...). A stylesheet maps tokens to concrete CSS
//! color values, so the same render model can be drawn with different themes.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing stylesheets
#[derive(Error, Debug)]
pub enum StylesheetError {
    #[error("Failed to read stylesheet file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse stylesheet TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A stylesheet mapping symbolic colors to concrete values
#[derive(Debug, Clone)]
pub struct Stylesheet {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Color mappings: token name -> CSS color
    pub colors: HashMap<String, String>,
}

/// TOML structure for deserializing stylesheets
#[derive(Deserialize)]
struct TomlStylesheet {
    metadata: Option<TomlMetadata>,
    colors: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

/// Default palette: slate neutrals, one hue per question role, and cell
/// strokes that get more saturated as a cell fills up
const DEFAULT_PALETTE: &str = r##"
[metadata]
name = "default"

[colors]
# Question roles
cq-subject = "#3b82f6"
cq-property = "#10b981"
cq-object = "#8b5cf6"
cq-unspecified = "#6b7280"

# Cell strokes by density
cell-empty = "rgba(148, 163, 184, 0.3)"
cell-low = "rgba(59, 130, 246, 0.5)"
cell-medium = "rgba(99, 102, 241, 0.6)"
cell-high = "rgba(139, 92, 246, 0.7)"
cell-empty-hover = "rgba(59, 130, 246, 0.6)"
cell-low-hover = "rgba(99, 102, 241, 0.7)"
cell-medium-hover = "rgba(139, 92, 246, 0.8)"
cell-high-hover = "rgba(168, 85, 247, 0.9)"

# Axes
axis-line = "#94a3b8"
axis-domain-hover = "#3b82f6"
axis-granularity-hover = "#10b981"

# Text
text-1 = "#1e293b"
text-2 = "#64748b"

# Background
background-1 = "#fafafa"
background-2 = "#f1f5f9"

# Point outline
point-stroke = "#ffffff"
"##;

impl Stylesheet {
    /// Load stylesheet from TOML file
    pub fn from_file(path: &Path) -> Result<Self, StylesheetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load stylesheet from TOML string
    pub fn from_str(content: &str) -> Result<Self, StylesheetError> {
        let parsed: TomlStylesheet = toml::from_str(content)?;

        Ok(Stylesheet {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            colors: parsed.colors,
        })
    }

    /// Resolve a symbolic color token to a concrete value
    ///
    /// Returns None if the token is not defined in this stylesheet.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.colors.get(token).map(|s| s.as_str())
    }

    /// Resolve a symbolic color token with fallback to default palette
    ///
    /// Fallback order:
    /// 1. Check this stylesheet for exact token
    /// 2. Check default palette for exact token
    /// 3. Use category default (cq → gray, cell → faint slate, etc.)
    pub fn resolve_or_default(&self, token: &str) -> String {
        if let Some(color) = self.resolve(token) {
            return color.to_string();
        }

        let default = Self::default();
        if let Some(color) = default.resolve(token) {
            return color.to_string();
        }

        let category = [
            ("cq-", "#6b7280"),
            ("cell-", "rgba(148, 163, 184, 0.3)"),
            ("axis", "#94a3b8"),
            ("text", "#1e293b"),
            ("background", "#ffffff"),
            ("point", "#ffffff"),
        ];
        category
            .iter()
            .find(|(prefix, _)| token.starts_with(prefix))
            .map_or("#1e293b", |(_, color)| color)
            .to_string()
    }

    /// Overlay another stylesheet; its tokens win
    pub fn merged_with(mut self, other: Stylesheet) -> Self {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
        self.colors.extend(other.colors);
        self
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::from_str(DEFAULT_PALETTE).expect("Default palette should be valid TOML")
    }
}
