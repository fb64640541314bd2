//! Configuration for the layout engine

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a layout configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read layout config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse layout config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Space reserved around the plot for axis labels and titles
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 60.0,
            right: 80.0,
            bottom: 100.0,
            left: 150.0,
        }
    }
}

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Space around the plot inside the viewport
    pub margins: Margins,

    /// Upper bound on the unexpanded plot size (width, height)
    pub max_plot_size: (f64, f64),

    /// Axis cardinality at which the plot has its base size
    pub baseline_domain_count: usize,
    pub baseline_granularity_count: usize,

    /// Inner and outer band padding as a fraction of the band pitch
    pub band_padding: f64,

    /// Largest factor by which added axis values may stretch the plot
    pub max_expansion: f64,

    /// Smallest width or height a cell is given
    pub min_cell_size: f64,

    /// Zoom scale at or below which questions are drawn as points
    pub points_max_scale: f64,

    /// Zoom scale above which every term gets its own label
    pub detail_min_scale: f64,

    /// Side length of the per-cell slot grid for points
    pub point_grid_size: usize,

    /// Inset of the point area from the cell edge
    pub point_margin: f64,

    pub point_radius: f64,

    /// Seed for overflow point placement
    pub fallback_seed: u64,

    /// Inset of the label area from the cell edge
    pub label_padding: f64,

    /// Padding added around each label box when testing collisions
    pub collision_padding: f64,

    /// Spiral attempts per term in summary and detail modes
    pub summary_attempts: usize,
    pub detail_attempts: usize,

    /// Font-size passes before giving up on a clean packing
    pub max_font_passes: usize,

    pub min_font_size: f64,

    /// Font size of axis tick labels
    pub axis_font_size: f64,

    /// Distance between an axis and its tick labels
    pub tick_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            max_plot_size: (800.0, 600.0),
            baseline_domain_count: 3,
            baseline_granularity_count: 3,
            band_padding: 0.1,
            max_expansion: 8.0,
            min_cell_size: 20.0,
            points_max_scale: 0.5,
            detail_min_scale: 1.3,
            point_grid_size: 4,
            point_margin: 8.0,
            point_radius: 5.0,
            fallback_seed: 0x5eed_0c0a,
            label_padding: 8.0,
            collision_padding: 2.0,
            summary_attempts: 100,
            detail_attempts: 150,
            max_font_passes: 5,
            min_font_size: 5.0,
            axis_font_size: 12.0,
            tick_padding: 15.0,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the margins around the plot
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Set the unexpanded plot size limit
    pub fn with_max_plot_size(mut self, width: f64, height: f64) -> Self {
        self.max_plot_size = (width, height);
        self
    }

    /// Set the axis counts that map to the base plot size
    pub fn with_baseline_counts(mut self, domains: usize, granularities: usize) -> Self {
        self.baseline_domain_count = domains;
        self.baseline_granularity_count = granularities;
        self
    }

    /// Set the cap on plot expansion
    pub fn with_max_expansion(mut self, factor: f64) -> Self {
        self.max_expansion = factor;
        self
    }

    /// Set the seed for overflow point placement
    pub fn with_fallback_seed(mut self, seed: u64) -> Self {
        self.fallback_seed = seed;
        self
    }
}
