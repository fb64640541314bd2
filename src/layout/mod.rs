//! Layout engine for the scoping plot
//!
//! This module takes plot data and the current viewport/zoom and computes
//! cell geometry, point and label positions, producing a [`RenderModel`].

pub mod config;
pub mod engine;
pub mod grid;
pub mod hit;
pub mod labels;
pub mod points;
pub mod types;

pub use config::{ConfigError, LayoutConfig, Margins};
pub use engine::{compute_layout, render_mode};
pub use grid::{BandScale, GridModel};
pub use hit::{hit_test, Hit};
pub use labels::{pack_labels, LabelDetail, PackedLabels};
pub use points::place_points;
pub use types::*;
