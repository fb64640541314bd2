//! SVG renderer for generating output from a render model
//!
//! This module takes a RenderModel and produces an SVG string
//! with prefixed CSS classes and resolved stylesheet colors.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::{render_svg, render_svg_with_stylesheet};
