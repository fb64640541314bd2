//! OntoScope - layout engine for competency-question scoping plots
//!
//! Competency questions are scattered over a grid of domain coverage ×
//! terminology granularity. This library computes cell geometry, marker and
//! label positions for a given viewport and zoom, answers hit-tests, keeps
//! sessions in memory and renders the result as SVG.
//!
//! # Example
//!
//! ```rust
//! use ontoscope::render;
//!
//! let svg = render(r#"{
//!     "domainCoverageValues": [{"id": "d1", "value": "Clinical"}],
//!     "terminologyGranularityValues": [{"id": "g1", "value": "First-level"}],
//!     "competencyQuestions": [{
//!         "id": "q1", "question": "Which patients?",
//!         "domainCoverage": "Clinical", "terminologyGranularity": "First-level",
//!         "suggestedTerms": ["Patient"], "type": "subject"
//!     }]
//! }"#).unwrap();
//! assert!(svg.contains("<svg"));
//! assert!(svg.contains("Patient"));
//! ```

pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod plot;
pub mod renderer;
pub mod store;
pub mod stylesheet;

pub use error::SnapshotError;
pub use export::{export_filename, export_session, SessionExport};
pub use layout::{compute_layout, hit_test, Hit, LayoutConfig, RenderModel, Viewport, ZoomTransform};
pub use model::{CompetencyQuestion, CqType, Dimension, DimensionValue, PlotData};
pub use plot::{PlotEvents, ScatterPlot};
pub use renderer::{render_svg, render_svg_with_stylesheet, SvgConfig};
pub use store::{SessionStore, StoreError};

use thiserror::Error;

// Re-export Stylesheet for public API
pub use stylesheet::Stylesheet;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Input could not be loaded or references unknown axis values
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Layout configuration
    pub layout: LayoutConfig,
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Stylesheet for color resolution
    pub stylesheet: Stylesheet,
    /// Drawing surface size
    pub viewport: Viewport,
    /// Pan/zoom applied to the plot
    pub transform: ZoomTransform,
    /// Reject questions that reference axis values missing from the plot
    pub strict: bool,
    /// Debug mode: print the layout table and outline label boxes
    pub debug: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            svg: SvgConfig::default(),
            stylesheet: Stylesheet::default(),
            viewport: Viewport::default(),
            transform: ZoomTransform::identity(),
            strict: false,
            debug: false,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout configuration
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the stylesheet for color resolution
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_transform(mut self, transform: ZoomTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Render a JSON snapshot to SVG with default configuration
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, RenderConfig::default())
}

/// Render a JSON snapshot to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use ontoscope::{render_with_config, RenderConfig, SvgConfig, ZoomTransform};
///
/// let config = RenderConfig::new()
///     .with_transform(ZoomTransform::with_scale(0.5))
///     .with_svg(SvgConfig::default().with_class_prefix("plot-"));
///
/// let svg = render_with_config(r#"{"domainCoverageValues": [], "terminologyGranularityValues": []}"#, config).unwrap();
/// assert!(svg.contains("plot-background"));
/// ```
pub fn render_with_config(source: &str, config: RenderConfig) -> Result<String, RenderError> {
    let data = PlotData::from_json_str(source)?;
    if config.strict {
        data.validate()?;
    }
    Ok(render_data(&data, &config))
}

/// Lay out and render already loaded plot data
pub fn render_data(data: &PlotData, config: &RenderConfig) -> String {
    let model = compute_layout(data, &config.viewport, &config.transform, &config.layout);

    if config.debug {
        print_layout_table(&model);
    }

    render_svg_with_stylesheet(&model, &config.svg, &config.stylesheet, config.debug)
}

fn print_layout_table(model: &RenderModel) {
    eprintln!("=== Layout Debug ({:?}) ===", model.mode);
    for cell in &model.cells {
        eprintln!(
            "[{}] {} × {} x={:.1} y={:.1} w={:.1} h={:.1} cqs={}",
            cell.id,
            cell.domain,
            cell.granularity,
            cell.bounds.x,
            cell.bounds.y,
            cell.bounds.width,
            cell.bounds.height,
            cell.cq_count
        );
        for point in model.points.iter().filter(|p| p.cell_id == cell.id) {
            eprintln!(
                "  point {} at ({:.1}, {:.1}) slot ({}, {})",
                point.cq_id, point.position.x, point.position.y, point.slot.grid_x, point.slot.grid_y
            );
        }
        for label in model.labels.iter().filter(|l| l.cell_id == cell.id) {
            eprintln!(
                "  label {:?} at ({:.1}, {:.1}) size={}{}",
                label.text,
                label.position.x,
                label.position.y,
                label.font_size,
                if label.forced { " forced" } else { "" }
            );
        }
    }
    eprintln!("====================");
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "domainCoverageValues": [
            {"id": "d1", "value": "Clinical"},
            {"id": "d2", "value": "Devices"}
        ],
        "terminologyGranularityValues": [
            {"id": "g1", "value": "First-level"}
        ],
        "competencyQuestions": [
            {"id": "q1", "question": "Which patients?", "domainCoverage": "Clinical",
             "terminologyGranularity": "First-level", "suggestedTerms": ["Patient", "Ward"],
             "type": "subject"},
            {"id": "q2", "question": "Lost?", "domainCoverage": "Imaging",
             "terminologyGranularity": "First-level"}
        ]
    }"#;

    #[test]
    fn test_render_default_is_summary_mode() {
        let svg = render(SNAPSHOT).unwrap();
        assert!(svg.contains("Patient (+1)"));
        assert!(svg.contains("os-mode-summary"));
    }

    #[test]
    fn test_render_points_mode() {
        let config = RenderConfig::new().with_transform(ZoomTransform::with_scale(0.4));
        let svg = render_with_config(SNAPSHOT, config).unwrap();
        assert!(svg.contains(r#"id="point-q1""#));
        assert!(!svg.contains(r#"id="point-q2""#));
    }

    #[test]
    fn test_render_detail_mode() {
        let config = RenderConfig::new().with_transform(ZoomTransform::with_scale(3.0));
        let svg = render_with_config(SNAPSHOT, config).unwrap();
        assert!(svg.contains(">Patient</text>"));
        assert!(svg.contains(">Ward</text>"));
    }

    #[test]
    fn test_strict_mode_rejects_orphans() {
        let result = render_with_config(SNAPSHOT, RenderConfig::new().with_strict(true));
        assert!(matches!(
            result,
            Err(RenderError::Snapshot(SnapshotError::UnknownAxisValue { .. }))
        ));
    }

    #[test]
    fn test_render_invalid_json() {
        let result = render("{ not json");
        assert!(matches!(
            result,
            Err(RenderError::Snapshot(SnapshotError::ParseError(_)))
        ));
    }

    #[test]
    fn test_viewport_sets_svg_size() {
        let config = RenderConfig::new().with_viewport(Viewport::new(640.0, 480.0));
        let svg = render_with_config(SNAPSHOT, config).unwrap();
        assert!(svg.contains(r#"viewBox="0 0 640 480""#));
    }
}
