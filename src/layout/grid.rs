//! Band grid for the two plot axes
//!
//! Each axis value owns a contiguous band. Bands share one pitch (`step`);
//! the gap between bands and the outer margin are both `padding * step`.
//! Adding values stretches the whole plot instead of narrowing the bands,
//! so a cell keeps roughly the same size as coverage grows.

use tracing::trace;

use super::config::LayoutConfig;
use super::types::{BoundingBox, PlotFrame, Viewport};

/// Ordinal band scale over a pixel range
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    values: Vec<String>,
    starts: Vec<f64>,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// Lay out `values` over `range`; a reversed range puts the first value at
    /// the high end.
    pub fn new(values: &[&str], range: (f64, f64), padding: f64) -> Self {
        let n = values.len();
        let (r0, r1) = range;
        let reverse = r1 < r0;
        let (lo, hi) = if reverse { (r1, r0) } else { (r0, r1) };
        let padding = padding.clamp(0.0, 0.99);

        let n_f = n as f64;
        let step = (hi - lo) / (n_f - padding + padding * 2.0).max(1.0);
        let start = lo + (hi - lo - step * (n_f - padding)) * 0.5;
        let bandwidth = step * (1.0 - padding);

        let mut starts: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
        if reverse {
            starts.reverse();
        }

        Self {
            values: values.iter().map(|v| v.to_string()).collect(),
            starts,
            step,
            bandwidth,
        }
    }

    /// Start of the band for a value
    pub fn position(&self, value: &str) -> Option<f64> {
        self.values
            .iter()
            .position(|v| v == value)
            .map(|i| self.starts[i])
    }

    pub fn band_at(&self, index: usize) -> Option<(f64, f64)> {
        self.starts.get(index).map(|s| (*s, *s + self.bandwidth))
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.as_str())
    }
}

impl PlotFrame {
    /// Fit the plot into the viewport, centered inside the margins
    pub fn from_viewport(viewport: &Viewport, config: &LayoutConfig) -> Self {
        let m = &config.margins;
        let (max_w, max_h) = config.max_plot_size;
        let available_w = viewport.width - m.left - m.right;
        let available_h = viewport.height - m.top - m.bottom;
        let inner_width = max_w.min(available_w).max(config.min_cell_size);
        let inner_height = max_h.min(available_h).max(config.min_cell_size);

        let offset_x = (viewport.width - inner_width - m.left - m.right) / 2.0;
        let offset_y = (viewport.height - inner_height - m.top - m.bottom) / 2.0;

        PlotFrame {
            origin: super::Point::new(m.left + offset_x, m.top + offset_y),
            inner_width,
            inner_height,
        }
    }
}

/// Expansion factor for an axis with `count` values
pub fn expansion_factor(count: usize, baseline: usize, max_expansion: f64) -> f64 {
    let factor = count as f64 / baseline.max(1) as f64;
    factor.min(max_expansion.max(1.0))
}

/// Cell geometry for the current axis values
#[derive(Debug, Clone, PartialEq)]
pub struct GridModel {
    pub x: BandScale,
    pub y: BandScale,
    /// Plot extent after expansion
    pub width: f64,
    pub height: f64,
    /// Bottom edge of the plot; the Y axis grows upward from here
    pub baseline_y: f64,
    min_cell_size: f64,
}

impl GridModel {
    pub fn build(
        domains: &[&str],
        granularities: &[&str],
        frame: &PlotFrame,
        config: &LayoutConfig,
    ) -> Self {
        let width = frame.inner_width
            * expansion_factor(
                domains.len(),
                config.baseline_domain_count,
                config.max_expansion,
            );
        let height = frame.inner_height
            * expansion_factor(
                granularities.len(),
                config.baseline_granularity_count,
                config.max_expansion,
            );

        let x = BandScale::new(domains, (0.0, width), config.band_padding);
        let y = BandScale::new(
            granularities,
            (frame.inner_height, frame.inner_height - height),
            config.band_padding,
        );

        trace!(
            columns = x.len(),
            rows = y.len(),
            width,
            height,
            bandwidth = x.bandwidth(),
            bandheight = y.bandwidth(),
            "grid built"
        );

        Self {
            x,
            y,
            width,
            height,
            baseline_y: frame.inner_height,
            min_cell_size: config.min_cell_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }

    /// Cell width and height, never below the configured minimum
    ///
    /// Clamping keeps each band start, so on a crowded axis clamped cells
    /// overlap the cells after them. Hit-testing resolves an overlap to the
    /// earlier cell.
    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.x.bandwidth().max(self.min_cell_size),
            self.y.bandwidth().max(self.min_cell_size),
        )
    }

    /// Rectangle of the cell at (column, row)
    pub fn cell_bounds(&self, column: usize, row: usize) -> Option<BoundingBox> {
        let (x0, _) = self.x.band_at(column)?;
        let (y0, _) = self.y.band_at(row)?;
        let (w, h) = self.cell_size();
        Some(BoundingBox::new(x0, y0, w, h))
    }

    /// Rectangle of the cell for a pair of axis values
    pub fn cell_for(&self, domain: &str, granularity: &str) -> Option<BoundingBox> {
        let x0 = self.x.position(domain)?;
        let y0 = self.y.position(granularity)?;
        let (w, h) = self.cell_size();
        Some(BoundingBox::new(x0, y0, w, h))
    }
}
