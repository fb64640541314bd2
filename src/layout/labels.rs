//! Term label packing inside a cell
//!
//! Labels are placed greedily along a golden-angle spiral around the cell
//! center. A candidate is accepted when its estimated text box stays inside
//! the padded cell and clears every label already placed in the same pass.
//! A term that finds no spot is forced near the center and clamped into the
//! cell, so every term always ends up with a position.
//!
//! Packing runs in two phases:
//!
//! - [`attempt_placement`] places all terms once at a fixed font size.
//! - [`pack_labels`] repeats that attempt, shrinking the font after every
//!   pass that needed the forced fallback.

use std::f64::consts::PI;

use tracing::trace;

use crate::model::{CompetencyQuestion, CqType};

use super::config::LayoutConfig;
use super::types::{BoundingBox, Point, RenderMode};

const GOLDEN_ANGLE_DEG: f64 = 137.5;
const ATTEMPT_ANGLE_STEP_DEG: f64 = 25.0;
const SPIRAL_FILL: f64 = 0.9;
const CENTER_MARGIN: f64 = 15.0;
const FALLBACK_RADIUS_CAP: f64 = 15.0;
const FALLBACK_RADIUS_FRACTION: f64 = 0.4;

/// How much of each question's terminology is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelDetail {
    /// First term of each question with a `(+N)` suffix
    Summary,
    /// Every term on its own
    Detail,
}

impl LabelDetail {
    pub fn for_mode(mode: RenderMode) -> Option<Self> {
        match mode {
            RenderMode::Points => None,
            RenderMode::Summary => Some(LabelDetail::Summary),
            RenderMode::Detail => Some(LabelDetail::Detail),
        }
    }

    fn attempts(self, config: &LayoutConfig) -> usize {
        match self {
            LabelDetail::Summary => config.summary_attempts,
            LabelDetail::Detail => config.detail_attempts,
        }
    }
}

/// One label to place, with the question it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct TermEntry<'a> {
    pub text: String,
    pub owner: &'a CompetencyQuestion,
}

impl TermEntry<'_> {
    pub fn cq_type(&self) -> CqType {
        self.owner.cq_type
    }
}

/// Flatten the terms of one intersection's questions into label entries
pub fn collect_terms<'a>(
    questions: &[&'a CompetencyQuestion],
    detail: LabelDetail,
) -> Vec<TermEntry<'a>> {
    let mut entries = Vec::new();
    for cq in questions {
        let terms = &cq.suggested_terms;
        let Some(first) = terms.first() else {
            continue;
        };
        match detail {
            LabelDetail::Detail => {
                entries.extend(terms.iter().map(|t| TermEntry {
                    text: t.clone(),
                    owner: cq,
                }));
            }
            LabelDetail::Summary => {
                let text = if terms.len() > 1 {
                    format!("{} (+{})", first, terms.len() - 1)
                } else {
                    first.clone()
                };
                entries.push(TermEntry { text, owner: cq });
            }
        }
    }
    entries
}

/// Starting font size: more terms start smaller
pub fn initial_font_size(count: usize, detail: LabelDetail, config: &LayoutConfig) -> f64 {
    let size = match detail {
        LabelDetail::Detail => (11.0 - (count / 3) as f64).clamp(5.0, 10.0),
        LabelDetail::Summary => (12.0 - (count / 2) as f64).clamp(7.0, 14.0),
    };
    size.max(config.min_font_size)
}

/// Estimated rendered width of `text`, assuming a near-monospace face
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    let len = text.chars().count() as f64;
    let avg_char_width = font_size * 0.55;
    let spacing = if len > 1.0 {
        (len - 1.0) * font_size * 0.05
    } else {
        0.0
    };
    len * avg_char_width + spacing
}

/// Text box of a label centered on `center`
pub fn text_box(text: &str, center: Point, font_size: f64) -> BoundingBox {
    BoundingBox::centered(center, estimate_text_width(text, font_size), font_size)
}

/// Padded overlap test; touching boxes count as colliding
fn collides(a: &BoundingBox, b: &BoundingBox, padding: f64) -> bool {
    let a = a.inflate(padding);
    let b = b.inflate(padding);
    !(a.right() < b.x || a.x > b.right() || a.bottom() < b.y || a.y > b.bottom())
}

/// Largest spiral radius that stays clear of the cell edge
pub fn max_radius(cell: &BoundingBox) -> f64 {
    (cell.width.min(cell.height) / 2.0 - CENTER_MARGIN).max(0.0)
}

/// Candidate center for a term at a given attempt
fn spiral_point(center: Point, index: usize, attempt: usize, total: usize, radius: f64) -> Point {
    let angle = (index as f64 * GOLDEN_ANGLE_DEG + attempt as f64 * ATTEMPT_ANGLE_STEP_DEG)
        * (PI / 180.0);
    let r = ((index + attempt + 1) as f64 / (total + 1) as f64).sqrt() * radius * SPIRAL_FILL;
    Point::new(center.x + angle.cos() * r, center.y + angle.sin() * r)
}

/// Clamp into `[lo, hi]`, or take the midpoint when the range is inverted
fn clamp_or_center(v: f64, lo: f64, hi: f64) -> f64 {
    if lo > hi {
        (lo + hi) / 2.0
    } else {
        v.clamp(lo, hi)
    }
}

/// Forced position for a term that found no free spot
fn fallback_point(
    cell: &BoundingBox,
    index: usize,
    total: usize,
    text: &str,
    font_size: f64,
    padding: f64,
) -> Point {
    let center = cell.center();
    let angle = index as f64 * (360.0 / total.max(1) as f64) * (PI / 180.0);
    let radius = (max_radius(cell) * FALLBACK_RADIUS_FRACTION).min(FALLBACK_RADIUS_CAP);
    let half_w = estimate_text_width(text, font_size) / 2.0;
    let half_h = font_size / 2.0;

    let x = clamp_or_center(
        center.x + angle.cos() * radius,
        cell.x + padding + half_w,
        cell.right() - padding - half_w,
    );
    let y = clamp_or_center(
        center.y + angle.sin() * radius,
        cell.y + padding + half_h,
        cell.bottom() - padding - half_h,
    );
    Point::new(x, y)
}

/// A label position produced by packing
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    /// Index into the term list
    pub index: usize,
    pub text: String,
    pub center: Point,
    pub font_size: f64,
    pub forced: bool,
}

impl PlacedLabel {
    pub fn bounds(&self) -> BoundingBox {
        text_box(&self.text, self.center, self.font_size)
    }
}

/// Outcome of one placement pass at a fixed font size
#[derive(Debug, Clone, PartialEq)]
pub struct PackingPass {
    pub labels: Vec<PlacedLabel>,
    pub font_size: f64,
}

impl PackingPass {
    /// Number of labels placed by the spiral search
    pub fn clean_count(&self) -> usize {
        self.labels.iter().filter(|l| !l.forced).count()
    }

    pub fn is_clean(&self) -> bool {
        self.labels.iter().all(|l| !l.forced)
    }
}

/// Place every term once at `font_size`
pub fn attempt_placement(
    terms: &[TermEntry<'_>],
    cell: &BoundingBox,
    font_size: f64,
    detail: LabelDetail,
    config: &LayoutConfig,
) -> PackingPass {
    let total = terms.len();
    let center = cell.center();
    let radius = max_radius(cell);
    let interior = cell.inflate(-config.label_padding);
    let attempts = detail.attempts(config);
    let mut placed: Vec<PlacedLabel> = Vec::with_capacity(total);

    for (index, term) in terms.iter().enumerate() {
        let found = (0..attempts).find_map(|attempt| {
            let candidate = spiral_point(center, index, attempt, total, radius);
            let bounds = text_box(&term.text, candidate, font_size);
            let accepted = interior.contains_box(&bounds)
                && placed
                    .iter()
                    .all(|other| !collides(&bounds, &other.bounds(), config.collision_padding));
            accepted.then_some(candidate)
        });

        let (center, forced) = match found {
            Some(p) => (p, false),
            None => (
                fallback_point(cell, index, total, &term.text, font_size, config.label_padding),
                true,
            ),
        };
        placed.push(PlacedLabel {
            index,
            text: term.text.clone(),
            center,
            font_size,
            forced,
        });
    }

    PackingPass {
        labels: placed,
        font_size,
    }
}

/// Result of packing one intersection
#[derive(Debug, Clone, PartialEq)]
pub struct PackedLabels {
    pub labels: Vec<PlacedLabel>,
    pub font_size: f64,
    pub passes: usize,
}

impl PackedLabels {
    pub fn forced_count(&self) -> usize {
        self.labels.iter().filter(|l| l.forced).count()
    }
}

/// Pack all terms of one cell, shrinking the font until they fit cleanly
pub fn pack_labels(
    terms: &[TermEntry<'_>],
    cell: &BoundingBox,
    detail: LabelDetail,
    config: &LayoutConfig,
) -> PackedLabels {
    if terms.is_empty() {
        return PackedLabels {
            labels: vec![],
            font_size: initial_font_size(0, detail, config),
            passes: 0,
        };
    }

    let mut font_size = initial_font_size(terms.len(), detail, config);
    let mut passes = 0;
    let mut last = None;

    while passes < config.max_font_passes.max(1) {
        let pass = attempt_placement(terms, cell, font_size, detail, config);
        passes += 1;
        let clean = pass.is_clean();
        trace!(
            pass = passes,
            font_size,
            clean = pass.clean_count(),
            total = terms.len(),
            "label pass"
        );
        last = Some(pass);
        if clean {
            break;
        }
        font_size = (font_size - 1.0).max(config.min_font_size);
    }

    let pass = last.unwrap_or_else(|| PackingPass {
        labels: vec![],
        font_size,
    });
    PackedLabels {
        font_size: pass.font_size,
        labels: pass.labels,
        passes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cq(id: &str, terms: &[&str]) -> CompetencyQuestion {
        CompetencyQuestion::new(id, "Q?", "A", "L1").with_terms(terms.iter().copied())
    }

    #[test]
    fn test_estimate_text_width() {
        assert_eq!(estimate_text_width("", 10.0), 0.0);
        assert!((estimate_text_width("a", 10.0) - 5.5).abs() < 1e-9);
        assert!((estimate_text_width("Patient", 10.0) - 41.5).abs() < 1e-9);
    }

    #[test]
    fn test_initial_font_size_bounds() {
        let config = LayoutConfig::default();
        assert_eq!(initial_font_size(1, LabelDetail::Detail, &config), 10.0);
        assert_eq!(initial_font_size(6, LabelDetail::Detail, &config), 9.0);
        assert_eq!(initial_font_size(60, LabelDetail::Detail, &config), 5.0);
        assert_eq!(initial_font_size(1, LabelDetail::Summary, &config), 12.0);
        assert_eq!(initial_font_size(4, LabelDetail::Summary, &config), 10.0);
        assert_eq!(initial_font_size(40, LabelDetail::Summary, &config), 7.0);
    }

    #[test]
    fn test_collect_terms_detail_and_summary() {
        let a = cq("a", &["Patient", "Ward", "Bed"]);
        let b = cq("b", &["Drug"]);
        let c = cq("c", &[]);
        let qs = vec![&a, &b, &c];

        let detail = collect_terms(&qs, LabelDetail::Detail);
        let texts: Vec<&str> = detail.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Patient", "Ward", "Bed", "Drug"]);

        let summary = collect_terms(&qs, LabelDetail::Summary);
        let texts: Vec<&str> = summary.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Patient (+2)", "Drug"]);
        assert_eq!(summary[0].owner.id, "a");
    }

    #[test]
    fn test_collision_counts_touching_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(14.0, 0.0, 10.0, 10.0);
        let c = BoundingBox::new(14.5, 0.0, 10.0, 10.0);
        assert!(collides(&a, &b, 2.0));
        assert!(!collides(&a, &c, 2.0));
    }

    #[test]
    fn test_clamp_or_center() {
        assert_eq!(clamp_or_center(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp_or_center(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp_or_center(5.0, 12.0, 8.0), 10.0);
    }

    #[test]
    fn test_few_short_terms_pack_cleanly() {
        let a = cq("a", &["Patient", "Drug", "Dose"]);
        let qs = vec![&a];
        let terms = collect_terms(&qs, LabelDetail::Detail);
        let cell = BoundingBox::new(0.0, 0.0, 150.0, 150.0);
        let packed = pack_labels(&terms, &cell, LabelDetail::Detail, &LayoutConfig::default());

        assert_eq!(packed.labels.len(), 3);
        assert_eq!(packed.forced_count(), 0);
        assert_eq!(packed.passes, 1);
        let interior = cell.inflate(-8.0);
        for label in &packed.labels {
            assert!(interior.contains_box(&label.bounds()), "{:?}", label);
        }
        for (i, a) in packed.labels.iter().enumerate() {
            for b in &packed.labels[i + 1..] {
                assert!(!a.bounds().intersects(&b.bounds()));
            }
        }
    }

    #[test]
    fn test_crowded_cell_places_every_term() {
        let owners: Vec<CompetencyQuestion> = (0..5)
            .map(|i| cq(&format!("q{}", i), &["Observation", "Measurement"]))
            .collect();
        let qs: Vec<&CompetencyQuestion> = owners.iter().collect();
        let terms = collect_terms(&qs, LabelDetail::Detail);
        let cell = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let packed = pack_labels(&terms, &cell, LabelDetail::Detail, &LayoutConfig::default());

        assert_eq!(packed.labels.len(), 10);
        assert!(packed.font_size >= 5.0);
        for label in &packed.labels {
            assert!(label.center.is_finite());
            assert!(cell.contains(label.center), "{:?}", label);
        }
    }

    #[test]
    fn test_font_shrinks_when_forced() {
        let owners: Vec<CompetencyQuestion> = (0..12)
            .map(|i| cq(&format!("q{}", i), &["Pharmacokinetics"]))
            .collect();
        let qs: Vec<&CompetencyQuestion> = owners.iter().collect();
        let terms = collect_terms(&qs, LabelDetail::Detail);
        let cell = BoundingBox::new(0.0, 0.0, 80.0, 80.0);
        let config = LayoutConfig::default();
        let packed = pack_labels(&terms, &cell, LabelDetail::Detail, &config);

        let start = initial_font_size(terms.len(), LabelDetail::Detail, &config);
        assert_eq!(packed.passes, config.max_font_passes);
        assert!(packed.font_size < start);
        assert!(packed.forced_count() > 0);
        assert_eq!(packed.labels.len(), 12);
    }

    #[test]
    fn test_attempt_placement_is_pure() {
        let a = cq("a", &["Patient", "Clinician", "Encounter", "Diagnosis"]);
        let qs = vec![&a];
        let terms = collect_terms(&qs, LabelDetail::Detail);
        let cell = BoundingBox::new(20.0, 40.0, 120.0, 90.0);
        let config = LayoutConfig::default();
        let first = attempt_placement(&terms, &cell, 9.0, LabelDetail::Detail, &config);
        let second = attempt_placement(&terms, &cell, 9.0, LabelDetail::Detail, &config);
        assert_eq!(first, second);
        assert!(first.labels.iter().all(|l| l.font_size == 9.0));
    }

    #[test]
    fn test_forced_label_wider_than_cell_is_centered() {
        let cell = BoundingBox::new(0.0, 0.0, 40.0, 40.0);
        let p = fallback_point(&cell, 0, 1, "Extraordinarily long term", 10.0, 8.0);
        assert_eq!(p.x, 20.0);
        assert!(cell.contains(p));
    }

    #[test]
    fn test_degenerate_cell_gives_finite_positions() {
        let a = cq("a", &["Patient"]);
        let qs = vec![&a];
        let terms = collect_terms(&qs, LabelDetail::Summary);
        let cell = BoundingBox::new(5.0, 5.0, 0.0, 0.0);
        let packed = pack_labels(&terms, &cell, LabelDetail::Summary, &LayoutConfig::default());
        assert_eq!(packed.labels.len(), 1);
        assert!(packed.labels[0].center.is_finite());
        assert!(packed.labels[0].forced);
    }
}
