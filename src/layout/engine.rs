//! Layout computation engine
//!
//! [`compute_layout`] turns plot data, the viewport and the current zoom transform
//! into a [`RenderModel`]. It is a pure function: occupied slots, placed
//! labels and the fallback generator all live and die inside one call, so it
//! can run on every frame of a zoom gesture.
//!
//! ## Pipeline
//!
//! 1. Fit the plot frame into the viewport
//! 2. Build the band grid from the relevant axis values
//! 3. Group relevant questions by intersection
//! 4. Points (zoom ≤ 0.5) or packed labels (zoom > 0.5) per intersection
//! 5. Axis tick labels

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::model::{CompetencyQuestion, Dimension, IntersectionKey, PlotData};

use super::config::LayoutConfig;
use super::grid::GridModel;
use super::labels::{collect_terms, pack_labels, LabelDetail};
use super::points::{place_points, project};
use super::types::*;

/// Pick the render mode for a zoom scale
pub fn render_mode(scale: f64, config: &LayoutConfig) -> RenderMode {
    if scale <= config.points_max_scale {
        RenderMode::Points
    } else if scale > config.detail_min_scale {
        RenderMode::Detail
    } else {
        RenderMode::Summary
    }
}

/// Compute the layout for one frame
pub fn compute_layout(
    data: &PlotData,
    viewport: &Viewport,
    transform: &ZoomTransform,
    config: &LayoutConfig,
) -> RenderModel {
    let frame = PlotFrame::from_viewport(viewport, config);
    let domains = data.domain_labels();
    let levels = data.granularity_labels();
    let grid = GridModel::build(&domains, &levels, &frame, config);
    let mode = render_mode(transform.scale, config);

    let mut model = RenderModel {
        viewport: *viewport,
        frame,
        transform: *transform,
        mode,
        plot_width: grid.width,
        plot_height: grid.height,
        cells: vec![],
        points: vec![],
        labels: vec![],
        axis_ticks: vec![],
    };

    if grid.is_empty() {
        debug!(
            domains = domains.len(),
            levels = levels.len(),
            "empty axis, nothing to lay out"
        );
        return model;
    }

    let groups = group_by_intersection(data);
    model.cells = layout_cells(&grid, &domains, &levels, &groups);

    match LabelDetail::for_mode(mode) {
        None => model.points = layout_points(data, &model.cells, config),
        Some(detail) => model.labels = layout_labels(&model.cells, &groups, detail, config),
    }
    model.axis_ticks = layout_axis_ticks(&grid, &domains, &levels, config);

    debug!(
        ?mode,
        cells = model.cells.len(),
        points = model.points.len(),
        labels = model.labels.len(),
        "layout computed"
    );
    model
}

/// Relevant questions per intersection, in input order
fn group_by_intersection(data: &PlotData) -> HashMap<IntersectionKey<'_>, Vec<&CompetencyQuestion>> {
    let mut groups: HashMap<IntersectionKey<'_>, Vec<&CompetencyQuestion>> = HashMap::new();
    for cq in data.relevant_questions() {
        groups.entry(cq.intersection()).or_default().push(cq);
    }
    groups
}

fn layout_cells(
    grid: &GridModel,
    domains: &[&str],
    levels: &[&str],
    groups: &HashMap<IntersectionKey<'_>, Vec<&CompetencyQuestion>>,
) -> Vec<CellLayout> {
    let mut cells = Vec::with_capacity(domains.len() * levels.len());
    for (column, domain) in domains.iter().enumerate() {
        for (row, level) in levels.iter().enumerate() {
            let Some(bounds) = grid.cell_bounds(column, row) else {
                continue;
            };
            let key = IntersectionKey {
                domain: *domain,
                granularity: *level,
            };
            let cq_count = groups.get(&key).map_or(0, Vec::len);
            cells.push(CellLayout {
                id: format!("cell-{}-{}", column, row),
                domain: domain.to_string(),
                granularity: level.to_string(),
                column,
                row,
                bounds,
                cq_count,
                density: CellDensity::from_count(cq_count),
            });
        }
    }
    cells
}

fn find_cell<'c>(cells: &'c [CellLayout], cq: &CompetencyQuestion) -> Option<&'c CellLayout> {
    cells
        .iter()
        .find(|c| c.domain == cq.domain_coverage && c.granularity == cq.terminology_granularity)
}

fn layout_points(
    data: &PlotData,
    cells: &[CellLayout],
    config: &LayoutConfig,
) -> Vec<PointLayout> {
    let positions = place_points(&data.competency_questions, config);
    let mut points = Vec::with_capacity(positions.len());

    for cq in data.relevant_questions() {
        let Some(cell) = find_cell(cells, cq) else {
            trace!(cq = %cq.id, key = %cq.intersection(), "question has no cell, skipped");
            continue;
        };
        let Some(slot) = positions.get(&cq.id) else {
            continue;
        };
        points.push(PointLayout {
            id: format!("point-{}", cq.id),
            cq_id: cq.id.clone(),
            cell_id: cell.id.clone(),
            position: project(slot, &cell.bounds, config.point_margin),
            radius: config.point_radius,
            slot: *slot,
            cq_type: cq.cq_type,
        });
    }
    points
}

fn layout_labels(
    cells: &[CellLayout],
    groups: &HashMap<IntersectionKey<'_>, Vec<&CompetencyQuestion>>,
    detail: LabelDetail,
    config: &LayoutConfig,
) -> Vec<LabelLayout> {
    let mut labels = Vec::new();

    for cell in cells.iter().filter(|c| c.cq_count > 0) {
        let key = IntersectionKey {
            domain: &cell.domain,
            granularity: &cell.granularity,
        };
        let Some(questions) = groups.get(&key) else {
            continue;
        };
        let terms = collect_terms(questions, detail);
        if terms.is_empty() {
            continue;
        }

        let packed = pack_labels(&terms, &cell.bounds, detail, config);
        trace!(
            cell = %cell.id,
            terms = terms.len(),
            font_size = packed.font_size,
            passes = packed.passes,
            forced = packed.forced_count(),
            "packed labels"
        );

        labels.extend(packed.labels.into_iter().map(|placed| {
            let owner = terms[placed.index].owner;
            LabelLayout {
                id: format!("label-{}-{}", cell.id, placed.index),
                cq_id: owner.id.clone(),
                cell_id: cell.id.clone(),
                text: placed.text,
                position: placed.center,
                font_size: placed.font_size,
                cq_type: owner.cq_type,
                forced: placed.forced,
            }
        }));
    }
    labels
}

fn layout_axis_ticks(
    grid: &GridModel,
    domains: &[&str],
    levels: &[&str],
    config: &LayoutConfig,
) -> Vec<AxisTick> {
    let (cell_w, cell_h) = grid.cell_size();
    let font_size = config.axis_font_size;
    let mut ticks = Vec::with_capacity(domains.len() + levels.len());

    for (i, domain) in domains.iter().enumerate() {
        if let Some((start, _)) = grid.x.band_at(i) {
            ticks.push(AxisTick {
                id: format!("tick-domain-{}", i),
                axis: Dimension::DomainCoverage,
                value: domain.to_string(),
                position: Point::new(
                    start + cell_w / 2.0,
                    grid.baseline_y + config.tick_padding + font_size / 2.0,
                ),
                anchor: TextAnchor::Middle,
                font_size,
            });
        }
    }
    for (i, level) in levels.iter().enumerate() {
        if let Some((start, _)) = grid.y.band_at(i) {
            ticks.push(AxisTick {
                id: format!("tick-granularity-{}", i),
                axis: Dimension::TerminologyGranularity,
                value: level.to_string(),
                position: Point::new(-config.tick_padding, start + cell_h / 2.0),
                anchor: TextAnchor::End,
                font_size,
            });
        }
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CqType;
    use pretty_assertions::assert_eq;

    fn sample() -> PlotData {
        PlotData::from_axes(["Clinical", "Devices", "Records"], ["L1", "L2", "L3"])
            .with_question(
                CompetencyQuestion::new("q1", "Which patients?", "Clinical", "L1")
                    .with_terms(["Patient", "Cohort"])
                    .with_type(CqType::Subject),
            )
            .with_question(
                CompetencyQuestion::new("q2", "Which devices?", "Devices", "L2")
                    .with_terms(["Device"])
                    .with_type(CqType::Object),
            )
    }

    #[test]
    fn test_render_mode_thresholds() {
        let config = LayoutConfig::default();
        assert_eq!(render_mode(0.5, &config), RenderMode::Points);
        assert_eq!(render_mode(0.51, &config), RenderMode::Summary);
        assert_eq!(render_mode(1.3, &config), RenderMode::Summary);
        assert_eq!(render_mode(1.31, &config), RenderMode::Detail);
    }

    #[test]
    fn test_cells_cover_every_pair() {
        let model = compute_layout(
            &sample(),
            &Viewport::default(),
            &ZoomTransform::identity(),
            &LayoutConfig::default(),
        );
        assert_eq!(model.cells.len(), 9);
        assert_eq!(model.axis_ticks.len(), 6);
        let clinical = model.cell("Clinical", "L1").unwrap();
        assert_eq!(clinical.cq_count, 1);
        assert_eq!(clinical.density, CellDensity::Low);
        assert_eq!(model.cell("Records", "L3").unwrap().density, CellDensity::Empty);
    }

    #[test]
    fn test_points_only_at_low_zoom() {
        let data = sample();
        let config = LayoutConfig::default();
        let low = compute_layout(&data, &Viewport::default(), &ZoomTransform::with_scale(0.5), &config);
        assert_eq!(low.mode, RenderMode::Points);
        assert_eq!(low.points.len(), 2);
        assert!(low.labels.is_empty());

        let high = compute_layout(&data, &Viewport::default(), &ZoomTransform::with_scale(2.0), &config);
        assert!(high.points.is_empty());
        assert_eq!(high.labels.len(), 3);
    }

    #[test]
    fn test_summary_mode_collapses_terms() {
        let model = compute_layout(
            &sample(),
            &Viewport::default(),
            &ZoomTransform::with_scale(1.0),
            &LayoutConfig::default(),
        );
        let texts: Vec<&str> = model.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Patient (+1)", "Device"]);
        assert_eq!(model.labels[0].cq_type, CqType::Subject);
    }

    #[test]
    fn test_points_stay_inside_their_cells() {
        let mut data = sample();
        for i in 0..20 {
            data.competency_questions
                .push(CompetencyQuestion::new(format!("x{}", i), "?", "Records", "L3"));
        }
        let model = compute_layout(
            &data,
            &Viewport::default(),
            &ZoomTransform::with_scale(0.5),
            &LayoutConfig::default(),
        );
        for point in &model.points {
            let cell = model.cells.iter().find(|c| c.id == point.cell_id).unwrap();
            assert!(cell.bounds.contains(point.position), "{:?}", point);
        }
    }

    #[test]
    fn test_repeated_axis_value_gets_one_cell() {
        let data = PlotData::from_axes(["Clinical", "Clinical", "Records"], ["L1"]).with_question(
            CompetencyQuestion::new("q1", "Which patients?", "Clinical", "L1").with_terms(["Patient"]),
        );
        let config = LayoutConfig::default();
        let model = compute_layout(&data, &Viewport::default(), &ZoomTransform::with_scale(2.0), &config);
        assert_eq!(model.cells.len(), 2);
        assert_eq!(model.axis_ticks.len(), 3);
        assert_eq!(model.labels.len(), 1);
        assert_eq!(model.labels[0].cell_id, model.cell("Clinical", "L1").unwrap().id);

        let low = compute_layout(&data, &Viewport::default(), &ZoomTransform::with_scale(0.5), &config);
        assert_eq!(low.point_for("q1").unwrap().cell_id, "cell-0-0");
    }

    #[test]
    fn test_orphaned_questions_are_skipped() {
        let data = sample().with_question(CompetencyQuestion::new("lost", "?", "Gone", "L1"));
        let model = compute_layout(
            &data,
            &Viewport::default(),
            &ZoomTransform::with_scale(0.5),
            &LayoutConfig::default(),
        );
        assert!(model.point_for("lost").is_none());
        assert_eq!(model.points.len(), 2);
    }

    #[test]
    fn test_empty_axis_gives_empty_model() {
        let data = PlotData::from_axes(Vec::<String>::new(), ["L1"]);
        let model = compute_layout(
            &data,
            &Viewport::default(),
            &ZoomTransform::identity(),
            &LayoutConfig::default(),
        );
        assert!(model.is_empty());
        assert!(model.axis_ticks.is_empty());
        assert_eq!(model.content_bounds(), BoundingBox::zero());
    }

    #[test]
    fn test_element_lookup_by_id() {
        let model = compute_layout(
            &sample(),
            &Viewport::default(),
            &ZoomTransform::with_scale(0.5),
            &LayoutConfig::default(),
        );
        assert!(matches!(model.element("cell-0-0"), Some(ElementRef::Cell(_))));
        assert!(matches!(model.element("point-q1"), Some(ElementRef::Point(_))));
        assert!(matches!(model.element("tick-granularity-2"), Some(ElementRef::AxisTick(_))));
        assert!(model.element("nope").is_none());
    }
}
