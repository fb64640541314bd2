//! Hit-testing against a computed render model
//!
//! Screen coordinates are mapped back into content space and tested against
//! the elements in reverse paint order: labels, points, axis ticks, then
//! cells. Cells accept clicks slightly outside their drawn rectangle.

use crate::model::Dimension;

use super::types::{Point, RenderModel};

/// Extra margin around a cell that still counts as a click on it
pub const CELL_CLICK_PADDING: f64 = 5.0;

/// What a click landed on
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    Cell {
        domain: String,
        granularity: String,
        /// Cell center in content space
        center: Point,
    },
    AxisValue {
        value: String,
        axis: Dimension,
    },
    Point {
        cq_id: String,
    },
    Label {
        cq_id: String,
    },
}

/// Find the topmost element under a viewport position
pub fn hit_test(model: &RenderModel, screen: Point) -> Option<Hit> {
    let p = model.to_content(screen);
    if !p.is_finite() {
        return None;
    }

    if let Some(label) = model.labels.iter().rev().find(|l| l.bounds().contains(p)) {
        return Some(Hit::Label {
            cq_id: label.cq_id.clone(),
        });
    }

    if let Some(point) = model.points.iter().rev().find(|pt| {
        let dx = pt.position.x - p.x;
        let dy = pt.position.y - p.y;
        dx * dx + dy * dy <= pt.radius * pt.radius
    }) {
        return Some(Hit::Point {
            cq_id: point.cq_id.clone(),
        });
    }

    if let Some(tick) = model.axis_ticks.iter().find(|t| t.bounds().contains(p)) {
        return Some(Hit::AxisValue {
            value: tick.value.clone(),
            axis: tick.axis,
        });
    }

    model
        .cells
        .iter()
        .find(|c| c.bounds.inflate(CELL_CLICK_PADDING).contains(p))
        .map(|cell| Hit::Cell {
            domain: cell.domain.clone(),
            granularity: cell.granularity.clone(),
            center: cell.bounds.center(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_layout, LayoutConfig, Viewport, ZoomTransform};
    use crate::model::{CompetencyQuestion, PlotData};
    use pretty_assertions::assert_eq;

    fn data() -> PlotData {
        PlotData::from_axes(["Clinical", "Devices"], ["L1", "L2"]).with_question(
            CompetencyQuestion::new("q1", "Which patients?", "Clinical", "L1")
                .with_terms(["Patient"]),
        )
    }

    fn model(scale: f64) -> RenderModel {
        compute_layout(
            &data(),
            &Viewport::default(),
            &ZoomTransform::new(scale, 12.0, -30.0),
            &LayoutConfig::default(),
        )
    }

    #[test]
    fn test_click_on_point() {
        let m = model(0.5);
        let point = m.point_for("q1").unwrap();
        let hit = hit_test(&m, m.to_screen(point.position));
        assert_eq!(
            hit,
            Some(Hit::Point {
                cq_id: "q1".to_string()
            })
        );
    }

    #[test]
    fn test_click_on_label() {
        let m = model(2.0);
        let label = &m.labels[0];
        let hit = hit_test(&m, m.to_screen(label.position));
        assert_eq!(
            hit,
            Some(Hit::Label {
                cq_id: "q1".to_string()
            })
        );
    }

    #[test]
    fn test_click_on_empty_cell() {
        let m = model(1.0);
        let cell = m.cell("Devices", "L2").unwrap();
        let hit = hit_test(&m, m.to_screen(cell.bounds.center()));
        assert_eq!(
            hit,
            Some(Hit::Cell {
                domain: "Devices".to_string(),
                granularity: "L2".to_string(),
                center: cell.bounds.center(),
            })
        );
    }

    #[test]
    fn test_click_just_outside_cell_still_hits() {
        let m = model(1.0);
        let cell = m.cell("Clinical", "L2").unwrap();
        let edge = Point::new(cell.bounds.x - 3.0, cell.bounds.center().y);
        assert!(matches!(
            hit_test(&m, m.to_screen(edge)),
            Some(Hit::Cell { .. })
        ));
    }

    #[test]
    fn test_click_on_axis_tick() {
        let m = model(1.0);
        let tick = m
            .axis_ticks
            .iter()
            .find(|t| t.value == "L2")
            .unwrap();
        let target = tick.bounds().center();
        assert_eq!(
            hit_test(&m, m.to_screen(target)),
            Some(Hit::AxisValue {
                value: "L2".to_string(),
                axis: Dimension::TerminologyGranularity,
            })
        );
    }

    #[test]
    fn test_overlapping_clamped_cells_resolve_to_the_earlier_one() {
        let data = PlotData::from_axes((0..200).map(|i| format!("D{}", i)), ["L1"]);
        let config = LayoutConfig::default().with_max_expansion(1.0);
        let m = compute_layout(
            &data,
            &Viewport::new(300.0, 300.0),
            &ZoomTransform::identity(),
            &config,
        );
        let first = m.cell("D0", "L1").unwrap().bounds;
        let second = m.cell("D1", "L1").unwrap().bounds;
        let target = Point::new(second.x + 1.0, first.center().y);
        assert!(first.contains(target) && second.contains(target));
        assert!(matches!(
            hit_test(&m, m.to_screen(target)),
            Some(Hit::Cell { domain, .. }) if domain == "D0"
        ));
    }

    #[test]
    fn test_click_on_nothing() {
        let m = model(1.0);
        assert_eq!(hit_test(&m, Point::new(-5000.0, -5000.0)), None);
    }
}
