//! End-to-end layout scenarios on realistic snapshots

use ontoscope::layout::labels::collect_terms;
use ontoscope::layout::{
    compute_layout, pack_labels, BoundingBox, LabelDetail, Point, RenderMode,
};
use ontoscope::{CompetencyQuestion, CqType, LayoutConfig, PlotData, Viewport, ZoomTransform};

fn clinical_axes() -> PlotData {
    PlotData::from_axes(
        ["Clinical", "Devices", "Records"],
        ["First-level", "Second-level", "Third-level"],
    )
}

fn single_patient_question() -> PlotData {
    clinical_axes().with_question(
        CompetencyQuestion::new("q1", "Which patients are admitted?", "Clinical", "First-level")
            .with_terms(["Patient"])
            .with_type(CqType::Subject),
    )
}

fn layout_at(data: &PlotData, scale: f64) -> ontoscope::RenderModel {
    compute_layout(
        data,
        &Viewport::default(),
        &ZoomTransform::with_scale(scale),
        &LayoutConfig::default(),
    )
}

#[test]
fn test_low_zoom_draws_one_point_inside_its_cell() {
    let data = single_patient_question();
    let model = layout_at(&data, 0.3);

    assert_eq!(model.mode, RenderMode::Points);
    assert_eq!(model.cells.len(), 9);
    assert!(model.labels.is_empty());
    assert_eq!(model.points.len(), 1);

    let cell = model.cell("Clinical", "First-level").expect("cell exists");
    let point = model.point_for("q1").expect("point placed");
    assert_eq!(point.cell_id, cell.id);
    assert!(cell.bounds.contains(point.position));
    assert_eq!((point.slot.grid_x, point.slot.grid_y), (0, 0));
}

#[test]
fn test_high_zoom_draws_one_clean_label_inside_its_cell() {
    let data = single_patient_question();
    let model = layout_at(&data, 2.0);

    assert_eq!(model.mode, RenderMode::Detail);
    assert!(model.points.is_empty());
    assert_eq!(model.labels.len(), 1);

    let label = &model.labels[0];
    let cell = model.cell("Clinical", "First-level").expect("cell exists");
    assert_eq!(label.text, "Patient");
    assert_eq!(label.cq_id, "q1");
    assert!(!label.forced);
    assert!(cell.bounds.contains_box(&label.bounds()));
    assert_eq!(model.labels_for("q1").count(), 1);
}

#[test]
fn test_first_level_is_the_bottom_row() {
    let model = layout_at(&clinical_axes(), 1.0);
    let first = model.cell("Clinical", "First-level").expect("cell exists");
    let third = model.cell("Clinical", "Third-level").expect("cell exists");
    assert!(first.bounds.y > third.bounds.y);

    let clinical = model.cell("Clinical", "Second-level").expect("cell exists");
    let records = model.cell("Records", "Second-level").expect("cell exists");
    assert!(clinical.bounds.x < records.bounds.x);
}

#[test]
fn test_crowded_small_cell_keeps_every_label_finite() {
    let questions: Vec<CompetencyQuestion> = (0..5)
        .map(|i| {
            CompetencyQuestion::new(
                format!("q{}", i),
                format!("Question {}?", i),
                "Clinical",
                "First-level",
            )
            .with_terms([format!("Term{}a", i), format!("Term{}b", i)])
        })
        .collect();
    let refs: Vec<&CompetencyQuestion> = questions.iter().collect();
    let terms = collect_terms(&refs, LabelDetail::Detail);
    assert_eq!(terms.len(), 10);

    let cell = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    let packed = pack_labels(&terms, &cell, LabelDetail::Detail, &LayoutConfig::default());

    assert_eq!(packed.labels.len(), 10);
    for label in &packed.labels {
        assert!(label.center.is_finite(), "{:?}", label);
        assert!(label.center.x >= 0.0 && label.center.y >= 0.0, "{:?}", label);
        assert!(label.font_size >= 5.0);
    }
}

#[test]
fn test_layout_is_idempotent() {
    let mut data = clinical_axes();
    for i in 0..20 {
        data = data.with_question(
            CompetencyQuestion::new(format!("q{}", i), "Q?", "Devices", "Second-level")
                .with_terms(["Device", "Implant"]),
        );
    }

    for scale in [0.4, 1.0, 3.0] {
        assert_eq!(layout_at(&data, scale), layout_at(&data, scale));
    }
}

#[test]
fn test_overflowing_cell_uses_fallback_positions() {
    let mut data = clinical_axes();
    for i in 0..20 {
        data = data.with_question(CompetencyQuestion::new(
            format!("q{}", i),
            "Q?",
            "Records",
            "Third-level",
        ));
    }
    let model = layout_at(&data, 0.5);
    let cell = model.cell("Records", "Third-level").expect("cell exists");

    assert_eq!(model.points.len(), 20);
    assert_eq!(model.points.iter().filter(|p| p.slot.is_fallback()).count(), 4);
    for point in &model.points {
        assert!(cell.bounds.contains(point.position));
    }
}

#[test]
fn test_screen_mapping_round_trips_through_transform() {
    let data = single_patient_question();
    let model = compute_layout(
        &data,
        &Viewport::default(),
        &ZoomTransform::new(2.0, -40.0, 25.0),
        &LayoutConfig::default(),
    );
    let p = Point::new(120.0, 80.0);
    let back = model.to_content(model.to_screen(p));
    assert!((back.x - p.x).abs() < 1e-9);
    assert!((back.y - p.y).abs() < 1e-9);
}
