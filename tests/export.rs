//! JSON export of a whole session

use chrono::{TimeZone, Utc};
use serde_json::Value;

use ontoscope::{export_session, CompetencyQuestion, CqType, Dimension, SessionStore};

#[test]
fn test_export_document_shape() {
    let mut store = SessionStore::new();
    let session = store.create_session("Rare Disease Research").id;
    for d in ["Genetics", "Clinical"] {
        store
            .add_dimension_value(&session, Dimension::DomainCoverage, d)
            .unwrap();
    }
    let hidden = store
        .add_dimension_value(&session, Dimension::DomainCoverage, "Billing")
        .unwrap();
    store.set_dimension_value_relevance(&hidden.id, false).unwrap();
    store
        .add_dimension_value(&session, Dimension::TerminologyGranularity, "Broad")
        .unwrap();

    let mut cq = CompetencyQuestion::new("", "Which variants cause it?", "Genetics", "Broad")
        .with_terms(["Variant", "Gene"])
        .with_type(CqType::Property);
    cq.x = 0.375;
    cq.y = 0.125;
    store.add_question(&session, cq).unwrap();
    store
        .add_question(
            &session,
            CompetencyQuestion::new("", "Which symptoms?", "Clinical", "Broad"),
        )
        .unwrap();

    let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let export = export_session(&store, &session, at).unwrap();
    let json: Value = serde_json::from_str(&export.to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["meta"]["domain"], "Rare Disease Research");
    assert_eq!(json["meta"]["session_id"], session.as_str());
    assert_eq!(json["meta"]["total_questions"], 2);
    assert_eq!(
        json["dimensions"]["domain_coverage_values"],
        serde_json::json!(["Genetics", "Clinical"])
    );

    let intersections = json["intersections"].as_array().unwrap();
    assert_eq!(intersections.len(), 2);
    assert_eq!(intersections[0]["domain_coverage"], "Clinical");
    assert_eq!(intersections[1]["domain_coverage"], "Genetics");

    let genetics = &intersections[1]["competency_questions"][0];
    assert_eq!(genetics["type"], "property");
    assert_eq!(genetics["terminologies"], serde_json::json!(["Variant", "Gene"]));
    assert_eq!(genetics["position"]["x"], 0.375);
    assert_eq!(intersections[0]["competency_questions"][0]["type"], "subject");

    assert_eq!(json["summary"]["questions_by_type"]["property"], 1);
    assert_eq!(
        json["summary"]["questions_by_intersection"][0]["intersection"],
        "Clinical × Broad"
    );
}
