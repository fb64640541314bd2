//! JSON export of a scoping session
//!
//! The document groups relevant questions by intersection and adds a small
//! summary. Field names are snake_case on the wire.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::model::{CqType, Dimension};
use crate::store::{SessionStore, StoreError};

pub const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionExport {
    pub meta: ExportMeta,
    pub dimensions: ExportDimensions,
    pub intersections: Vec<ExportIntersection>,
    pub summary: ExportSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportMeta {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub domain: String,
    pub session_id: String,
    pub total_questions: usize,
    pub total_intersections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDimensions {
    pub domain_coverage_values: Vec<String>,
    pub terminology_granularity_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportIntersection {
    pub domain_coverage: String,
    pub terminology_granularity: String,
    pub competency_questions: Vec<ExportQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportQuestion {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub cq_type: String,
    pub terminologies: Vec<String>,
    pub position: ExportPosition,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExportPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub questions_by_type: BTreeMap<String, usize>,
    pub questions_by_intersection: Vec<IntersectionCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntersectionCount {
    pub intersection: String,
    pub count: usize,
}

impl SessionExport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Export label for a question role; untyped questions count as subjects
fn type_label(cq_type: CqType) -> &'static str {
    cq_type.as_str().unwrap_or("subject")
}

/// Build the export document for one session
pub fn export_session(
    store: &SessionStore,
    session_id: &str,
    exported_at: DateTime<Utc>,
) -> Result<SessionExport, StoreError> {
    let session = store.session(session_id)?;
    let questions = store.relevant_questions(session_id);

    let values = |dimension| -> Vec<String> {
        store
            .dimension_values(session_id, dimension)
            .into_iter()
            .map(|dv| dv.value.clone())
            .collect()
    };

    let mut grouped: HashMap<(String, String), Vec<ExportQuestion>> = HashMap::new();
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    for cq in &questions {
        *by_type.entry(type_label(cq.cq_type).to_string()).or_default() += 1;
        grouped
            .entry((cq.domain_coverage.clone(), cq.terminology_granularity.clone()))
            .or_default()
            .push(ExportQuestion {
                id: cq.id.clone(),
                question: cq.question.clone(),
                cq_type: type_label(cq.cq_type).to_string(),
                terminologies: cq.suggested_terms.clone(),
                position: ExportPosition { x: cq.x, y: cq.y },
                created: store.question_created_at(&cq.id)?,
            });
    }

    let mut keys: Vec<(String, String)> = grouped.keys().cloned().collect();
    keys.sort();
    let intersections: Vec<ExportIntersection> = keys
        .into_iter()
        .filter_map(|key| {
            let cqs = grouped.remove(&key)?;
            Some(ExportIntersection {
                domain_coverage: key.0,
                terminology_granularity: key.1,
                competency_questions: cqs,
            })
        })
        .collect();

    let questions_by_intersection = intersections
        .iter()
        .map(|i| IntersectionCount {
            intersection: format!("{} × {}", i.domain_coverage, i.terminology_granularity),
            count: i.competency_questions.len(),
        })
        .collect();

    Ok(SessionExport {
        meta: ExportMeta {
            schema_version: SCHEMA_VERSION.to_string(),
            exported_at,
            domain: session.domain.clone(),
            session_id: session.id.clone(),
            total_questions: questions.len(),
            total_intersections: intersections.len(),
        },
        dimensions: ExportDimensions {
            domain_coverage_values: values(Dimension::DomainCoverage),
            terminology_granularity_values: values(Dimension::TerminologyGranularity),
        },
        intersections,
        summary: ExportSummary {
            questions_by_type: by_type,
            questions_by_intersection,
        },
    })
}

/// Download file name for an export: `ontoscope-<domain>-<date>.json`
pub fn export_filename(domain: &str, date: NaiveDate) -> String {
    let slug = domain
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("ontoscope-{}-{}.json", slug, date.format("%Y-%m-%d"))
}
