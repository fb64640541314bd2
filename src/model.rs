//! Data model shared by the store, the layout engine and the CLI
//!
//! Records use camelCase field names on the wire so snapshots exported by the
//! web client can be fed to the engine unchanged.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SnapshotError;

/// The two axes of the scoping plot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// X axis: subdomains
    #[default]
    DomainCoverage,
    /// Y axis: hierarchical specificity levels
    TerminologyGranularity,
}

impl Dimension {
    /// Axis name used in click events and export files
    pub fn axis_name(self) -> &'static str {
        match self {
            Dimension::DomainCoverage => "domain",
            Dimension::TerminologyGranularity => "granularity",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::DomainCoverage => write!(f, "domain_coverage"),
            Dimension::TerminologyGranularity => write!(f, "terminology_granularity"),
        }
    }
}

/// Grammatical role of a competency question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CqType {
    Subject,
    Property,
    Object,
    #[default]
    Unspecified,
}

impl CqType {
    /// Parse a role name; anything unrecognised is `Unspecified`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "subject" => CqType::Subject,
            "property" => CqType::Property,
            "object" => CqType::Object,
            _ => CqType::Unspecified,
        }
    }

    pub fn as_str(self) -> Option<&'static str> {
        match self {
            CqType::Subject => Some("subject"),
            CqType::Property => Some("property"),
            CqType::Object => Some("object"),
            CqType::Unspecified => None,
        }
    }

    /// Stylesheet token for the label/point color of this role
    pub fn color_token(self) -> &'static str {
        match self {
            CqType::Subject => "cq-subject",
            CqType::Property => "cq-property",
            CqType::Object => "cq-object",
            CqType::Unspecified => "cq-unspecified",
        }
    }
}

fn serialize_cq_type<S: Serializer>(value: &CqType, serializer: S) -> Result<S::Ok, S::Error> {
    match value.as_str() {
        Some(s) => serializer.serialize_some(s),
        None => serializer.serialize_none(),
    }
}

fn deserialize_cq_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CqType, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().map(CqType::parse).unwrap_or_default())
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

fn default_true() -> bool {
    true
}

/// One category value on an axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionValue {
    pub id: String,
    #[serde(default)]
    pub dimension: Dimension,
    pub value: String,
    #[serde(default = "default_true")]
    pub is_relevant: bool,
}

impl DimensionValue {
    pub fn new(id: impl Into<String>, dimension: Dimension, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dimension,
            value: value.into(),
            is_relevant: true,
        }
    }
}

/// A competency question placed at one intersection of the plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyQuestion {
    pub id: String,
    pub question: String,
    pub domain_coverage: String,
    pub terminology_granularity: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub suggested_terms: Vec<String>,
    #[serde(
        rename = "type",
        default,
        serialize_with = "serialize_cq_type",
        deserialize_with = "deserialize_cq_type"
    )]
    pub cq_type: CqType,
    #[serde(default = "default_true")]
    pub is_relevant: bool,
    /// Legacy normalized position hint; placement ignores it
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl CompetencyQuestion {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        domain_coverage: impl Into<String>,
        terminology_granularity: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            domain_coverage: domain_coverage.into(),
            terminology_granularity: terminology_granularity.into(),
            suggested_terms: vec![],
            cq_type: CqType::Unspecified,
            is_relevant: true,
            x: 0.5,
            y: 0.5,
        }
    }

    pub fn with_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggested_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_type(mut self, cq_type: CqType) -> Self {
        self.cq_type = cq_type;
        self
    }

    pub fn with_relevance(mut self, is_relevant: bool) -> Self {
        self.is_relevant = is_relevant;
        self
    }

    /// The intersection this question belongs to
    pub fn intersection(&self) -> IntersectionKey<'_> {
        IntersectionKey {
            domain: &self.domain_coverage,
            granularity: &self.terminology_granularity,
        }
    }

    /// The value this question references on the given axis
    pub fn axis_value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::DomainCoverage => &self.domain_coverage,
            Dimension::TerminologyGranularity => &self.terminology_granularity,
        }
    }
}

/// Grouping key for questions sharing a (domain, granularity) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntersectionKey<'a> {
    pub domain: &'a str,
    pub granularity: &'a str,
}

impl fmt::Display for IntersectionKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.domain, self.granularity)
    }
}

/// Everything the layout engine needs for one recompute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotData {
    #[serde(default)]
    pub domain_coverage_values: Vec<DimensionValue>,
    #[serde(default)]
    pub terminology_granularity_values: Vec<DimensionValue>,
    #[serde(default)]
    pub competency_questions: Vec<CompetencyQuestion>,
}

impl PlotData {
    /// Build plot input from plain axis labels
    pub fn from_axes<D, G>(domains: D, granularities: G) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        let domain_coverage_values = domains
            .into_iter()
            .enumerate()
            .map(|(i, v)| DimensionValue::new(format!("d{}", i), Dimension::DomainCoverage, v))
            .collect();
        let terminology_granularity_values = granularities
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                DimensionValue::new(format!("g{}", i), Dimension::TerminologyGranularity, v)
            })
            .collect();
        Self {
            domain_coverage_values,
            terminology_granularity_values,
            competency_questions: vec![],
        }
    }

    pub fn with_question(mut self, cq: CompetencyQuestion) -> Self {
        self.competency_questions.push(cq);
        self
    }

    /// Load a snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load a snapshot from a JSON string
    ///
    /// The `dimension` field of each axis value is taken from the list it
    /// appears in, whatever the record itself says.
    pub fn from_json_str(content: &str) -> Result<Self, SnapshotError> {
        let mut data: PlotData = serde_json::from_str(content)?;
        for dv in &mut data.domain_coverage_values {
            dv.dimension = Dimension::DomainCoverage;
        }
        for dv in &mut data.terminology_granularity_values {
            dv.dimension = Dimension::TerminologyGranularity;
        }
        Ok(data)
    }

    pub fn to_json_string(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Relevant axis labels, in band order
    pub fn domain_labels(&self) -> Vec<&str> {
        relevant_labels(&self.domain_coverage_values)
    }

    pub fn granularity_labels(&self) -> Vec<&str> {
        relevant_labels(&self.terminology_granularity_values)
    }

    /// Relevant questions, in input order
    pub fn relevant_questions(&self) -> impl Iterator<Item = &CompetencyQuestion> {
        self.competency_questions.iter().filter(|cq| cq.is_relevant)
    }

    /// Relevant questions whose axis values are not on the plot
    pub fn orphans(&self) -> Vec<&CompetencyQuestion> {
        let domains: HashSet<&str> = self.domain_labels().into_iter().collect();
        let levels: HashSet<&str> = self.granularity_labels().into_iter().collect();
        self.relevant_questions()
            .filter(|cq| {
                !domains.contains(cq.domain_coverage.as_str())
                    || !levels.contains(cq.terminology_granularity.as_str())
            })
            .collect()
    }

    /// Fail on the first relevant question that references a missing axis value
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let domains: HashSet<&str> = self.domain_labels().into_iter().collect();
        let levels: HashSet<&str> = self.granularity_labels().into_iter().collect();
        for cq in self.relevant_questions() {
            if !domains.contains(cq.domain_coverage.as_str()) {
                return Err(SnapshotError::unknown_value(
                    &cq.id,
                    "domain",
                    &cq.domain_coverage,
                ));
            }
            if !levels.contains(cq.terminology_granularity.as_str()) {
                return Err(SnapshotError::unknown_value(
                    &cq.id,
                    "granularity",
                    &cq.terminology_granularity,
                ));
            }
        }
        Ok(())
    }
}

/// Relevant labels in order; a repeated label keeps its first band
fn relevant_labels(values: &[DimensionValue]) -> Vec<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|dv| dv.is_relevant)
        .map(|dv| dv.value.as_str())
        .filter(|label| seen.insert(*label))
        .collect()
}
