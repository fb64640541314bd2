//! In-memory session store
//!
//! Holds scoping sessions with their axis values and competency questions,
//! plus a per-session history of deleted values, terms and questions. A
//! [`SessionStore::snapshot`] hands the layout engine everything it needs for
//! one session.
//!
//! Records keep insertion order, which is also the band order on the plot.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::model::{CompetencyQuestion, CqType, Dimension, DimensionValue, PlotData};

/// Errors returned by store lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Dimension value not found: {0}")]
    DimensionValueNotFound(String),
    #[error("Granularity level '{value}' not found in session {session}")]
    GranularityLevelNotFound { session: String, value: String },
    #[error("Competency question not found: {0}")]
    QuestionNotFound(String),
    #[error("Value '{value}' already exists on the {dimension} axis")]
    DuplicateValue { dimension: Dimension, value: String },
    #[error("Competency question already exists in the session: {0}")]
    DuplicateQuestion(String),
}

/// One scoping session for a subject domain
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub domain: String,
    pub created_at: DateTime<Utc>,
}

/// An axis value that was deleted from a session
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedValue {
    pub id: String,
    pub session_id: String,
    pub dimension: Dimension,
    pub value: String,
    pub deleted_at: DateTime<Utc>,
}

/// A term removed from one of a session's questions
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedTerminology {
    pub id: String,
    pub session_id: String,
    pub terminology: String,
    pub deleted_at: DateTime<Utc>,
}

/// A question deleted from a session
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedQuestion {
    pub id: String,
    pub session_id: String,
    pub question: String,
    pub deleted_at: DateTime<Utc>,
}

/// Partial update of a question; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionUpdate {
    pub question: Option<String>,
    pub domain_coverage: Option<String>,
    pub terminology_granularity: Option<String>,
    pub suggested_terms: Option<Vec<String>>,
    pub cq_type: Option<CqType>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

#[derive(Debug, Clone)]
struct Scoped<T> {
    session_id: String,
    created_at: DateTime<Utc>,
    record: T,
}

impl<T> Scoped<T> {
    fn new(session_id: &str, record: T) -> Self {
        Self {
            session_id: session_id.to_string(),
            created_at: Utc::now(),
            record,
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Comparison key for duplicate detection
fn normalized(text: &str) -> String {
    text.trim().to_lowercase()
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<Session>,
    values: Vec<Scoped<DimensionValue>>,
    questions: Vec<Scoped<CompetencyQuestion>>,
    deleted_values: Vec<DeletedValue>,
    deleted_terminologies: Vec<DeletedTerminology>,
    deleted_questions: Vec<DeletedQuestion>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_session(&mut self, domain: impl Into<String>) -> Session {
        let session = Session {
            id: new_id(),
            domain: domain.into(),
            created_at: Utc::now(),
        };
        debug!(id = %session.id, domain = %session.domain, "session created");
        self.sessions.push(session.clone());
        session
    }

    pub fn session(&self, id: &str) -> Result<&Session, StoreError> {
        self.sessions
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))
    }

    // ---- Axis values ----

    /// Add a value to one axis of a session
    ///
    /// Values are unique per axis, ignoring case and surrounding whitespace.
    pub fn add_dimension_value(
        &mut self,
        session_id: &str,
        dimension: Dimension,
        value: impl Into<String>,
    ) -> Result<DimensionValue, StoreError> {
        self.session(session_id)?;
        let value = value.into();
        let key = normalized(&value);
        let taken = self.values.iter().any(|s| {
            s.session_id == session_id
                && s.record.dimension == dimension
                && normalized(&s.record.value) == key
        });
        if taken {
            return Err(StoreError::DuplicateValue { dimension, value });
        }
        let dv = DimensionValue::new(new_id(), dimension, value);
        self.values.push(Scoped::new(session_id, dv.clone()));
        Ok(dv)
    }

    /// Relevant values of one axis, in insertion order
    pub fn dimension_values(&self, session_id: &str, dimension: Dimension) -> Vec<&DimensionValue> {
        self.values
            .iter()
            .filter(|s| s.session_id == session_id)
            .map(|s| &s.record)
            .filter(|dv| dv.dimension == dimension && dv.is_relevant)
            .collect()
    }

    pub fn set_dimension_value_relevance(&mut self, id: &str, is_relevant: bool) -> Result<(), StoreError> {
        let dv = self
            .values
            .iter_mut()
            .map(|s| &mut s.record)
            .find(|dv| dv.id == id)
            .ok_or_else(|| StoreError::DimensionValueNotFound(id.to_string()))?;
        dv.is_relevant = is_relevant;
        Ok(())
    }

    /// Delete an axis value and every question of the same session on it
    ///
    /// Returns the number of questions removed.
    pub fn delete_dimension_value(&mut self, id: &str) -> Result<usize, StoreError> {
        let index = self
            .values
            .iter()
            .position(|s| s.record.id == id)
            .ok_or_else(|| StoreError::DimensionValueNotFound(id.to_string()))?;
        let removed = self.values.remove(index);
        let session_id = removed.session_id;
        let dv = removed.record;

        self.deleted_values.push(DeletedValue {
            id: new_id(),
            session_id: session_id.clone(),
            dimension: dv.dimension,
            value: dv.value.clone(),
            deleted_at: Utc::now(),
        });

        let before = self.questions.len();
        self.questions.retain(|s| {
            s.session_id != session_id || s.record.axis_value(dv.dimension) != dv.value
        });
        let cascaded = before - self.questions.len();

        debug!(
            value = %dv.value,
            dimension = %dv.dimension,
            cascaded,
            "dimension value deleted"
        );
        Ok(cascaded)
    }

    /// Delete a granularity level by its label
    pub fn delete_granularity_level(&mut self, session_id: &str, value: &str) -> Result<usize, StoreError> {
        self.session(session_id)?;
        let id = self
            .dimension_values(session_id, Dimension::TerminologyGranularity)
            .into_iter()
            .find(|dv| dv.value == value)
            .map(|dv| dv.id.clone())
            .ok_or_else(|| StoreError::GranularityLevelNotFound {
                session: session_id.to_string(),
                value: value.to_string(),
            })?;
        self.delete_dimension_value(&id)
    }

    // ---- Questions ----

    /// Store a question under a fresh id; it starts out relevant
    ///
    /// Question texts are unique per session, ignoring case and surrounding
    /// whitespace.
    pub fn add_question(
        &mut self,
        session_id: &str,
        mut cq: CompetencyQuestion,
    ) -> Result<CompetencyQuestion, StoreError> {
        self.session(session_id)?;
        let key = normalized(&cq.question);
        let taken = self
            .questions
            .iter()
            .any(|s| s.session_id == session_id && normalized(&s.record.question) == key);
        if taken {
            return Err(StoreError::DuplicateQuestion(cq.question));
        }
        cq.id = new_id();
        cq.is_relevant = true;
        self.questions.push(Scoped::new(session_id, cq.clone()));
        Ok(cq)
    }

    pub fn question(&self, id: &str) -> Result<&CompetencyQuestion, StoreError> {
        self.scoped_question(id).map(|s| &s.record)
    }

    /// When a question was stored
    pub fn question_created_at(&self, id: &str) -> Result<DateTime<Utc>, StoreError> {
        self.scoped_question(id).map(|s| s.created_at)
    }

    pub fn questions(&self, session_id: &str) -> Vec<&CompetencyQuestion> {
        self.questions
            .iter()
            .filter(|s| s.session_id == session_id)
            .map(|s| &s.record)
            .collect()
    }

    pub fn relevant_questions(&self, session_id: &str) -> Vec<&CompetencyQuestion> {
        self.questions(session_id)
            .into_iter()
            .filter(|cq| cq.is_relevant)
            .collect()
    }

    pub fn set_question_relevance(&mut self, id: &str, is_relevant: bool) -> Result<(), StoreError> {
        self.question_mut(id)?.is_relevant = is_relevant;
        Ok(())
    }

    pub fn update_question(&mut self, id: &str, update: QuestionUpdate) -> Result<&CompetencyQuestion, StoreError> {
        let cq = self.question_mut(id)?;
        if let Some(question) = update.question {
            cq.question = question;
        }
        if let Some(domain) = update.domain_coverage {
            cq.domain_coverage = domain;
        }
        if let Some(level) = update.terminology_granularity {
            cq.terminology_granularity = level;
        }
        if let Some(terms) = update.suggested_terms {
            cq.suggested_terms = terms;
        }
        if let Some(cq_type) = update.cq_type {
            cq.cq_type = cq_type;
        }
        if let Some(x) = update.x {
            cq.x = x;
        }
        if let Some(y) = update.y {
            cq.y = y;
        }
        Ok(&*cq)
    }

    pub fn set_question_terms(&mut self, id: &str, terms: Vec<String>) -> Result<(), StoreError> {
        self.question_mut(id)?.suggested_terms = terms;
        Ok(())
    }

    /// Drop a term from a question and remember it as deleted
    pub fn remove_term(&mut self, id: &str, term: &str) -> Result<(), StoreError> {
        let scoped = self
            .questions
            .iter_mut()
            .find(|s| s.record.id == id)
            .ok_or_else(|| StoreError::QuestionNotFound(id.to_string()))?;
        scoped.record.suggested_terms.retain(|t| t != term);
        self.deleted_terminologies.push(DeletedTerminology {
            id: new_id(),
            session_id: scoped.session_id.clone(),
            terminology: term.to_string(),
            deleted_at: Utc::now(),
        });
        Ok(())
    }

    /// Delete a question and remember its text
    pub fn delete_question(&mut self, id: &str) -> Result<CompetencyQuestion, StoreError> {
        let index = self
            .questions
            .iter()
            .position(|s| s.record.id == id)
            .ok_or_else(|| StoreError::QuestionNotFound(id.to_string()))?;
        let removed = self.questions.remove(index);
        self.deleted_questions.push(DeletedQuestion {
            id: new_id(),
            session_id: removed.session_id,
            question: removed.record.question.clone(),
            deleted_at: Utc::now(),
        });
        Ok(removed.record)
    }

    // ---- Deletion history ----

    pub fn deleted_values(&self, session_id: &str) -> Vec<&DeletedValue> {
        self.deleted_values
            .iter()
            .filter(|d| d.session_id == session_id)
            .collect()
    }

    pub fn deleted_terminologies(&self, session_id: &str) -> Vec<&DeletedTerminology> {
        self.deleted_terminologies
            .iter()
            .filter(|d| d.session_id == session_id)
            .collect()
    }

    pub fn deleted_questions(&self, session_id: &str) -> Vec<&DeletedQuestion> {
        self.deleted_questions
            .iter()
            .filter(|d| d.session_id == session_id)
            .collect()
    }

    /// Layout input for one session
    pub fn snapshot(&self, session_id: &str) -> Result<PlotData, StoreError> {
        self.session(session_id)?;
        let collect = |dimension| {
            self.dimension_values(session_id, dimension)
                .into_iter()
                .cloned()
                .collect()
        };
        Ok(PlotData {
            domain_coverage_values: collect(Dimension::DomainCoverage),
            terminology_granularity_values: collect(Dimension::TerminologyGranularity),
            competency_questions: self.questions(session_id).into_iter().cloned().collect(),
        })
    }

    fn scoped_question(&self, id: &str) -> Result<&Scoped<CompetencyQuestion>, StoreError> {
        self.questions
            .iter()
            .find(|s| s.record.id == id)
            .ok_or_else(|| StoreError::QuestionNotFound(id.to_string()))
    }

    fn question_mut(&mut self, id: &str) -> Result<&mut CompetencyQuestion, StoreError> {
        self.questions
            .iter_mut()
            .map(|s| &mut s.record)
            .find(|cq| cq.id == id)
            .ok_or_else(|| StoreError::QuestionNotFound(id.to_string()))
    }
}
