//! Error types for loading plot input

use thiserror::Error;

/// Errors that can occur when loading a plot snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse snapshot JSON: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Question '{question}' references unknown {axis} value '{value}'")]
    UnknownAxisValue {
        question: String,
        axis: &'static str,
        value: String,
    },
}

impl SnapshotError {
    /// Create an unknown axis value error
    pub fn unknown_value(
        question: impl Into<String>,
        axis: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::UnknownAxisValue {
            question: question.into(),
            axis,
            value: value.into(),
        }
    }
}
