//! Error taxonomy for profile handling, AI inference and form filling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutofillError {
    /// Profile file absent, unreadable, or missing derived fields. Fatal.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("navigation failed: {0}")]
    NavigationFailure(String),

    #[error("browser automation error: {0}")]
    Browser(String),

    #[error("AI generation failed: {0}")]
    AiGenerationFailed(String),

    #[error("AI did not return a valid JSON mapping. Response was:\n{raw}")]
    AiResponseInvalid { raw: String },

    /// Only ever logged; never leaves the form filler.
    #[error("failed to fill element #{index} ({tag}): {reason}")]
    ElementApply {
        index: usize,
        tag: String,
        reason: String,
    },

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AutofillError>;

impl AutofillError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, AutofillError::ConfigurationMissing(_))
    }
}
