//! Error types for quiz generation, scoring, and reporting.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error surfaced by the quiz pipeline.
///
/// Every variant is recoverable at the user-interaction boundary: the caller
/// shows the message and returns to file selection.
#[derive(Error, Debug)]
pub enum Error {
    /// Slide text could not be extracted.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The requested configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The quiz could not be scored.
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// The generation service failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Failures while extracting text from a slide-deck archive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The input is not a readable zip archive, or an entry could not be read.
    #[error("unreadable archive")]
    UnreadableArchive,

    /// The archive opened but no slide carried any text.
    #[error("no text found")]
    NoTextFound,
}

/// Invalid generation settings or file sets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// More files were attached than the limit allows.
    #[error("too many files")]
    TooManyFiles,

    /// The question count is not one of the presets for the assessment type.
    #[error("invalid question count for assessment type")]
    InvalidQuestionCount,

    /// Every attached file was skipped or failed extraction.
    #[error("no usable source files")]
    NoUsableFiles,
}

/// Failures while scoring a completed quiz.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// There are no questions to score against.
    #[error("empty quiz")]
    EmptyQuiz,
}

/// Failures talking to the external generation service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The service could not be reached at all.
    #[error("generation service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a non-success status.
    #[error("generation service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was missing or not the expected JSON.
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),

    /// The model returned no content.
    #[error("generation service returned no questions")]
    EmptyResponse,

    /// A returned question does not have the declared shape.
    #[error("question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },
}
