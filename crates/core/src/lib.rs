//! Core domain types, configuration rules, quiz scoring, and report
//! assembly for generating quizzes from lecture material.

pub mod config;
pub mod error;
pub mod layout;
pub mod report;
pub mod scoring;
pub mod types;

pub use config::{ConfigurationNormalizer, FileWarning, QuizSettings, Screened, MAX_SOURCE_FILES};
pub use error::{ConfigError, Error, ExtractionError, GenerationError, Result, ScoringError};
pub use layout::{Page, PagedTextRenderer, ReportLabels};
pub use report::{
    AnswerStatus, QuestionBlock, Report, ReportAssembler, ReportHeader, SelectedAnswer,
    DEFAULT_REPORT_TITLE,
};
pub use scoring::{QuestionOutcome, QuizScorer, ScoredResult};
pub use types::{
    validate_questions, AnswerSet, AssessmentType, GenerationRequest, Language, Question,
    SlideText, SourceContent, SourceFile, SourceFormat, Upload, PDF_MIME, PPTX_MIME,
};
