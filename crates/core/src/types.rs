//! Domain types for source files, generation requests, and quiz questions.

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// MIME type declared for PDF documents.
pub const PDF_MIME: &str = "application/pdf";

/// MIME type declared for PowerPoint (OOXML) slide decks.
pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Number of options every question must carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A file as selected by the user, before screening.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original filename (without path).
    pub name: String,

    /// Declared MIME type. May be empty when unknown.
    pub mime_type: String,

    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Create a new upload.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// The supported format this upload declares, if any.
    pub fn format(&self) -> Option<SourceFormat> {
        SourceFormat::from_declared(&self.name, &self.mime_type)
    }
}

/// The two source formats the generator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// PDF, passed through to the generation service as bytes.
    Pdf,
    /// PPTX slide deck, text-extracted locally.
    Pptx,
}

impl SourceFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Detect format from a declared MIME type, falling back to the
    /// filename extension for slide decks.
    ///
    /// Browsers and some mailers leave the PPTX MIME type blank, so a
    /// `.pptx` name is accepted on its own. PDFs must declare their type.
    pub fn from_declared(name: &str, mime_type: &str) -> Option<Self> {
        if mime_type.eq_ignore_ascii_case(PDF_MIME) {
            return Some(Self::Pdf);
        }
        if mime_type.eq_ignore_ascii_case(PPTX_MIME) {
            return Some(Self::Pptx);
        }
        match name.rsplit_once('.') {
            Some((_, ext)) if ext.eq_ignore_ascii_case("pptx") => Some(Self::Pptx),
            _ => None,
        }
    }

    /// The canonical MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Pptx => PPTX_MIME,
        }
    }
}

/// Content of a screened source file. Exactly one form is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceContent {
    /// Bytes the generation service ingests directly (PDF).
    Binary(Vec<u8>),
    /// Text extracted locally (slide decks).
    Text(String),
}

/// A source file ready to be sent for generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub mime_type: String,
    pub content: SourceContent,
}

impl SourceFile {
    /// A file whose raw bytes are sent as-is.
    pub fn binary(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content: SourceContent::Binary(bytes),
        }
    }

    /// A file represented by its extracted text.
    pub fn text(name: impl Into<String>, mime_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content: SourceContent::Text(text.into()),
        }
    }

    /// Extracted text, when this file was text-extracted.
    pub fn extracted_text(&self) -> Option<&str> {
        match &self.content {
            SourceContent::Text(text) => Some(text),
            SourceContent::Binary(_) => None,
        }
    }
}

/// Text of one slide, as extracted from a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideText {
    /// 1-based position in slide order.
    pub number: usize,

    /// Run texts joined by single spaces and trimmed.
    pub text: String,
}

/// Language the questions should be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Arabic,
}

impl Language {
    /// Display name, as sent to the generation service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Arabic => "Arabic",
        }
    }
}

/// Short quiz or long exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentType {
    #[default]
    Quiz,
    Exam,
}

impl AssessmentType {
    /// Allowed question counts for this assessment type.
    pub fn presets(&self) -> &'static [u32] {
        match self {
            Self::Quiz => &[5, 10, 15, 20],
            Self::Exam => &[30, 40, 50],
        }
    }

    /// The count selected when switching to this type.
    pub fn default_question_count(&self) -> u32 {
        match self {
            Self::Quiz => 10,
            Self::Exam => 30,
        }
    }

    /// Whether `count` is one of this type's presets.
    pub fn allows(&self, count: u32) -> bool {
        self.presets().contains(&count)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Exam => "exam",
        }
    }
}

/// Everything the generation service needs for one quiz attempt.
///
/// Only [`ConfigurationNormalizer::normalize`](crate::ConfigurationNormalizer::normalize)
/// builds one, so the question count is always a preset of the assessment
/// type and the file set is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    source_files: Vec<SourceFile>,
    question_count: u32,
    language: Language,
    assessment_type: AssessmentType,
}

impl GenerationRequest {
    pub(crate) fn new(
        source_files: Vec<SourceFile>,
        question_count: u32,
        language: Language,
        assessment_type: AssessmentType,
    ) -> Self {
        Self {
            source_files,
            question_count,
            language,
            assessment_type,
        }
    }

    /// Source files in the order the user attached them.
    pub fn source_files(&self) -> &[SourceFile] {
        &self.source_files
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn assessment_type(&self) -> AssessmentType {
        self.assessment_type
    }
}

/// A multiple-choice question produced by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,

    pub options: Vec<String>,

    #[serde(rename = "correctAnswerIndex")]
    pub correct_option_index: usize,

    pub explanation: String,
}

impl Question {
    /// Check the declared shape: exactly four options and an in-range
    /// correct index. `index` is only used for the error report.
    pub fn validate(&self, index: usize) -> std::result::Result<(), GenerationError> {
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(GenerationError::InvalidQuestion {
                index,
                reason: format!(
                    "expected {} options, got {}",
                    OPTIONS_PER_QUESTION,
                    self.options.len()
                ),
            });
        }
        if self.correct_option_index >= OPTIONS_PER_QUESTION {
            return Err(GenerationError::InvalidQuestion {
                index,
                reason: format!(
                    "correct answer index {} is out of range",
                    self.correct_option_index
                ),
            });
        }
        Ok(())
    }

    /// Text of the option at `index`, if it exists.
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    /// Text of the correct option.
    pub fn correct_option(&self) -> Option<&str> {
        self.option(self.correct_option_index)
    }
}

/// Validate a whole generated question set.
pub fn validate_questions(questions: &[Question]) -> std::result::Result<(), GenerationError> {
    questions
        .iter()
        .enumerate()
        .try_for_each(|(idx, q)| q.validate(idx))
}

/// The user's selections: question index to selected option index.
///
/// Indices are expected to be dense but unanswered questions are simply
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<usize, usize>);

impl AnswerSet {
    /// Create an empty answer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the selection for a question.
    pub fn select(&mut self, question: usize, option: usize) {
        self.0.insert(question, option);
    }

    /// The selection for a question, if answered.
    pub fn get(&self, question: usize) -> Option<usize> {
        self.0.get(&question).copied()
    }

    /// Number of answered questions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(usize, usize)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: usize, correct: usize) -> Question {
        Question {
            prompt: "What is 2 + 2?".to_string(),
            options: (0..options).map(|i| format!("Option {}", i)).collect(),
            correct_option_index: correct,
            explanation: "Arithmetic.".to_string(),
        }
    }

    #[test]
    fn test_format_from_declared() {
        assert_eq!(SourceFormat::from_declared("notes.pdf", PDF_MIME), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_declared("deck", PPTX_MIME), Some(SourceFormat::Pptx));
        assert_eq!(SourceFormat::from_declared("Deck.PPTX", ""), Some(SourceFormat::Pptx));
        assert_eq!(SourceFormat::from_declared("notes.pdf", ""), None);
        assert_eq!(SourceFormat::from_declared("song.ppt", "application/vnd.ms-powerpoint"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_extension("PDF"), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_extension("pptx"), Some(SourceFormat::Pptx));
        assert_eq!(SourceFormat::from_extension("docx"), None);
    }

    #[test]
    fn test_presets() {
        assert!(AssessmentType::Quiz.allows(15));
        assert!(!AssessmentType::Quiz.allows(30));
        assert!(AssessmentType::Exam.allows(50));
        assert_eq!(AssessmentType::Quiz.default_question_count(), 10);
        assert_eq!(AssessmentType::Exam.default_question_count(), 30);
    }

    #[test]
    fn test_question_validate() {
        assert!(question(4, 3).validate(0).is_ok());
        assert!(matches!(
            question(3, 0).validate(2),
            Err(GenerationError::InvalidQuestion { index: 2, .. })
        ));
        assert!(question(4, 4).validate(0).is_err());
    }

    #[test]
    fn test_question_wire_names() {
        let json = r#"{"question":"Q","options":["a","b","c","d"],"correctAnswerIndex":2,"explanation":"E"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.prompt, "Q");
        assert_eq!(q.correct_option_index, 2);
        assert_eq!(q.correct_option(), Some("c"));
    }

    #[test]
    fn test_answer_set_from_json() {
        let answers: AnswerSet = serde_json::from_str(r#"{"0": 1, "3": 2}"#).unwrap();
        assert_eq!(answers.get(0), Some(1));
        assert_eq!(answers.get(1), None);
        assert_eq!(answers.get(3), Some(2));
        assert_eq!(answers.len(), 2);
    }
}
