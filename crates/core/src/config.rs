//! Reconciles assessment settings and attached files into a generation
//! request.

use crate::error::ConfigError;
use crate::types::{AssessmentType, GenerationRequest, Language, SourceFile, SourceFormat, Upload};
use std::fmt;

/// Maximum number of files attached to one generation request.
pub const MAX_SOURCE_FILES: usize = 10;

/// User-chosen generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    pub assessment_type: AssessmentType,
    pub question_count: u32,
    pub language: Language,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            assessment_type: AssessmentType::Quiz,
            question_count: AssessmentType::Quiz.default_question_count(),
            language: Language::English,
        }
    }
}

impl QuizSettings {
    /// Switch assessment type. The question count resets to the new type's
    /// default.
    pub fn with_assessment_type(mut self, assessment_type: AssessmentType) -> Self {
        self.assessment_type = assessment_type;
        self.question_count = assessment_type.default_question_count();
        self
    }

    /// Set the question count. Not validated until normalization.
    pub fn with_question_count(mut self, count: u32) -> Self {
        self.question_count = count;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// A file that was skipped or failed, while the rest of the set proceeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWarning {
    /// Name of the affected file.
    pub file: String,
    /// Human-readable reason.
    pub reason: String,
}

impl FileWarning {
    pub fn new(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.reason)
    }
}

/// Uploads that passed screening, in their original order.
#[derive(Debug, Default)]
pub struct Screened {
    pub accepted: Vec<(Upload, SourceFormat)>,
    pub warnings: Vec<FileWarning>,
}

/// Enforces file limits, supported types, and question-count presets.
#[derive(Debug, Clone)]
pub struct ConfigurationNormalizer {
    max_files: usize,
}

impl Default for ConfigurationNormalizer {
    fn default() -> Self {
        Self {
            max_files: MAX_SOURCE_FILES,
        }
    }
}

impl ConfigurationNormalizer {
    /// Create a normalizer with the default 10-file limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with a custom file limit.
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files.max(1);
        self
    }

    /// Reject counts outside the preset set. Never coerces.
    pub fn validate_question_count(
        &self,
        assessment_type: AssessmentType,
        count: u32,
    ) -> Result<u32, ConfigError> {
        if assessment_type.allows(count) {
            Ok(count)
        } else {
            log::debug!(
                "Rejecting question count {} for {} (presets: {:?})",
                count,
                assessment_type.as_str(),
                assessment_type.presets()
            );
            Err(ConfigError::InvalidQuestionCount)
        }
    }

    /// Check the file limit, then split uploads into supported files and
    /// per-file warnings for unsupported declared types.
    ///
    /// Exceeding the limit fails before any upload is looked at.
    pub fn screen(&self, uploads: Vec<Upload>) -> Result<Screened, ConfigError> {
        if uploads.len() > self.max_files {
            return Err(ConfigError::TooManyFiles);
        }

        let mut screened = Screened::default();
        for upload in uploads {
            match upload.format() {
                Some(format) => screened.accepted.push((upload, format)),
                None => {
                    log::warn!(
                        "Skipping {}: unsupported type '{}'",
                        upload.name,
                        upload.mime_type
                    );
                    let reason = if upload.mime_type.is_empty() {
                        "unsupported file type".to_string()
                    } else {
                        format!("unsupported file type '{}'", upload.mime_type)
                    };
                    screened.warnings.push(FileWarning::new(&upload.name, reason));
                }
            }
        }

        Ok(screened)
    }

    /// Package settings and prepared files into a generation request.
    pub fn normalize(
        &self,
        settings: QuizSettings,
        source_files: Vec<SourceFile>,
    ) -> Result<GenerationRequest, ConfigError> {
        if source_files.len() > self.max_files {
            return Err(ConfigError::TooManyFiles);
        }
        let question_count =
            self.validate_question_count(settings.assessment_type, settings.question_count)?;
        if source_files.is_empty() {
            return Err(ConfigError::NoUsableFiles);
        }

        Ok(GenerationRequest::new(
            source_files,
            question_count,
            settings.language,
            settings.assessment_type,
        ))
    }
}
