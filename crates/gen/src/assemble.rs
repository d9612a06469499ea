//! Turning user uploads into a generation request.

use quiz_core::{
    ConfigurationNormalizer, FileWarning, GenerationRequest, QuizSettings, Result, SourceFile,
    SourceFormat, Upload,
};
use quiz_pptx::SlideTextExtractor;

/// A request ready to send, plus the files that were left out of it.
#[derive(Debug)]
pub struct AssembledRequest {
    pub request: GenerationRequest,
    pub warnings: Vec<FileWarning>,
}

/// Screens uploads, extracts slide text, and builds the request.
///
/// PDFs are passed through as bytes; slide decks are reduced to their text.
/// A file that fails extraction is reported as a warning and the rest still
/// proceed. Output order always follows upload order.
#[derive(Default)]
pub struct RequestAssembler {
    normalizer: ConfigurationNormalizer,
    extractor: SlideTextExtractor,
}

impl RequestAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalizer(mut self, normalizer: ConfigurationNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Assemble a request from `uploads` with `settings`.
    ///
    /// Fails without processing any file when there are too many uploads or
    /// the question count is not a preset; fails after processing when no
    /// file survives.
    pub fn assemble(
        &self,
        uploads: Vec<Upload>,
        settings: QuizSettings,
    ) -> Result<AssembledRequest> {
        let screened = self.normalizer.screen(uploads)?;
        self.normalizer
            .validate_question_count(settings.assessment_type, settings.question_count)?;

        let mut warnings = screened.warnings;
        let mut files = Vec::with_capacity(screened.accepted.len());

        for (upload, format) in screened.accepted {
            match self.prepare(upload, format) {
                Ok(file) => files.push(file),
                Err(warning) => {
                    log::warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        log::info!(
            "Prepared {} source file(s), {} skipped",
            files.len(),
            warnings.len()
        );

        let request = self.normalizer.normalize(settings, files)?;
        Ok(AssembledRequest { request, warnings })
    }

    fn prepare(
        &self,
        upload: Upload,
        format: SourceFormat,
    ) -> std::result::Result<SourceFile, FileWarning> {
        match format {
            SourceFormat::Pdf => Ok(SourceFile::binary(
                upload.name,
                format.mime_type(),
                upload.bytes,
            )),
            SourceFormat::Pptx => {
                log::debug!("Extracting slide text from {}", upload.name);
                match self.extractor.extract_bytes(&upload.bytes) {
                    Ok(text) => Ok(SourceFile::text(upload.name, format.mime_type(), text)),
                    Err(e) => Err(FileWarning::new(
                        upload.name,
                        format!("could not extract text: {}", e),
                    )),
                }
            }
        }
    }
}
