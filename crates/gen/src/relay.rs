//! Client for a generation relay endpoint.
//!
//! The relay holds the model credentials. It takes the source files and the
//! configuration as JSON and answers with a JSON array of questions, or with
//! `{"error": "..."}` and a non-success status.

use crate::client::{parse_questions, status_error, transport_error, QuizGenerator};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use quiz_core::{
    AssessmentType, GenerationError, GenerationRequest, Language, Question, SourceContent,
};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Wire form of one source file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayFile<'a> {
    name: &'a str,
    mime_type: &'a str,
    /// Base64 for binary files, plain text for extracted ones.
    base64_or_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayConfig {
    assessment_type: AssessmentType,
    question_count: u32,
    language: Language,
}

#[derive(Debug, Serialize)]
struct RelayBody<'a> {
    files: Vec<RelayFile<'a>>,
    config: RelayConfig,
}

impl<'a> RelayBody<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        let files = request
            .source_files()
            .iter()
            .map(|file| RelayFile {
                name: &file.name,
                mime_type: &file.mime_type,
                base64_or_text: match &file.content {
                    SourceContent::Binary(bytes) => BASE64.encode(bytes),
                    SourceContent::Text(text) => text.clone(),
                },
            })
            .collect();

        Self {
            files,
            config: RelayConfig {
                assessment_type: request.assessment_type(),
                question_count: request.question_count(),
                language: request.language(),
            },
        }
    }
}

/// Posts generation requests to a relay endpoint.
#[derive(Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    /// Create a client for `endpoint` with a whole-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl QuizGenerator for RelayClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Question>, GenerationError> {
        let body = RelayBody::from_request(request);
        log::info!(
            "Requesting {} {} question(s) from {} across {} file(s)",
            request.question_count(),
            request.assessment_type().as_str(),
            self.endpoint,
            request.source_files().len()
        );

        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .header(USER_AGENT, concat!("quizgen/", env!("CARGO_PKG_VERSION")))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err = status_error(response).await;
            log::error!("Relay request failed after {:?}: {}", start.elapsed(), err);
            return Err(err);
        }

        let text = response.text().await.map_err(transport_error)?;
        log::info!(
            "Relay responded in {:?} ({} bytes)",
            start.elapsed(),
            text.len()
        );

        parse_questions(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{ConfigurationNormalizer, QuizSettings, SourceFile, PDF_MIME, PPTX_MIME};
    use serde_json::json;

    #[test]
    fn test_wire_body() {
        let settings = QuizSettings::default().with_assessment_type(AssessmentType::Exam);
        let files = vec![
            SourceFile::binary("notes.pdf", PDF_MIME, b"%PDF".to_vec()),
            SourceFile::text("deck.pptx", PPTX_MIME, "[Slide 1] Hi\n"),
        ];
        let request = ConfigurationNormalizer::new().normalize(settings, files).unwrap();

        let value = serde_json::to_value(RelayBody::from_request(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "files": [
                    {"name": "notes.pdf", "mimeType": PDF_MIME, "base64OrText": "JVBERg=="},
                    {"name": "deck.pptx", "mimeType": PPTX_MIME, "base64OrText": "[Slide 1] Hi\n"}
                ],
                "config": {"assessmentType": "exam", "questionCount": 30, "language": "English"}
            })
        );
    }
}
