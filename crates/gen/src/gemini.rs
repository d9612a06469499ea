//! Direct client for the Gemini `generateContent` API.
//!
//! Builds the prompt locally and asks for structured JSON output matching
//! the question schema. Extracted slide text is sent as text parts, PDFs as
//! inline data.

use crate::client::{parse_questions, status_error, transport_error, QuizGenerator};
use crate::prompt::{build_prompt, response_schema, source_text};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use quiz_core::{GenerationError, GenerationRequest, Question, SourceContent};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const TEMPERATURE: f32 = 0.4;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
    total_token_count: Option<u64>,
}

impl GenerateContentRequest {
    fn from_request(request: &GenerationRequest) -> Self {
        let mut parts = vec![Part::Text {
            text: build_prompt(request),
        }];

        for file in request.source_files() {
            parts.push(match &file.content {
                SourceContent::Text(text) => Part::Text {
                    text: source_text(&file.name, text),
                },
                SourceContent::Binary(bytes) => Part::Inline {
                    inline_data: InlineData {
                        mime_type: file.mime_type.clone(),
                        data: BASE64.encode(bytes),
                    },
                },
            });
        }

        Self {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                temperature: TEMPERATURE,
            },
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Calls Gemini directly with an API key.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client using the default model and endpoint.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl QuizGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Question>, GenerationError> {
        let body = GenerateContentRequest::from_request(request);
        log::info!(
            "Calling {} for {} {} question(s)",
            self.model,
            request.question_count(),
            request.assessment_type().as_str()
        );

        let start = Instant::now();
        let response = self
            .client
            .post(self.url())
            .header(USER_AGENT, concat!("quizgen/", env!("CARGO_PKG_VERSION")))
            .header(CONTENT_TYPE, "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err = status_error(response).await;
            log::error!("Model call failed after {:?}: {}", start.elapsed(), err);
            return Err(err);
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(transport_error)?;
        if let Some(usage) = &parsed.usage_metadata {
            log::info!(
                "Model usage: prompt={:?} completion={:?} total={:?}",
                usage.prompt_token_count,
                usage.candidates_token_count,
                usage.total_token_count
            );
        }
        log::info!("Model responded in {:?}", start.elapsed());

        parse_questions(&parsed.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{
        AssessmentType, ConfigurationNormalizer, Language, QuizSettings, SourceFile, PDF_MIME,
        PPTX_MIME,
    };

    fn request() -> GenerationRequest {
        let settings = QuizSettings::default()
            .with_assessment_type(AssessmentType::Quiz)
            .with_question_count(5)
            .with_language(Language::English);
        let files = vec![
            SourceFile::text("deck.pptx", PPTX_MIME, "[Slide 1] Osmosis\n"),
            SourceFile::binary("paper.pdf", PDF_MIME, b"%PDF".to_vec()),
        ];
        ConfigurationNormalizer::new().normalize(settings, files).unwrap()
    }

    #[test]
    fn test_request_parts() {
        let value = serde_json::to_value(GenerateContentRequest::from_request(&request())).unwrap();
        let parts = value["contents"][0]["parts"].as_array().unwrap();

        assert_eq!(parts.len(), 3);
        assert!(parts[0]["text"].as_str().unwrap().contains("Number of Questions: 5"));
        assert_eq!(
            parts[1]["text"],
            "[Source: deck.pptx] Content:\n[Slide 1] Osmosis\n"
        );
        assert_eq!(parts[2]["inlineData"]["mimeType"], PDF_MIME);
        assert_eq!(parts[2]["inlineData"]["data"], "JVBERg==");

        let config = &value["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "ARRAY");
    }

    #[test]
    fn test_response_text() {
        let body = r#"{
            "candidates": [{"content": {"parts": [{"text": "[{\"question\":"}, {"text": "\"Q\"}]"}]}}],
            "usageMetadata": {"promptTokenCount": 10, "totalTokenCount": 20}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text(), "[{\"question\":\"Q\"}]");

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_url() {
        let client = GeminiClient::new("key", Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://localhost:8080/v1beta/")
            .with_model("gemini-test");
        assert_eq!(
            client.url(),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
    }
}
