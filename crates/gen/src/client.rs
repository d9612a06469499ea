//! The generation-service seam and response handling shared by backends.

use quiz_core::{validate_questions, GenerationError, GenerationRequest, Question};
use serde::Deserialize;
use std::future::Future;

/// Something that turns a generation request into questions.
///
/// One call is one atomic request to the service. There is no retry; a
/// failure is returned to the caller as-is.
pub trait QuizGenerator {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<Vec<Question>, GenerationError>> + Send;
}

/// Parse and validate a JSON array of questions.
pub fn parse_questions(body: &str) -> Result<Vec<Question>, GenerationError> {
    let body = strip_code_fence(body.trim());
    if body.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let questions: Vec<Question> = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    if questions.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    validate_questions(&questions)?;
    Ok(questions)
}

/// Models occasionally wrap JSON output in a markdown fence.
fn strip_code_fence(body: &str) -> &str {
    let Some(rest) = body.strip_prefix("```") else {
        return body;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Turn a failed HTTP response into a status error, preferring the message
/// the service put in its JSON body.
pub(crate) async fn status_error(response: reqwest::Response) -> GenerationError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            body
        }
    });

    GenerationError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Pull the message out of `{"error": "..."}` or `{"error": {"message": "..."}}`.
fn extract_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorField {
        Text(String),
        Object { message: String },
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorField,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.error {
        ErrorField::Text(text) => Some(text),
        ErrorField::Object { message } => Some(message),
    }
}

pub(crate) fn transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_decode() {
        GenerationError::MalformedResponse(e.to_string())
    } else {
        GenerationError::Unreachable(e.to_string())
    }
}
