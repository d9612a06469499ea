//! Request assembly and generation-service clients.
//!
//! [`RequestAssembler`] turns uploads into a [`quiz_core::GenerationRequest`];
//! a [`QuizGenerator`] backend turns that request into validated questions.

pub mod assemble;
pub mod client;
pub mod gemini;
pub mod prompt;
pub mod relay;

pub use assemble::{AssembledRequest, RequestAssembler};
pub use client::{parse_questions, QuizGenerator};
pub use gemini::GeminiClient;
pub use relay::RelayClient;
