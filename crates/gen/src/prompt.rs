//! Prompt text and response schema for direct model calls.

use quiz_core::{AssessmentType, GenerationRequest};
use serde_json::{json, Value};

/// Title the model is asked to write.
pub fn assessment_title(assessment_type: AssessmentType) -> &'static str {
    match assessment_type {
        AssessmentType::Quiz => "Quick Quiz",
        AssessmentType::Exam => "Comprehensive Final Exam",
    }
}

/// How deep the questions should go.
pub fn depth_instruction(assessment_type: AssessmentType) -> &'static str {
    match assessment_type {
        AssessmentType::Quiz => {
            "Create questions that test key concepts and basic understanding of the material."
        }
        AssessmentType::Exam => {
            "Deeply analyze all provided documents. Create high-level questions that test \
             critical thinking, synthesis of concepts across files, and detailed understanding."
        }
    }
}

/// Build the instruction prompt sent ahead of the source material.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let ty = request.assessment_type();
    format!(
        "You are an expert university professor and exam creator.\n\
         Create a {title} based strictly on the attached document(s) content.\n\
         \n\
         Context:\n\
         - The user has provided {files} source file(s).\n\
         - You MUST extract and synthesize information from ALL provided files.\n\
         - Cover topics distributed across all provided materials, not just the first one.\n\
         \n\
         Configuration:\n\
         - Assessment Type: {ty}\n\
         - Number of Questions: {count}\n\
         - Language: {language} (questions, options, and explanations must all be in this language).\n\
         - Difficulty: University level.\n\
         \n\
         Instruction:\n\
         {depth}\n\
         \n\
         Format: Return a raw JSON array.\n\
         \n\
         Rules:\n\
         - Exactly 4 options per question.\n\
         - correctAnswerIndex must be the 0-based index of the correct option.\n\
         - Provide a helpful explanation for learning purposes.\n",
        title = assessment_title(ty),
        files = request.source_files().len(),
        ty = ty.as_str(),
        count = request.question_count(),
        language = request.language().as_str(),
        depth = depth_instruction(ty),
    )
}

/// Header placed before a text-extracted source.
pub fn source_text(name: &str, text: &str) -> String {
    format!("[Source: {}] Content:\n{}", name, text)
}

/// Structured-output schema for a question array.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": {
                    "type": "STRING",
                    "description": "The text of the quiz question."
                },
                "options": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "A list of 4 possible answers.",
                    "minItems": 4,
                    "maxItems": 4
                },
                "correctAnswerIndex": {
                    "type": "INTEGER",
                    "description": "The index (0-3) of the correct answer in the options array."
                },
                "explanation": {
                    "type": "STRING",
                    "description": "A detailed explanation of why the correct answer is correct."
                }
            },
            "required": ["question", "options", "correctAnswerIndex", "explanation"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{ConfigurationNormalizer, Language, QuizSettings, SourceFile, PDF_MIME};

    fn request(ty: AssessmentType, count: u32) -> GenerationRequest {
        let settings = QuizSettings::default()
            .with_assessment_type(ty)
            .with_question_count(count)
            .with_language(Language::Arabic);
        let files = vec![
            SourceFile::binary("a.pdf", PDF_MIME, vec![1]),
            SourceFile::binary("b.pdf", PDF_MIME, vec![2]),
        ];
        ConfigurationNormalizer::new().normalize(settings, files).unwrap()
    }

    #[test]
    fn test_quiz_prompt() {
        let prompt = build_prompt(&request(AssessmentType::Quiz, 15));
        assert!(prompt.contains("Create a Quick Quiz"));
        assert!(prompt.contains("provided 2 source file(s)"));
        assert!(prompt.contains("Number of Questions: 15"));
        assert!(prompt.contains("Language: Arabic"));
        assert!(prompt.contains("basic understanding"));
    }

    #[test]
    fn test_exam_prompt() {
        let prompt = build_prompt(&request(AssessmentType::Exam, 40));
        assert!(prompt.contains("Comprehensive Final Exam"));
        assert!(prompt.contains("Assessment Type: exam"));
        assert!(prompt.contains("critical thinking"));
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = response_schema();
        let required = schema["items"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 4);
        assert_eq!(schema["items"]["properties"]["options"]["maxItems"], 4);
    }

    #[test]
    fn test_source_text() {
        assert_eq!(
            source_text("deck.pptx", "[Slide 1] Hi\n"),
            "[Source: deck.pptx] Content:\n[Slide 1] Hi\n"
        );
    }
}
