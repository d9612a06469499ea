//! Scoring a completed quiz against its answer key.

use crate::error::ScoringError;
use crate::types::{AnswerSet, Question};
use serde::{Deserialize, Serialize};

/// How one question was answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question: Question,
    /// `None` when the user skipped the question.
    pub selected_index: Option<usize>,
    pub is_correct: bool,
}

impl QuestionOutcome {
    /// Text of the selected option, or `None` if skipped or out of range.
    pub fn selected_text(&self) -> Option<&str> {
        self.selected_index.and_then(|idx| self.question.option(idx))
    }
}

/// A scored quiz. Built once from questions and answers, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredResult {
    per_question: Vec<QuestionOutcome>,
    correct_count: usize,
    total: usize,
    percentage: u8,
}

impl ScoredResult {
    /// Outcomes in question order.
    pub fn per_question(&self) -> &[QuestionOutcome] {
        &self.per_question
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Rounded half-up, 0 to 100.
    pub fn percentage(&self) -> u8 {
        self.percentage
    }
}

/// Compares answers with the answer key.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizScorer;

impl QuizScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score `answers` against `questions`.
    ///
    /// Unanswered questions count as incorrect. Answers keyed beyond the last
    /// question are ignored.
    pub fn score(
        &self,
        questions: &[Question],
        answers: &AnswerSet,
    ) -> Result<ScoredResult, ScoringError> {
        if questions.is_empty() {
            return Err(ScoringError::EmptyQuiz);
        }

        let per_question: Vec<QuestionOutcome> = questions
            .iter()
            .enumerate()
            .map(|(idx, question)| {
                let selected_index = answers.get(idx);
                QuestionOutcome {
                    is_correct: selected_index == Some(question.correct_option_index),
                    question: question.clone(),
                    selected_index,
                }
            })
            .collect();

        let correct_count = per_question.iter().filter(|o| o.is_correct).count();
        let total = per_question.len();

        log::debug!("Scored {}/{} correct", correct_count, total);

        Ok(ScoredResult {
            percentage: percentage(correct_count, total),
            per_question,
            correct_count,
            total,
        })
    }
}

/// `round(correct / total * 100)` with halves rounded up, in integers.
fn percentage(correct: usize, total: usize) -> u8 {
    let scaled = (correct * 200 + total) / (total * 2);
    scaled.min(100) as u8
}
