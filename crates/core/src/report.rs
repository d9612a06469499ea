//! Assembling a scored quiz into an ordered report description.
//!
//! The report is a header followed by one block per question, in question
//! order. Layout (wrapping, pagination) is left to a renderer such as
//! [`crate::layout::PagedTextRenderer`].

use crate::scoring::{QuestionOutcome, ScoredResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary shown at the top of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub title: String,
    pub correct_count: usize,
    pub total: usize,
    pub percentage: u8,
    pub date: NaiveDate,
}

/// Whether the user got a question right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    Correct,
    Incorrect,
}

/// What the user selected for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum SelectedAnswer {
    Chosen(String),
    Skipped,
}

/// One question's section of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBlock {
    /// 1-based question number.
    pub number: usize,
    pub prompt: String,
    pub status: AnswerStatus,
    pub selected: SelectedAnswer,
    /// Present only when the user was wrong.
    pub correct_answer: Option<String>,
    pub explanation: String,
}

/// A complete report: header then blocks in question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub header: ReportHeader,
    pub blocks: Vec<QuestionBlock>,
}

/// Title used when none is set.
pub const DEFAULT_REPORT_TITLE: &str = "Quiz Results Report";

/// Turns a [`ScoredResult`] into a [`Report`].
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    title: String,
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self {
            title: DEFAULT_REPORT_TITLE.to_string(),
        }
    }
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Build the report for `result`, dated `date`.
    ///
    /// Reads the result as-is; nothing is re-scored.
    pub fn assemble(&self, result: &ScoredResult, date: NaiveDate) -> Report {
        let header = ReportHeader {
            title: self.title.clone(),
            correct_count: result.correct_count(),
            total: result.total(),
            percentage: result.percentage(),
            date,
        };

        let blocks = result
            .per_question()
            .iter()
            .enumerate()
            .map(|(idx, outcome)| block_for(idx + 1, outcome))
            .collect();

        Report { header, blocks }
    }
}

fn block_for(number: usize, outcome: &QuestionOutcome) -> QuestionBlock {
    let question = &outcome.question;

    // An out-of-range selection has no text to show.
    let selected = match outcome.selected_text() {
        Some(text) => SelectedAnswer::Chosen(text.to_string()),
        None => SelectedAnswer::Skipped,
    };

    let (status, correct_answer) = if outcome.is_correct {
        (AnswerStatus::Correct, None)
    } else {
        (
            AnswerStatus::Incorrect,
            question.correct_option().map(str::to_string),
        )
    };

    QuestionBlock {
        number,
        prompt: question.prompt.clone(),
        status,
        selected,
        correct_answer,
        explanation: question.explanation.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::QuizScorer;
    use crate::types::{AnswerSet, Question};

    fn sample_questions() -> Vec<Question> {
        vec![
            Question {
                prompt: "Capital of France?".into(),
                options: vec!["Paris".into(), "Rome".into(), "Madrid".into(), "Berlin".into()],
                correct_option_index: 0,
                explanation: "Paris is the capital.".into(),
            },
            Question {
                prompt: "2 + 2?".into(),
                options: vec!["3".into(), "4".into(), "5".into(), "22".into()],
                correct_option_index: 1,
                explanation: "Basic addition.".into(),
            },
            Question {
                prompt: "Largest planet?".into(),
                options: vec!["Mars".into(), "Earth".into(), "Jupiter".into(), "Venus".into()],
                correct_option_index: 2,
                explanation: "Jupiter is the largest.".into(),
            },
        ]
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_assemble_blocks() {
        let answers: AnswerSet = [(0, 0), (1, 3)].into_iter().collect();
        let result = QuizScorer::new().score(&sample_questions(), &answers).unwrap();
        let report = ReportAssembler::new().assemble(&result, date());

        assert_eq!(report.header.title, "Quiz Results Report");
        assert_eq!(report.header.correct_count, 1);
        assert_eq!(report.header.total, 3);
        assert_eq!(report.header.percentage, 33);
        assert_eq!(report.header.date, date());

        let numbers: Vec<usize> = report.blocks.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        let first = &report.blocks[0];
        assert_eq!(first.status, AnswerStatus::Correct);
        assert_eq!(first.selected, SelectedAnswer::Chosen("Paris".into()));
        assert_eq!(first.correct_answer, None);

        let second = &report.blocks[1];
        assert_eq!(second.status, AnswerStatus::Incorrect);
        assert_eq!(second.selected, SelectedAnswer::Chosen("22".into()));
        assert_eq!(second.correct_answer.as_deref(), Some("4"));

        let third = &report.blocks[2];
        assert_eq!(third.selected, SelectedAnswer::Skipped);
        assert_eq!(third.correct_answer.as_deref(), Some("Jupiter"));
        assert_eq!(third.explanation, "Jupiter is the largest.");
    }

    #[test]
    fn test_out_of_range_selection_is_skipped() {
        let answers: AnswerSet = [(0, 7)].into_iter().collect();
        let result = QuizScorer::new().score(&sample_questions()[..1], &answers).unwrap();
        let report = ReportAssembler::new().assemble(&result, date());

        assert_eq!(report.blocks[0].selected, SelectedAnswer::Skipped);
        assert_eq!(report.blocks[0].status, AnswerStatus::Incorrect);
    }

    #[test]
    fn test_title_in_json_export() {
        let answers = AnswerSet::new();
        let result = QuizScorer::new().score(&sample_questions(), &answers).unwrap();
        let report = ReportAssembler::new()
            .with_title("Biology Midterm Review")
            .assemble(&result, date());

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["header"]["title"], "Biology Midterm Review");
        assert_eq!(value["header"]["date"], "2026-10-16");
        assert_eq!(value["header"]["percentage"], 0);
    }
}
