//! Paginated plain-text rendering of quiz reports.
//!
//! Wraps every line to a fixed column width and starts a new page when the
//! line budget is exhausted. Pages are separated by a form feed.

use crate::report::{AnswerStatus, QuestionBlock, Report, SelectedAnswer};

/// Page separator in rendered output.
pub const FORM_FEED: char = '\u{000C}';

/// Display strings used in the rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLabels {
    pub score: String,
    pub date: String,
    pub status: String,
    pub correct: String,
    pub incorrect: String,
    pub your_answer: String,
    pub skipped: String,
    pub correct_answer: String,
    pub explanation: String,
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self {
            score: "Score".into(),
            date: "Date".into(),
            status: "Status".into(),
            correct: "Correct".into(),
            incorrect: "Incorrect".into(),
            your_answer: "Your answer".into(),
            skipped: "Skipped".into(),
            correct_answer: "Correct answer".into(),
            explanation: "Explanation".into(),
        }
    }
}

/// One rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub lines: Vec<String>,
}

impl Page {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The page as a single string with a trailing newline.
    pub fn text(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Renders a [`Report`] as wrapped, paginated plain text.
#[derive(Debug, Clone)]
pub struct PagedTextRenderer {
    /// Maximum characters per line.
    column_width: usize,
    /// Maximum lines per page.
    lines_per_page: usize,
    labels: ReportLabels,
}

impl Default for PagedTextRenderer {
    fn default() -> Self {
        Self {
            column_width: 80,
            lines_per_page: 56,
            labels: ReportLabels::default(),
        }
    }
}

impl PagedTextRenderer {
    /// Create a renderer with 80 columns and 56 lines per page.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column_width(mut self, width: usize) -> Self {
        self.column_width = width.max(10);
        self
    }

    pub fn with_lines_per_page(mut self, lines: usize) -> Self {
        self.lines_per_page = lines.max(4);
        self
    }

    pub fn with_labels(mut self, labels: ReportLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Lay the report out into pages.
    pub fn paginate(&self, report: &Report) -> Vec<Page> {
        let mut pages = Vec::new();
        let mut page = Page::new();

        for line in self.report_lines(report) {
            if page.lines.len() == self.lines_per_page {
                pages.push(std::mem::replace(&mut page, Page::new()));
            }
            // Separators never open a page.
            if line.is_empty() && page.lines.is_empty() && !pages.is_empty() {
                continue;
            }
            page.lines.push(line);
        }

        while page.lines.last().is_some_and(|l| l.is_empty()) {
            page.lines.pop();
        }
        if !page.lines.is_empty() || pages.is_empty() {
            pages.push(page);
        }

        pages
    }

    /// Render the report to text, pages separated by form feeds.
    pub fn render(&self, report: &Report) -> String {
        let separator = FORM_FEED.to_string();
        self.paginate(report)
            .iter()
            .map(Page::text)
            .collect::<Vec<_>>()
            .join(separator.as_str())
    }

    fn report_lines(&self, report: &Report) -> Vec<String> {
        let labels = &self.labels;
        let header = &report.header;
        let mut lines = Vec::new();

        self.push_wrapped(&mut lines, &header.title);
        self.push_wrapped(
            &mut lines,
            &format!(
                "{}: {} / {} ({}%)",
                labels.score, header.correct_count, header.total, header.percentage
            ),
        );
        self.push_wrapped(&mut lines, &format!("{}: {}", labels.date, header.date));

        for block in &report.blocks {
            lines.push(String::new());
            self.push_block(&mut lines, block);
        }

        lines
    }

    fn push_block(&self, lines: &mut Vec<String>, block: &QuestionBlock) {
        let labels = &self.labels;

        self.push_wrapped(lines, &format!("Q{}: {}", block.number, block.prompt));

        let status = match block.status {
            AnswerStatus::Correct => &labels.correct,
            AnswerStatus::Incorrect => &labels.incorrect,
        };
        self.push_wrapped(
            lines,
            &format!("{}: {}", labels.status, status.to_uppercase()),
        );

        let selected = match &block.selected {
            SelectedAnswer::Chosen(text) => text.as_str(),
            SelectedAnswer::Skipped => labels.skipped.as_str(),
        };
        self.push_wrapped(lines, &format!("{}: {}", labels.your_answer, selected));

        if let Some(correct) = &block.correct_answer {
            self.push_wrapped(lines, &format!("{}: {}", labels.correct_answer, correct));
        }

        if !block.explanation.is_empty() {
            self.push_wrapped(
                lines,
                &format!("{}: {}", labels.explanation, block.explanation),
            );
        }
    }

    fn push_wrapped(&self, lines: &mut Vec<String>, text: &str) {
        lines.extend(wrap(text, self.column_width));
    }
}

/// Greedy word wrap to `width` characters. Words longer than a line are
/// split. Embedded newlines start new lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }

        if current_len > 0 || lines.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
