//! Subcommand implementations.

use crate::{BackendArg, GenerationArgs, ReportArgs};
use anyhow::{anyhow, bail, Context, Result};
use quiz_core::{
    validate_questions, AnswerSet, ConfigError, FileWarning, PagedTextRenderer, Question,
    QuizScorer, ReportAssembler, ScoredResult, SourceFormat, Upload, MAX_SOURCE_FILES,
};
use quiz_gen::{GeminiClient, QuizGenerator, RelayClient, RequestAssembler};
use quiz_pptx::SlideTextExtractor;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader as AsyncBufReader};

/// Default report path for `take`.
const DEFAULT_REPORT: &str = "quiz-results.txt";

/// Print extracted text for each deck. A failing deck is reported and the
/// rest continue.
pub fn extract(inputs: &[PathBuf]) -> Result<()> {
    let extractor = SlideTextExtractor::new();

    for input_path in inputs {
        log::debug!("Extracting: {}", input_path.display());

        let result = File::open(input_path)
            .with_context(|| format!("Failed to open {}", input_path.display()))
            .and_then(|file| {
                extractor
                    .extract(BufReader::new(file))
                    .map_err(|e| anyhow!("{}", e))
            });

        match result {
            Ok(text) => {
                println!("== {}", input_path.display());
                print!("{}", text);
            }
            Err(e) => {
                eprintln!("Error processing {}: {}", input_path.display(), e);
            }
        }
    }

    Ok(())
}

/// Generate questions and write them as pretty JSON.
pub async fn generate(args: &GenerationArgs, output: Option<&Path>) -> Result<()> {
    let questions = run_generation(args).await?;
    let json = serde_json::to_string_pretty(&questions)?;

    match output {
        Some(path) => {
            write_output(path, &format!("{}\n", json))?;
            eprintln!("Wrote {} questions to {}", questions.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Score an answer file and optionally export the report.
pub fn score(questions_path: &Path, answers_path: &Path, report: &ReportArgs) -> Result<()> {
    let questions: Vec<Question> = read_json(questions_path)?;
    validate_questions(&questions)
        .with_context(|| format!("Invalid question file {}", questions_path.display()))?;
    let answers: AnswerSet = read_json(answers_path)?;

    let result = QuizScorer::new().score(&questions, &answers)?;
    print_summary(&result);
    export_report(&result, report, None)
}

/// Generate a quiz, collect answers on stdin, then score and export.
pub async fn take(args: &GenerationArgs, report: &ReportArgs) -> Result<()> {
    let questions = run_generation(args).await?;
    let answers = ask_questions(&questions).await?;

    let result = QuizScorer::new().score(&questions, &answers)?;
    print_summary(&result);
    export_report(&result, report, Some(Path::new(DEFAULT_REPORT)))
}

/// Read uploads, assemble the request, and call the chosen backend.
async fn run_generation(args: &GenerationArgs) -> Result<Vec<Question>> {
    let (uploads, mut warnings) = read_uploads(&args.input).await?;
    let assembled = RequestAssembler::new().assemble(uploads, args.settings())?;
    warnings.extend(assembled.warnings);

    for warning in &warnings {
        eprintln!("Skipped {}", warning);
    }

    let request = &assembled.request;
    eprintln!(
        "Generating {} {} question(s) from {} file(s)...",
        request.question_count(),
        request.assessment_type().as_str(),
        request.source_files().len()
    );

    let questions = match args.backend {
        BackendArg::Relay => {
            let endpoint = args
                .endpoint
                .as_deref()
                .ok_or_else(|| anyhow!("No relay endpoint: pass --endpoint or set QUIZGEN_ENDPOINT"))?;
            RelayClient::new(endpoint, args.timeout())?
                .generate(request)
                .await?
        }
        BackendArg::Gemini => {
            let api_key = args
                .api_key
                .as_deref()
                .ok_or_else(|| anyhow!("No API key: pass --api-key or set GEMINI_API_KEY"))?;
            GeminiClient::new(api_key, args.timeout())?
                .with_model(&args.model)
                .generate(request)
                .await?
        }
    };

    if questions.len() != request.question_count() as usize {
        log::warn!(
            "Requested {} questions, received {}",
            request.question_count(),
            questions.len()
        );
    }

    Ok(questions)
}

/// Read each input in order. The declared type comes from the extension.
///
/// The file limit is checked before anything is read. A file that cannot be
/// read becomes a warning and the rest still proceed.
async fn read_uploads(inputs: &[PathBuf]) -> Result<(Vec<Upload>, Vec<FileWarning>)> {
    if inputs.len() > MAX_SOURCE_FILES {
        return Err(ConfigError::TooManyFiles.into());
    }

    let mut uploads = Vec::with_capacity(inputs.len());
    let mut warnings = Vec::new();

    for path in inputs {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                warnings.push(FileWarning::new(name, format!("could not read file: {}", e)));
                continue;
            }
        };

        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(SourceFormat::from_extension)
            .map(|f| f.mime_type())
            .unwrap_or_default();

        uploads.push(Upload::new(name, mime_type, bytes));
    }

    Ok((uploads, warnings))
}

/// Walk through the questions on the terminal. A blank line skips.
async fn ask_questions(questions: &[Question]) -> Result<AnswerSet> {
    let mut lines = AsyncBufReader::new(tokio::io::stdin()).lines();
    let mut answers = AnswerSet::new();
    let total = questions.len();

    for (idx, question) in questions.iter().enumerate() {
        println!();
        println!("Question {} of {}", idx + 1, total);
        println!("{}", question.prompt);
        for (opt, text) in question.options.iter().enumerate() {
            println!("  {}) {}", option_letter(opt), text);
        }

        loop {
            print!("Answer (A-D, blank to skip): ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                eprintln!("Input closed; remaining questions are skipped.");
                return Ok(answers);
            };

            match parse_choice(&line, question.options.len()) {
                Ok(Some(choice)) => {
                    answers.select(idx, choice);
                    break;
                }
                Ok(None) => break,
                Err(e) => println!("{}", e),
            }
        }
    }

    if answers.len() < total {
        println!();
        println!("You answered {} of {} questions.", answers.len(), total);
    }

    Ok(answers)
}

fn option_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

/// Accepts a letter (A-D) or a 1-based number. Blank means skip.
fn parse_choice(input: &str, option_count: usize) -> Result<Option<usize>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let choice = if let Ok(n) = input.parse::<usize>() {
        n.checked_sub(1)
    } else {
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
            }
            _ => None,
        }
    };

    match choice {
        Some(c) if c < option_count => Ok(Some(c)),
        _ => bail!("Please enter a letter A-{}", option_letter(option_count.saturating_sub(1))),
    }
}

fn print_summary(result: &ScoredResult) {
    println!();
    println!(
        "Score: {} / {} ({}%)",
        result.correct_count(),
        result.total(),
        result.percentage()
    );
}

/// Write the text and/or JSON report. `fallback` is used when no text path
/// was given.
fn export_report(result: &ScoredResult, args: &ReportArgs, fallback: Option<&Path>) -> Result<()> {
    let report = ReportAssembler::new().assemble(result, chrono::Local::now().date_naive());

    if let Some(path) = args.report.as_deref().or(fallback) {
        let renderer = PagedTextRenderer::new()
            .with_column_width(args.width)
            .with_lines_per_page(args.page_lines);
        write_output(path, &renderer.render(&report))?;
        eprintln!("Report written to {}", path.display());
    }

    if let Some(path) = &args.report_json {
        write_output(path, &serde_json::to_string_pretty(&report)?)?;
        eprintln!("JSON report written to {}", path.display());
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice_letters_and_numbers() {
        assert_eq!(parse_choice("a", 4).unwrap(), Some(0));
        assert_eq!(parse_choice(" D ", 4).unwrap(), Some(3));
        assert_eq!(parse_choice("2", 4).unwrap(), Some(1));
        assert_eq!(parse_choice("", 4).unwrap(), None);
    }

    #[test]
    fn test_parse_choice_rejects_out_of_range() {
        assert!(parse_choice("e", 4).is_err());
        assert!(parse_choice("0", 4).is_err());
        assert!(parse_choice("5", 4).is_err());
        assert!(parse_choice("ab", 4).is_err());
    }

    #[tokio::test]
    async fn test_read_uploads_limit_checked_first() {
        let inputs: Vec<PathBuf> = (0..=MAX_SOURCE_FILES)
            .map(|i| PathBuf::from(format!("/nonexistent/quizgen/{}.pdf", i)))
            .collect();

        let err = read_uploads(&inputs).await.unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::TooManyFiles));
    }

    #[tokio::test]
    async fn test_read_uploads_unreadable_file_is_a_warning() {
        let dir = std::env::temp_dir().join(format!("quizgen-read-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let readable = dir.join("notes.pdf");
        std::fs::write(&readable, b"%PDF-1.4").unwrap();

        let inputs = vec![dir.join("missing.pptx"), readable];
        let (uploads, warnings) = read_uploads(&inputs).await.unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].name, "notes.pdf");
        assert_eq!(uploads[0].mime_type, quiz_core::PDF_MIME);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].file, "missing.pptx");
        assert!(warnings[0].reason.starts_with("could not read file"));
    }

    #[test]
    fn test_option_letter() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
    }
}
