//! CLI tool for turning lecture slides and PDFs into quizzes.

mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use quiz_core::{AssessmentType, Language, QuizSettings};
use std::path::PathBuf;
use std::time::Duration;

/// Generate, take, and score multiple-choice quizzes from lecture material.
#[derive(Parser, Debug)]
#[command(name = "quizgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the slide text extracted from .pptx files
    Extract {
        /// Input slide decks
        #[arg(required = true)]
        input: Vec<PathBuf>,
    },

    /// Generate questions and write them as JSON
    Generate {
        #[command(flatten)]
        generation: GenerationArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score an answer file against a question file
    Score {
        /// Questions JSON, as written by `generate`
        #[arg(short, long)]
        questions: PathBuf,

        /// Answers JSON: an object mapping question index to option index
        #[arg(short, long)]
        answers: PathBuf,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Generate a quiz, answer it in the terminal, then score it
    Take {
        #[command(flatten)]
        generation: GenerationArgs,

        #[command(flatten)]
        report: ReportArgs,
    },
}

#[derive(Args, Debug)]
struct GenerationArgs {
    /// Lecture files (.pdf or .pptx, at most 10)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Assessment type
    #[arg(short = 't', long = "type", value_enum, default_value_t = AssessmentArg::Quiz)]
    assessment: AssessmentArg,

    /// Number of questions (quiz: 5, 10, 15, 20; exam: 30, 40, 50)
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Language of the questions
    #[arg(short, long, value_enum, default_value_t = LanguageArg::English)]
    language: LanguageArg,

    /// Generation backend
    #[arg(long, value_enum, default_value_t = BackendArg::Relay)]
    backend: BackendArg,

    /// Relay endpoint URL (relay backend)
    #[arg(long, env = "QUIZGEN_ENDPOINT")]
    endpoint: Option<String>,

    /// Gemini API key (gemini backend)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model (gemini backend)
    #[arg(long, env = "GEMINI_MODEL", default_value = quiz_gen::gemini::DEFAULT_MODEL)]
    model: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "120")]
    timeout: u64,
}

impl GenerationArgs {
    fn settings(&self) -> QuizSettings {
        let settings = QuizSettings::default()
            .with_assessment_type(self.assessment.into())
            .with_language(self.language.into());
        match self.count {
            Some(count) => settings.with_question_count(count),
            None => settings,
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Write the paginated text report here
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Write the report as JSON here
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Report line width
    #[arg(long, default_value = "80")]
    width: usize,

    /// Report lines per page
    #[arg(long, default_value = "56")]
    page_lines: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AssessmentArg {
    Quiz,
    Exam,
}

impl From<AssessmentArg> for AssessmentType {
    fn from(arg: AssessmentArg) -> Self {
        match arg {
            AssessmentArg::Quiz => AssessmentType::Quiz,
            AssessmentArg::Exam => AssessmentType::Exam,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LanguageArg {
    English,
    Arabic,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::English => Language::English,
            LanguageArg::Arabic => Language::Arabic,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    /// POST to a relay endpoint that holds the model credentials
    Relay,
    /// Call Gemini directly
    Gemini,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command {
        Command::Extract { input } => commands::extract(&input),
        Command::Generate { generation, output } => {
            commands::generate(&generation, output.as_deref()).await
        }
        Command::Score {
            questions,
            answers,
            report,
        } => commands::score(&questions, &answers, &report),
        Command::Take { generation, report } => commands::take(&generation, &report).await,
    }
}
