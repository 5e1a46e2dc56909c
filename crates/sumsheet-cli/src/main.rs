mod config;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};

use sumsheet_core::{
    evaluate_expression, format_answer, generate_report, GenerationReport, Operation, PaperSize,
    Quiz, Settings, Verdict,
};
use sumsheet_pdf::{ExportOptions, PdfExporter};

use config::{Config, GenerationConfig, LayoutConfig};

#[derive(Parser)]
#[command(
    name = "sumsheet",
    version,
    about = "Arithmetic practice worksheets, PDF export and timed quizzes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate problems and print them
    Generate {
        #[command(flatten)]
        generation: GenerationArgs,

        /// Print problems as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate problems and export them as a two-column PDF worksheet
    Export {
        /// Output file (default: timestamped file in the configured output dir)
        output: Option<PathBuf>,

        #[command(flatten)]
        generation: GenerationArgs,

        /// Title printed above the first page
        #[arg(long)]
        title: Option<String>,

        /// Append an answer key after the worksheet
        #[arg(long)]
        answer_key: bool,
    },

    /// Evaluate an arithmetic expression (digits, + - * / and parentheses)
    Eval {
        /// Expression to evaluate, e.g. "(2 + 3) * 4"
        expression: String,
    },

    /// Take a timed quiz on the terminal
    Quiz {
        #[command(flatten)]
        generation: GenerationArgs,

        /// Time limit in seconds (0 disables the limit)
        #[arg(short, long)]
        time_limit: Option<u64>,
    },

    /// Show current configuration
    Config,
}

/// Overrides for the `[generation]` and `[layout]` config sections.
#[derive(Args, Default)]
struct GenerationArgs {
    /// Number of problems
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Operations (comma-separated: + - * / or add,sub,mul,div)
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    ops: Vec<Operation>,

    /// Smallest operand
    #[arg(long, allow_negative_numbers = true)]
    min: Option<i64>,

    /// Largest operand
    #[arg(long, allow_negative_numbers = true)]
    max: Option<i64>,

    /// Smallest accepted result
    #[arg(long, allow_negative_numbers = true)]
    result_min: Option<i64>,

    /// Largest accepted result
    #[arg(long, allow_negative_numbers = true)]
    result_max: Option<i64>,

    /// Fewest operands per problem
    #[arg(long)]
    operands_min: Option<i64>,

    /// Most operands per problem
    #[arg(long)]
    operands_max: Option<i64>,

    /// Accept negative results
    #[arg(long)]
    allow_negative: bool,

    /// Print answers next to problems
    #[arg(short, long)]
    answers: bool,

    /// Paper size: a4 or letter
    #[arg(long)]
    paper: Option<PaperSize>,

    /// Font size in points
    #[arg(long)]
    font_size: Option<f32>,

    /// Distance between rows in points
    #[arg(long)]
    line_spacing: Option<f32>,
}

impl GenerationArgs {
    fn apply(&self, generation: &mut GenerationConfig, layout: &mut LayoutConfig) {
        if let Some(n) = self.count {
            generation.num_problems = n;
        }
        if !self.ops.is_empty() {
            generation.operations = self.ops.clone();
        }
        if let Some(v) = self.min {
            generation.num_min = v;
        }
        if let Some(v) = self.max {
            generation.num_max = v;
        }
        if let Some(v) = self.result_min {
            generation.result_min = v;
        }
        if let Some(v) = self.result_max {
            generation.result_max = v;
        }
        if let Some(v) = self.operands_min {
            generation.operands_min = v;
        }
        if let Some(v) = self.operands_max {
            generation.operands_max = v;
        }
        if self.allow_negative {
            generation.allow_negative = true;
        }
        if self.answers {
            layout.show_answers = true;
        }
        if let Some(p) = self.paper {
            layout.paper_size = p;
        }
        if let Some(v) = self.font_size {
            layout.font_size = v;
        }
        if let Some(v) = self.line_spacing {
            layout.line_spacing = v;
        }
    }

    fn settings(&self, cfg: &Config) -> Result<Settings> {
        let mut generation = cfg.generation.clone();
        let mut layout = cfg.layout.clone();
        self.apply(&mut generation, &mut layout);
        config::build_settings(&generation, &layout)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Commands::Generate { generation, json } => {
            let settings = generation.settings(&cfg)?;
            cmd_generate(&settings, json)
        }
        Commands::Export {
            output,
            generation,
            title,
            answer_key,
        } => {
            let settings = generation.settings(&cfg)?;
            let output = output.unwrap_or_else(|| default_export_path(&cfg));
            cmd_export(&settings, output, title, answer_key)
        }
        Commands::Eval { expression } => cmd_eval(&expression),
        Commands::Quiz {
            generation,
            time_limit,
        } => {
            let settings = generation.settings(&cfg)?;
            let secs = time_limit.unwrap_or(cfg.quiz.time_limit_secs);
            let limit = (secs > 0).then(|| Duration::from_secs(secs));
            cmd_quiz(&settings, limit)
        }
        Commands::Config => cmd_config(&cfg),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn generate(settings: &Settings) -> Result<GenerationReport> {
    let report = generate_report(settings).context("generating problems")?;
    debug!(
        "generated {}/{} problems",
        report.problems.len(),
        report.requested
    );
    if report.shortfall() > 0 {
        warn!(
            "only {} of {} problems could be generated; the settings may be too restrictive",
            report.problems.len(),
            report.requested
        );
    }
    Ok(report)
}

fn cmd_generate(settings: &Settings, json: bool) -> Result<()> {
    let report = generate(settings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.problems)?);
        return Ok(());
    }

    if report.problems.is_empty() {
        println!("No problems generated.");
        return Ok(());
    }

    let width = report.problems.len().to_string().len();
    for (i, problem) in report.problems.iter().enumerate() {
        println!("{:>width$}. {}", i + 1, problem.text);
    }
    Ok(())
}

fn cmd_export(
    settings: &Settings,
    output: PathBuf,
    title: Option<String>,
    answer_key: bool,
) -> Result<()> {
    let report = generate(settings)?;
    if report.problems.is_empty() {
        bail!("no problems could be generated with these settings; nothing to export");
    }

    let exporter = PdfExporter::new();
    let options = ExportOptions { title, answer_key };
    let summary = exporter.export(&report.problems, settings.presentation(), &options, &output)?;
    println!(
        "Exported {} problems ({} pages) to {}",
        summary.problems,
        summary.pages,
        output.display()
    );
    Ok(())
}

fn cmd_eval(expression: &str) -> Result<()> {
    match evaluate_expression(expression) {
        Ok(value) => {
            println!("{value}");
            Ok(())
        }
        Err(e) => bail!("invalid expression {expression:?}: {e}"),
    }
}

fn cmd_quiz(settings: &Settings, limit: Option<Duration>) -> Result<()> {
    let report = generate(settings)?;
    if report.problems.is_empty() {
        bail!("no problems could be generated with these settings");
    }

    match limit {
        Some(l) => println!(
            "{} problems, {} seconds. Type an answer and press Enter (q to stop).",
            report.problems.len(),
            l.as_secs()
        ),
        None => println!(
            "{} problems. Type an answer and press Enter (q to stop).",
            report.problems.len()
        ),
    }

    let mut quiz = Quiz::new(report.problems, limit);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    while let Some(problem) = quiz.current() {
        let (n, total) = quiz.progress();
        let prompt = match quiz.remaining(Instant::now()) {
            Some(left) => format!("[{n}/{total}, {}s left] {}", left.as_secs(), problem.text),
            None => format!("[{n}/{total}] {}", problem.text),
        };
        print!("{prompt}");
        stdout.flush()?;

        let Some(line) = lines.next() else {
            println!();
            quiz.stop_at(Instant::now());
            break;
        };
        let line = line.context("reading answer")?;
        let input = line.trim();
        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            quiz.stop_at(Instant::now());
            break;
        }

        match quiz.answer(input) {
            Verdict::Correct => println!("  correct"),
            Verdict::Incorrect { expected } => {
                println!("  wrong, answer: {}", format_answer(expected))
            }
            Verdict::Unreadable(e) => println!("  could not read that answer ({e}), try again"),
            Verdict::TimeUp => {
                println!("  time is up");
                break;
            }
            Verdict::Finished => break,
        }
    }

    let summary = quiz.summary();
    println!();
    println!("Answered:  {}/{}", summary.attempted, summary.total);
    println!("Correct:   {}", summary.correct);
    println!("Score:     {:.0}%", summary.score_percent());
    println!("Time:      {}s", summary.elapsed.as_secs());
    Ok(())
}

fn cmd_config(cfg: &Config) -> Result<()> {
    let source = config::describe_config_source(config::config_path().as_deref());
    println!("Config: {source}");
    println!();
    println!("[generation]");
    let ops: Vec<String> = cfg
        .generation
        .operations
        .iter()
        .map(|op| op.to_string())
        .collect();
    println!("  operations = [{}]", ops.join(", "));
    println!(
        "  numbers = {}..={}",
        cfg.generation.num_min, cfg.generation.num_max
    );
    println!(
        "  results = {}..={}",
        cfg.generation.result_min, cfg.generation.result_max
    );
    println!(
        "  operands = {}..={}",
        cfg.generation.operands_min, cfg.generation.operands_max
    );
    println!("  allow_negative = {}", cfg.generation.allow_negative);
    println!("  num_problems = {}", cfg.generation.num_problems);
    println!();
    println!("[layout]");
    println!("  font_size = {}", cfg.layout.font_size);
    println!("  line_spacing = {}", cfg.layout.line_spacing);
    println!("  paper_size = {}", cfg.layout.paper_size);
    println!("  show_answers = {}", cfg.layout.show_answers);
    println!();
    println!("[quiz]");
    println!("  time_limit_secs = {}", cfg.quiz.time_limit_secs);
    println!();
    println!("[export]");
    println!(
        "  output_dir = {}",
        config::output_dir(&cfg.export).display()
    );

    if let Err(e) = config::build_settings(&cfg.generation, &cfg.layout) {
        println!();
        println!("warning: configuration is invalid: {e:#}");
    }
    Ok(())
}

fn default_export_path(cfg: &Config) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    config::output_dir(&cfg.export).join(format!("worksheet-{stamp}.pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_generation_flags() {
        let cli = Cli::try_parse_from([
            "sumsheet", "generate", "-n", "5", "--ops", "+,*", "--min", "-3", "--max", "9",
            "--answers",
        ])
        .unwrap();
        let Commands::Generate { generation, json } = cli.command else {
            panic!("expected generate");
        };
        assert!(!json);
        assert_eq!(generation.count, Some(5));
        assert_eq!(generation.ops, vec![Operation::Add, Operation::Multiply]);
        assert_eq!(generation.min, Some(-3));

        let settings = generation.settings(&Config::default()).unwrap();
        assert_eq!(settings.num_problems(), 5);
        assert_eq!(settings.num_range().min(), -3);
        assert!(settings.presentation().show_answers);
    }

    #[test]
    fn test_cli_accepts_minus_operation() {
        let cli = Cli::try_parse_from(["sumsheet", "generate", "--ops", "-,/"]).unwrap();
        let Commands::Generate { generation, .. } = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(generation.ops, vec![Operation::Subtract, Operation::Divide]);
    }

    #[test]
    fn test_flags_override_config() {
        let cfg = Config::default();
        let args = GenerationArgs {
            result_max: Some(10),
            paper: Some(PaperSize::Letter),
            allow_negative: true,
            ..GenerationArgs::default()
        };
        let settings = args.settings(&cfg).unwrap();
        assert_eq!(settings.result_range().max(), 10);
        assert_eq!(settings.result_range().min(), 0);
        assert!(settings.allow_negative());
        assert_eq!(settings.presentation().paper_size, PaperSize::Letter);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = GenerationArgs {
            min: Some(50),
            max: Some(5),
            ..GenerationArgs::default()
        };
        assert!(args.settings(&Config::default()).is_err());
    }

    #[test]
    fn test_export_command_parses() {
        let cli = Cli::try_parse_from([
            "sumsheet",
            "export",
            "out.pdf",
            "--title",
            "Week 3",
            "--answer-key",
        ])
        .unwrap();
        let Commands::Export {
            output,
            title,
            answer_key,
            ..
        } = cli.command
        else {
            panic!("expected export");
        };
        assert_eq!(output, Some(PathBuf::from("out.pdf")));
        assert_eq!(title.as_deref(), Some("Week 3"));
        assert!(answer_key);
    }

    #[test]
    fn test_cmd_export_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.pdf");
        let settings = GenerationArgs::default()
            .settings(&Config::default())
            .unwrap();
        cmd_export(&settings, path.clone(), Some("Practice".into()), true).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_cmd_eval_reports_errors() {
        assert!(cmd_eval("(2 + 3) * 4").is_ok());
        assert!(cmd_eval("5 / 0").is_ok());
        let err = cmd_eval("2 & 3").unwrap_err();
        assert!(err.to_string().contains("invalid characters"));
    }
}
