//! NetTriage CLI - diagnose home network problems from the command line.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use nettriage::history::HistoryEntry;
use nettriage::{
    DiagnoseOptions, DiagnosisReport, DiagnosisSource, StrategyKind, TriageConfig, Troubleshooter,
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nettriage")]
#[command(about = "Rule-based network problem diagnosis", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite history database (overrides config and NETTRIAGE_DB)
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose a problem description
    Diagnose {
        /// Free-text description, e.g. "my wifi keeps dropping"
        #[arg(value_name = "PROBLEM", required = true, num_args = 1..)]
        problem: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Classification strategy
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Ask the configured completion service instead of the rule tables
        #[arg(long)]
        ai: bool,

        /// Also print the extracted signals
        #[arg(short, long)]
        verbose: bool,

        /// Do not record this diagnosis in history
        #[arg(long)]
        no_history: bool,
    },

    /// Show recent diagnoses, newest first
    History {
        /// Number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// List the issue categories, devices and symptom severities
    Rules {
        /// Show remediation steps and trigger phrases
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripts
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Multi-signal tag classification
    Signal,
    /// Single best keyword match
    Keyword,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Signal => StrategyKind::Signal,
            StrategyArg::Keyword => StrategyKind::Keyword,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut config = load_config(cli.config.as_ref())?;
    if let Some(db) = cli.db {
        config.history.db_path = Some(db);
    }

    match cli.command {
        Commands::Diagnose {
            problem,
            format,
            strategy,
            ai,
            verbose,
            no_history,
        } => {
            if let Some(strategy) = strategy {
                config.strategy = strategy.into();
            }
            let options = DiagnoseOptions {
                use_ai: ai,
                save_history: !no_history,
            };
            handle_diagnose(&config, &problem.join(" "), &options, format, verbose).await
        }
        Commands::History { limit, format } => handle_history(&config, limit, format),
        Commands::Rules { verbose } => handle_rules(&config, verbose),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<TriageConfig> {
    match path {
        Some(path) => TriageConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display())),
        None => {
            let mut config = TriageConfig::default();
            config.apply_env();
            Ok(config)
        }
    }
}

async fn handle_diagnose(
    config: &TriageConfig,
    problem: &str,
    options: &DiagnoseOptions,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<i32> {
    let troubleshooter = Troubleshooter::from_config(config)?;
    let report = troubleshooter.diagnose(problem, options).await?;

    match format {
        OutputFormat::Human => {
            output_human(&report);
            if verbose {
                output_signals_human(&troubleshooter, problem);
            }
        }
        OutputFormat::Json => {
            let output = if verbose {
                let severity = troubleshooter
                    .classifier()
                    .knowledge()
                    .symptom_severity(problem);
                serde_json::json!({
                    "diagnosis": report.diagnosis,
                    "signals": troubleshooter.signals(problem),
                    "severity": severity,
                })
            } else {
                serde_json::to_value(&report.diagnosis)?
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(0)
}

fn output_human(report: &DiagnosisReport) {
    let d = &report.diagnosis;

    println!("\nProblem: {}", report.problem);
    println!("{}", "─".repeat(60));

    println!("\n  Solutions:");
    for (i, step) in d.solutions.iter().enumerate() {
        println!("    {}. {}", i + 1, step);
    }

    let source = match report.source {
        DiagnosisSource::Rules => "rules",
        DiagnosisSource::Ai => "ai",
    };
    println!("\n  Confidence: {}% ({})", d.confidence, source);
    println!("  Detected:   {}", d.detected_issues.join(", "));

    if !d.follow_up_questions.is_empty() {
        println!("\n  Follow-up questions:");
        for question in &d.follow_up_questions {
            println!("    - {}", question);
        }
    }

    if let Some(reasoning) = &d.reasoning {
        println!("\n  Reasoning: {}", reasoning);
    }
}

fn output_signals_human(troubleshooter: &Troubleshooter, problem: &str) {
    let signals = troubleshooter.signals(problem);
    let severity = troubleshooter
        .classifier()
        .knowledge()
        .symptom_severity(problem);

    println!("\n  Signals:");
    println!("    Device:   {}", signals.device);
    println!("    Tokens:   {}", signals.token_count);
    println!("    Numbers:  {}", signals.has_numbers);
    println!("    Urgent:   {}", signals.urgent);
    if !signals.emotions.is_empty() {
        println!("    Emotions: {}", signals.emotions.join(", "));
    }
    if let Some(level) = severity {
        println!("    Severity: {}", level);
    }
    println!("    Strategy: {}", troubleshooter.classifier().strategy_id());
}

fn handle_history(
    config: &TriageConfig,
    limit: Option<usize>,
    format: OutputFormat,
) -> anyhow::Result<i32> {
    let troubleshooter = Troubleshooter::from_config(config)?;
    if !troubleshooter.has_history() {
        eprintln!("History is disabled: pass --db or set NETTRIAGE_DB");
        return Ok(1);
    }

    let entries = troubleshooter.recent_history(limit);
    match format {
        OutputFormat::Human => output_history_human(&entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
    }
    Ok(0)
}

fn output_history_human(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No troubleshooting history yet");
        return;
    }

    for entry in entries {
        println!(
            "\n[{}] {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.problem
        );
        for (i, step) in entry.solutions.iter().enumerate() {
            println!("    {}. {}", i + 1, step);
        }
    }
}

fn handle_rules(config: &TriageConfig, verbose: bool) -> anyhow::Result<i32> {
    let troubleshooter = Troubleshooter::from_config(config)?;
    let kb = troubleshooter.classifier().knowledge();

    println!("Issue categories:\n");
    for category in &kb.categories {
        println!("  {:<20} {}", category.tag, category.description);
        if verbose {
            println!("    Triggers: {}", category.triggers.join(", "));
            for step in &category.steps {
                println!("    - {}", step);
            }
            if let Some(variant) = &category.device_variant {
                let devices: Vec<&str> = variant.devices.iter().map(|d| d.as_str()).collect();
                println!("    On {}:", devices.join("/"));
                for step in &variant.steps {
                    println!("      - {}", step);
                }
                if !variant.otherwise.is_empty() {
                    println!("    Otherwise:");
                    for step in &variant.otherwise {
                        println!("      - {}", step);
                    }
                }
            }
        }
    }

    println!("\nFallback rules:\n");
    for fallback in &kb.fallbacks {
        println!("  {:<20} keywords: {}", fallback.tag, fallback.keywords.join(", "));
    }

    println!("\nDevices:\n");
    for profile in &kb.devices {
        println!("  {:<20} {}", profile.device, profile.keywords.join(", "));
    }

    println!("\nSymptom severity:\n");
    for symptom in &kb.symptoms {
        println!("  {:<20} {}", symptom.symptom, symptom.severity);
    }

    Ok(0)
}
