// Command-line front end: score a text, test it for positivity, or scan a
// directory of text files into a JSON report.
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use emotional::nlp::config::ENGLISH_LEXICON;
use emotional::{Sentiment, SentimentAnalyzer, SentimentConfig, SentimentError, DEFAULT_THRESHOLD};

#[derive(Parser)]
#[command(name = "emotional", about = "Polarity and subjectivity of text from a sentiment lexicon")]
struct Cli {
    /// Lexicon XML file (defaults to the bundled English lexicon)
    #[arg(short, long, global = true)]
    lexicon: Option<PathBuf>,
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Ignore negations such as "not" and "never"
    #[arg(long, global = true)]
    no_negation: bool,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print polarity, subjectivity and assessments as JSON
    Get { text: String },
    /// Print whether the text's polarity reaches the threshold
    Positive {
        text: String,
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
    },
    /// Score every text file below a directory
    Scan {
        #[arg(short, long)]
        dir: PathBuf,
        #[arg(short, long, default_value = "sentiment_report.json")]
        out: PathBuf,
    },
}

#[derive(Serialize, Deserialize, Debug)]
struct FileScore {
    path: String,
    polarity: f64,
    subjectivity: f64,
    assessments: usize,
}

#[derive(Serialize, Deserialize, Debug)]
struct Report {
    files: Vec<FileScore>,
    skipped: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn build_config(config: Option<&Path>, lexicon: Option<PathBuf>) -> Result<SentimentConfig> {
    let mut config = match config {
        Some(path) => SentimentConfig::from_json_file(path)?,
        None => SentimentConfig::english(),
    };
    if let Some(path) = lexicon {
        config.lexicon = Some(path);
    }
    if config.lexicon.is_none() {
        config.lexicon = Some(PathBuf::from(ENGLISH_LEXICON));
    }
    Ok(config)
}

fn score(analyzer: &SentimentAnalyzer, text: &str, negation: bool) -> Result<Sentiment, SentimentError> {
    analyzer.get_with(text, negation, |_| 1.0)
}

fn print_verdict(positive: bool) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let color = if positive { Color::Green } else { Color::Red };
    stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    writeln!(stdout, "{}", positive)?;
    stdout.reset()?;
    Ok(())
}

fn scan_dir(analyzer: &SentimentAnalyzer, dir: &Path, out: &Path, negation: bool) -> Result<Report> {
    if !dir.is_dir() {
        return Err(anyhow!("not a directory: {}", dir.display()));
    }
    let allowed_exts = ["txt", "md", "csv"];
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| allowed_exts.contains(&ext))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let scored: Vec<std::result::Result<FileScore, String>> = files
        .par_iter()
        .map(|p| {
            let path = p.to_string_lossy().to_string();
            let result = std::fs::read(p)
                .map_err(|e| e.to_string())
                .and_then(|bytes| {
                    let text = std::str::from_utf8(&bytes).map_err(|e| {
                        SentimentError::InvalidInput(format!("input is not UTF-8 text: {}", e)).to_string()
                    })?;
                    score(analyzer, text, negation).map_err(|e| e.to_string())
                });
            pb.inc(1);
            match result {
                Ok(sentiment) => Ok(FileScore {
                    path,
                    polarity: sentiment.polarity,
                    subjectivity: sentiment.subjectivity,
                    assessments: sentiment.assessments.len(),
                }),
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "skipping file");
                    Err(path)
                }
            }
        })
        .collect();

    pb.finish_with_message("scoring files");

    let mut report = Report {
        files: Vec::new(),
        skipped: Vec::new(),
    };
    for entry in scored {
        match entry {
            Ok(file) => report.files.push(file),
            Err(path) => report.skipped.push(path),
        }
    }

    let fout = File::create(out)?;
    serde_json::to_writer_pretty(fout, &report)?;
    println!("Wrote report to {}", out.display());
    Ok(report)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(cli.config.as_deref(), cli.lexicon)?;
    let analyzer = SentimentAnalyzer::new(config);
    analyzer.load()?;
    let negation = !cli.no_negation;

    match cli.command {
        Commands::Get { text } => {
            let sentiment = score(&analyzer, &text, negation)?;
            println!("{}", serde_json::to_string_pretty(&sentiment)?);
        }
        Commands::Positive { text, threshold } => {
            let sentiment = score(&analyzer, &text, negation)?;
            print_verdict(sentiment.polarity >= threshold)?;
        }
        Commands::Scan { dir, out } => {
            scan_dir(&analyzer, &dir, &out, negation)?;
        }
    }
    Ok(())
}
