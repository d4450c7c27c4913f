//! CLI for the dupe post-analysis pipeline
//!
//! Usage:
//! ```bash
//! dupe run                                  # data/raw/dupe_posts_sample.csv -> cleaned table + frequency export
//! dupe tokenize --text "這個CP值超高！"
//! dupe tokenize --input posts.csv --output tokens.csv
//! dupe freq --input posts.csv --output freq.csv --top 10
//! dupe stats                                # data/processed/ai_labeled_results.csv
//! ```

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::settings::{load_config, Overrides, ProjectPaths};

#[derive(Parser)]
#[command(name = "dupe")]
#[command(version)]
#[command(about = "Token frequency and purchase-intent analysis for social posts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// JSON configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Project root holding data/ and reports/
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: clean and tokenize raw posts, export token frequencies
    Run {
        /// Raw post file under data/raw/
        #[arg(short, long, default_value = "dupe_posts_sample.csv")]
        file: String,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Tokenize one text or a CSV table
    Tokenize {
        /// Text to tokenize; printed as a JSON array
        #[arg(short, long, conflicts_with = "input")]
        text: Option<String>,

        /// Input CSV
        #[arg(short, long, requires = "output")]
        input: Option<PathBuf>,

        /// Output CSV with an added `tokens` column
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Count token frequencies in a CSV table
    Freq {
        /// Input CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output `token,count` CSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Chi-square test and logistic regression on labeled results
    Stats {
        /// Labeled CSV (defaults to data/processed/ai_labeled_results.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let paths = ProjectPaths::new(&cli.root);
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Run { file, overrides } => {
            let config = load_config(config_file, &overrides)?;
            let summary = commands::run_pipeline(&paths, &file, &config)?;
            info!(
                records = summary.records,
                cleaned = %summary.cleaned.display(),
                export = %summary.export.display(),
                "pipeline finished"
            );

            println!("Top 5 keywords:");
            for row in summary.table.top(5) {
                println!("  {row}");
            }
        }
        Commands::Tokenize {
            text,
            input,
            output,
            overrides,
        } => {
            let config = load_config(config_file, &overrides)?;
            match (text, input, output) {
                (Some(text), _, _) => {
                    let tokens = commands::tokenize_text(&text, &config)?;
                    println!("{}", serde_json::to_string(&tokens)?);
                }
                (None, Some(input), Some(output)) => {
                    let rows = commands::tokenize_file(&input, &output, &config)?;
                    info!(rows, output = %output.display(), "tokenized table written");
                }
                _ => bail!("either --text or both --input and --output are required"),
            }
        }
        Commands::Freq {
            input,
            output,
            overrides,
        } => {
            let config = load_config(config_file, &overrides)?;
            let table = commands::freq_file(&input, output.as_deref(), &config)?;

            println!("{}", table.stats());
            for row in table.top(config.top_n) {
                println!("  {row}");
            }
        }
        Commands::Stats { input, overrides } => {
            let config = load_config(config_file, &overrides)?;
            let input = input.unwrap_or_else(|| paths.labeled_results());
            let report = commands::stats_file(&input, &config)?;
            println!("{report}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from(["dupe", "freq", "--input", "p.csv", "--min-freq", "1", "--top", "5"]);
        match cli.command {
            Commands::Freq { input, overrides, .. } => {
                assert_eq!(input, PathBuf::from("p.csv"));
                assert_eq!(overrides.min_freq, Some(1));
                assert_eq!(overrides.top, Some(5));
            }
            _ => panic!("expected freq"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["dupe", "stats", "--log-level", "debug", "--root", "/tmp/x"]);
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.root, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn run_defaults_to_sample_file() {
        let cli = Cli::parse_from(["dupe", "run"]);
        match cli.command {
            Commands::Run { file, .. } => assert_eq!(file, "dupe_posts_sample.csv"),
            _ => panic!("expected run"),
        }
    }
}
