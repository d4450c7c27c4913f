//! Subcommand implementations. Each returns its results; printing is left
//! to `main`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dupe_core::analyzer::Tokenizer;
use dupe_core::stats::StatsReport;
use dupe_core::table::{write_frequency_table, PostTable};
use dupe_core::{aggregate, FrequencyTable};
use dupe_types::{AnalysisConfig, Token};
use tracing::info;

use crate::settings::ProjectPaths;

/// What a full pipeline run produced.
#[derive(Debug)]
pub struct PipelineSummary {
    pub records: usize,
    pub cleaned: PathBuf,
    pub export: PathBuf,
    pub table: FrequencyTable,
}

fn build_tokenizer(config: &AnalysisConfig) -> Result<Tokenizer> {
    Tokenizer::from_config(config).context("building tokenizer")
}

/// Reads a table and tokenizes its text column.
fn tokenize_table(
    input: &Path,
    config: &AnalysisConfig,
) -> Result<(PostTable, Vec<Vec<Token>>)> {
    let table = PostTable::read_csv(input)
        .with_context(|| format!("loading posts from {}", input.display()))?;
    let records = table.text_records(&config.text_column)?;
    let tokens = build_tokenizer(config)?.tokenize_records(&records);
    Ok((table, tokens))
}

/// Raw posts to cleaned table and frequency export.
pub fn run_pipeline(
    paths: &ProjectPaths,
    file: &str,
    config: &AnalysisConfig,
) -> Result<PipelineSummary> {
    let raw = paths.raw_posts(file);
    info!(path = %raw.display(), "loading raw posts");
    let (table, tokens) = tokenize_table(&raw, config)?;

    let cleaned = paths.cleaned_posts();
    table
        .write_with_tokens(&cleaned, &tokens)
        .context("saving cleaned posts")?;

    let freq = aggregate(&tokens, config.min_freq);
    info!(stats = %freq.stats(), "frequency table ready");

    let export = paths.frequency_export();
    write_frequency_table(&export, freq.rows()).context("exporting frequency table")?;

    Ok(PipelineSummary {
        records: table.len(),
        cleaned,
        export,
        table: freq,
    })
}

/// Tokenizes one text.
pub fn tokenize_text(text: &str, config: &AnalysisConfig) -> Result<Vec<Token>> {
    Ok(build_tokenizer(config)?.tokenize(text))
}

/// CSV in, CSV with a `tokens` column out. Returns the row count.
pub fn tokenize_file(input: &Path, output: &Path, config: &AnalysisConfig) -> Result<usize> {
    let (table, tokens) = tokenize_table(input, config)?;
    table
        .write_with_tokens(output, &tokens)
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(table.len())
}

/// CSV in, ranked frequency table out (optionally exported).
pub fn freq_file(
    input: &Path,
    output: Option<&Path>,
    config: &AnalysisConfig,
) -> Result<FrequencyTable> {
    let (_, tokens) = tokenize_table(input, config)?;
    let freq = aggregate(&tokens, config.min_freq);
    if let Some(output) = output {
        write_frequency_table(output, freq.rows())
            .with_context(|| format!("writing {}", output.display()))?;
    }
    Ok(freq)
}

/// Labeled CSV in, association test and regression out.
pub fn stats_file(input: &Path, config: &AnalysisConfig) -> Result<StatsReport> {
    let table = PostTable::read_csv(input)
        .with_context(|| format!("loading labeled results from {}", input.display()))?;
    let records =
        table.labeled_records(&config.group_column, &config.outcome_column, &config.text_column)?;
    info!(records = records.len(), "loaded labeled records");
    Ok(StatsReport::compute(&records, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn pipeline_writes_both_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path());
        write(
            &paths.raw_posts("posts.csv"),
            "text\n平替好用\n這個平替超便宜\n平替\n真的好用\n",
        );

        let summary = run_pipeline(&paths, "posts.csv", &AnalysisConfig::default()).unwrap();
        assert_eq!(summary.records, 4);
        assert!(summary.cleaned.exists());
        assert!(summary.export.exists());
        assert_eq!(summary.table.rows()[0].token, "平替");
        assert_eq!(summary.table.rows()[0].count, 3);
        assert_eq!(summary.table.count_of("好用"), None);
    }

    #[test]
    fn pipeline_reports_missing_raw_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(dir.path());
        let err = run_pipeline(&paths, "absent.csv", &AnalysisConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("absent.csv"));
    }

    #[test]
    fn missing_text_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        write(&input, "body\n好用\n");

        let err = freq_file(&input, None, &AnalysisConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("missing required column 'text'"));
    }

    #[test]
    fn tokenize_single_text() {
        let tokens = tokenize_text("這個CP值超高！", &AnalysisConfig::default()).unwrap();
        assert_eq!(tokens, ["這個", "cp值", "超高"]);
    }

    #[test]
    fn tokenize_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out/tokens.csv");
        write(&input, "id,text\n1,FOMO好怕\n");

        assert_eq!(
            tokenize_file(&input, &output, &AnalysisConfig::default()).unwrap(),
            1
        );
        let back = PostTable::read_csv(&output).unwrap();
        let col = back.column_index("tokens").unwrap();
        assert!(back.cell(0, col).unwrap().contains("\"fomo\""));
    }

    #[test]
    fn stats_from_labeled_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("labeled.csv");
        write(
            &input,
            "motivation_type,purchase_intent\nhedonic,strong\nhedonic,none\nutilitarian,none\nboth,weak\n",
        );

        let report = stats_file(&input, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.association.sample_size, 3);
        assert_eq!(report.association.excluded, 1);
    }
}
