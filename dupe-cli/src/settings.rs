//! Configuration layering and the on-disk project layout.
//!
//! Values are resolved in three layers, later ones winning:
//! built-in defaults, an optional JSON file (`--config`), command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use dupe_core::analyzer::read_word_list;
use dupe_types::AnalysisConfig;

/// Flags that override individual configuration values.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Minimum token count kept in the frequency table
    #[arg(long)]
    pub min_freq: Option<u64>,

    /// Significance threshold for the chi-square test
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Column holding the post text
    #[arg(long)]
    pub text_column: Option<String>,

    /// Column holding the group label
    #[arg(long)]
    pub group_column: Option<String>,

    /// Column holding the outcome label
    #[arg(long)]
    pub outcome_column: Option<String>,

    /// Stopword file (one word per line), replaces the default list
    #[arg(long, value_name = "FILE")]
    pub stopwords: Option<PathBuf>,

    /// Custom term file (one term per line), replaces the default terms
    #[arg(long, value_name = "FILE")]
    pub terms: Option<PathBuf>,

    /// User dictionary (`word [freq [tag]]` per line)
    #[arg(long, value_name = "FILE")]
    pub dict: Option<PathBuf>,

    /// Rows listed on the console
    #[arg(long)]
    pub top: Option<usize>,

    /// Keep words missing from the dictionaries split into characters
    #[arg(long)]
    pub no_hmm: bool,
}

impl Overrides {
    /// Writes every given flag into `config`.
    pub fn apply(&self, config: &mut AnalysisConfig) -> Result<()> {
        if let Some(v) = self.min_freq {
            config.min_freq = v;
        }
        if let Some(v) = self.alpha {
            config.alpha = v;
        }
        if let Some(v) = &self.text_column {
            config.text_column = v.clone();
        }
        if let Some(v) = &self.group_column {
            config.group_column = v.clone();
        }
        if let Some(v) = &self.outcome_column {
            config.outcome_column = v.clone();
        }
        if let Some(path) = &self.stopwords {
            config.stopwords = read_word_list(path).context("loading stopword file")?;
        }
        if let Some(path) = &self.terms {
            config.custom_terms = read_word_list(path).context("loading custom term file")?;
        }
        if let Some(path) = &self.dict {
            config.dictionary = Some(path.clone());
        }
        if let Some(v) = self.top {
            config.top_n = v;
        }
        if self.no_hmm {
            config.hmm = false;
        }
        Ok(())
    }
}

/// Resolves the effective configuration and validates it.
pub fn load_config(file: Option<&Path>, overrides: &Overrides) -> Result<AnalysisConfig> {
    let mut config = match file {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    overrides.apply(&mut config)?;
    config.validate().context("checking configuration")?;

    tracing::debug!(?config, "effective configuration");
    Ok(config)
}

/// Directory layout of an analysis project.
///
/// ```text
/// <root>/data/raw/                         raw post tables
/// <root>/data/processed/                   tokenized and labeled tables
/// <root>/reports/                          exports for charting tools
/// ```
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory of raw post tables.
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("data").join("raw")
    }

    /// Directory of tokenized and labeled tables.
    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("data").join("processed")
    }

    /// Directory of chart-ready exports.
    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    /// A raw post table by file name.
    pub fn raw_posts(&self, file: &str) -> PathBuf {
        self.raw_dir().join(file)
    }

    /// Tokenized post table written by `run`.
    pub fn cleaned_posts(&self) -> PathBuf {
        self.processed_dir().join("dupe_posts_cleaned.csv")
    }

    /// Labeled table read by `run` for the statistics.
    pub fn labeled_results(&self) -> PathBuf {
        self.processed_dir().join("ai_labeled_results.csv")
    }

    /// Frequency table exported for charting.
    pub fn frequency_export(&self) -> PathBuf {
        self.reports_dir().join("data_for_datawrapper.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file_or_flags() {
        let config = load_config(None, &Overrides::default()).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dupe.json");
        std::fs::write(&path, r#"{ "min_freq": 5, "alpha": 0.01 }"#).unwrap();

        let overrides = Overrides {
            min_freq: Some(2),
            ..Default::default()
        };
        let config = load_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.min_freq, 2);
        assert_eq!(config.alpha, 0.01);
    }

    #[test]
    fn word_list_flags_replace_vocabularies() {
        let dir = tempfile::tempdir().unwrap();
        let stop = dir.path().join("stop.txt");
        let terms = dir.path().join("terms.txt");
        std::fs::write(&stop, "嗎\n呢\n").unwrap();
        std::fs::write(&terms, "小棕瓶\n").unwrap();

        let overrides = Overrides {
            stopwords: Some(stop),
            terms: Some(terms),
            ..Default::default()
        };
        let config = load_config(None, &overrides).unwrap();
        assert_eq!(config.stopwords, ["嗎", "呢"]);
        assert_eq!(config.custom_terms, ["小棕瓶"]);
    }

    #[test]
    fn no_hmm_flag_disables_discovery() {
        assert!(load_config(None, &Overrides::default()).unwrap().hmm);

        let overrides = Overrides {
            no_hmm: true,
            ..Default::default()
        };
        assert!(!load_config(None, &overrides).unwrap().hmm);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let overrides = Overrides {
            alpha: Some(0.0),
            ..Default::default()
        };
        let err = load_config(None, &overrides).unwrap_err();
        assert!(format!("{err:#}").contains("alpha"));
    }

    #[test]
    fn missing_config_file_names_path() {
        let err = load_config(Some(Path::new("/no/such/dupe.json")), &Overrides::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/dupe.json"));
    }

    #[test]
    fn project_layout() {
        let paths = ProjectPaths::new("/work");
        assert_eq!(
            paths.raw_posts("dupe_posts_sample.csv"),
            Path::new("/work/data/raw/dupe_posts_sample.csv")
        );
        assert_eq!(
            paths.cleaned_posts(),
            Path::new("/work/data/processed/dupe_posts_cleaned.csv")
        );
        assert_eq!(
            paths.frequency_export(),
            Path::new("/work/reports/data_for_datawrapper.csv")
        );
        assert_eq!(
            paths.labeled_results(),
            Path::new("/work/data/processed/ai_labeled_results.csv")
        );
    }
}
