//! CLI argument parsing for benchdiff

use crate::regression::TestType;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for comparison reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "benchdiff")]
#[command(version)]
#[command(about = "Statistical before/after comparison of benchmark timings", long_about = None)]
pub struct Cli {
    /// JSON array of raw sample sets from the baseline run
    #[arg(value_name = "BEFORE")]
    pub before: PathBuf,

    /// JSON array of raw sample sets from the candidate run
    #[arg(value_name = "AFTER")]
    pub after: PathBuf,

    /// TOML configuration file ([diff] and [sampling] sections)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Hypothesis test (ttest, ranksum, signedrank, kolmogorov-smirnov)
    #[arg(short = 't', long = "test-type", value_name = "TEST")]
    pub test_type: Option<TestType>,

    /// Significance level, overrides the config file
    #[arg(short, long, value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Seed for down-sampling, overrides the config file
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Exit with status 1 when any test case regressed
    #[arg(long = "fail-on-regression")]
    pub fail_on_regression: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_paths() {
        let cli = Cli::parse_from(["benchdiff", "before.json", "after.json"]);
        assert_eq!(cli.before, PathBuf::from("before.json"));
        assert_eq!(cli.after, PathBuf::from("after.json"));
        assert!(cli.config.is_none());
        assert!(cli.test_type.is_none());
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_requires_both_paths() {
        assert!(Cli::try_parse_from(["benchdiff", "before.json"]).is_err());
    }

    #[test]
    fn test_cli_test_type_aliases() {
        let cli = Cli::parse_from(["benchdiff", "a", "b", "--test-type", "wilcoxon"]);
        assert_eq!(cli.test_type, Some(TestType::SignedRank));
        let cli = Cli::parse_from(["benchdiff", "a", "b", "-t", "KS"]);
        assert_eq!(cli.test_type, Some(TestType::KolmogorovSmirnov));
    }

    #[test]
    fn test_cli_rejects_unknown_test_type() {
        assert!(Cli::try_parse_from(["benchdiff", "a", "b", "--test-type", "anova"]).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "benchdiff",
            "a",
            "b",
            "--alpha",
            "0.01",
            "--seed",
            "7",
            "--format",
            "json",
            "--fail-on-regression",
            "--debug",
        ]);
        assert_eq!(cli.alpha, Some(0.01));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.fail_on_regression);
        assert!(cli.debug);
    }
}
