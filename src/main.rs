use anyhow::{Context, Result};
use benchdiff::cli::{Cli, OutputFormat};
use benchdiff::config::BenchDiffConfig;
use benchdiff::json_output::JsonOutput;
use benchdiff::regression::{self, ChangeDescription, RawSampleSet, StatisticalTestResult, TestCaseResult};
use clap::Parser;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Debug logging on stderr; `RUST_LOG` replaces the default filter
fn init_tracing(debug: bool) {
    if !debug {
        return;
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("benchdiff=trace"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_sample_sets(path: &Path) -> Result<Vec<RawSampleSet>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse sample sets in {}", path.display()))
}

fn load_config(args: &Cli) -> Result<BenchDiffConfig> {
    let mut config = match &args.config {
        Some(path) => BenchDiffConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BenchDiffConfig::default(),
    };

    if let Some(test_type) = args.test_type {
        config.diff.test_type = test_type;
    }
    if let Some(alpha) = args.alpha {
        config.diff.alpha = alpha;
    }
    if let Some(seed) = args.seed {
        config.diff.seed = Some(seed);
    }
    config.validate().context("Invalid settings")?;
    Ok(config)
}

/// Print a human-readable comparison table
fn print_text_report(results: &[TestCaseResult]) {
    println!("=== Benchmark Comparison ===");
    println!(
        "{:<48} {:>12} {:>12} {:>10} {:>8}  Change",
        "Test case", "Before", "After", "Statistic", "p"
    );
    println!("{}", "─".repeat(104));

    for result in results {
        let name = result.test_case_id.display_name();
        match &result.test_result {
            StatisticalTestResult::Success(stats) => {
                let marker = match stats.change_description {
                    ChangeDescription::Regressed => "▲",
                    ChangeDescription::Improved => "▼",
                    ChangeDescription::NoChange => " ",
                };
                println!(
                    "{:<48} {:>12} {:>12} {:>10} {:>8}  {} {}",
                    name,
                    stats.mean_before,
                    stats.mean_after,
                    stats.statistic,
                    stats.p_value,
                    marker,
                    stats.change_description
                );
            }
            StatisticalTestResult::Failed { error } => {
                println!("{:<48} FAILED: {}", name, error);
            }
        }
    }

    let regressed = count(results, ChangeDescription::Regressed);
    let improved = count(results, ChangeDescription::Improved);
    println!("{}", "─".repeat(104));
    println!(
        "{} compared, {} regressed, {} improved",
        results.len(),
        regressed,
        improved
    );
}

fn count(results: &[TestCaseResult], change: ChangeDescription) -> usize {
    results
        .iter()
        .filter(|r| r.change_description() == Some(change))
        .count()
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let before = read_sample_sets(&args.before)?;
    let after = read_sample_sets(&args.after)?;

    let results = regression::compute(&before, &after, &config.diff)
        .context("Failed to compare sample sets")?;

    match args.format {
        OutputFormat::Text => print_text_report(&results),
        OutputFormat::Json => {
            let output = JsonOutput::from_results(&config.diff, &results);
            println!("{}", output.to_json()?);
        }
    }

    if args.fail_on_regression && count(&results, ChangeDescription::Regressed) > 0 {
        std::process::exit(1);
    }
    Ok(())
}
