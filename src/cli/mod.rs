//! Command-line interface for running the pipeline or a single stage.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

use crate::config::{PipelineConfig, PipelinePaths, DEFAULT_CONFIG_PATH};
use crate::ingestion::{store_from_endpoint, DataIngestion, SplitSummary};
use crate::pipeline::TrainingPipeline;
use crate::preprocessing::DataPreprocessor;
use crate::training::{ModelMetrics, ModelTrainer};
use crate::utils::Timer;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString    { s.truecolor(100, 210, 120) }

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn kv_line(key: &str, val: String) {
    println!("  {:<16} {}", muted(key), val.white().bold());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "reservation-pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train a hotel reservation cancellation classifier")]
#[command(long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML)
    #[arg(short, long, env = "PIPELINE_CONFIG", default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Root directory for raw, processed and model files
    #[arg(short, long, default_value = "artifacts", global = true)]
    pub artifacts: PathBuf,

    /// Directory for log files
    #[arg(long, default_value = "logs", global = true)]
    pub log_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run ingestion, preprocessing and training
    Run,
    /// Download the raw dataset and split it
    Ingest,
    /// Turn the raw split into processed files
    Preprocess,
    /// Train and evaluate the model on the processed files
    Train,
}

fn load_config(path: &Path) -> anyhow::Result<PipelineConfig> {
    Ok(PipelineConfig::load(path)?)
}

fn print_split(split: &SplitSummary) {
    kv_line("Rows", split.total_rows.to_string());
    kv_line("Train", split.train_rows.to_string());
    kv_line("Test", split.test_rows.to_string());
}

fn print_metrics(metrics: &ModelMetrics) {
    kv_line("Accuracy", format!("{:.4}", metrics.accuracy));
    kv_line("Precision", format!("{:.4}", metrics.precision));
    kv_line("Recall", format!("{:.4}", metrics.recall));
    kv_line("F1", format!("{:.4}", metrics.f1_score));
    kv_line("Fit time", format!("{:.3}s", metrics.training_time_secs));
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub async fn cmd_run(config_path: &Path, paths: PipelinePaths) -> anyhow::Result<()> {
    section("Training pipeline");
    let config = load_config(config_path)?;
    let store = store_from_endpoint(&config.data_ingestion.endpoint)?;

    let report = TrainingPipeline::new(config, paths.clone(), store).run().await?;

    step_ok(&format!("raw data split into {}", paths.raw_dir.display()));
    step_ok(&format!("processed data written to {}", paths.processed_dir.display()));
    step_ok(&format!("model saved to {}", paths.model_file.display()));
    println!();
    print_split(&report.split);
    print_metrics(&report.metrics);
    kv_line("Total time", format!("{:.3}s", report.elapsed_secs));
    println!();
    Ok(())
}

pub async fn cmd_ingest(config_path: &Path, paths: PipelinePaths) -> anyhow::Result<()> {
    section("Ingest");
    let config = load_config(config_path)?;
    let store = store_from_endpoint(&config.data_ingestion.endpoint)?;

    let split = DataIngestion::new(&config, paths.clone(), store)?.run().await?;

    step_ok(&format!("train/test written to {}", paths.raw_dir.display()));
    print_split(&split);
    println!();
    Ok(())
}

pub fn cmd_preprocess(config_path: &Path, paths: PipelinePaths) -> anyhow::Result<()> {
    section("Preprocess");
    let config = load_config(config_path)?;
    let timer = Timer::start();

    DataPreprocessor::new(&config, paths.clone())?.process()?;

    step_ok(&format!(
        "processed data written to {} in {:.2?}",
        paths.processed_dir.display(),
        timer.elapsed()
    ));
    println!();
    Ok(())
}

pub fn cmd_train(config_path: &Path, paths: PipelinePaths) -> anyhow::Result<()> {
    section("Train");
    let config = load_config(config_path)?;

    let metrics = ModelTrainer::new(paths.clone(), config.model_training).run()?;

    step_ok(&format!("model saved to {}", paths.model_file.display()));
    println!();
    print_metrics(&metrics);
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "reservation-pipeline",
            "train",
            "--artifacts",
            "/tmp/a",
            "--config",
            "cfg.yaml",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Train));
        assert_eq!(cli.artifacts, PathBuf::from("/tmp/a"));
        assert_eq!(cli.config, PathBuf::from("cfg.yaml"));
        assert_eq!(cli.log_dir, PathBuf::from("logs"));
    }
}
