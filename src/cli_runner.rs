//! Runs a parsed command: loads configuration, builds the plan against the
//! local filesystem, and prints it or submits it to the bulk engine.

use std::io::{self, Write};
use std::path::PathBuf;

use tracing::info;

use crate::cli::{self, Commands, PlanArgs};
use crate::config::AppConfig;
use crate::detect::CodecExtensions;
use crate::engine::{BulkEngine, CompactionJob, ManifestEngine};
use crate::error::Result;
use crate::fsx::LocalFs;
use crate::plan::{CompactionPlan, Planner};
use crate::ratio::CompressionRatioTable;

/// Public entry for running CLI logic.
pub fn run_cli_app() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let command = cli::run()?;
    run_command(&command)?;
    Ok(())
}

pub fn run_command(command: &Commands) -> Result<()> {
    match command {
        Commands::Plan { args } => {
            let (plan, _) = build_plan(args)?;
            let mut out = io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, &plan)?;
            writeln!(out)?;
        }
        Commands::Submit { args, manifest } => {
            let (plan, config) = build_plan(args)?;
            submit(&plan, &config, manifest.clone())?;
        }
    }
    Ok(())
}

/// Builds the plan for `args` against the local filesystem.
pub fn build_plan(args: &PlanArgs) -> Result<(CompactionPlan, AppConfig)> {
    let config = AppConfig::load(args.config.as_deref())?;
    let ratios = CompressionRatioTable::default();
    let codecs = CodecExtensions::default();
    let fs = LocalFs::new(args.block_size);

    info!(strategy = ?args.compaction_strategy, "planning compaction");
    let plan = Planner::new(&fs, &ratios, &codecs).plan(&args.plan_request(config.tiers()))?;
    Ok((plan, config))
}

fn submit(plan: &CompactionPlan, config: &AppConfig, manifest: Option<PathBuf>) -> Result<()> {
    let job = CompactionJob::from_plan(&config.spark.app_name, plan);
    ManifestEngine::new(manifest).submit(&job)
}
