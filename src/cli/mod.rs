use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::fsx::DEFAULT_BLOCK_SIZE;
use crate::common::SizeRangeRule;
use crate::plan::PlanRequest;
use crate::sizing::StrategyKind;
use crate::validate::FormatRequest;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Compute the compaction plan for an input directory and print it as JSON.
    #[command(alias = "p")]
    Plan {
        #[command(flatten)]
        args: PlanArgs,
    },

    /// Compute the plan and hand the resulting job to the bulk data engine.
    #[command(alias = "s")]
    Submit {
        #[command(flatten)]
        args: PlanArgs,

        /// Write the job manifest to this file instead of stdout.
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
}

/// Options shared by every command.
#[derive(ClapArgs, Clone, Debug)]
pub struct PlanArgs {
    /// The input path where files need to be compacted.
    #[arg(short, long = "input-path")]
    pub input_path: PathBuf,

    /// The output directory the compacted files will be written to.
    #[arg(short, long = "output-path")]
    pub output_path: PathBuf,

    /// Serialization of the input files (avro, parquet, text). [default: detected]
    #[arg(long)]
    pub input_serialization: Option<String>,

    /// Compression of the input files (none, snappy, gzip, bzip2). [default: detected]
    #[arg(long)]
    pub input_compression: Option<String>,

    /// Serialization of the compacted files (avro, parquet, text). [default: input serialization]
    #[arg(long)]
    pub output_serialization: Option<String>,

    /// Compression of the compacted files (none, snappy, gzip, bzip2). [default: input compression]
    #[arg(long)]
    pub output_compression: Option<String>,

    /// Strategy used to calculate the split size.
    #[arg(short = 's', long, value_enum, default_value_t = StrategyKind::BlockSize)]
    pub compaction_strategy: StrategyKind,

    /// JSON configuration file with the size ranges for compaction. Falls back to $COMPACTION_CONFIG.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Block size, in bytes, of the output filesystem.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: u64,
}

impl PlanArgs {
    pub fn format_request(&self) -> FormatRequest {
        FormatRequest {
            input_serialization: self.input_serialization.clone(),
            input_compression: self.input_compression.clone(),
            output_serialization: self.output_serialization.clone(),
            output_compression: self.output_compression.clone(),
        }
    }

    /// The planner request; tiers come from the loaded configuration.
    pub fn plan_request(&self, tiers: &[SizeRangeRule]) -> PlanRequest {
        PlanRequest {
            input_path: self.input_path.clone(),
            output_path: self.output_path.clone(),
            formats: self.format_request(),
            strategy: self.compaction_strategy,
            tiers: tiers.to_vec(),
        }
    }
}

/// Parses command-line arguments using `clap` and returns the command to execute.
pub fn run() -> Result<Commands, clap::Error> {
    let args = Args::try_parse()?;
    Ok(args.command)
}
