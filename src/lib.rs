//! # Compaction Planner Core Library
//!
//! Decides how many output partitions a compaction job should coalesce a
//! directory of many small files into, so the directory can be rewritten as a
//! smaller number of appropriately-sized files by an external bulk data engine.
//!
//! ## Key Modules
//!
//! - [`detect`]: Infers the serialization format and compression codec of a corpus.
//! - [`ratio`]: Static compression-ratio table.
//! - [`estimate`]: Normalizes stored bytes to an estimated logical size.
//! - [`validate`]: Rejects unsupported format and codec choices.
//! - [`sizing`]: Block-size and size-range split strategies.
//! - [`plan`]: Runs the stages above and produces a [`plan::CompactionPlan`].
//! - [`engine`]: Hands the plan to the bulk data engine.
//! - [`fsx`]: Filesystem listing service.
//!
//! ## Examples
//!
//! ```no_run
//! use compaction_planner::detect::CodecExtensions;
//! use compaction_planner::fsx::LocalFs;
//! use compaction_planner::plan::{PlanRequest, Planner};
//! use compaction_planner::ratio::CompressionRatioTable;
//!
//! let (ratios, codecs) = (CompressionRatioTable::default(), CodecExtensions::default());
//! let planner = Planner::new(LocalFs::default(), &ratios, &codecs);
//! let plan = planner.plan(&PlanRequest {
//!     input_path: "/data/events/2024-01-01".into(),
//!     output_path: "/data/events_compacted/2024-01-01".into(),
//!     ..PlanRequest::default()
//! })?;
//! println!("coalesce into {} partitions", plan.split_size);
//! # Ok::<(), compaction_planner::CompactionError>(())
//! ```

pub mod cli;
pub mod cli_runner;
pub mod common;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub use error::CompactionError;
pub mod estimate;
pub mod plan;
pub mod ratio;
pub mod sizing;
pub mod validate;

// Filesystem listing service
pub mod fsx;
