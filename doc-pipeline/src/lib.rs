//! Documentation pipeline: discover source files, extract their structure,
//! generate documentation through an LLM and write it back as comments.
//!
//! Per file: `Discovered → Extracted → Generated → Merged → Inserted →
//! Written → Done`, with `Skipped`/`Failed` terminal states on the way.
//! See [`run`] for the orchestrator and [`run::run_from_env`] for the
//! all-in-one entry point used by the binary.

pub mod config;
pub mod core;
pub mod export;
pub mod generation;
pub mod mutator;
pub mod run;

pub use config::model::PipelineConfig;
pub use generation::{GenerationClient, GenerationError, RetryPolicy};
pub use mutator::{FileMutator, MutationError};
pub use run::{
    FailureReason, FileOutcome, FileStage, Orchestrator, OutcomeStatus, PipelineError, RunReport,
    SkipReason, run_from_env,
};
