//! Configuration data structures for the documentation pipeline.
//!
//! Groups:
//! - [`PipelineConfig`]  : top-level container for all config groups
//! - [`Filters`]         : which files are discovered
//! - [`Limits`]          : size limits, chunking and concurrency
//! - [`GenerationConfig`]: retry policy of the generation call
//! - [`MutationConfig`]  : backup suffix and dry-run switch
//! - [`PromptConfig`]    : project context sent along with every file
//! - [`OutputConfig`]    : where the run report is written
//!
//! All structs are `serde`-friendly so they can be loaded from YAML/JSON;
//! every field has a default, so a config file only lists what it changes.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A config value that cannot work.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid config value `{field}`: {reason}")]
pub struct InvalidConfig {
    pub field: &'static str,
    pub reason: &'static str,
}

fn invalid(field: &'static str, reason: &'static str) -> InvalidConfig {
    InvalidConfig { field, reason }
}

/// Top-level configuration for the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub filters: Filters,
    pub limits: Limits,
    pub generation: GenerationConfig,
    pub mutation: MutationConfig,
    pub prompt: PromptConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Validate config sanity (no degenerate or absurd values).
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.limits.max_file_bytes == 0 {
            return Err(invalid("limits.max_file_bytes", "must be greater than 0"));
        }
        if self.limits.binary_probe_bytes == 0 {
            return Err(invalid("limits.binary_probe_bytes", "must be greater than 0"));
        }
        if self.limits.chunk_max_length == 0 {
            return Err(invalid("limits.chunk_max_length", "must be greater than 0"));
        }
        if self.limits.concurrency == 0 {
            return Err(invalid("limits.concurrency", "must be greater than 0"));
        }
        if self.limits.adapter_concurrency == Some(0) {
            return Err(invalid("limits.adapter_concurrency", "must be greater than 0 when set"));
        }
        if self.generation.max_attempts == 0 {
            return Err(invalid("generation.max_attempts", "must be at least 1"));
        }
        if self.generation.attempt_timeout_secs == 0 {
            return Err(invalid("generation.attempt_timeout_secs", "must be greater than 0"));
        }
        if self.mutation.backup_suffix.trim().is_empty() {
            return Err(invalid("mutation.backup_suffix", "must not be empty"));
        }
        Ok(())
    }
}

/// File filtering rules applied during discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,
    /// File names skipped wherever they appear.
    pub exclude_files: Vec<String>,
    /// Glob patterns (repository-relative, `/` separators) for files to ignore.
    pub ignore_globs: Vec<String>,
    /// Extensions never processed (with or without the leading dot).
    pub skip_extensions: Vec<String>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            exclude_dirs: [
                ".git",
                "node_modules",
                "target",
                "build",
                "dist",
                "__pycache__",
                ".venv",
                "venv",
                ".idea",
                ".vscode",
                "docscribe_out",
            ]
            .map(String::from)
            .to_vec(),
            exclude_files: ["package-lock.json", "yarn.lock"].map(String::from).to_vec(),
            ignore_globs: vec!["**/*.min.js".into(), "**/*.min.css".into()],
            skip_extensions: [
                "png", "jpg", "jpeg", "gif", "ico", "svg", "pdf", "zip", "gz", "tar", "exe",
                "dll", "so", "dylib", "class", "jar", "pyc", "lock", "woff", "woff2", "ttf",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// Limits for discovery, chunking and concurrency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum file size to process (bytes).
    pub max_file_bytes: u64,
    /// Leading bytes checked for NUL by the binary heuristic.
    pub binary_probe_bytes: usize,
    /// Descriptions longer than this (in chars) are split into chunks.
    pub chunk_max_length: usize,
    /// Files processed concurrently, which also bounds in-flight generation calls.
    pub concurrency: usize,
    /// Optional bound for extraction/insertion work.
    pub adapter_concurrency: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            binary_probe_bytes: 1024,
            chunk_max_length: 500,
            concurrency: 5,
            adapter_concurrency: None,
        }
    }
}

/// Retry policy of the generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Total attempts per file, first one included.
    pub max_attempts: u32,
    /// Base of the exponential backoff (`base * 2^attempt`).
    pub base_delay_ms: u64,
    /// Timeout applied to every single attempt.
    pub attempt_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            attempt_timeout_secs: 120,
        }
    }
}

impl GenerationConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}

/// File mutation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Suffix of the transient backup written next to a file during a write.
    pub backup_suffix: String,
    /// Run everything except the final write.
    pub dry_run: bool,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            backup_suffix: ".bak".into(),
            dry_run: false,
        }
    }
}

/// Project context included in every prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub project_info: String,
    pub style_guidelines: String,
}

/// Report destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Relative paths resolve against the repository root.
    pub out_dir: String,
    /// Whether to write the report at all.
    pub write_report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_dir: "docscribe_out".into(),
            write_report: true,
        }
    }
}
