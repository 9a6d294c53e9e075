//! Persist the run report into the given output directory.
//!
//! Layout:
//!   out_dir/
//!     documentation.md
//!     outcomes.jsonl
//!     summary.json
//!
//! `out_dir` is expected to be a timestamped folder (caller chooses it).
//! This module ensures the directory exists and writes all files,
//! returning a [`PersistFiles`] with their paths.

use crate::{export::markdown::render_report, run::RunReport};
use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

/// File paths of the persisted artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct PersistFiles {
    pub out_dir: String,
    pub documentation_md: String,
    pub outcomes_jsonl: String,
    pub summary_json: String,
}

/// Write every report artifact to `out_dir`.
pub fn persist_report(out_dir: &Path, root: &Path, report: &RunReport) -> Result<PersistFiles> {
    fs::create_dir_all(out_dir).with_context(|| format!("create_dir_all {}", out_dir.display()))?;
    info!("persist: dir prepared -> {}", out_dir.display());

    let p_md = out_dir.join("documentation.md");
    let p_outcomes = out_dir.join("outcomes.jsonl");
    let p_summary = out_dir.join("summary.json");

    fs::write(&p_md, render_report(report, root))
        .with_context(|| format!("write {}", p_md.display()))?;

    {
        let f = fs::File::create(&p_outcomes)
            .with_context(|| format!("create {}", p_outcomes.display()))?;
        let mut w = BufWriter::new(f);
        for outcome in &report.outcomes {
            serde_json::to_writer(&mut w, outcome)?;
            w.write_all(b"\n")?;
        }
        w.flush()?;
    }

    {
        let f = fs::File::create(&p_summary)
            .with_context(|| format!("create {}", p_summary.display()))?;
        let w = BufWriter::new(f);
        serde_json::to_writer_pretty(w, &report.summary)?;
    }

    info!("persist: all artifacts written");
    Ok(PersistFiles {
        out_dir: out_dir.to_string_lossy().into_owned(),
        documentation_md: p_md.to_string_lossy().into_owned(),
        outcomes_jsonl: p_outcomes.to_string_lossy().into_owned(),
        summary_json: p_summary.to_string_lossy().into_owned(),
    })
}
