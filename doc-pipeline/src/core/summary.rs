//! Run summary: counters and timing of one pipeline execution.
//!
//! The summary is serialized into `summary.json` by the export layer and
//! printed by the binary. Keys are stable snake_case strings so they stay
//! easy to grep and to query downstream.

use crate::run::{FileOutcome, OutcomeStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// High-level summary with counts and total time of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// ISO 8601 UTC timestamp when the summary was produced.
    pub generated_at: String,
    pub counts: Counts,
    pub elapsed_ms: u64,
}

/// Aggregate counters used by [`RunSummary`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Counts {
    /// Files returned by discovery.
    pub discovered: usize,
    pub done: usize,
    /// Files that reached `Done` and were rewritten on disk.
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Files per language (`"unknown"` for unsupported ones).
    pub by_language: BTreeMap<String, usize>,
    pub skip_reasons: BTreeMap<String, usize>,
    pub failure_reasons: BTreeMap<String, usize>,
    /// Payload entries that did not match any element.
    pub dropped_documentation: usize,
}

impl RunSummary {
    /// Build a summary from the collected outcomes.
    pub fn from_outcomes(discovered: usize, outcomes: &[FileOutcome], elapsed: Duration) -> Self {
        let generated_at: DateTime<Utc> = Utc::now();
        let mut counts = Counts {
            discovered,
            ..Counts::default()
        };

        for o in outcomes {
            let lang = o
                .language
                .map(|l| l.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            *counts.by_language.entry(lang).or_insert(0) += 1;

            match &o.status {
                OutcomeStatus::Done { dropped, written, .. } => {
                    counts.done += 1;
                    counts.written += usize::from(*written);
                    counts.dropped_documentation += dropped.len();
                }
                OutcomeStatus::Skipped { reason, .. } => {
                    counts.skipped += 1;
                    *counts.skip_reasons.entry(reason.as_str().to_string()).or_insert(0) += 1;
                }
                OutcomeStatus::Failed { reason, .. } => {
                    counts.failed += 1;
                    *counts.failure_reasons.entry(reason.kind().to_string()).or_insert(0) += 1;
                }
            }
        }

        Self {
            generated_at: generated_at.to_rfc3339(),
            counts,
            elapsed_ms: elapsed.as_millis().min(u64::MAX as u128) as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::{FailureReason, FileStage, SkipReason};
    use code_structure::{FileStructure, LanguageKind};
    use std::path::PathBuf;

    fn outcome(language: Option<LanguageKind>, status: OutcomeStatus) -> FileOutcome {
        FileOutcome {
            path: PathBuf::from("x"),
            language,
            status,
            elapsed_ms: 1,
        }
    }

    #[test]
    fn counts_every_terminal_state() {
        let outcomes = vec![
            outcome(
                Some(LanguageKind::Python),
                OutcomeStatus::Done {
                    structure: FileStructure::new(LanguageKind::Python, vec![]),
                    dropped: vec![],
                    written: true,
                    text: String::new(),
                },
            ),
            outcome(
                None,
                OutcomeStatus::Skipped {
                    stage: FileStage::Discovered,
                    reason: SkipReason::UnsupportedLanguage,
                },
            ),
            outcome(
                Some(LanguageKind::Go),
                OutcomeStatus::Failed {
                    stage: FileStage::Generated,
                    reason: FailureReason::Generation("exhausted".into()),
                },
            ),
        ];

        let s = RunSummary::from_outcomes(3, &outcomes, Duration::from_millis(42));
        assert_eq!(s.counts.discovered, 3);
        assert_eq!((s.counts.done, s.counts.skipped, s.counts.failed), (1, 1, 1));
        assert_eq!(s.counts.written, 1);
        assert_eq!(s.counts.by_language["unknown"], 1);
        assert_eq!(s.counts.skip_reasons["unsupported_language"], 1);
        assert_eq!(s.counts.failure_reasons["generation"], 1);
        assert_eq!(s.elapsed_ms, 42);
    }
}
