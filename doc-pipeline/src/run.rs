//! High-level orchestration: drive discovered files through
//! extraction → generation → merge → insertion → write.
//!
//! Every file ends in exactly one terminal state ([`OutcomeStatus`]). Errors
//! are converted into that state at the stage where they happen, so one
//! file never aborts another. The run itself only aborts when discovery
//! finds nothing or when a rollback fails (source integrity at risk).
//!
//! Entry points:
//! - [`Orchestrator::run`] for callers that wire their own collaborators;
//! - [`run_from_env`] for the binary (config file/env, LLM from env, report export).

use crate::{
    config::{self, ConfigLoadError, model::PipelineConfig},
    core::{
        chunking::chunk_text,
        fs_scan::{DiscoveredFile, discover_files},
        normalize::repo_rel_str,
        summary::RunSummary,
    },
    export::save_all,
    generation::{GenerationClient, RetryPolicy, llm_transport::LlmTransport, prompt},
    mutator::{ContentWriter, FileMutator, FsWriter},
};
use ai_llm_service::{AiLlmError, LlmService, config::default_config::config_from_env};
use chrono::Utc;
use code_structure::{
    AdapterRegistry, DroppedDocumentation, FileStructure, LanguageKind,
    merge_documentation,
};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};
use thiserror::Error;
use tokio::sync::{Semaphore, watch};
use tracing::{debug, error, info, warn};

/* ---------------------------------------------------------------------- */
/* Per-file states                                                        */
/* ---------------------------------------------------------------------- */

/// Stages a file moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStage {
    Discovered,
    Extracted,
    Generated,
    Merged,
    Inserted,
    Written,
    Done,
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Discovered => "discovered",
            Self::Extracted => "extracted",
            Self::Generated => "generated",
            Self::Merged => "merged",
            Self::Inserted => "inserted",
            Self::Written => "written",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnsupportedLanguage,
    EmptyContent,
    NotUtf8,
    /// The rewritten text no longer passes the adapter's syntax check.
    ValidationFailed,
    NoElements,
    Cancelled,
    DryRun,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedLanguage => "unsupported_language",
            Self::EmptyContent => "empty_content",
            Self::NotUtf8 => "not_utf8",
            Self::ValidationFailed => "validation_failed",
            Self::NoElements => "no_elements",
            Self::Cancelled => "cancelled",
            Self::DryRun => "dry_run",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    Read(String),
    Parse(String),
    Generation(String),
    Chunking(String),
    Insert(String),
    Write(String),
    /// Restoring the backup failed. Aborts the run.
    Rollback(String),
}

impl FailureReason {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Read(_) => "read",
            Self::Parse(_) => "parse",
            Self::Generation(_) => "generation",
            Self::Chunking(_) => "chunking",
            Self::Insert(_) => "insert",
            Self::Write(_) => "write",
            Self::Rollback(_) => "rollback",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::Read(d)
            | Self::Parse(d)
            | Self::Generation(d)
            | Self::Chunking(d)
            | Self::Insert(d)
            | Self::Write(d)
            | Self::Rollback(d) => d,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.detail())
    }
}

/// Terminal state of one file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Done {
        /// Merged structure, i.e. what was written into the file.
        structure: FileStructure,
        dropped: Vec<DroppedDocumentation>,
        /// `false` when insertion produced the original text.
        written: bool,
        /// File text after the run; shown in the Markdown report only.
        #[serde(skip)]
        text: String,
    },
    Skipped {
        stage: FileStage,
        reason: SkipReason,
    },
    Failed {
        stage: FileStage,
        reason: FailureReason,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub language: Option<LanguageKind>,
    #[serde(flatten)]
    pub status: OutcomeStatus,
    pub elapsed_ms: u64,
}

impl FileOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self.status, OutcomeStatus::Done { .. })
    }
}

/// Per-file outcomes, in completion order, plus the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<FileOutcome>,
    pub summary: RunSummary,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no files discovered under {0}")]
    NoFiles(PathBuf),

    #[error("rollback failed for {path}: {detail}")]
    RollbackFailed {
        path: PathBuf,
        detail: String,
        /// Outcomes collected up to the abort.
        report: Box<RunReport>,
    },

    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Discovery(#[from] anyhow::Error),
}

fn skipped(stage: FileStage, reason: SkipReason) -> OutcomeStatus {
    OutcomeStatus::Skipped { stage, reason }
}

fn failed(stage: FileStage, reason: FailureReason) -> OutcomeStatus {
    OutcomeStatus::Failed { stage, reason }
}

/* ---------------------------------------------------------------------- */
/* Orchestrator                                                           */
/* ---------------------------------------------------------------------- */

/// Drives files through the pipeline with bounded parallelism.
pub struct Orchestrator<W: ContentWriter + 'static = FsWriter> {
    root: PathBuf,
    cfg: PipelineConfig,
    registry: AdapterRegistry,
    client: GenerationClient,
    mutator: Arc<FileMutator<W>>,
    adapter_gate: Option<Arc<Semaphore>>,
    abort: AtomicBool,
}

impl<W: ContentWriter + 'static> Orchestrator<W> {
    pub fn new(
        root: impl Into<PathBuf>,
        cfg: PipelineConfig,
        registry: AdapterRegistry,
        client: GenerationClient,
        mutator: FileMutator<W>,
    ) -> Self {
        let adapter_gate = cfg
            .limits
            .adapter_concurrency
            .map(|n| Arc::new(Semaphore::new(n.max(1))));
        Self {
            root: root.into(),
            cfg,
            registry,
            client,
            mutator: Arc::new(mutator),
            adapter_gate,
            abort: AtomicBool::new(false),
        }
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    /// Process every file and collect one outcome per file.
    ///
    /// # Errors
    /// - [`PipelineError::NoFiles`] for an empty input;
    /// - [`PipelineError::RollbackFailed`] once all in-flight files have
    ///   finished, if any rollback failed.
    pub async fn run(
        &self,
        files: Vec<DiscoveredFile>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<RunReport, PipelineError> {
        if files.is_empty() {
            return Err(PipelineError::NoFiles(self.root.clone()));
        }
        let started = Instant::now();
        let discovered = files.len();
        let concurrency = self.cfg.limits.concurrency.max(1);
        info!(files = discovered, concurrency, "run: start");

        let outcomes: Vec<FileOutcome> = stream::iter(files)
            .map(|file| self.process_file(file, shutdown.clone()))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let summary = RunSummary::from_outcomes(discovered, &outcomes, started.elapsed());
        info!(
            done = summary.counts.done,
            written = summary.counts.written,
            skipped = summary.counts.skipped,
            failed = summary.counts.failed,
            attempts = self.client.attempts(),
            elapsed_ms = summary.elapsed_ms,
            "run: finished"
        );
        let report = RunReport { outcomes, summary };

        let fatal = report.outcomes.iter().find_map(|o| match &o.status {
            OutcomeStatus::Failed {
                reason: FailureReason::Rollback(detail),
                ..
            } => Some((o.path.clone(), detail.clone())),
            _ => None,
        });
        match fatal {
            Some((path, detail)) => Err(PipelineError::RollbackFailed {
                path,
                detail,
                report: Box::new(report),
            }),
            None => Ok(report),
        }
    }

    #[tracing::instrument(skip_all, fields(path = %repo_rel_str(&self.root, &file.path)))]
    async fn process_file(&self, file: DiscoveredFile, mut shutdown: watch::Receiver<bool>) -> FileOutcome {
        let started = Instant::now();
        let status = self.drive(&file, &mut shutdown).await;

        match &status {
            OutcomeStatus::Done { written, dropped, .. } => {
                info!(written, dropped = dropped.len(), "file: done")
            }
            OutcomeStatus::Skipped { stage, reason } => {
                warn!(%stage, %reason, "file: skipped")
            }
            OutcomeStatus::Failed { stage, reason } => {
                error!(%stage, %reason, "file: failed")
            }
        }

        FileOutcome {
            path: file.path,
            language: file.language,
            status,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }

    fn stop_requested(&self, shutdown: &watch::Receiver<bool>) -> bool {
        self.abort.load(Ordering::SeqCst) || *shutdown.borrow()
    }

    async fn drive(&self, file: &DiscoveredFile, shutdown: &mut watch::Receiver<bool>) -> OutcomeStatus {
        use FileStage::*;

        if self.stop_requested(shutdown) {
            return skipped(Discovered, SkipReason::Cancelled);
        }
        let Some(adapter) = file.language.and_then(|l| self.registry.resolve_language(l)) else {
            return skipped(Discovered, SkipReason::UnsupportedLanguage);
        };

        let bytes = match tokio::fs::read(&file.path).await {
            Ok(b) => b,
            Err(e) => return failed(Discovered, FailureReason::Read(e.to_string())),
        };
        let source: Arc<str> = match String::from_utf8(bytes) {
            Ok(s) => Arc::from(s),
            Err(_) => return skipped(Discovered, SkipReason::NotUtf8),
        };
        if source.trim().is_empty() {
            return skipped(Discovered, SkipReason::EmptyContent);
        }

        /* ---- extract ---- */
        let extraction = {
            let (adapter, source) = (adapter.clone(), source.clone());
            self.adapter_work(move || adapter.extract_structure(&source)).await
        };
        let structure = match extraction {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => return failed(Extracted, FailureReason::Parse(e.to_string())),
            Err(e) => return failed(Extracted, FailureReason::Parse(e)),
        };
        let elements = structure.element_count();
        if elements == 0 {
            return skipped(Extracted, SkipReason::NoElements);
        }
        debug!(elements, "file: extracted");

        /* ---- generate ---- */
        if self.stop_requested(shutdown) {
            return skipped(Extracted, SkipReason::Cancelled);
        }
        let rel = repo_rel_str(&self.root, &file.path);
        let request = prompt::build_request(&rel, &structure, &self.cfg.prompt);
        let generated = tokio::select! {
            biased;
            _ = wait_for_shutdown(shutdown) => return skipped(Extracted, SkipReason::Cancelled),
            res = self.client.generate(&request) => res,
        };
        let docs = match generated {
            Ok(d) => d,
            Err(e) => return failed(Generated, FailureReason::Generation(e.to_string())),
        };

        let max_len = self.cfg.limits.chunk_max_length;
        let docs = match docs.try_with_chunks(|d| {
            if d.chars().count() > max_len {
                chunk_text(d, max_len)
            } else {
                Ok(vec![d.trim().to_string()])
            }
        }) {
            Ok(d) => d,
            Err(e) => return failed(Generated, FailureReason::Chunking(e.to_string())),
        };

        /* ---- merge ---- */
        let merged = merge_documentation(&structure, &docs);
        debug!(matched = merged.matched, dropped = merged.dropped.len(), "file: merged");

        /* ---- insert ---- */
        let insertion = {
            let (adapter, source) = (adapter.clone(), source.clone());
            let documented = merged.structure.clone();
            self.adapter_work(move || {
                adapter
                    .insert_documentation(&source, &documented)
                    .map(|text| {
                        let valid = text.as_str() == &*source || adapter.validate_syntax(&text);
                        (text, valid)
                    })
            })
            .await
        };
        let (new_text, valid) = match insertion {
            Ok(Ok(out)) => out,
            Ok(Err(e)) => return failed(Inserted, FailureReason::Insert(e.to_string())),
            Err(e) => return failed(Inserted, FailureReason::Insert(e)),
        };

        if new_text.as_str() == &*source {
            debug!("file: documentation already in place, nothing to write");
            return OutcomeStatus::Done {
                structure: merged.structure,
                dropped: merged.dropped,
                written: false,
                text: source.to_string(),
            };
        }
        if !valid {
            return skipped(Inserted, SkipReason::ValidationFailed);
        }
        if self.cfg.mutation.dry_run {
            let added = new_text.lines().count().saturating_sub(source.lines().count());
            info!(lines_added = added, "file: dry run, write skipped");
            return skipped(Inserted, SkipReason::DryRun);
        }

        /* ---- write ---- */
        // Not raced against shutdown: a mutation always completes or rolls back.
        match self.mutator.clone().apply_blocking(file.path.clone(), new_text.clone()).await {
            Ok(()) => OutcomeStatus::Done {
                structure: merged.structure,
                dropped: merged.dropped,
                written: true,
                text: new_text,
            },
            Err(e) if e.is_fatal() => {
                self.abort.store(true, Ordering::SeqCst);
                failed(Written, FailureReason::Rollback(e.to_string()))
            }
            Err(e) => failed(Written, FailureReason::Write(e.to_string())),
        }
    }

    /// Runs adapter work on the blocking pool, bounded by the adapter gate when configured.
    async fn adapter_work<T, F>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let _permit = match &self.adapter_gate {
            Some(gate) => Some(gate.clone().acquire_owned().await.map_err(|e| e.to_string())?),
            None => None,
        };
        tokio::task::spawn_blocking(f).await.map_err(|e| e.to_string())
    }
}

/// Resolves once shutdown is requested; never resolves if the sender is gone.
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/* ---------------------------------------------------------------------- */
/* Convenience entry point                                                */
/* ---------------------------------------------------------------------- */

/// Full run for the repository at `root` with everything taken from the
/// environment: pipeline config (file + `DOCSCRIBE_*`), LLM settings
/// (`LLM_KIND`, `OPENAI_*`, `OLLAMA_*`), default adapters. The report is
/// exported under `<root>/<output.out_dir>/<timestamp>/`, also when a
/// rollback failure aborts the run.
#[tracing::instrument(level = "info", skip_all, fields(root = %root.display()))]
pub async fn run_from_env(root: &Path, shutdown: watch::Receiver<bool>) -> Result<RunReport, PipelineError> {
    let root = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    let cfg = config::load(&root)?;
    info!(
        concurrency = cfg.limits.concurrency,
        dry_run = cfg.mutation.dry_run,
        "Configuration loaded"
    );

    let llm = Arc::new(LlmService::new(config_from_env()?)?);
    info!(provider = %llm.provider(), "LLM service ready");

    let files = discover_files(&root, &cfg)?;
    info!(files = files.len(), "Scanned filesystem");

    let client = GenerationClient::new(
        Arc::new(LlmTransport::new(llm)),
        RetryPolicy::from_config(&cfg.generation),
        cfg.limits.concurrency,
    );
    let mutator = FileMutator::new(cfg.mutation.backup_suffix.clone());
    let output = cfg.output.clone();
    let orchestrator = Orchestrator::new(
        root.clone(),
        cfg,
        AdapterRegistry::with_defaults(),
        client,
        mutator,
    );

    let result = orchestrator.run(files, shutdown).await;

    let report = match &result {
        Ok(report) => Some(report),
        Err(PipelineError::RollbackFailed { report, .. }) => Some(report.as_ref()),
        Err(_) => None,
    };
    if let (true, Some(report)) = (output.write_report, report) {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let out_dir = root.join(&output.out_dir).join(timestamp);
        match save_all::persist_report(&out_dir, &root, report) {
            Ok(files) => info!(out_dir = %files.out_dir, "Report saved"),
            Err(err) => error!(error = %format!("{err:#}"), "Failed to save report"),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::transport::{
        GenerationRequest, GenerationTransport, TransportError, TransportFuture,
    };
    use std::{fs, io, time::Duration};

    struct Fixed(&'static str);

    impl GenerationTransport for Fixed {
        fn complete<'a>(&'a self, _req: &'a GenerationRequest) -> TransportFuture<'a> {
            Box::pin(async move { Ok::<_, TransportError>(self.0.to_string()) })
        }
    }

    struct Slow;

    impl GenerationTransport for Slow {
        fn complete<'a>(&'a self, _req: &'a GenerationRequest) -> TransportFuture<'a> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok::<_, TransportError>("{}".to_string())
            })
        }
    }

    /// Loses the backup and fails, so the restore cannot happen.
    struct Sabotage;

    impl ContentWriter for Sabotage {
        fn write(&self, path: &Path, _content: &str) -> io::Result<()> {
            let mut backup = path.as_os_str().to_owned();
            backup.push(".bak");
            fs::remove_file(PathBuf::from(backup))?;
            Err(io::Error::other("device lost"))
        }
    }

    const ADD_DOCS: &str = r#"{"elements":[{"name":"add","description":"Adds two numbers."}]}"#;

    fn client(transport: impl GenerationTransport + 'static) -> GenerationClient {
        let policy = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
            attempt_timeout: Duration::from_secs(5),
        };
        GenerationClient::new(Arc::new(transport), policy, 2)
    }

    fn discovered(path: &Path) -> DiscoveredFile {
        DiscoveredFile {
            path: path.to_path_buf(),
            language: LanguageKind::from_path(path),
            size: 0,
        }
    }

    fn status_of<'a>(report: &'a RunReport, path: &Path) -> &'a OutcomeStatus {
        &report.outcomes.iter().find(|o| o.path == path).unwrap().status
    }

    #[tokio::test]
    async fn empty_input_is_fatal() {
        let orch = Orchestrator::new(
            "/repo",
            PipelineConfig::default(),
            AdapterRegistry::with_defaults(),
            client(Fixed("{}")),
            FileMutator::new(".bak"),
        );
        let (_tx, rx) = watch::channel(false);
        assert!(matches!(orch.run(vec![], rx).await, Err(PipelineError::NoFiles(_))));
    }

    #[tokio::test]
    async fn skips_and_failures_do_not_stop_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("calc.py");
        let broken = dir.path().join("broken.py");
        let blank = dir.path().join("blank.js");
        let latin1 = dir.path().join("old.go");
        let notes = dir.path().join("notes.txt");
        fs::write(&good, "def add(a, b):\n    return a + b\n").unwrap();
        fs::write(&broken, "def broken(:\n  pass\n").unwrap();
        fs::write(&blank, "  \n").unwrap();
        fs::write(&latin1, b"package main\n// caf\xe9\n").unwrap();
        fs::write(&notes, "hello\n").unwrap();

        let orch = Orchestrator::new(
            dir.path(),
            PipelineConfig::default(),
            AdapterRegistry::with_defaults(),
            client(Fixed(ADD_DOCS)),
            FileMutator::new(".bak"),
        );
        let files = [&good, &broken, &blank, &latin1, &notes]
            .into_iter()
            .map(|p| discovered(p))
            .collect();
        let (_tx, rx) = watch::channel(false);
        let report = orch.run(files, rx).await.unwrap();

        assert_eq!(report.outcomes.len(), 5);
        assert!(matches!(status_of(&report, &good), OutcomeStatus::Done { written: true, .. }));
        assert!(matches!(
            status_of(&report, &broken),
            OutcomeStatus::Failed { stage: FileStage::Extracted, reason: FailureReason::Parse(_) }
        ));
        assert!(matches!(
            status_of(&report, &blank),
            OutcomeStatus::Skipped { reason: SkipReason::EmptyContent, .. }
        ));
        assert!(matches!(
            status_of(&report, &latin1),
            OutcomeStatus::Skipped { reason: SkipReason::NotUtf8, .. }
        ));
        assert!(matches!(
            status_of(&report, &notes),
            OutcomeStatus::Skipped { reason: SkipReason::UnsupportedLanguage, .. }
        ));
        assert_eq!(report.summary.counts.done, 1);
        assert_eq!(report.summary.counts.failed, 1);
        assert_eq!(report.summary.counts.skipped, 3);
    }

    #[tokio::test]
    async fn dry_run_leaves_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calc.py");
        let src = "def add(a, b):\n    return a + b\n";
        fs::write(&path, src).unwrap();

        let mut cfg = PipelineConfig::default();
        cfg.mutation.dry_run = true;
        let orch = Orchestrator::new(
            dir.path(),
            cfg,
            AdapterRegistry::with_defaults(),
            client(Fixed(ADD_DOCS)),
            FileMutator::new(".bak"),
        );
        let (_tx, rx) = watch::channel(false);
        let report = orch.run(vec![discovered(&path)], rx).await.unwrap();

        assert!(matches!(
            status_of(&report, &path),
            OutcomeStatus::Skipped { stage: FileStage::Inserted, reason: SkipReason::DryRun }
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), src);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_generation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calc.py");
        fs::write(&path, "def add(a, b):\n    return a + b\n").unwrap();

        let orch = Orchestrator::new(
            dir.path(),
            PipelineConfig::default(),
            AdapterRegistry::with_defaults(),
            client(Slow),
            FileMutator::new(".bak"),
        );
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = tx.send(true);
        });
        let report = orch.run(vec![discovered(&path)], rx).await.unwrap();

        assert!(matches!(
            status_of(&report, &path),
            OutcomeStatus::Skipped { reason: SkipReason::Cancelled, .. }
        ));
    }

    #[tokio::test]
    async fn failed_rollback_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.py");
        let second = dir.path().join("b.py");
        fs::write(&first, "def add(a, b):\n    return a + b\n").unwrap();
        fs::write(&second, "def add(a, b):\n    return a + b\n").unwrap();

        let mut cfg = PipelineConfig::default();
        cfg.limits.concurrency = 1;
        let orch = Orchestrator::new(
            dir.path(),
            cfg,
            AdapterRegistry::with_defaults(),
            client(Fixed(ADD_DOCS)),
            FileMutator::with_writer(".bak", Sabotage),
        );
        let (_tx, rx) = watch::channel(false);
        let err = orch
            .run(vec![discovered(&first), discovered(&second)], rx)
            .await
            .unwrap_err();

        match err {
            PipelineError::RollbackFailed { path, report, .. } => {
                assert_eq!(path, first);
                assert!(matches!(
                    status_of(&report, &second),
                    OutcomeStatus::Skipped { reason: SkipReason::Cancelled, .. }
                ));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
