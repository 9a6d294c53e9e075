//! End-to-end runs over a temporary repository with a scripted generation backend.

use code_structure::{AdapterRegistry, DropReason};
use doc_pipeline::{
    FileMutator, GenerationClient, OutcomeStatus, Orchestrator, PipelineConfig, RetryPolicy,
    core::fs_scan::discover_files,
    generation::transport::{GenerationRequest, GenerationTransport, TransportError, TransportFuture},
};
use std::{collections::HashMap, fs, path::Path, sync::Arc, time::Duration};
use tokio::sync::watch;

/// Answers with the payload registered for the request's file name.
struct ByFile(HashMap<&'static str, &'static str>);

impl GenerationTransport for ByFile {
    fn complete<'a>(&'a self, req: &'a GenerationRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            self.0
                .get(req.file_name.as_str())
                .map(|body| body.to_string())
                .ok_or_else(|| TransportError::Malformed(format!("no script for {}", req.file_name)))
        })
    }
}

fn orchestrator(root: &Path, script: &[(&'static str, &'static str)]) -> Orchestrator {
    let transport = ByFile(script.iter().copied().collect());
    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        attempt_timeout: Duration::from_secs(5),
    };
    Orchestrator::new(
        root,
        PipelineConfig::default(),
        AdapterRegistry::with_defaults(),
        GenerationClient::new(Arc::new(transport), policy, 4),
        FileMutator::new(".bak"),
    )
}

#[tokio::test]
async fn documents_add_and_keeps_code_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let src = "import math\n\n\ndef add(a, b):\n    return a + b\n";
    fs::write(dir.path().join("calc.py"), src).unwrap();

    let orch = orchestrator(
        dir.path(),
        &[("calc.py", r#"{"elements":[{"name":"add","description":"Adds two numbers."}]}"#)],
    );
    let files = discover_files(dir.path(), &PipelineConfig::default()).unwrap();
    let (_tx, rx) = watch::channel(false);
    let report = orch.run(files, rx).await.unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert!(matches!(report.outcomes[0].status, OutcomeStatus::Done { written: true, .. }));

    let out = fs::read_to_string(dir.path().join("calc.py")).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    let def = lines.iter().position(|l| l.starts_with("def add(a, b):")).unwrap();
    assert_eq!(lines[def - 1], "# Adds two numbers.");
    assert_eq!(lines[def + 1], "    return a + b");

    let stripped: Vec<&str> = lines.iter().copied().filter(|l| *l != "# Adds two numbers.").collect();
    assert_eq!(stripped.join("\n") + "\n", src);
    assert!(!dir.path().join("calc.py.bak").exists());
}

#[tokio::test]
async fn unmatched_names_are_dropped_without_touching_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = "def add(a, b):\n    \"\"\"Return a + b.\"\"\"\n    return a + b\n";
    fs::write(dir.path().join("calc.py"), src).unwrap();

    let orch = orchestrator(
        dir.path(),
        &[("calc.py", r#"{"elements":[{"name":"subtract","description":"Subtracts."}]}"#)],
    );
    let files = discover_files(dir.path(), &PipelineConfig::default()).unwrap();
    let (_tx, rx) = watch::channel(false);
    let report = orch.run(files, rx).await.unwrap();

    match &report.outcomes[0].status {
        OutcomeStatus::Done {
            structure,
            dropped,
            written,
            text,
        } => {
            assert_eq!(text, src);
            assert!(!written);
            assert_eq!(dropped.len(), 1);
            assert_eq!(dropped[0].name, "subtract");
            assert_eq!(dropped[0].reason, DropReason::Unmatched);
            let add = &structure.top_level_elements[0];
            assert_eq!(add.name, "add");
            assert_eq!(add.docstring, "Return a + b.");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(fs::read_to_string(dir.path().join("calc.py")).unwrap(), src);
}

#[tokio::test]
async fn mixed_repository_reaches_one_outcome_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("web")).unwrap();
    fs::write(root.join("calc.py"), "def add(a, b):\n    return a + b\n").unwrap();
    fs::write(
        root.join("web/app.js"),
        "function greet(name) {\n  return `hi ${name}`;\n}\n",
    )
    .unwrap();
    fs::write(root.join("README.md"), "# demo\n").unwrap();

    let orch = orchestrator(
        root,
        &[
            ("calc.py", r#"{"elements":[{"name":"add","description":"Adds two numbers."}]}"#),
            ("web/app.js", r#"{"elements":[{"name":"greet","description":"Greets someone."}]}"#),
        ],
    );
    let files = discover_files(root, &PipelineConfig::default()).unwrap();
    let (_tx, rx) = watch::channel(false);
    let report = orch.run(files, rx).await.unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.summary.counts.done, 2);
    assert_eq!(report.summary.counts.skipped, 1);

    let js = fs::read_to_string(root.join("web/app.js")).unwrap();
    assert!(js.contains("Greets someone."));
    assert!(js.contains("function greet(name) {\n  return `hi ${name}`;\n}\n"));
}

#[tokio::test]
async fn fields_on_one_line_do_not_fail_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = "package geo\n\ntype Point struct {\n\tX, Y float64\n}\n\nfunc Add(a, b Point) Point {\n\treturn Point{a.X + b.X, a.Y + b.Y}\n}\n";
    fs::write(dir.path().join("geo.go"), src).unwrap();

    let orch = orchestrator(
        dir.path(),
        &[(
            "geo.go",
            r#"{"elements":[
                {"name":"Point","description":"Point is a 2D position."},
                {"name":"X","parentName":"Point","description":"Horizontal offset."},
                {"name":"Y","parentName":"Point","description":"Vertical offset."},
                {"name":"Add","description":"Add sums two points."}
            ]}"#,
        )],
    );
    let files = discover_files(dir.path(), &PipelineConfig::default()).unwrap();
    let (_tx, rx) = watch::channel(false);
    let report = orch.run(files, rx).await.unwrap();

    assert!(matches!(report.outcomes[0].status, OutcomeStatus::Done { written: true, .. }));
    let out = fs::read_to_string(dir.path().join("geo.go")).unwrap();
    assert!(out.contains("// Point is a 2D position.\ntype Point struct {\n"));
    assert!(out.contains("\t// X: Horizontal offset.\n\t// Y: Vertical offset.\n\tX, Y float64\n"));
    assert!(out.contains("// Add sums two points.\nfunc Add(a, b Point) Point {\n"));
}
