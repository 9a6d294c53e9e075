use std::{error::Error, path::PathBuf};

use colored::Colorize;
use doc_pipeline::{PipelineError, RunReport, run_from_env};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file when present.
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,doc_pipeline=info,code_structure=info,ai_llm_service=info"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_filter(filter::filter_fn(|meta| !ai_llm_service::telemetry::is_own_target(meta))),
        )
        .with(ai_llm_service::telemetry::layer())
        .try_init()?;

    let root = std::env::var("DOCSCRIBE_ROOT")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| std::env::args().nth(1))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    // First Ctrl-C stops new generation work; writes in flight still finish.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("shutdown requested, finishing in-flight writes");
            let _ = shutdown_tx.send(true);
        }
    });

    info!(root = %root.display(), "docscribe: start");
    match run_from_env(&root, shutdown_rx).await {
        Ok(report) => {
            print_summary(&report);
            Ok(())
        }
        Err(PipelineError::RollbackFailed { path, detail, report }) => {
            print_summary(&report);
            error!(path = %path.display(), %detail, "rollback failed, run aborted");
            eprintln!(
                "{} {} could not be restored ({}). Check its backup before rerunning.",
                "FATAL:".red().bold(),
                path.display(),
                detail
            );
            Err(PipelineError::RollbackFailed { path, detail, report }.into())
        }
        Err(err) => Err(err.into()),
    }
}

fn print_summary(report: &RunReport) {
    let c = &report.summary.counts;
    println!("{}", "docscribe summary".bold());
    println!("  discovered: {}", c.discovered);
    println!(
        "  {} {} ({} rewritten)",
        "done:".green(),
        c.done,
        c.written
    );
    println!("  {} {}", "skipped:".yellow(), c.skipped);
    for (reason, n) in &c.skip_reasons {
        println!("    {reason}: {n}");
    }
    println!("  {} {}", "failed:".red(), c.failed);
    for (reason, n) in &c.failure_reasons {
        println!("    {reason}: {n}");
    }
    println!("  elapsed: {} ms", report.summary.elapsed_ms);
}
