//! Tracing layer for events emitted by this crate.
//!
//! Provider calls log latency, status and snippets under the
//! `ai_llm_service` target. The binary composes [`layer`] next to its own
//! formatting layer and excludes this target from the latter, so provider
//! chatter gets compact, timestamped lines of its own.

use std::io::{self, IsTerminal};

use tracing::Metadata;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, filter, fmt};

/// Crate target prefix used to filter only library-originated logs.
pub const TARGET_PREFIX: &str = "ai_llm_service";

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
pub struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// `true` for events and spans emitted from this crate.
pub fn is_own_target(meta: &Metadata<'_>) -> bool {
    meta.target().starts_with(TARGET_PREFIX)
}

/// Formatting layer that renders ONLY events emitted by this crate.
///
/// RFC3339 UTC timestamps, compact single-line format with `file:line`,
/// span close events (durations of instrumented calls), ANSI colors only
/// when stdout is a terminal.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(filter::filter_fn(is_own_target))
}
