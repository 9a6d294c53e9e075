//! Markdown rendering of a [`RunReport`].
//!
//! Layout:
//! - title and run counters;
//! - table of contents over every documented file;
//! - one section per documented file (summary, changes, functions, classes
//!   with member tables, other elements, the documented source);
//! - skipped and failed files with their reasons.
//!
//! Elements flagged as high relevance by the generation service are marked
//! with ★.

use crate::{
    core::normalize::repo_rel_str,
    run::{FileOutcome, OutcomeStatus, RunReport},
};
use code_structure::{CodeElement, ElementKind, FileStructure};
use std::{collections::HashMap, fmt::Write, path::Path};

/// Render the whole report. Paths are shown relative to `root`.
pub fn render_report(report: &RunReport, root: &Path) -> String {
    let mut done: Vec<(String, &FileOutcome, &FileStructure)> = report
        .outcomes
        .iter()
        .filter_map(|o| match &o.status {
            OutcomeStatus::Done { structure, .. } => Some((repo_rel_str(root, &o.path), o, structure)),
            _ => None,
        })
        .collect();
    done.sort_by(|a, b| a.0.cmp(&b.0));

    let c = &report.summary.counts;
    let mut out = String::new();
    out.push_str("# Documentation report\n\n");
    let _ = writeln!(out, "Generated at {}.\n", report.summary.generated_at);
    let _ = writeln!(
        out,
        "Files: {} discovered, {} documented ({} rewritten), {} skipped, {} failed.\n",
        c.discovered, c.done, c.written, c.skipped, c.failed
    );

    let mut anchors = Anchors::default();
    let headings: Vec<(String, String)> = done
        .iter()
        .map(|(rel, _, _)| (rel.clone(), anchors.next(rel)))
        .collect();
    let skipped_anchor = anchors.next("Skipped and failed files");

    if !headings.is_empty() {
        out.push_str("## Contents\n\n");
        for (title, anchor) in &headings {
            let _ = writeln!(out, "- [{}](#{})", title, anchor);
        }
        let _ = writeln!(out, "- [Skipped and failed files](#{})\n", skipped_anchor);
    }

    for (rel, outcome, structure) in &done {
        render_file(&mut out, rel, outcome, structure);
    }

    render_not_documented(&mut out, report, root);
    out
}

fn render_file(out: &mut String, rel: &str, outcome: &FileOutcome, structure: &FileStructure) {
    let _ = writeln!(out, "## {}\n", rel);
    let _ = writeln!(out, "**Language:** {}\n", structure.language);

    if !structure.summary.is_empty() {
        let _ = writeln!(out, "{}\n", structure.summary);
    }
    if !structure.changes_made.is_empty() {
        out.push_str("**Changes:**\n\n");
        for change in &structure.changes_made {
            let _ = writeln!(out, "- {}", change);
        }
        out.push('\n');
    }
    if let OutcomeStatus::Done { dropped, .. } = &outcome.status {
        if !dropped.is_empty() {
            let names: Vec<&str> = dropped.iter().map(|d| d.name.as_str()).collect();
            let _ = writeln!(out, "_Documentation not applied for: {}._\n", names.join(", "));
        }
    }

    let functions: Vec<&CodeElement> = structure
        .top_level_elements
        .iter()
        .filter(|e| e.kind.is_callable())
        .collect();
    if !functions.is_empty() {
        out.push_str("### Functions\n\n");
        out.push_str("| Name | Parameters | Description | Async |\n|---|---|---|---|\n");
        for f in functions {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                name_cell(f),
                params_cell(f),
                cell(first_line(&f.docstring)),
                if f.is_async { "yes" } else { "" }
            );
        }
        out.push('\n');
    }

    let containers: Vec<&CodeElement> = structure
        .top_level_elements
        .iter()
        .filter(|e| e.kind.is_container())
        .collect();
    if !containers.is_empty() {
        out.push_str("### Classes\n\n");
        for class in containers {
            let _ = writeln!(out, "#### {} ({})\n", name_cell(class), class.kind.as_str());
            if !class.docstring.is_empty() {
                let _ = writeln!(out, "{}\n", class.docstring);
            }
            if class.children.is_empty() {
                continue;
            }
            out.push_str("| Member | Kind | Parameters | Description |\n|---|---|---|---|\n");
            for m in &class.children {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    name_cell(m),
                    m.kind.as_str(),
                    params_cell(m),
                    cell(first_line(&m.docstring))
                );
            }
            out.push('\n');
        }
    }

    let others: Vec<&CodeElement> = structure
        .top_level_elements
        .iter()
        .filter(|e| !e.kind.is_callable() && !e.kind.is_container())
        .collect();
    if !others.is_empty() {
        let title = match others[0].kind {
            ElementKind::StyleRule => "Style rules",
            ElementKind::MarkupTag => "Tags",
            _ => "Other elements",
        };
        let _ = writeln!(out, "### {}\n", title);
        out.push_str("| Name | Kind | Description |\n|---|---|---|\n");
        for e in others {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                name_cell(e),
                e.kind.as_str(),
                cell(first_line(&e.docstring))
            );
        }
        out.push('\n');
    }

    if let OutcomeStatus::Done { text, .. } = &outcome.status {
        code_block(out, structure.language.as_str(), text);
    }
}

/// Fenced block of `text`; the fence outgrows any backtick run inside it.
fn code_block(out: &mut String, language: &str, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    let longest = text
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest.max(2) + 1);
    let _ = writeln!(out, "<details><summary>Source</summary>\n\n{fence}{language}\n{text}\n{fence}\n\n</details>\n");
}

fn render_not_documented(out: &mut String, report: &RunReport, root: &Path) {
    let mut rows: Vec<(String, String, String)> = report
        .outcomes
        .iter()
        .filter_map(|o| match &o.status {
            OutcomeStatus::Skipped { stage, reason } => {
                Some((repo_rel_str(root, &o.path), format!("skipped at {stage}"), reason.to_string()))
            }
            OutcomeStatus::Failed { stage, reason } => {
                Some((repo_rel_str(root, &o.path), format!("failed at {stage}"), reason.to_string()))
            }
            OutcomeStatus::Done { .. } => None,
        })
        .collect();
    rows.sort();

    out.push_str("## Skipped and failed files\n\n");
    if rows.is_empty() {
        out.push_str("None.\n");
        return;
    }
    out.push_str("| File | Status | Reason |\n|---|---|---|\n");
    for (path, status, reason) in rows {
        let _ = writeln!(out, "| {} | {} | {} |", cell(&path), status, cell(&reason));
    }
}

fn name_cell(e: &CodeElement) -> String {
    let high = e.relevance.as_ref().is_some_and(|r| r.is_high());
    if high {
        format!("`{}` ★", e.name)
    } else {
        format!("`{}`", e.name)
    }
}

fn params_cell(e: &CodeElement) -> String {
    let params: Vec<String> = e
        .parameters
        .iter()
        .map(|p| match &p.ty {
            Some(ty) => format!("{}: {}", p.name, ty),
            None => p.name.clone(),
        })
        .collect();
    cell(&params.join(", "))
}

fn first_line(text: &str) -> &str {
    text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

/// Escape a value for a single table cell.
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// GitHub-style heading anchors, unique within one document.
#[derive(Default)]
struct Anchors {
    seen: HashMap<String, usize>,
}

impl Anchors {
    fn next(&mut self, heading: &str) -> String {
        let base = slug(heading);
        let n = self.seen.entry(base.clone()).or_insert(0);
        let anchor = if *n == 0 { base } else { format!("{}-{}", base, n) };
        *n += 1;
        anchor
    }
}

fn slug(heading: &str) -> String {
    heading
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}
