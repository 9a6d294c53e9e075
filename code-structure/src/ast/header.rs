//! File-level header comment used by the markup and stylesheet adapters.
//!
//! Those languages have no declarations worth a per-element comment, so the
//! generated summary, change list and per-element notes go into one block at
//! the top of the file. A block is only ever replaced when it looks like one
//! written here before (it mentions `Summary:` or `Changes:`).

use super::comments::{self, CommentStyle};
use crate::types::FileStructure;

const MARKERS: [&str; 2] = ["Summary:", "Changes:"];

/// Text lines of the header for `documented`; empty when there is nothing to say.
pub fn header_lines(documented: &FileStructure) -> Vec<String> {
    let mut out = Vec::new();

    let summary = comments::text_lines(&documented.summary);
    if !summary.is_empty() {
        out.push(format!("Summary: {}", summary.join(" ")));
    }

    let changes: Vec<&str> = documented
        .changes_made
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if !changes.is_empty() {
        out.push("Changes:".to_string());
        out.extend(changes.iter().map(|c| format!("- {c}")));
    }

    for el in documented.iter().filter(|e| e.has_documentation()) {
        let text = comments::doc_lines(el).join(" ");
        out.push(format!("{}: {}", el.name, text));
    }
    out
}

/// Write `text` as a `style` block at `row`, replacing a header written earlier.
pub fn apply_header(source: &str, row: usize, text: &[String], style: CommentStyle) -> String {
    if text.is_empty() {
        return source.to_string();
    }
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let row = row.min(lines.len());
    let block = style.render(text, "", comments::newline_of(source));

    let replace_until = existing_header(&lines, row, style).map(|(end, existing)| {
        if same_text(text, &existing) { None } else { Some(end) }
    });
    let end = match replace_until {
        // identical header already present
        Some(None) => return source.to_string(),
        Some(Some(end)) => end,
        None => row,
    };

    let mut out = String::with_capacity(source.len() + block.len());
    lines[..row].iter().for_each(|l| out.push_str(l));
    out.push_str(&block);
    lines[end..].iter().for_each(|l| out.push_str(l));
    out
}

/// End row (exclusive) and text of a previously written header starting at `row`.
fn existing_header(lines: &[&str], row: usize, style: CommentStyle) -> Option<(usize, Vec<String>)> {
    let (open, close) = match style {
        CommentStyle::Markup => ("<!--", "-->"),
        _ => ("/*", "*/"),
    };
    if !lines.get(row)?.trim_start().starts_with(open) {
        return None;
    }
    let last = (row..lines.len()).find(|&r| lines[r].contains(close))?;
    let block = style.leading_block(lines, last + 1)?;
    if block.rows.start != row {
        return None;
    }
    let ours = block
        .lines
        .iter()
        .any(|l| MARKERS.iter().any(|m| l.trim_start().starts_with(m)));
    ours.then_some((last + 1, block.lines))
}

fn same_text(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.trim() == y.trim())
}
