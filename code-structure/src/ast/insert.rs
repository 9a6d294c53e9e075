//! Line-based comment insertion shared by the parse-tree adapters.
//!
//! The text is re-extracted first, so every documented element is resolved
//! against the declarations that actually exist in the text being edited.
//! Edits only ever add whole comment lines above an anchor row or replace
//! the comment block already sitting there; every other byte is kept.

use super::comments::{self, CommentStyle};
use super::interface::LanguageAdapter;
use crate::errors::InsertError;
use crate::types::{CodeElement, FileStructure};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug)]
struct Pending<'a> {
    name: &'a str,
    text: Vec<String>,
    current: &'a str,
}

#[derive(Debug)]
struct Edit {
    row: usize,
    replace_from: usize,
    block: String,
}

/// Re-extract `source` with `adapter` and write per-element comment blocks.
pub fn insert_with<A>(
    adapter: &A,
    source: &str,
    documented: &FileStructure,
    style: CommentStyle,
) -> Result<String, InsertError>
where
    A: LanguageAdapter + ?Sized,
{
    if !documented.iter().any(CodeElement::has_documentation) {
        return Ok(source.to_string());
    }
    let fresh = adapter.extract_structure(source)?;
    apply_comments(source, &fresh, documented, style)
}

/// Apply comment edits for `documented` using anchors from `fresh`.
///
/// Elements that share an anchor row (`X, Y float64`, `int a, b;`,
/// `class A: x = 1`) get a single block with one labelled entry each.
pub fn apply_comments(
    source: &str,
    fresh: &FileStructure,
    documented: &FileStructure,
    style: CommentStyle,
) -> Result<String, InsertError> {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let newline = comments::newline_of(source);

    let mut by_row: BTreeMap<usize, Vec<Pending<'_>>> = BTreeMap::new();
    for el in documented.iter() {
        if !el.has_documentation() {
            continue;
        }
        let Some(target) = fresh.find(el.parent.as_deref(), &el.name, el.kind) else {
            warn!(
                name = %el.name,
                kind = el.kind.as_str(),
                parent = el.parent.as_deref().unwrap_or("<top>"),
                "element not found in source, documentation skipped"
            );
            continue;
        };
        by_row.entry(target.span.start_row).or_default().push(Pending {
            name: &el.name,
            text: comments::doc_lines(el),
            current: &target.docstring,
        });
    }

    let mut edits: Vec<Edit> = Vec::new();
    for (row, group) in by_row {
        let new_lines = match group.as_slice() {
            [only] => {
                if same_text(&only.text, &comments::text_lines(only.current)) {
                    continue;
                }
                only.text.clone()
            }
            shared => {
                debug!(row, elements = shared.len(), "elements share an anchor row");
                labelled(shared)
            }
        };

        let Some(anchor_line) = lines.get(row) else {
            return Err(InsertError::RowOutOfBounds {
                row,
                lines: lines.len(),
            });
        };

        let existing = style.leading_block(&lines, row);
        if let Some(block) = &existing {
            if same_text(&new_lines, &block.lines) {
                continue;
            }
        }

        let block = style.render(&new_lines, comments::indent_of(anchor_line), newline);
        edits.push(Edit {
            row,
            replace_from: existing.map(|b| b.rows.start).unwrap_or(row),
            block,
        });
    }

    if edits.is_empty() {
        debug!("no comment edits required");
        return Ok(source.to_string());
    }

    let mut out = String::with_capacity(source.len() + edits.iter().map(|e| e.block.len()).sum::<usize>());
    let mut cursor = 0usize;
    for edit in &edits {
        let keep_until = edit.replace_from.max(cursor);
        for line in &lines[cursor..keep_until] {
            out.push_str(line);
        }
        out.push_str(&edit.block);
        cursor = edit.row;
    }
    for line in &lines[cursor..] {
        out.push_str(line);
    }

    debug!(edits = edits.len(), "comment blocks written");
    Ok(out)
}

/// `Name: first line` followed by the remaining lines, per element in tree order.
///
/// An element whose text is still the shared block read back from the source
/// contributes only its own labelled section of that block.
fn labelled(group: &[Pending<'_>]) -> Vec<String> {
    let names: Vec<&str> = group.iter().map(|p| p.name).collect();
    let mut out = Vec::new();
    for p in group {
        let current = comments::text_lines(p.current);
        let own = if same_text(&p.text, &current) {
            section_of(p.name, &current, &names).unwrap_or_else(|| p.text.clone())
        } else {
            p.text.clone()
        };
        let mut text = own.iter();
        let Some(first) = text.next() else {
            continue;
        };
        out.push(format!("{}: {}", p.name, first.trim_start()));
        out.extend(text.cloned());
    }
    out
}

/// Lines labelled `name:` in a shared block, up to the next label of the group.
fn section_of(name: &str, block: &[String], names: &[&str]) -> Option<Vec<String>> {
    let label = format!("{name}: ");
    let is_label = |line: &str| names.iter().any(|n| line.trim_start().starts_with(&format!("{n}: ")));
    let start = block.iter().position(|l| l.trim_start().starts_with(&label))?;
    let mut out = vec![block[start].trim_start()[label.len()..].to_string()];
    out.extend(block[start + 1..].iter().take_while(|l| !is_label(l.as_str())).cloned());
    Some(out)
}

fn same_text(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.trim() == y.trim())
}
