//! Comment syntax per language: rendering new blocks and reading existing ones.
//!
//! All detection here is line based. A "leading block" is the run of comment
//! lines that ends on the row directly above a declaration anchor, with no
//! blank line in between.

use crate::types::CodeElement;

/// Comment flavours used by the adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `# text` (Python)
    Hash,
    /// `// text` (Go)
    DoubleSlash,
    /// `/** ... */` doc blocks (JavaScript, TypeScript, Java)
    DocBlock,
    /// `<!-- ... -->` (HTML)
    Markup,
    /// `/* ... */` (CSS)
    Stylesheet,
}

/// Inclusive-exclusive row range `[start, end)` of an existing comment block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

/// An existing comment block with its text normalized to one entry per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadingBlock {
    pub rows: RowRange,
    pub lines: Vec<String>,
}

impl CommentStyle {
    /// Render `text_lines` as a comment block; every emitted line ends with `newline`.
    pub fn render(self, text_lines: &[String], indent: &str, newline: &str) -> String {
        let mut out = String::new();
        match self {
            Self::Hash | Self::DoubleSlash => {
                let marker = if self == Self::Hash { "#" } else { "//" };
                for line in text_lines {
                    push_prefixed(&mut out, indent, marker, line, newline);
                }
            }
            Self::DocBlock | Self::Stylesheet => {
                let open = if self == Self::DocBlock { "/**" } else { "/*" };
                out.push_str(indent);
                out.push_str(open);
                out.push_str(newline);
                for line in text_lines {
                    push_prefixed(&mut out, indent, " *", &self.sanitize(line), newline);
                }
                out.push_str(indent);
                out.push_str(" */");
                out.push_str(newline);
            }
            Self::Markup => {
                out.push_str(indent);
                out.push_str("<!--");
                out.push_str(newline);
                for line in text_lines {
                    push_prefixed(&mut out, indent, " ", &self.sanitize(line), newline);
                }
                out.push_str(indent);
                out.push_str("-->");
                out.push_str(newline);
            }
        }
        out
    }

    /// Neutralize sequences that would terminate the comment early.
    pub fn sanitize(self, text: &str) -> String {
        match self {
            Self::DocBlock | Self::Stylesheet => text.replace("*/", "* /"),
            Self::Markup => text.replace("-->", "-- >"),
            Self::Hash | Self::DoubleSlash => text.to_string(),
        }
    }

    /// Existing comment block ending on `row - 1`, if any.
    pub fn leading_block(self, lines: &[&str], row: usize) -> Option<LeadingBlock> {
        if row == 0 || row > lines.len() {
            return None;
        }
        match self {
            Self::Hash => line_block(lines, row, |t| {
                (t.starts_with('#') && !is_hash_pragma(t)).then(|| strip_marker(t, "#"))
            }),
            Self::DoubleSlash => line_block(lines, row, |t| {
                let directive = t.starts_with("//go:") || t.starts_with("//+build") || t.starts_with("//line ");
                (t.starts_with("//") && !directive).then(|| strip_marker(t, "//"))
            }),
            Self::DocBlock => delimited_block(lines, row, "/**", "*/"),
            Self::Stylesheet => delimited_block(lines, row, "/*", "*/"),
            Self::Markup => delimited_block(lines, row, "<!--", "-->"),
        }
    }
}

/// Shebangs, encoding cookies and linter/type-checker/formatter pragmas.
fn is_hash_pragma(trimmed: &str) -> bool {
    const PRAGMAS: [&str; 11] = [
        "-*-", "coding:", "coding=", "vim:", "pylint:", "noqa", "type:", "mypy:", "pyright:", "fmt:", "isort:",
    ];
    if trimmed.starts_with("#!") {
        return true;
    }
    let body = trimmed.trim_start_matches('#').trim_start().to_ascii_lowercase();
    PRAGMAS.iter().any(|p| body.starts_with(p)) || body.starts_with("pragma: no cover")
}

/// Text lines to render for an element: description chunks when present,
/// otherwise the docstring split on newlines. Surrounding blank lines are dropped.
pub fn doc_lines(el: &CodeElement) -> Vec<String> {
    if el.description_chunks.iter().any(|c| !c.trim().is_empty()) {
        el.description_chunks
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    } else {
        text_lines(&el.docstring)
    }
}

/// Split free text into trimmed-right lines without leading/trailing blank lines.
pub fn text_lines(text: &str) -> Vec<String> {
    let lines: Vec<String> = text.lines().map(|l| l.trim_end().to_string()).collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e].to_vec(),
        _ => Vec::new(),
    }
}

/// Newline convention of `source` (`"\r\n"` when any CRLF is present).
pub fn newline_of(source: &str) -> &'static str {
    if source.contains("\r\n") { "\r\n" } else { "\n" }
}

/// Leading whitespace of a line.
pub fn indent_of(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

fn push_prefixed(out: &mut String, indent: &str, marker: &str, text: &str, newline: &str) {
    out.push_str(indent);
    out.push_str(marker);
    if !text.is_empty() {
        out.push(' ');
        out.push_str(text.trim_start_matches(' '));
    }
    out.push_str(newline);
}

fn strip_marker(trimmed: &str, marker: &str) -> String {
    let rest = &trimmed[marker.len()..];
    rest.strip_prefix(' ').unwrap_or(rest).trim_end().to_string()
}

fn line_block<F>(lines: &[&str], row: usize, read: F) -> Option<LeadingBlock>
where
    F: Fn(&str) -> Option<String>,
{
    let mut start = row;
    let mut text = Vec::new();
    while start > 0 {
        let t = lines[start - 1].trim();
        match read(t) {
            Some(line) => {
                text.push(line);
                start -= 1;
            }
            None => break,
        }
    }
    if start == row {
        return None;
    }
    text.reverse();
    Some(LeadingBlock {
        rows: RowRange { start, end: row },
        lines: text,
    })
}

fn delimited_block(lines: &[&str], row: usize, open: &str, close: &str) -> Option<LeadingBlock> {
    let last = lines[row - 1].trim();
    if !last.ends_with(close) {
        return None;
    }
    let mut start = row - 1;
    loop {
        let t = lines[start].trim();
        if t.starts_with(open) {
            break;
        }
        // Interior lines of a doc block start with `*`; anything else means the
        // closing marker belongs to code, not to a leading comment.
        let interior_ok = match open {
            "/**" | "/*" => t.starts_with('*'),
            _ => true,
        };
        if start == 0 || !interior_ok || (start < row - 1 && t.contains(close)) {
            return None;
        }
        start -= 1;
    }

    let mut text = Vec::new();
    for (i, raw) in lines[start..row].iter().enumerate() {
        let mut t = raw.trim();
        if i == 0 {
            t = t[open.len()..].trim_start();
        }
        if let Some(stripped) = t.strip_suffix(close) {
            t = stripped.trim_end();
        }
        if open != "<!--" {
            if let Some(stripped) = t.strip_prefix('*') {
                t = stripped.strip_prefix(' ').unwrap_or(stripped);
            }
        }
        text.push(t.trim_end().to_string());
    }
    let lines_out = text_lines(&text.join("\n"));
    Some(LeadingBlock {
        rows: RowRange { start, end: row },
        lines: lines_out,
    })
}
