//! HTML adapter: a tag walk instead of a full grammar.
//!
//! Every distinct tag name becomes one `MarkupTag` element (first occurrence
//! order) whose parameters are the attribute names seen on that tag anywhere
//! in the document. Comments, doctype declarations and the bodies of
//! `<script>`/`<style>` are skipped. Documentation is written as one header
//! comment, see [`super::header`].

use super::comments::CommentStyle;
use super::header;
use super::interface::LanguageAdapter;
use crate::errors::{InsertError, ParseError};
use crate::types::{CodeElement, ElementKind, FileStructure, LanguageKind, Parameter, Span};
use regex::Regex;
use std::sync::LazyLock;

static TAG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<(/?)([A-Za-z][A-Za-z0-9:_-]*)").expect("tag name pattern")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?"#)
        .expect("attribute pattern")
});

/// Tags whose content is raw text and must not be scanned for markup.
const RAW_TEXT: [&str; 2] = ["script", "style"];

#[derive(Debug, Clone, Default)]
pub struct HtmlAdapter;

impl LanguageAdapter for HtmlAdapter {
    fn language(&self) -> LanguageKind {
        LanguageKind::Html
    }

    fn extract_structure(&self, source: &str) -> Result<FileStructure, ParseError> {
        let mut elements: Vec<CodeElement> = Vec::new();
        for tag in scan(source)? {
            match elements.iter_mut().find(|e| e.name == tag.name) {
                Some(el) => {
                    for attr in tag.attributes {
                        if !el.parameters.iter().any(|p| p.name == attr) {
                            el.parameters.push(Parameter::new(attr, None));
                        }
                    }
                }
                None => {
                    let mut params: Vec<Parameter> = Vec::new();
                    for attr in tag.attributes {
                        if !params.iter().any(|p| p.name == attr) {
                            params.push(Parameter::new(attr, None));
                        }
                    }
                    elements.push(
                        CodeElement::new(tag.name, ElementKind::MarkupTag, tag.span)
                            .with_parameters(params),
                    );
                }
            }
        }
        Ok(FileStructure::new(LanguageKind::Html, elements))
    }

    fn insert_documentation(
        &self,
        source: &str,
        documented: &FileStructure,
    ) -> Result<String, InsertError> {
        scan(source)?;
        let text = header::header_lines(documented);
        Ok(header::apply_header(
            source,
            header_row(source),
            &text,
            CommentStyle::Markup,
        ))
    }

    fn validate_syntax(&self, source: &str) -> bool {
        scan(source).is_ok()
    }
}

/// Row the header goes on: below a leading doctype or XML declaration.
fn header_row(source: &str) -> usize {
    let Some(first) = source.split_inclusive('\n').next() else {
        return 0;
    };
    let head = first.trim_start().to_ascii_lowercase();
    let declaration = head.starts_with("<!doctype") || head.starts_with("<?xml");
    usize::from(declaration && first.ends_with('\n'))
}

#[derive(Debug)]
struct Tag {
    name: String,
    attributes: Vec<String>,
    span: Span,
}

fn scan(source: &str) -> Result<Vec<Tag>, ParseError> {
    let mut tags = Vec::new();
    let mut i = 0usize;

    while let Some(offset) = source[i..].find('<') {
        let at = i + offset;
        let rest = &source[at..];

        if let Some(body) = rest.strip_prefix("<!--") {
            let end = body
                .find("-->")
                .ok_or_else(|| malformed(source, at, "unterminated comment"))?;
            i = at + 4 + end + 3;
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest
                .find('>')
                .ok_or_else(|| malformed(source, at, "unterminated declaration"))?;
            i = at + end + 1;
            continue;
        }
        let Some(caps) = TAG_NAME.captures(rest) else {
            // a bare `<` in text
            i = at + 1;
            continue;
        };

        let end = tag_end(rest).ok_or_else(|| malformed(source, at, "unterminated tag"))?;
        let raw = &rest[..=end];
        i = at + end + 1;
        if !caps[1].is_empty() {
            continue;
        }

        let name = caps[2].to_ascii_lowercase();
        let inner = raw[caps[0].len()..].trim_end_matches('>');
        let self_closing = inner.trim_end().ends_with('/');
        let attributes = ATTRIBUTE
            .captures_iter(inner.trim_end_matches('/'))
            .map(|c| c[1].to_ascii_lowercase())
            .collect();

        let start_row = row_of(source, at);
        tags.push(Tag {
            name: name.clone(),
            attributes,
            span: Span {
                start_byte: at,
                end_byte: i,
                start_row,
                end_row: start_row + raw.matches('\n').count(),
            },
        });

        if RAW_TEXT.contains(&name.as_str()) && !self_closing {
            let close = format!("</{name}");
            let found = source[i..].to_ascii_lowercase().find(&close);
            match found {
                Some(pos) => i += pos,
                None => return Err(malformed(source, at, "unterminated raw text element")),
            }
        }
    }
    Ok(tags)
}

/// Index of the `>` closing the tag at the start of `rest`, skipping quoted values.
fn tag_end(rest: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, ch) in rest.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '>') => return Some(idx),
            (None, '<') => return None,
            _ => {}
        }
    }
    None
}

fn row_of(source: &str, byte: usize) -> usize {
    source[..byte].matches('\n').count()
}

fn malformed(source: &str, byte: usize, detail: &'static str) -> ParseError {
    ParseError::Malformed {
        language: LanguageKind::Html,
        line: row_of(source, byte) + 1,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
  <!-- <fake attr=1> -->
  <style>p > a { color: red; }</style>
  <script>if (a < b) { document.write('<div>'); }</script>
</head>
<body>
  <div class=\"main\" id='root'>
    <a href=\"/x\" data-role=\"link\">x</a>
    <div hidden>y</div>
    <br/>
  </div>
</body>
</html>
";

    #[test]
    fn one_element_per_distinct_tag() {
        let fs = HtmlAdapter.extract_structure(PAGE).unwrap();
        let names: Vec<&str> = fs.top_level_elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["html", "head", "style", "script", "body", "div", "a", "br"]);
        assert!(fs.iter().all(|e| e.kind == ElementKind::MarkupTag));

        let div = &fs.top_level_elements[5];
        let attrs: Vec<&str> = div.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(attrs, vec!["class", "id", "hidden"]);
        assert_eq!(div.span.start_row, 8);
    }

    #[test]
    fn unterminated_input_is_rejected() {
        for bad in ["<div class=\"x\"", "<p>ok</p><!-- open", "<script>let a = 1;"] {
            let err = HtmlAdapter.extract_structure(bad).unwrap_err();
            assert!(matches!(err, ParseError::Malformed { .. }), "{bad}");
            assert!(!HtmlAdapter.validate_syntax(bad));
        }
        assert!(HtmlAdapter.validate_syntax("a < b and <b>bold</b>"));
    }

    #[test]
    fn header_goes_below_doctype() {
        let mut fs = HtmlAdapter.extract_structure(PAGE).unwrap();
        fs.summary = "Landing page.".into();
        fs.changes_made = vec!["Added a header".into()];

        let out = HtmlAdapter.insert_documentation(PAGE, &fs).unwrap();
        assert!(out.starts_with(
            "<!DOCTYPE html>\n<!--\n  Summary: Landing page.\n  Changes:\n  - Added a header\n-->\n<html lang=\"en\">\n"
        ));
        assert_eq!(HtmlAdapter.insert_documentation(&out, &fs).unwrap(), out);
    }

    #[test]
    fn nothing_to_say_leaves_the_file_alone() {
        let fs = HtmlAdapter.extract_structure(PAGE).unwrap();
        assert_eq!(HtmlAdapter.insert_documentation(PAGE, &fs).unwrap(), PAGE);
    }
}
