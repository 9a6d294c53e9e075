//! CSS adapter: a brace scanner instead of a full grammar.
//!
//! Each selector (or at-rule prelude such as `@media screen`) becomes one
//! `StyleRule`, with its declarations as parameters (`name` is the property,
//! `type` the value). Rules nested inside at-rule blocks are listed in source
//! order next to their parent. Repeated selectors are merged into the first
//! occurrence. Documentation is written as one header comment.

use super::comments::CommentStyle;
use super::header;
use super::interface::LanguageAdapter;
use crate::errors::{InsertError, ParseError};
use crate::types::{CodeElement, ElementKind, FileStructure, LanguageKind, Parameter, Span};

#[derive(Debug, Clone, Copy, Default)]
pub struct CssAdapter;

impl LanguageAdapter for CssAdapter {
    fn language(&self) -> LanguageKind {
        LanguageKind::Css
    }

    fn extract_structure(&self, source: &str) -> Result<FileStructure, ParseError> {
        let rules = scan(source)?;
        let mut elements: Vec<CodeElement> = Vec::with_capacity(rules.len());
        for rule in rules {
            match elements.iter_mut().find(|e| e.name == rule.name) {
                Some(first) => {
                    for decl in rule.parameters {
                        if !first.parameters.iter().any(|p| p.name == decl.name) {
                            first.parameters.push(decl);
                        }
                    }
                }
                None => elements.push(rule),
            }
        }
        Ok(FileStructure::new(LanguageKind::Css, elements))
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
            CommentStyle::Stylesheet,
        ))
    }

    fn validate_syntax(&self, source: &str) -> bool {
        scan(source).is_ok()
    }
}

/// `@charset` must stay the first statement of a stylesheet.
fn header_row(source: &str) -> usize {
    match source.split_inclusive('\n').next() {
        Some(first) => usize::from(first.trim_start().starts_with("@charset") && first.ends_with('\n')),
        None => 0,
    }
}

struct Frame {
    /// Index into the output list, `None` for blocks without a prelude.
    rule: Option<usize>,
}

fn scan(source: &str) -> Result<Vec<CodeElement>, ParseError> {
    let code = blank_comments(source)?;
    let bytes = code.as_bytes();

    let mut rules: Vec<CodeElement> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut segment = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                i = skip_string(bytes, i, quote);
                continue;
            }
            b'{' => {
                let prelude = &code[segment..i];
                let rule = selector_name(prelude).map(|name| {
                    let offset = segment + (prelude.len() - prelude.trim_start().len());
                    let row = row_of(source, offset);
                    rules.push(CodeElement::new(
                        name,
                        ElementKind::StyleRule,
                        Span {
                            start_byte: offset,
                            end_byte: i,
                            start_row: row,
                            end_row: row,
                        },
                    ));
                    rules.len() - 1
                });
                stack.push(Frame { rule });
                segment = i + 1;
            }
            b';' => {
                if let Some(Frame { rule: Some(idx) }) = stack.last() {
                    push_declaration(&mut rules[*idx], &code[segment..i]);
                }
                segment = i + 1;
            }
            b'}' => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| malformed(source, i, "unbalanced closing brace"))?;
                if let Some(idx) = frame.rule {
                    push_declaration(&mut rules[idx], &code[segment..i]);
                    let end_row = row_of(source, i);
                    let span = &mut rules[idx].span;
                    span.end_byte = i + 1;
                    span.end_row = end_row;
                }
                segment = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if !stack.is_empty() {
        return Err(malformed(source, source.len(), "unclosed block"));
    }
    Ok(rules)
}

/// Copy of `source` with comment bytes replaced by spaces (newlines kept).
fn blank_comments(source: &str) -> Result<String, ParseError> {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut i = 0usize;
    let mut copied = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => i = skip_string(bytes, i, quote),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = source[i + 2..]
                    .find("*/")
                    .map(|p| i + 2 + p + 2)
                    .ok_or_else(|| malformed(source, i, "unterminated comment"))?;
                out.push_str(&source[copied..i]);
                out.extend(source[i..end].chars().map(|c| if c == '\n' { '\n' } else { ' ' }));
                // keep byte offsets identical to the source
                let width = source[i..end].len() - source[i..end].chars().count();
                out.extend(std::iter::repeat_n(' ', width));
                copied = end;
                i = end;
            }
            _ => i += 1,
        }
    }
    out.push_str(&source[copied..]);
    Ok(out)
}

/// Position after the string literal opened at `start`; unterminated strings run to the end.
fn skip_string(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            b'\n' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn selector_name(prelude: &str) -> Option<String> {
    let name = prelude.split_whitespace().collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}

fn push_declaration(rule: &mut CodeElement, raw: &str) {
    let Some((property, value)) = raw.split_once(':') else {
        return;
    };
    let property = property.trim();
    if property.is_empty() || property.contains(char::is_whitespace) {
        return;
    }
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if rule.parameters.iter().any(|p| p.name == property) {
        return;
    }
    rule.parameters.push(Parameter::new(property, (!value.is_empty()).then_some(value)));
}

fn row_of(source: &str, byte: usize) -> usize {
    source[..byte.min(source.len())].matches('\n').count()
}

fn malformed(source: &str, byte: usize, detail: &'static str) -> ParseError {
    ParseError::Malformed {
        language: LanguageKind::Css,
        line: row_of(source, byte) + 1,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "@charset \"utf-8\";
/* base { not a rule } */
body {
  margin: 0;
  font-family: \"Open Sans\", sans-serif
}

.card > h1,
.card > h2 { color: #333; }

@media screen and (max-width: 600px) {
  body { margin: 4px; padding: 0; }
}

a::after { content: \"}\"; }
";

    #[test]
    fn rules_and_declarations() {
        let fs = CssAdapter.extract_structure(SHEET).unwrap();
        let names: Vec<&str> = fs.top_level_elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "body",
                ".card > h1, .card > h2",
                "@media screen and (max-width: 600px)",
                "a::after"
            ]
        );

        // the nested `body` rule merged into the first one
        let body = &fs.top_level_elements[0];
        let props: Vec<(&str, Option<&str>)> = body
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.ty.as_deref()))
            .collect();
        assert_eq!(
            props,
            vec![
                ("margin", Some("0")),
                ("font-family", Some("\"Open Sans\", sans-serif")),
                ("padding", Some("0")),
            ]
        );
        assert_eq!(body.span.start_row, 2);
        assert_eq!(fs.top_level_elements[3].parameters[0].ty.as_deref(), Some("\"}\""));
    }

    #[test]
    fn unbalanced_input_is_rejected() {
        for bad in ["a { color: red;", "a { color: red; } }", "/* open\na {}"] {
            assert!(matches!(
                CssAdapter.extract_structure(bad),
                Err(ParseError::Malformed { .. })
            ));
            assert!(!CssAdapter.validate_syntax(bad));
        }
        assert!(CssAdapter.validate_syntax(SHEET));
    }

    #[test]
    fn header_goes_below_charset() {
        let mut fs = CssAdapter.extract_structure(SHEET).unwrap();
        fs.summary = "Base styles.".into();
        fs.top_level_elements[0].docstring = "Page defaults.".into();

        let out = CssAdapter.insert_documentation(SHEET, &fs).unwrap();
        assert!(out.starts_with(
            "@charset \"utf-8\";\n/*\n * Summary: Base styles.\n * body: Page defaults.\n */\n/* base"
        ));
        assert!(CssAdapter.validate_syntax(&out));
        assert_eq!(CssAdapter.insert_documentation(&out, &fs).unwrap(), out);
    }
}
