//! Tree-sitter helpers shared by the parse-tree adapters.

use crate::errors::ParseError;
use crate::types::{LanguageKind, Span};
use tree_sitter::{Language, Node, Parser, Tree};

/// Parse `code` and reject trees that contain error or missing nodes.
pub fn parse_strict(kind: LanguageKind, lang: &Language, code: &str) -> Result<Tree, ParseError> {
    let tree = parse_lenient(kind, lang, code)?;
    if let Some(err) = first_error(tree.root_node()) {
        let pos = err.start_position();
        return Err(ParseError::Syntax {
            language: kind,
            line: pos.row + 1,
            column: pos.column + 1,
        });
    }
    Ok(tree)
}

/// Parse `code`, accepting trees with error nodes.
pub fn parse_lenient(kind: LanguageKind, lang: &Language, code: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(lang)
        .map_err(|_| ParseError::TreeSitterLanguage(kind))?;
    parser
        .parse(code, None)
        .ok_or(ParseError::TreeSitterParse(kind))
}

/// `true` when `code` parses without error nodes.
pub fn is_valid(kind: LanguageKind, lang: &Language, code: &str) -> bool {
    parse_lenient(kind, lang, code)
        .map(|t| !t.root_node().has_error())
        .unwrap_or(false)
}

/// First error or missing node in pre-order, if any.
pub fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    if !root.has_error() {
        return None;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    Some(root)
}

/// UTF-8 text of a node (empty on invalid ranges).
#[inline]
pub fn text<'a>(node: Node<'_>, code: &'a str) -> &'a str {
    code.get(node.start_byte()..node.end_byte()).unwrap_or_default()
}

/// Text of the named field, if present.
pub fn field_text<'a>(node: Node<'_>, field: &str, code: &'a str) -> Option<&'a str> {
    node.child_by_field_name(field).map(|n| text(n, code))
}

/// Named children collected into a vector.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// All children (named and anonymous) collected into a vector.
pub fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// `true` when an anonymous child token with this kind exists (e.g. `async`).
pub fn has_token(node: Node<'_>, token: &str) -> bool {
    children(node).iter().any(|c| !c.is_named() && c.kind() == token)
}

/// Span anchored at `anchor` (rows/bytes of the declaration start).
pub fn span_of(anchor: Node<'_>) -> Span {
    Span {
        start_byte: anchor.start_byte(),
        end_byte: anchor.end_byte(),
        start_row: anchor.start_position().row,
        end_row: anchor.end_position().row,
    }
}

/// Strip a leading `:` and whitespace from a type annotation node's text.
pub fn annotation_text(raw: &str) -> String {
    raw.trim().trim_start_matches(':').trim().to_string()
}
