//! Python adapter backed by tree-sitter-python.
//!
//! Extracts module-level functions and classes, methods, and class-level
//! attributes. Existing documentation is read from the body docstring, or
//! from a `#` block directly above the declaration. New documentation is
//! written as a `#` block above the declaration (above its decorators).

use super::comments::CommentStyle;
use super::grammar::{self, field_text, has_token, named_children, span_of, text};
use super::insert;
use super::interface::LanguageAdapter;
use crate::errors::{InsertError, ParseError};
use crate::types::{CodeElement, ElementKind, FileStructure, LanguageKind, Parameter};
use tree_sitter::{Language, Node};

const STYLE: CommentStyle = CommentStyle::Hash;

#[derive(Debug, Clone, Copy, Default)]
pub struct PythonAdapter;

#[inline]
fn language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> LanguageKind {
        LanguageKind::Python
    }

    fn extract_structure(&self, source: &str) -> Result<FileStructure, ParseError> {
        let tree = grammar::parse_strict(LanguageKind::Python, &language(), source)?;
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        let ctx = Ctx { code: source, lines: &lines };
        let elements = collect_block(tree.root_node(), &ctx, false);
        Ok(FileStructure::new(LanguageKind::Python, elements))
    }

    fn insert_documentation(
        &self,
        source: &str,
        documented: &FileStructure,
    ) -> Result<String, InsertError> {
        insert::insert_with(self, source, documented, STYLE)
    }

    fn validate_syntax(&self, source: &str) -> bool {
        grammar::is_valid(LanguageKind::Python, &language(), source)
    }
}

struct Ctx<'a> {
    code: &'a str,
    lines: &'a [&'a str],
}

fn collect_block(block: Node<'_>, ctx: &Ctx<'_>, in_class: bool) -> Vec<CodeElement> {
    let mut out = Vec::new();
    for stmt in named_children(block) {
        match stmt.kind() {
            "function_definition" => out.push(function(stmt, stmt, ctx, in_class)),
            "class_definition" => out.push(class(stmt, stmt, ctx)),
            "decorated_definition" => {
                if let Some(def) = stmt.child_by_field_name("definition") {
                    match def.kind() {
                        "function_definition" => out.push(function(def, stmt, ctx, in_class)),
                        "class_definition" => out.push(class(def, stmt, ctx)),
                        _ => {}
                    }
                }
            }
            "expression_statement" if in_class => {
                if let Some(attr) = attribute(stmt, ctx) {
                    out.push(attr);
                }
            }
            _ => {}
        }
    }
    out
}

fn function(def: Node<'_>, anchor: Node<'_>, ctx: &Ctx<'_>, in_class: bool) -> CodeElement {
    let name = field_text(def, "name", ctx.code).unwrap_or_default();
    let kind = if in_class {
        ElementKind::Method
    } else {
        ElementKind::Function
    };
    let params = def
        .child_by_field_name("parameters")
        .map(|p| parameters(p, ctx.code, in_class))
        .unwrap_or_default();

    CodeElement::new(name, kind, span_of(anchor))
        .with_parameters(params)
        .with_async(has_token(def, "async"))
        .with_docstring(existing_doc(def, anchor, ctx))
}

fn class(def: Node<'_>, anchor: Node<'_>, ctx: &Ctx<'_>) -> CodeElement {
    let name = field_text(def, "name", ctx.code).unwrap_or_default();
    let children = def
        .child_by_field_name("body")
        .map(|body| collect_block(body, ctx, true))
        .unwrap_or_default();

    CodeElement::new(name, ElementKind::Class, span_of(anchor))
        .with_children(children)
        .with_docstring(existing_doc(def, anchor, ctx))
}

/// `NAME = value` or `NAME: T = value` directly in a class body.
fn attribute(stmt: Node<'_>, ctx: &Ctx<'_>) -> Option<CodeElement> {
    let assign = stmt.named_child(0).filter(|n| n.kind() == "assignment")?;
    let left = assign.child_by_field_name("left")?;
    if left.kind() != "identifier" {
        return None;
    }
    let ty = field_text(assign, "type", ctx.code).map(|t| t.trim().to_string());
    let doc = STYLE
        .leading_block(ctx.lines, stmt.start_position().row)
        .map(|b| b.lines.join("\n"))
        .unwrap_or_default();

    Some(
        CodeElement::new(text(left, ctx.code), ElementKind::Attribute, span_of(stmt))
            .with_parameters(ty.map(|t| vec![Parameter::new("type", Some(t))]).unwrap_or_default())
            .with_docstring(doc),
    )
}

fn parameters(list: Node<'_>, code: &str, skip_receiver: bool) -> Vec<Parameter> {
    let mut out = Vec::new();
    for p in named_children(list) {
        let (name, ty) = match p.kind() {
            "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                (text(p, code).to_string(), None)
            }
            "typed_parameter" => {
                let name = p.named_child(0).map(|n| text(n, code)).unwrap_or_default();
                (name.to_string(), field_text(p, "type", code).map(str::to_string))
            }
            "default_parameter" | "typed_default_parameter" => (
                field_text(p, "name", code).unwrap_or_default().to_string(),
                field_text(p, "type", code).map(str::to_string),
            ),
            _ => continue,
        };
        if name.is_empty() {
            continue;
        }
        if skip_receiver && out.is_empty() && (name == "self" || name == "cls") {
            continue;
        }
        out.push(Parameter::new(name, ty));
    }
    out
}

fn existing_doc(def: Node<'_>, anchor: Node<'_>, ctx: &Ctx<'_>) -> String {
    if let Some(doc) = def
        .child_by_field_name("body")
        .and_then(|body| body_docstring(body, ctx.code))
    {
        return doc;
    }
    STYLE
        .leading_block(ctx.lines, anchor.start_position().row)
        .map(|b| b.lines.join("\n"))
        .unwrap_or_default()
}

/// First statement of a block when it is a bare string literal.
fn body_docstring(body: Node<'_>, code: &str) -> Option<String> {
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let lit = first.named_child(0).filter(|n| n.kind() == "string")?;
    Some(clean_string_literal(text(lit, code)))
}

fn clean_string_literal(raw: &str) -> String {
    let s = raw.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    let s = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|q| s.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)))
        .unwrap_or(s);
    s.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
