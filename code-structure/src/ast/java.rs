//! Java adapter backed by tree-sitter-java.
//!
//! Classes, records and enums map to `Class`, interfaces to `Interface`.
//! Members are methods, constructors, fields and nested types. Overloaded
//! methods collapse onto the first declaration. Annotations and modifiers
//! are part of the anchor, so Javadoc lands above them.

use super::comments::CommentStyle;
use super::grammar::{self, field_text, named_children, span_of, text};
use super::insert;
use super::interface::LanguageAdapter;
use crate::errors::{InsertError, ParseError};
use crate::types::{CodeElement, ElementKind, FileStructure, LanguageKind, Parameter, Span};
use tree_sitter::{Language, Node};

const STYLE: CommentStyle = CommentStyle::DocBlock;

#[derive(Debug, Clone, Copy, Default)]
pub struct JavaAdapter;

#[inline]
fn language() -> Language {
    tree_sitter_java::LANGUAGE.into()
}

impl LanguageAdapter for JavaAdapter {
    fn language(&self) -> LanguageKind {
        LanguageKind::Java
    }

    fn extract_structure(&self, source: &str) -> Result<FileStructure, ParseError> {
        let tree = grammar::parse_strict(LanguageKind::Java, &language(), source)?;
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        let ctx = Ctx {
            code: source,
            lines: &lines,
        };
        let elements = named_children(tree.root_node())
            .into_iter()
            .filter_map(|n| type_declaration(n, &ctx))
            .collect();
        Ok(FileStructure::new(LanguageKind::Java, elements))
    }

    fn insert_documentation(
        &self,
        source: &str,
        documented: &FileStructure,
    ) -> Result<String, InsertError> {
        insert::insert_with(self, source, documented, STYLE)
    }

    fn validate_syntax(&self, source: &str) -> bool {
        grammar::is_valid(LanguageKind::Java, &language(), source)
    }
}

struct Ctx<'a> {
    code: &'a str,
    lines: &'a [&'a str],
}

impl Ctx<'_> {
    fn element(&self, name: &str, kind: ElementKind, anchor: Span) -> CodeElement {
        let doc = STYLE
            .leading_block(self.lines, anchor.start_row)
            .map(|b| b.lines.join("\n"))
            .unwrap_or_default();
        CodeElement::new(name, kind, anchor).with_docstring(doc)
    }
}

fn type_declaration(node: Node<'_>, ctx: &Ctx<'_>) -> Option<CodeElement> {
    let kind = match node.kind() {
        "class_declaration" | "record_declaration" | "enum_declaration" => ElementKind::Class,
        "interface_declaration" => ElementKind::Interface,
        _ => return None,
    };
    let name = field_text(node, "name", ctx.code)?;
    let members = node
        .child_by_field_name("body")
        .map(|body| body_members(body, ctx))
        .unwrap_or_default();

    let mut el = ctx
        .element(name, kind, span_of(node))
        .with_children(members);
    if node.kind() == "record_declaration" {
        // Record components read like constructor parameters.
        el.parameters = formal_parameters(node, ctx.code);
    }
    Some(el)
}

fn body_members(body: Node<'_>, ctx: &Ctx<'_>) -> Vec<CodeElement> {
    let mut out = Vec::new();
    for member in named_children(body) {
        match member.kind() {
            // enum constants are followed by regular members in this wrapper
            "enum_body_declarations" => out.extend(body_members(member, ctx)),
            "method_declaration" | "constructor_declaration" | "compact_constructor_declaration" => {
                if let Some(name) = field_text(member, "name", ctx.code) {
                    out.push(
                        ctx.element(name, ElementKind::Method, span_of(member))
                            .with_parameters(formal_parameters(member, ctx.code)),
                    );
                }
            }
            "field_declaration" | "constant_declaration" => {
                let ty = field_text(member, "type", ctx.code).map(str::to_string);
                let mut cursor = member.walk();
                let declarators: Vec<Node<'_>> = member
                    .children_by_field_name("declarator", &mut cursor)
                    .collect();
                let single = declarators.len() == 1;
                for d in declarators {
                    let Some(name) = field_text(d, "name", ctx.code) else {
                        continue;
                    };
                    let anchor = span_of(if single { member } else { d });
                    out.push(
                        ctx.element(name, ElementKind::Attribute, anchor).with_parameters(
                            ty.clone()
                                .map(|t| vec![Parameter::new("type", Some(t))])
                                .unwrap_or_default(),
                        ),
                    );
                }
            }
            _ => {
                if let Some(nested) = type_declaration(member, ctx) {
                    out.push(nested);
                }
            }
        }
    }
    out
}

fn formal_parameters(node: Node<'_>, code: &str) -> Vec<Parameter> {
    let Some(list) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for p in named_children(list) {
        match p.kind() {
            "formal_parameter" => {
                if let Some(name) = field_text(p, "name", code) {
                    out.push(Parameter::new(name, field_text(p, "type", code).map(str::to_string)));
                }
            }
            "spread_parameter" => {
                let children = named_children(p);
                let ty = children
                    .iter()
                    .find(|c| c.kind() != "variable_declarator" && c.kind() != "modifiers")
                    .map(|c| format!("{}...", text(*c, code)));
                let name = children
                    .iter()
                    .find(|c| c.kind() == "variable_declarator")
                    .and_then(|d| field_text(*d, "name", code));
                if let Some(name) = name {
                    out.push(Parameter::new(name, ty));
                }
            }
            _ => {}
        }
    }
    out
}
