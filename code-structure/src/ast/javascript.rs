//! JavaScript and TypeScript adapter backed by tree-sitter-javascript and
//! tree-sitter-typescript.
//!
//! Extracted:
//! - function declarations (incl. generators) and `const|let|var` bindings to
//!   arrow functions or function expressions;
//! - classes (incl. TypeScript `abstract class`) with methods and fields;
//! - TypeScript interfaces with property and method signatures.
//!
//! `export` keywords and decorators are part of the declaration anchor.
//! Documentation is written as a `/** ... */` block.
//!
//! TypeScript sources are parsed with the TypeScript grammar first and with
//! the TSX grammar when that fails, since the adapter only sees the text.

use super::comments::CommentStyle;
use super::grammar::{self, annotation_text, field_text, has_token, named_children, span_of, text};
use super::insert;
use super::interface::LanguageAdapter;
use crate::errors::{InsertError, ParseError};
use crate::types::{CodeElement, ElementKind, FileStructure, LanguageKind, Parameter, Span};
use tree_sitter::{Language, Node, Tree};

const STYLE: CommentStyle = CommentStyle::DocBlock;

#[derive(Debug, Clone, Copy)]
pub struct JavaScriptAdapter {
    kind: LanguageKind,
}

impl JavaScriptAdapter {
    pub fn javascript() -> Self {
        Self {
            kind: LanguageKind::JavaScript,
        }
    }

    pub fn typescript() -> Self {
        Self {
            kind: LanguageKind::TypeScript,
        }
    }

    fn grammars(&self) -> Vec<Language> {
        match self.kind {
            LanguageKind::TypeScript => vec![
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                tree_sitter_typescript::LANGUAGE_TSX.into(),
            ],
            _ => vec![tree_sitter_javascript::LANGUAGE.into()],
        }
    }

    fn parse(&self, source: &str) -> Result<Tree, ParseError> {
        let mut first_err = None;
        for lang in self.grammars() {
            match grammar::parse_strict(self.kind, &lang, source) {
                Ok(tree) => return Ok(tree),
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }
        Err(first_err.unwrap_or(ParseError::TreeSitterParse(self.kind)))
    }
}

impl LanguageAdapter for JavaScriptAdapter {
    fn language(&self) -> LanguageKind {
        self.kind
    }

    fn extract_structure(&self, source: &str) -> Result<FileStructure, ParseError> {
        let tree = self.parse(source)?;
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        let ctx = Ctx {
            code: source,
            lines: &lines,
        };
        let mut out = Vec::new();
        for node in named_children(tree.root_node()) {
            declaration(node, node, &ctx, &mut out);
        }
        Ok(FileStructure::new(self.kind, out))
    }

    fn insert_documentation(
        &self,
        source: &str,
        documented: &FileStructure,
    ) -> Result<String, InsertError> {
        insert::insert_with(self, source, documented, STYLE)
    }

    fn validate_syntax(&self, source: &str) -> bool {
        self.grammars()
            .iter()
            .any(|lang| grammar::is_valid(self.kind, lang, source))
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

/// Top-level statement; `anchor` differs from `node` for `export` wrappers.
fn declaration(node: Node<'_>, anchor: Node<'_>, ctx: &Ctx<'_>, out: &mut Vec<CodeElement>) {
    match node.kind() {
        "export_statement" => {
            if let Some(decl) = node.child_by_field_name("declaration") {
                declaration(decl, anchor, ctx, out);
            }
        }
        "function_declaration" | "generator_function_declaration" => {
            let Some(name) = field_text(node, "name", ctx.code) else {
                return;
            };
            out.push(
                ctx.element(name, ElementKind::Function, span_of(anchor))
                    .with_parameters(callable_parameters(node, ctx.code))
                    .with_async(has_token(node, "async")),
            );
        }
        "class_declaration" | "abstract_class_declaration" => {
            let Some(name) = field_text(node, "name", ctx.code) else {
                return;
            };
            let members = node
                .child_by_field_name("body")
                .map(|b| class_members(b, ctx))
                .unwrap_or_default();
            out.push(
                ctx.element(name, ElementKind::Class, span_of(anchor))
                    .with_children(members),
            );
        }
        "interface_declaration" => {
            let Some(name) = field_text(node, "name", ctx.code) else {
                return;
            };
            let members = node
                .child_by_field_name("body")
                .map(|b| interface_members(b, ctx))
                .unwrap_or_default();
            out.push(
                ctx.element(name, ElementKind::Interface, span_of(anchor))
                    .with_children(members),
            );
        }
        "lexical_declaration" | "variable_declaration" => {
            let declarators: Vec<Node<'_>> = named_children(node)
                .into_iter()
                .filter(|n| n.kind() == "variable_declarator")
                .collect();
            let single = declarators.len() == 1;
            for d in declarators {
                let Some(value) = d.child_by_field_name("value") else {
                    continue;
                };
                if !matches!(
                    value.kind(),
                    "arrow_function" | "function_expression" | "function" | "generator_function"
                ) {
                    continue;
                }
                let Some(name) = d.child_by_field_name("name").filter(|n| n.kind() == "identifier") else {
                    continue;
                };
                let at = if single { anchor } else { d };
                out.push(
                    ctx.element(text(name, ctx.code), ElementKind::Function, span_of(at))
                        .with_parameters(callable_parameters(value, ctx.code))
                        .with_async(has_token(value, "async")),
                );
            }
        }
        _ => {}
    }
}

fn class_members(body: Node<'_>, ctx: &Ctx<'_>) -> Vec<CodeElement> {
    let mut out = Vec::new();
    // Decorators may be siblings preceding the member they decorate.
    let mut pending_decorator: Option<Node<'_>> = None;
    for member in named_children(body) {
        if member.kind() == "decorator" {
            pending_decorator.get_or_insert(member);
            continue;
        }
        let anchor = pending_decorator.take().unwrap_or(member);
        match member.kind() {
            "method_definition" | "method_signature" | "abstract_method_signature" => {
                let Some(name) = field_text(member, "name", ctx.code) else {
                    continue;
                };
                out.push(
                    ctx.element(name, ElementKind::Method, span_of(anchor))
                        .with_parameters(callable_parameters(member, ctx.code))
                        .with_async(has_token(member, "async")),
                );
            }
            "field_definition" | "public_field_definition" => {
                let name = field_text(member, "property", ctx.code)
                    .or_else(|| field_text(member, "name", ctx.code));
                let Some(name) = name else {
                    continue;
                };
                let ty = field_text(member, "type", ctx.code).map(annotation_text);
                out.push(
                    ctx.element(name, ElementKind::Attribute, span_of(anchor))
                        .with_parameters(ty.map(|t| vec![Parameter::new("type", Some(t))]).unwrap_or_default()),
                );
            }
            _ => {}
        }
    }
    out
}

fn interface_members(body: Node<'_>, ctx: &Ctx<'_>) -> Vec<CodeElement> {
    let mut out = Vec::new();
    for member in named_children(body) {
        let Some(name) = field_text(member, "name", ctx.code) else {
            continue;
        };
        match member.kind() {
            "method_signature" => out.push(
                ctx.element(name, ElementKind::Method, span_of(member))
                    .with_parameters(callable_parameters(member, ctx.code)),
            ),
            "property_signature" => {
                let ty = field_text(member, "type", ctx.code).map(annotation_text);
                out.push(
                    ctx.element(name, ElementKind::Attribute, span_of(member))
                        .with_parameters(ty.map(|t| vec![Parameter::new("type", Some(t))]).unwrap_or_default()),
                );
            }
            _ => {}
        }
    }
    out
}

/// Parameters of a function-like node (`parameters`, or a bare arrow `parameter`).
fn callable_parameters(node: Node<'_>, code: &str) -> Vec<Parameter> {
    if let Some(list) = node.child_by_field_name("parameters") {
        return formal_parameters(list, code);
    }
    node.child_by_field_name("parameter")
        .map(|p| vec![Parameter::new(text(p, code), None)])
        .unwrap_or_default()
}

fn formal_parameters(list: Node<'_>, code: &str) -> Vec<Parameter> {
    let mut out = Vec::new();
    for p in named_children(list) {
        let param = match p.kind() {
            "identifier" | "rest_pattern" | "object_pattern" | "array_pattern" => {
                Parameter::new(text(p, code), None)
            }
            "assignment_pattern" => {
                Parameter::new(field_text(p, "left", code).unwrap_or_default(), None)
            }
            "required_parameter" | "optional_parameter" => {
                let name = field_text(p, "pattern", code).unwrap_or_default();
                let ty = field_text(p, "type", code).map(annotation_text);
                Parameter::new(name, ty)
            }
            _ => continue,
        };
        if !param.name.is_empty() {
            out.push(param);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const JS: &str = r#"import x from "y";

export function add(a, b = 1, ...rest) {
  return a + b;
}

const fetchAll = async (urls) => Promise.all(urls);
let one = x => x;

/**
 * Counts things.
 */
class Counter {
  count = 0;

  async bump(step) {
    this.count += step;
  }
}
"#;

    #[test]
    fn extracts_javascript_declarations() {
        let fs = JavaScriptAdapter::javascript().extract_structure(JS).unwrap();
        let names: Vec<&str> = fs.top_level_elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["add", "fetchAll", "one", "Counter"]);

        let add = &fs.top_level_elements[0];
        assert_eq!(
            add.parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "...rest"]
        );
        assert_eq!(add.span.start_row, 2);
        assert!(fs.top_level_elements[1].is_async);
        assert_eq!(fs.top_level_elements[2].parameters[0].name, "x");

        let counter = &fs.top_level_elements[3];
        assert_eq!(counter.docstring, "Counts things.");
        assert_eq!(counter.children[0].kind, ElementKind::Attribute);
        assert_eq!(counter.children[1].name, "bump");
        assert!(counter.children[1].is_async);
    }

    #[test]
    fn inserts_doc_blocks_above_exports_and_methods() {
        let adapter = JavaScriptAdapter::javascript();
        let mut fs = adapter.extract_structure(JS).unwrap();
        fs.top_level_elements[0].docstring = "Adds two numbers.".into();
        fs.top_level_elements[3].children[1].docstring = "Bumps the counter.".into();

        let out = adapter.insert_documentation(JS, &fs).unwrap();
        assert!(out.contains("/**\n * Adds two numbers.\n */\nexport function add(a, b = 1, ...rest) {\n"));
        assert!(out.contains("  /**\n   * Bumps the counter.\n   */\n  async bump(step) {\n"));
        // the existing class block is untouched
        assert!(out.contains("/**\n * Counts things.\n */\nclass Counter {"));
        assert!(adapter.validate_syntax(&out));
    }

    #[test]
    fn extracts_typescript_interfaces_and_types() {
        let src = r#"export interface Repo {
  name: string;
  find(id: number, opts?: Options): Item;
}

export abstract class Base {
  protected readonly id: number = 0;
  abstract run(): void;
}

function sum(a: number, b: number): number {
  return a + b;
}
"#;
        let adapter = JavaScriptAdapter::typescript();
        let fs = adapter.extract_structure(src).unwrap();
        let repo = &fs.top_level_elements[0];
        assert_eq!(repo.kind, ElementKind::Interface);
        assert_eq!(repo.children[0].name, "name");
        assert_eq!(repo.children[0].parameters[0].ty.as_deref(), Some("string"));
        assert_eq!(repo.children[1].kind, ElementKind::Method);
        assert_eq!(repo.children[1].parameters[0].ty.as_deref(), Some("number"));
        assert_eq!(repo.children[1].parameters[1].name, "opts");

        let base = &fs.top_level_elements[1];
        assert_eq!(base.kind, ElementKind::Class);
        assert_eq!(base.children.len(), 2);

        let sum = &fs.top_level_elements[2];
        assert_eq!(sum.parameters[1].ty.as_deref(), Some("number"));
    }

    #[test]
    fn typescript_falls_back_to_tsx() {
        let src = "export const App = () => <div className=\"app\" />;\n";
        let fs = JavaScriptAdapter::typescript().extract_structure(src).unwrap();
        assert_eq!(fs.top_level_elements[0].name, "App");
    }

    #[test]
    fn broken_source_is_rejected() {
        let adapter = JavaScriptAdapter::javascript();
        assert!(adapter.extract_structure("function (a, {\n").is_err());
        assert!(!adapter.validate_syntax("class {"));
    }
}
