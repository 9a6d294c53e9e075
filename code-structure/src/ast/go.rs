//! Go adapter backed by tree-sitter-go.
//!
//! Functions stay at the top level. Methods are attached to the struct named
//! by their receiver when that struct is declared in the same file; other
//! methods stay top-level under the name `Receiver.Method`. Structs expose
//! their named fields, interfaces their method elements. Comments use `//`.

use super::comments::CommentStyle;
use super::grammar::{self, field_text, named_children, span_of, text};
use super::insert;
use super::interface::LanguageAdapter;
use crate::errors::{InsertError, ParseError};
use crate::types::{CodeElement, ElementKind, FileStructure, LanguageKind, Parameter, Span};
use tree_sitter::{Language, Node};

const STYLE: CommentStyle = CommentStyle::DoubleSlash;

#[derive(Debug, Clone, Copy, Default)]
pub struct GoAdapter;

#[inline]
fn language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

impl LanguageAdapter for GoAdapter {
    fn language(&self) -> LanguageKind {
        LanguageKind::Go
    }

    fn extract_structure(&self, source: &str) -> Result<FileStructure, ParseError> {
        let tree = grammar::parse_strict(LanguageKind::Go, &language(), source)?;
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        let ctx = Ctx {
            code: source,
            lines: &lines,
        };

        let mut top = Vec::new();
        let mut methods: Vec<(String, CodeElement)> = Vec::new();
        for node in named_children(tree.root_node()) {
            match node.kind() {
                "function_declaration" => {
                    if let Some(name) = field_text(node, "name", source) {
                        top.push(
                            ctx.element(name, ElementKind::Function, span_of(node))
                                .with_parameters(parameter_list(node, source)),
                        );
                    }
                }
                "method_declaration" => {
                    let name = field_text(node, "name", source);
                    let receiver = receiver_type(node, source);
                    if let (Some(name), Some(receiver)) = (name, receiver) {
                        let el = ctx
                            .element(name, ElementKind::Method, span_of(node))
                            .with_parameters(parameter_list(node, source));
                        methods.push((receiver, el));
                    }
                }
                "type_declaration" => type_declaration(node, &ctx, &mut top),
                _ => {}
            }
        }

        for (receiver, mut method) in methods {
            match top
                .iter_mut()
                .find(|e| e.kind == ElementKind::Struct && e.name == receiver)
            {
                Some(owner) => owner.children.push(method),
                None => {
                    method.name = format!("{receiver}.{}", method.name);
                    top.push(method);
                }
            }
        }

        Ok(FileStructure::new(LanguageKind::Go, top))
    }

    fn insert_documentation(
        &self,
        source: &str,
        documented: &FileStructure,
    ) -> Result<String, InsertError> {
        insert::insert_with(self, source, documented, STYLE)
    }

    fn validate_syntax(&self, source: &str) -> bool {
        grammar::is_valid(LanguageKind::Go, &language(), source)
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

fn type_declaration(decl: Node<'_>, ctx: &Ctx<'_>, out: &mut Vec<CodeElement>) {
    let specs: Vec<Node<'_>> = named_children(decl)
        .into_iter()
        .filter(|n| n.kind() == "type_spec")
        .collect();
    let single = specs.len() == 1;
    for spec in specs {
        let Some(name) = field_text(spec, "name", ctx.code) else {
            continue;
        };
        let Some(ty) = spec.child_by_field_name("type") else {
            continue;
        };
        let anchor = span_of(if single { decl } else { spec });
        match ty.kind() {
            "struct_type" => {
                let fields = struct_fields(ty, ctx);
                out.push(
                    ctx.element(name, ElementKind::Struct, anchor)
                        .with_children(fields),
                );
            }
            "interface_type" => {
                let methods = interface_methods(ty, ctx);
                out.push(
                    ctx.element(name, ElementKind::Interface, anchor)
                        .with_children(methods),
                );
            }
            _ => {}
        }
    }
}

fn struct_fields(struct_type: Node<'_>, ctx: &Ctx<'_>) -> Vec<CodeElement> {
    let mut out = Vec::new();
    for list in named_children(struct_type) {
        if list.kind() != "field_declaration_list" {
            continue;
        }
        for field in named_children(list) {
            if field.kind() != "field_declaration" {
                continue;
            }
            let ty = field_text(field, "type", ctx.code).map(str::to_string);
            let mut cursor = field.walk();
            let names: Vec<Node<'_>> = field.children_by_field_name("name", &mut cursor).collect();
            let single = names.len() == 1;
            for name in names {
                // Fields sharing a line share the declaration anchor.
                let anchor = span_of(if single { field } else { name });
                out.push(
                    ctx.element(text(name, ctx.code), ElementKind::Attribute, anchor)
                        .with_parameters(ty.clone().map(|t| vec![Parameter::new("type", Some(t))]).unwrap_or_default()),
                );
            }
        }
    }
    out
}

fn interface_methods(iface: Node<'_>, ctx: &Ctx<'_>) -> Vec<CodeElement> {
    named_children(iface)
        .into_iter()
        .filter(|n| matches!(n.kind(), "method_elem" | "method_spec"))
        .filter_map(|m| {
            let name = field_text(m, "name", ctx.code)?;
            Some(
                ctx.element(name, ElementKind::Method, span_of(m))
                    .with_parameters(parameter_list(m, ctx.code)),
            )
        })
        .collect()
}

fn parameter_list(node: Node<'_>, code: &str) -> Vec<Parameter> {
    let Some(list) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for decl in named_children(list) {
        let variadic = decl.kind() == "variadic_parameter_declaration";
        if !variadic && decl.kind() != "parameter_declaration" {
            continue;
        }
        let ty = field_text(decl, "type", code).map(|t| {
            if variadic {
                format!("...{t}")
            } else {
                t.to_string()
            }
        });
        let mut cursor = decl.walk();
        let names: Vec<Node<'_>> = decl.children_by_field_name("name", &mut cursor).collect();
        if names.is_empty() {
            // Unnamed parameter: only the type is known.
            if let Some(t) = ty {
                out.push(Parameter::new("_", Some(t)));
            }
            continue;
        }
        for n in names {
            out.push(Parameter::new(text(n, code), ty.clone()));
        }
    }
    out
}

/// Base type name of a method receiver (`*Circle` and `List[T]` give the bare name).
fn receiver_type(method: Node<'_>, code: &str) -> Option<String> {
    let list = method.child_by_field_name("receiver")?;
    let decl = named_children(list)
        .into_iter()
        .find(|n| n.kind() == "parameter_declaration")?;
    let raw = field_text(decl, "type", code)?;
    let base = raw.trim().trim_start_matches('*').trim();
    let base = base.split('[').next().unwrap_or(base).trim();
    (!base.is_empty()).then(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "package shapes

import \"math\"

// Shape is anything with an area.
type Shape interface {
\tArea() float64
\tScale(f float64)
}

type Circle struct {
\tX, Y float64
\tR    float64 `json:\"r\"`
}

func (c *Circle) Area() float64 {
\treturn math.Pi * c.R * c.R
}

type Celsius float64

func (t Celsius) String() string { return \"\" }

func New(r float64, opts ...Option) *Circle {
\treturn &Circle{R: r}
}
";

    #[test]
    fn extracts_types_methods_and_functions() {
        let fs = GoAdapter.extract_structure(SRC).unwrap();
        let names: Vec<&str> = fs.top_level_elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Shape", "Circle", "New", "Celsius.String"]);

        let shape = &fs.top_level_elements[0];
        assert_eq!(shape.kind, ElementKind::Interface);
        assert_eq!(shape.docstring, "Shape is anything with an area.");
        assert_eq!(shape.children.len(), 2);
        assert_eq!(shape.children[1].parameters[0].name, "f");

        let circle = &fs.top_level_elements[1];
        let members: Vec<(&str, ElementKind)> =
            circle.children.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            members,
            vec![
                ("X", ElementKind::Attribute),
                ("Y", ElementKind::Attribute),
                ("R", ElementKind::Attribute),
                ("Area", ElementKind::Method),
            ]
        );
        assert_eq!(circle.children[3].parent.as_deref(), Some("Circle"));

        let new = &fs.top_level_elements[2];
        assert_eq!(new.parameters[1].name, "opts");
        assert_eq!(new.parameters[1].ty.as_deref(), Some("...Option"));
    }

    #[test]
    fn inserts_line_comments_before_func() {
        let mut fs = GoAdapter.extract_structure(SRC).unwrap();
        fs.top_level_elements[1].children[3].docstring = "Area returns the circle's area.".into();
        fs.top_level_elements[2].docstring = "New builds a circle.".into();

        let out = GoAdapter.insert_documentation(SRC, &fs).unwrap();
        assert!(out.contains("// Area returns the circle's area.\nfunc (c *Circle) Area() float64 {\n"));
        assert!(out.contains("// New builds a circle.\nfunc New(r float64, opts ...Option) *Circle {\n"));
        assert!(out.contains("// Shape is anything with an area.\ntype Shape interface {"));
        assert!(GoAdapter.validate_syntax(&out));
    }

    #[test]
    fn same_line_fields_share_one_block() {
        let mut fs = GoAdapter.extract_structure(SRC).unwrap();
        fs.top_level_elements[1].docstring = "Circle is a disc.".into();
        fs.top_level_elements[1].children[0].docstring = "X coordinate.".into();
        fs.top_level_elements[1].children[1].docstring = "Y coordinate.".into();
        fs.top_level_elements[2].docstring = "New builds a circle.".into();

        let out = GoAdapter.insert_documentation(SRC, &fs).unwrap();
        assert!(out.contains("// Circle is a disc.\ntype Circle struct {\n"));
        assert!(out.contains("\t// X: X coordinate.\n\t// Y: Y coordinate.\n\tX, Y float64\n"));
        assert!(out.contains("// New builds a circle.\nfunc New("));
        assert!(GoAdapter.validate_syntax(&out));

        let again = GoAdapter.extract_structure(&out).unwrap();
        let x = &again.top_level_elements[1].children[0];
        assert_eq!(x.docstring, "X: X coordinate.\nY: Y coordinate.");
        assert_eq!(GoAdapter.insert_documentation(&out, &again).unwrap(), out);
        assert_eq!(GoAdapter.insert_documentation(&out, &fs).unwrap(), out);
    }
}
