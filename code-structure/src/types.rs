use crate::payload::RelevanceScore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::debug;

//
// ──────────────────────────────────────────────────────────────────────────
//  Core enums
// ──────────────────────────────────────────────────────────────────────────
//

/// Language discriminator for source files.
///
/// Only languages with a registered adapter appear here; anything else is
/// "unsupported" and is represented by `None` at the call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageKind {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Go,
    Html,
    Css,
}

impl LanguageKind {
    /// All languages in a stable order.
    pub const ALL: [LanguageKind; 7] = [
        LanguageKind::Python,
        LanguageKind::JavaScript,
        LanguageKind::TypeScript,
        LanguageKind::Java,
        LanguageKind::Go,
        LanguageKind::Html,
        LanguageKind::Css,
    ];

    /// Map a lowercase file extension (without the dot) to a language.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" | "pyi" => Some(Self::Python),
            "js" | "mjs" | "cjs" | "jsx" => Some(Self::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "java" => Some(Self::Java),
            "go" => Some(Self::Go),
            "html" | "htm" => Some(Self::Html),
            "css" => Some(Self::Css),
            _ => None,
        }
    }

    /// Detect the language from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::from_extension(&ext)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Java => "java",
            Self::Go => "go",
            Self::Html => "html",
            Self::Css => "css",
        }
    }
}

impl fmt::Display for LanguageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a documentable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Function,
    Method,
    Class,
    Attribute,
    Interface,
    Struct,
    StyleRule,
    MarkupTag,
}

impl ElementKind {
    /// `true` for kinds where `is_async` carries meaning.
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function | Self::Method)
    }

    /// `true` for kinds that own child elements.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Class | Self::Interface | Self::Struct)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Attribute => "attribute",
            Self::Interface => "interface",
            Self::Struct => "struct",
            Self::StyleRule => "style_rule",
            Self::MarkupTag => "markup_tag",
        }
    }
}

/// One entry of an element's ordered parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Option<String>) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Byte and row span of an element's declaration anchor.
///
/// `start_row` is the row before which a leading comment block belongs
/// (decorators, annotations and `export` keywords are part of the anchor).
/// Rows are 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_row: usize,
    pub end_row: usize,
}

//
// ──────────────────────────────────────────────────────────────────────────
//  Structure model
// ──────────────────────────────────────────────────────────────────────────
//

/// A documentable element of a source file.
///
/// Containers (`Class`, `Interface`, `Struct`) own their `children`; every
/// child carries the owning container's name in `parent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeElement {
    pub name: String,
    pub kind: ElementKind,
    #[serde(default)]
    pub docstring: String,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CodeElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description_chunks: Vec<String>,
    /// Relevance hint carried over from the generated documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<RelevanceScore>,
    #[serde(skip)]
    pub span: Span,
}

impl CodeElement {
    pub fn new(name: impl Into<String>, kind: ElementKind, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            docstring: String::new(),
            is_async: false,
            parameters: Vec::new(),
            children: Vec::new(),
            parent: None,
            description_chunks: Vec::new(),
            relevance: None,
            span,
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async && self.kind.is_callable();
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = docstring.into();
        self
    }

    pub fn with_children(mut self, children: Vec<CodeElement>) -> Self {
        self.children = children;
        self
    }

    /// `true` when there is documentation text to render for this element.
    pub fn has_documentation(&self) -> bool {
        !self.docstring.trim().is_empty() || self.description_chunks.iter().any(|c| !c.trim().is_empty())
    }
}

/// Root container for one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStructure {
    pub language: LanguageKind,
    pub top_level_elements: Vec<CodeElement>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub changes_made: Vec<String>,
}

impl FileStructure {
    /// Builds a structure and normalizes the tree:
    /// - every child gets its container's name as `parent`;
    /// - a later sibling repeating both name and kind of an earlier one
    ///   (overloads) is dropped, so the first lexical occurrence wins.
    pub fn new(language: LanguageKind, elements: Vec<CodeElement>) -> Self {
        Self {
            language,
            top_level_elements: normalize_siblings(elements, None),
            summary: String::new(),
            changes_made: Vec::new(),
        }
    }

    /// Total number of elements in the tree.
    pub fn element_count(&self) -> usize {
        self.iter().count()
    }

    /// Depth-first, pre-order walk over every element.
    pub fn iter(&self) -> impl Iterator<Item = &CodeElement> {
        let mut stack: Vec<&CodeElement> = self.top_level_elements.iter().rev().collect();
        std::iter::from_fn(move || {
            let el = stack.pop()?;
            stack.extend(el.children.iter().rev());
            Some(el)
        })
    }

    /// Index paths of every element named `name` whose immediate container is
    /// `parent` (`None` = file top level).
    pub fn locate(&self, parent: Option<&str>, name: &str) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect_paths(&self.top_level_elements, None, parent, name, &mut path, &mut out, false);
        out
    }

    /// Index paths of every element named `name` below the top level.
    pub fn locate_nested(&self, name: &str) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect_paths(&self.top_level_elements, None, None, name, &mut path, &mut out, true);
        out
    }

    pub fn element_at(&self, path: &[usize]) -> Option<&CodeElement> {
        let (first, rest) = path.split_first()?;
        let mut el = self.top_level_elements.get(*first)?;
        for idx in rest {
            el = el.children.get(*idx)?;
        }
        Some(el)
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut CodeElement> {
        let (first, rest) = path.split_first()?;
        let mut el = self.top_level_elements.get_mut(*first)?;
        for idx in rest {
            el = el.children.get_mut(*idx)?;
        }
        Some(el)
    }

    /// First element matching `(parent, name, kind)`.
    pub fn find(&self, parent: Option<&str>, name: &str, kind: ElementKind) -> Option<&CodeElement> {
        self.iter()
            .find(|el| el.parent.as_deref() == parent && el.name == name && el.kind == kind)
    }

    /// `true` when no element carries documentation and there is no file-level summary.
    pub fn is_undocumented(&self) -> bool {
        self.summary.trim().is_empty()
            && self.changes_made.iter().all(|c| c.trim().is_empty())
            && !self.iter().any(CodeElement::has_documentation)
    }

    /// JSON view of the structure used when prompting the generation service.
    pub fn structural_summary(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn normalize_siblings(elements: Vec<CodeElement>, parent: Option<&str>) -> Vec<CodeElement> {
    let mut seen: HashSet<(String, ElementKind)> = HashSet::new();
    let mut out = Vec::with_capacity(elements.len());
    for mut el in elements {
        if el.name.is_empty() {
            continue;
        }
        if !seen.insert((el.name.clone(), el.kind)) {
            debug!(
                name = %el.name,
                kind = el.kind.as_str(),
                parent = parent.unwrap_or("<top>"),
                "duplicate sibling dropped; first occurrence is documented"
            );
            continue;
        }
        el.parent = parent.map(str::to_string);
        let children = std::mem::take(&mut el.children);
        el.children = normalize_siblings(children, Some(el.name.as_str()));
        out.push(el);
    }
    out
}

fn collect_paths(
    elements: &[CodeElement],
    current_parent: Option<&str>,
    wanted_parent: Option<&str>,
    name: &str,
    path: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
    nested_only: bool,
) {
    for (i, el) in elements.iter().enumerate() {
        path.push(i);
        let depth_ok = if nested_only {
            current_parent.is_some()
        } else {
            current_parent == wanted_parent
        };
        if depth_ok && el.name == name {
            out.push(path.clone());
        }
        collect_paths(
            &el.children,
            Some(el.name.as_str()),
            wanted_parent,
            name,
            path,
            out,
            nested_only,
        );
        path.pop();
    }
}
