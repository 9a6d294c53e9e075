//! Merge a [`GeneratedDocumentation`] payload into a freshly extracted [`FileStructure`].
//!
//! Entries resolve by `(parentName?, name)`. An entry that matches nothing,
//! or that matches siblings of different kinds, is dropped and logged; the
//! structure it would have touched keeps its original docstring.

use crate::payload::GeneratedDocumentation;
use crate::types::{ElementKind, FileStructure};
use serde::Serialize;
use tracing::{debug, warn};

/// Why a payload entry was not merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// No element with this `(parent, name)` exists.
    Unmatched,
    /// The name resolves to elements of different kinds.
    Ambiguous,
    /// The service returned an empty description.
    EmptyDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedDocumentation {
    pub name: String,
    pub parent_name: Option<String>,
    pub reason: DropReason,
}

/// Annotated structure plus merge diagnostics.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub structure: FileStructure,
    pub matched: usize,
    pub dropped: Vec<DroppedDocumentation>,
}

/// Produce a new structure carrying the payload's documentation.
pub fn merge_documentation(
    structure: &FileStructure,
    docs: &GeneratedDocumentation,
) -> MergeOutcome {
    let mut merged = structure.clone();
    let mut matched = 0usize;
    let mut dropped = Vec::new();

    for entry in &docs.elements {
        let parent = entry.parent_name.as_deref().filter(|p| !p.trim().is_empty());
        let dropped_as = |reason| DroppedDocumentation {
            name: entry.name.clone(),
            parent_name: parent.map(str::to_string),
            reason,
        };

        if entry.description.trim().is_empty() {
            debug!(name = %entry.name, "empty description, keeping original docstring");
            dropped.push(dropped_as(DropReason::EmptyDescription));
            continue;
        }

        let mut candidates = merged.locate(parent, &entry.name);
        if candidates.is_empty() && parent.is_none() {
            candidates = merged.locate_nested(&entry.name);
        }

        let path = match resolve(&merged, &candidates) {
            Resolution::Unique(path) => path,
            Resolution::None => {
                warn!(
                    name = %entry.name,
                    parent = parent.unwrap_or("<top>"),
                    "documentation for unknown element dropped"
                );
                dropped.push(dropped_as(DropReason::Unmatched));
                continue;
            }
            Resolution::Ambiguous(kinds) => {
                warn!(
                    name = %entry.name,
                    parent = parent.unwrap_or("<top>"),
                    kinds = ?kinds,
                    "documentation matches elements of different kinds, skipped"
                );
                dropped.push(dropped_as(DropReason::Ambiguous));
                continue;
            }
        };

        if let Some(el) = merged.element_at_mut(&path) {
            el.docstring = entry.description.trim().to_string();
            el.description_chunks = entry.description_chunks.clone();
            el.relevance = entry.context_relevance_score.clone();
            matched += 1;
        }
    }

    if let Some(summary) = docs.summary.as_deref() {
        merged.summary = summary.trim().to_string();
    }
    merged.changes_made = docs
        .changes_made
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    MergeOutcome {
        structure: merged,
        matched,
        dropped,
    }
}

enum Resolution {
    None,
    Unique(Vec<usize>),
    Ambiguous(Vec<ElementKind>),
}

fn resolve(structure: &FileStructure, candidates: &[Vec<usize>]) -> Resolution {
    let Some(first) = candidates.first() else {
        return Resolution::None;
    };
    let mut kinds: Vec<ElementKind> = candidates
        .iter()
        .filter_map(|p| structure.element_at(p).map(|e| e.kind))
        .collect();
    kinds.dedup();

    // Nested fallback may find the name under different containers.
    let parents: Vec<Option<&str>> = candidates
        .iter()
        .filter_map(|p| structure.element_at(p).map(|e| e.parent.as_deref()))
        .collect();
    let same_parent = parents.windows(2).all(|w| w[0] == w[1]);

    if kinds.len() > 1 || !same_parent {
        Resolution::Ambiguous(kinds)
    } else {
        Resolution::Unique(first.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CodeElement, LanguageKind, Span};

    fn el(name: &str, kind: ElementKind) -> CodeElement {
        CodeElement::new(name, kind, Span::default())
    }

    fn structure() -> FileStructure {
        FileStructure::new(
            LanguageKind::Python,
            vec![
                el("add", ElementKind::Function).with_docstring("old"),
                el("Shape", ElementKind::Class).with_children(vec![
                    el("area", ElementKind::Method),
                    el("sides", ElementKind::Attribute),
                ]),
                el("Point", ElementKind::Class),
                el("Point", ElementKind::Function),
            ],
        )
    }

    fn payload(json: &str) -> GeneratedDocumentation {
        GeneratedDocumentation::from_payload(json).unwrap()
    }

    #[test]
    fn matches_top_level_and_nested() {
        let out = merge_documentation(
            &structure(),
            &payload(
                r#"{"elements":[
                    {"name":"add","description":"Adds two numbers."},
                    {"name":"area","parentName":"Shape","description":"Computes area."},
                    {"name":"sides","description":"Number of sides."}
                ],"summary":"Geometry helpers.","changesMade":["docs"]}"#,
            ),
        );
        assert_eq!(out.matched, 3);
        assert!(out.dropped.is_empty());
        let s = &out.structure;
        assert_eq!(s.top_level_elements[0].docstring, "Adds two numbers.");
        assert_eq!(s.top_level_elements[1].children[0].docstring, "Computes area.");
        assert_eq!(s.top_level_elements[1].children[1].docstring, "Number of sides.");
        assert_eq!(s.summary, "Geometry helpers.");
        assert_eq!(s.changes_made, vec!["docs".to_string()]);
    }

    #[test]
    fn relevance_is_carried_onto_the_element() {
        let out = merge_documentation(
            &structure(),
            &payload(r#"{"elements":[{"name":"add","description":"Adds.","contextRelevanceScore":"High"}]}"#),
        );
        let add = &out.structure.top_level_elements[0];
        assert!(add.relevance.as_ref().is_some_and(|r| r.is_high()));
        assert!(out.structure.top_level_elements[2].relevance.is_none());
    }

    #[test]
    fn unmatched_entries_are_dropped() {
        let original = structure();
        let out = merge_documentation(
            &original,
            &payload(r#"{"elements":[{"name":"ghost","description":"Boo."}]}"#),
        );
        assert_eq!(out.matched, 0);
        assert_eq!(out.dropped[0].reason, DropReason::Unmatched);
        assert_eq!(out.structure.top_level_elements, original.top_level_elements);
    }

    #[test]
    fn kind_collision_is_a_logged_skip() {
        let out = merge_documentation(
            &structure(),
            &payload(r#"{"elements":[{"name":"Point","description":"A point."}]}"#),
        );
        assert_eq!(out.matched, 0);
        assert_eq!(out.dropped[0].reason, DropReason::Ambiguous);
        assert!(out.structure.iter().filter(|e| e.name == "Point").all(|e| e.docstring.is_empty()));
    }

    #[test]
    fn empty_description_keeps_original() {
        let out = merge_documentation(
            &structure(),
            &payload(r#"{"elements":[{"name":"add","description":"  "}]}"#),
        );
        assert_eq!(out.structure.top_level_elements[0].docstring, "old");
        assert_eq!(out.dropped[0].reason, DropReason::EmptyDescription);
    }

    #[test]
    fn wrong_parent_does_not_match() {
        let out = merge_documentation(
            &structure(),
            &payload(r#"{"elements":[{"name":"area","parentName":"Point","description":"x"}]}"#),
        );
        assert_eq!(out.dropped[0].reason, DropReason::Unmatched);
    }
}
