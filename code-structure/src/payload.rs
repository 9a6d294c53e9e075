//! Documentation payload returned by the generation service.
//!
//! The shape mirrors [`FileStructure`](crate::types::FileStructure) by name:
//! `{ elements: [{ name, parentName?, description, contextRelevanceScore? }], summary?, changesMade? }`.
//! `descriptionChunks` is filled locally by the chunking policy and is never
//! read from the wire.

use serde::{Deserialize, Serialize};

/// Relevance hint attached by the service to an element description.
///
/// Services answer either with a label (`"High"`, `"Medium"`, `"Low"`) or
/// with a number in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelevanceScore {
    Numeric(f64),
    Label(String),
}

impl RelevanceScore {
    pub fn is_high(&self) -> bool {
        match self {
            Self::Numeric(v) => *v >= 0.75,
            Self::Label(s) => s.trim().eq_ignore_ascii_case("high"),
        }
    }
}

/// Documentation for a single element, matched by `(parent_name, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDocumentation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_relevance_score: Option<RelevanceScore>,
    #[serde(skip_deserializing, default, skip_serializing_if = "Vec::is_empty")]
    pub description_chunks: Vec<String>,
}

/// Whole-file payload. A payload with zero elements is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocumentation {
    #[serde(default)]
    pub elements: Vec<ElementDocumentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub changes_made: Vec<String>,
}

impl GeneratedDocumentation {
    /// Decode the raw body returned by the service.
    pub fn from_payload(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body.trim())
    }

    /// Returns a copy where every element's `description_chunks` is produced by `chunker`.
    pub fn try_with_chunks<E, F>(&self, mut chunker: F) -> Result<Self, E>
    where
        F: FnMut(&str) -> Result<Vec<String>, E>,
    {
        let mut out = self.clone();
        for el in &mut out.elements {
            el.description_chunks = if el.description.trim().is_empty() {
                Vec::new()
            } else {
                chunker(&el.description)?
            };
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_and_full_payloads() {
        let minimal = GeneratedDocumentation::from_payload(
            r#"{"elements":[{"name":"add","description":"Adds two numbers."}]}"#,
        )
        .unwrap();
        assert_eq!(minimal.elements.len(), 1);
        assert!(minimal.elements[0].parent_name.is_none());
        assert!(minimal.summary.is_none());

        let full = GeneratedDocumentation::from_payload(
            r#"{
                "elements": [
                    {"name": "run", "parentName": "Job", "description": "Runs.", "contextRelevanceScore": "High"},
                    {"name": "x", "description": "", "contextRelevanceScore": 0.2}
                ],
                "summary": "Jobs.",
                "changesMade": ["Documented run"]
            }"#,
        )
        .unwrap();
        assert_eq!(full.elements[0].parent_name.as_deref(), Some("Job"));
        assert!(full.elements[0].context_relevance_score.as_ref().unwrap().is_high());
        assert!(!full.elements[1].context_relevance_score.as_ref().unwrap().is_high());
        assert_eq!(full.changes_made, vec!["Documented run".to_string()]);
    }

    #[test]
    fn empty_payload_is_valid() {
        let doc = GeneratedDocumentation::from_payload("{}").unwrap();
        assert!(doc.elements.is_empty());
    }

    #[test]
    fn chunks_are_not_read_from_the_wire() {
        let doc = GeneratedDocumentation::from_payload(
            r#"{"elements":[{"name":"a","description":"d","descriptionChunks":["x"]}]}"#,
        )
        .unwrap();
        assert!(doc.elements[0].description_chunks.is_empty());
    }

    #[test]
    fn chunking_leaves_original_untouched() {
        let doc = GeneratedDocumentation::from_payload(
            r#"{"elements":[{"name":"a","description":"One. Two."},{"name":"b","description":""}]}"#,
        )
        .unwrap();
        let chunked = doc
            .try_with_chunks(|t| Ok::<_, ()>(t.split(". ").map(str::to_string).collect()))
            .unwrap();
        assert_eq!(chunked.elements[0].description_chunks.len(), 2);
        assert!(chunked.elements[1].description_chunks.is_empty());
        assert!(doc.elements[0].description_chunks.is_empty());
    }
}
