//! Prompt and response schema for documentation generation.

use super::transport::GenerationRequest;
use crate::config::model::PromptConfig;
use code_structure::FileStructure;
use serde_json::json;

/// Name of the function the answer is delivered through.
pub const FUNCTION_NAME: &str = "submit_documentation";
pub const FUNCTION_DESCRIPTION: &str =
    "Submit documentation for the code elements of one source file.";

const SYSTEM_PROMPT: &str = "You are a senior engineer writing concise, accurate \
source code documentation. Document only elements that exist in the given structure \
and answer strictly in the requested JSON shape.";

/// JSON schema of the expected answer, shared by every provider.
pub fn documentation_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "elements": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "parentName": { "type": ["string", "null"] },
                        "description": { "type": "string" },
                        "contextRelevanceScore": {
                            "type": "string",
                            "enum": ["High", "Medium", "Low"]
                        }
                    },
                    "required": ["name", "description"]
                }
            },
            "summary": { "type": "string" },
            "changesMade": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["elements"]
    })
}

/// Build the request for `structure` extracted from `file_name`.
pub fn build_request(
    file_name: &str,
    structure: &FileStructure,
    cfg: &PromptConfig,
) -> GenerationRequest {
    let structural_summary = structure.structural_summary();
    let pretty = serde_json::to_string_pretty(&structural_summary).unwrap_or_default();

    let mut prompt = String::new();
    if !cfg.project_info.trim().is_empty() {
        prompt.push_str("Project information:\n");
        prompt.push_str(cfg.project_info.trim());
        prompt.push_str("\n\n");
    }
    if !cfg.style_guidelines.trim().is_empty() {
        prompt.push_str("Style guidelines:\n");
        prompt.push_str(cfg.style_guidelines.trim());
        prompt.push_str("\n\n");
    }
    prompt.push_str(&format!(
        "File: {file_name}\nLanguage: {}\n\nStructure:\n{pretty}\n\n",
        structure.language
    ));
    prompt.push_str(
        "Return one entry per element worth documenting. Use `name` exactly as given and \
         `parentName` for members of a class or interface. `description` is plain prose \
         without comment markers. Add a one-paragraph `summary` of the file and list what \
         you documented in `changesMade`.",
    );

    GenerationRequest {
        file_name: file_name.to_string(),
        language: structure.language,
        structural_summary,
        prompt,
        system: SYSTEM_PROMPT.to_string(),
    }
}
