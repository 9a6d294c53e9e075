use crate::types::LanguageKind;
use thiserror::Error;

/// Extraction could not build a structure for the given text.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("tree-sitter language error for {0}")]
    TreeSitterLanguage(LanguageKind),

    #[error("tree-sitter produced no tree for {0}")]
    TreeSitterParse(LanguageKind),

    #[error("{language} syntax error at line {line}, column {column}")]
    Syntax {
        language: LanguageKind,
        /// 1-based line of the first error node.
        line: usize,
        /// 1-based column of the first error node.
        column: usize,
    },

    #[error("malformed {language} input at line {line}: {detail}")]
    Malformed {
        language: LanguageKind,
        line: usize,
        detail: &'static str,
    },
}

/// Documentation could not be written into the text.
#[derive(Debug, Error)]
pub enum InsertError {
    #[error("re-parse before insertion failed: {0}")]
    Parse(#[from] ParseError),

    #[error("anchor row {row} is outside of {lines} lines")]
    RowOutOfBounds { row: usize, lines: usize },
}
