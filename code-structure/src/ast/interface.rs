use crate::errors::{InsertError, ParseError};
use crate::types::{FileStructure, LanguageKind};

/// Extract/insert contract implemented once per supported language.
///
/// Implementations are stateless and shared across workers behind an `Arc`.
pub trait LanguageAdapter: Send + Sync {
    /// Language handled by this adapter.
    fn language(&self) -> LanguageKind;

    /// Build the structure of `source`. Unparseable input is a [`ParseError`],
    /// never a partially filled structure.
    fn extract_structure(&self, source: &str) -> Result<FileStructure, ParseError>;

    /// Write the documentation carried by `documented` into `source`.
    ///
    /// A structure without any documentation returns `source` unchanged.
    fn insert_documentation(
        &self,
        source: &str,
        documented: &FileStructure,
    ) -> Result<String, InsertError>;

    /// Cheap syntax check. Adapters that cannot validate answer `true`.
    fn validate_syntax(&self, _source: &str) -> bool {
        true
    }
}
