//! Language-aware structure extraction and comment insertion.
//!
//! The crate turns source text into a [`FileStructure`] (functions, classes,
//! members, style rules, markup tags), merges a documentation payload into
//! it, and writes the result back as comments without touching any other
//! byte of the file.
//!
//! ```no_run
//! use code_structure::{AdapterRegistry, LanguageAdapter};
//! use std::path::Path;
//!
//! let registry = AdapterRegistry::with_defaults();
//! let adapter = registry.resolve(Path::new("calc.py")).expect("python is supported");
//! let structure = adapter.extract_structure("def add(a, b):\n    return a + b\n")?;
//! assert_eq!(structure.top_level_elements[0].name, "add");
//! # Ok::<(), code_structure::ParseError>(())
//! ```

pub mod ast;
pub mod errors;
pub mod merge;
pub mod payload;
pub mod types;

pub use ast::interface::LanguageAdapter;
pub use ast::router::AdapterRegistry;
pub use errors::{InsertError, ParseError};
pub use merge::{DropReason, DroppedDocumentation, MergeOutcome, merge_documentation};
pub use payload::{ElementDocumentation, GeneratedDocumentation, RelevanceScore};
pub use types::{CodeElement, ElementKind, FileStructure, LanguageKind, Parameter, Span};
