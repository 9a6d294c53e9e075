//! AdapterRegistry maps a language (or a file path) to its adapter and never panics.

use super::{
    go::GoAdapter, interface::LanguageAdapter, java::JavaAdapter, javascript::JavaScriptAdapter,
    markup::HtmlAdapter, python::PythonAdapter, stylesheet::CssAdapter,
};
use crate::types::LanguageKind;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<LanguageKind, Arc<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    /// Empty registry; every file resolves as unsupported.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in adapter.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register(Arc::new(PythonAdapter));
        reg.register(Arc::new(JavaScriptAdapter::javascript()));
        reg.register(Arc::new(JavaScriptAdapter::typescript()));
        reg.register(Arc::new(JavaAdapter));
        reg.register(Arc::new(GoAdapter));
        reg.register(Arc::new(HtmlAdapter::default()));
        reg.register(Arc::new(CssAdapter));
        reg
    }

    /// Register (or replace) the adapter for its language.
    pub fn register(&mut self, adapter: Arc<dyn LanguageAdapter>) {
        self.adapters.insert(adapter.language(), adapter);
    }

    pub fn resolve_language(&self, language: LanguageKind) -> Option<Arc<dyn LanguageAdapter>> {
        self.adapters.get(&language).cloned()
    }

    /// Adapter for a path's extension; `None` means "unsupported".
    pub fn resolve(&self, path: &Path) -> Option<Arc<dyn LanguageAdapter>> {
        LanguageKind::from_path(path).and_then(|lang| self.resolve_language(lang))
    }

    /// Registered languages in a stable order.
    pub fn languages(&self) -> Vec<LanguageKind> {
        let mut out: Vec<LanguageKind> = self.adapters.keys().copied().collect();
        out.sort();
        out
    }
}
