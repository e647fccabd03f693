use std::sync::{Arc, OnceLock, RwLock};

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::{NoopObserver, SharedObserver, StructuredLogObserver};

/// Error returned when a named observer cannot be resolved.
#[derive(Debug, Error)]
pub enum ObserverRegistryError {
    #[error("unknown observer: {0}")]
    Unknown(String),
}

/// Process-wide named registry of [`super::Observer`] instances.
///
/// Mirrors the teacher's `ReducerRegistry`: a guarded `FxHashMap` with
/// eager default registration and builder-style `with_*` registration.
/// Registration is safe for concurrent use; re-registration overwrites the
/// previous entry under the same name.
#[derive(Clone)]
pub struct ObserverRegistry {
    inner: Arc<RwLock<FxHashMap<String, SharedObserver>>>,
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register("noop", Arc::new(NoopObserver));
        registry.register("slog", Arc::new(StructuredLogObserver));
        registry
    }
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(FxHashMap::default())),
        }
    }

    /// Registers (or overwrites) an observer under `name`.
    pub fn register(&mut self, name: impl Into<String>, observer: SharedObserver) -> &mut Self {
        self.inner.write().unwrap().insert(name.into(), observer);
        self
    }

    /// Builder-style registration for fluent construction.
    pub fn with_observer(mut self, name: impl Into<String>, observer: SharedObserver) -> Self {
        self.register(name, observer);
        self
    }

    /// Resolves a named observer. Fails with [`ObserverRegistryError::Unknown`]
    /// for names that were never registered (spec.md §4.3: construction
    /// fails fast on unknown registry names, never lazily at emit time).
    pub fn get(&self, name: &str) -> Result<SharedObserver, ObserverRegistryError> {
        self.inner
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ObserverRegistryError::Unknown(name.to_string()))
    }
}

fn global() -> &'static RwLock<ObserverRegistry> {
    static GLOBAL: OnceLock<RwLock<ObserverRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(ObserverRegistry::default()))
}

/// Resolves a named observer from the process-wide registry.
pub fn get_observer(name: &str) -> Result<SharedObserver, ObserverRegistryError> {
    global().read().unwrap().get(name)
}

/// Registers an observer in the process-wide registry. Intended to run
/// during process initialization; re-registration overwrites silently.
pub fn register_observer(name: impl Into<String>, observer: SharedObserver) {
    global().write().unwrap().register(name, observer);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_default_names() {
        let registry = ObserverRegistry::default();
        assert!(registry.get("noop").is_ok());
        assert!(registry.get("slog").is_ok());
    }

    #[test]
    fn unknown_name_errors() {
        let registry = ObserverRegistry::default();
        assert!(matches!(
            registry.get("made-up"),
            Err(ObserverRegistryError::Unknown(_))
        ));
    }

    #[test]
    fn global_registry_roundtrips() {
        register_observer("test-custom", Arc::new(NoopObserver));
        assert!(get_observer("test-custom").is_ok());
    }
}
