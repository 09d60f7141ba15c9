use crate::pattern::PathPattern;
use crate::routing::mappings::{MappedRoute, PathMappings};
use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, PoisonError};

/// Concurrently readable routing table, cheaply cloneable.
///
/// Readers take a lock-free snapshot with [`load`](Self::load). Writers are
/// serialized through `write_mu`; each mutation clones the current table,
/// applies the change (index growth included) and publishes the result as a
/// new snapshot, so the entries and the three indexes always switch together.
pub struct SharedPathMappings<R> {
    current: Arc<ArcSwap<PathMappings<R>>>,
    write_mu: Arc<Mutex<()>>,
}

impl<R> Clone for SharedPathMappings<R> {
    fn clone(&self) -> Self {
        Self {
            current: self.current.clone(),
            write_mu: self.write_mu.clone(),
        }
    }
}

impl<R> Default for SharedPathMappings<R> {
    fn default() -> Self {
        Self::new(PathMappings::new())
    }
}

impl<R> SharedPathMappings<R> {
    pub fn new(mappings: PathMappings<R>) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(mappings)),
            write_mu: Arc::new(Mutex::new(())),
        }
    }

    /// Current snapshot. Later mutations do not affect it.
    pub fn load(&self) -> arc_swap::Guard<Arc<PathMappings<R>>> {
        self.current.load()
    }

    /// Apply `f` to a private copy of the table and publish it.
    pub fn update<T>(&self, f: impl FnOnce(&mut PathMappings<R>) -> T) -> T {
        let _guard = self.write_mu.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = PathMappings::clone(&self.current.load());
        let out = f(&mut next);
        self.current.store(Arc::new(next));
        out
    }

    /// Publish a table built elsewhere, e.g. after a config reload.
    pub fn replace(&self, mappings: PathMappings<R>) {
        let _guard = self.write_mu.lock().unwrap_or_else(PoisonError::into_inner);
        self.current.store(Arc::new(mappings));
        tracing::info!("pathmap: replaced routing table, size={}", self.current.load().len());
    }

    pub fn insert(&self, pattern: PathPattern, resource: R) -> bool {
        self.update(|m| m.insert(pattern, resource))
    }

    pub fn remove(&self, pattern: &PathPattern) -> bool {
        self.update(|m| m.remove(pattern))
    }

    pub fn reset(&self) {
        self.update(|m| m.reset())
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    pub fn get_match(&self, path: &str) -> Option<Arc<MappedRoute<R>>> {
        self.current.load().get_match(path)
    }

    pub fn get_matches(&self, path: &str) -> Vec<Arc<MappedRoute<R>>> {
        self.current.load().get_matches(path)
    }
}
