use crate::error::PatternError;
use crate::pattern::{PathPattern, PatternGroup};
use crate::routing::ternary_trie::{self, TernaryTrie};
use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::sync::Arc;

/// A pattern bound to the resource it dispatches to. Immutable once built.
#[derive(Debug)]
pub struct MappedRoute<R> {
    pattern: PathPattern,
    resource: R,
}

impl<R> MappedRoute<R> {
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }
}

/// Outcome of a mutation, handed to the observer.
#[derive(Debug, Clone, Copy)]
pub enum MappingEvent<'a> {
    Inserted { pattern: &'a PathPattern, added: bool },
    Removed { pattern: &'a PathPattern, removed: bool },
}

/// Callback invoked after every insert and remove.
pub type MappingObserver = Arc<dyn Fn(&MappingEvent<'_>) + Send + Sync>;

/// Sizing of the three literal indexes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSettings {
    pub initial_capacity: usize,
    /// Capacity multiplier applied each time an index runs out of nodes.
    pub grow_factor: f64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            initial_capacity: ternary_trie::DEFAULT_CAPACITY,
            grow_factor: 1.5,
        }
    }
}

/// Which literal index a pattern's key lives in.
#[derive(Debug, Clone, Copy)]
enum IndexSlot {
    Exact,
    Prefix,
    Suffix,
}

impl IndexSlot {
    fn as_str(&self) -> &'static str {
        match self {
            IndexSlot::Exact => "exact",
            IndexSlot::Prefix => "prefix",
            IndexSlot::Suffix => "suffix",
        }
    }
}

type RouteIndex<R> = TernaryTrie<Arc<MappedRoute<R>>>;

/// The routing table: patterns in specificity order plus literal indexes.
///
/// Entries are kept sorted by [`PathPattern`]'s ordering, so iterating yields
/// the most specific pattern first. Exact, prefix-glob and suffix-glob
/// patterns are also indexed by their literal key, which lets
/// [`get_match`](Self::get_match) jump to a candidate instead of testing every
/// pattern of the group. An index hit is only a candidate; it is always
/// re-checked with [`PathPattern::matches`].
///
/// When two patterns of one group share a literal key the index keeps the
/// latest one. The earlier pattern is still found by the linear scan.
pub struct PathMappings<R> {
    mappings: BTreeMap<PathPattern, Arc<MappedRoute<R>>>,
    exact_index: RouteIndex<R>,
    prefix_index: RouteIndex<R>,
    suffix_index: RouteIndex<R>,
    settings: IndexSettings,
    observer: Option<MappingObserver>,
}

impl<R> Default for PathMappings<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for PathMappings<R> {
    fn clone(&self) -> Self {
        Self {
            mappings: self.mappings.clone(),
            exact_index: self.exact_index.clone(),
            prefix_index: self.prefix_index.clone(),
            suffix_index: self.suffix_index.clone(),
            settings: self.settings,
            observer: self.observer.clone(),
        }
    }
}

impl<R> PathMappings<R> {
    pub fn new() -> Self {
        Self::with_settings(IndexSettings::default())
    }

    pub fn with_settings(settings: IndexSettings) -> Self {
        Self {
            mappings: BTreeMap::new(),
            exact_index: TernaryTrie::with_capacity(settings.initial_capacity),
            prefix_index: TernaryTrie::with_capacity(settings.initial_capacity),
            suffix_index: TernaryTrie::with_capacity(settings.initial_capacity),
            settings,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: MappingObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Entries in specificity order.
    pub fn iter(&self) -> btree_map::Values<'_, PathPattern, Arc<MappedRoute<R>>> {
        self.mappings.values()
    }

    /// Snapshot of all entries in specificity order.
    pub fn mappings(&self) -> Vec<Arc<MappedRoute<R>>> {
        self.mappings.values().cloned().collect()
    }

    /// Resource registered for exactly this pattern, ignoring match semantics.
    pub fn get(&self, pattern: &PathPattern) -> Option<&R> {
        self.mappings.get(pattern).map(|entry| &entry.resource)
    }

    /// Parse `pattern` and insert it.
    pub fn insert_str(&mut self, pattern: &str, resource: R) -> Result<bool, PatternError> {
        Ok(self.insert(PathPattern::parse(pattern)?, resource))
    }

    /// Register `pattern`. Returns `false` and changes nothing if an equal
    /// pattern is already present.
    pub fn insert(&mut self, pattern: PathPattern, resource: R) -> bool {
        if self.mappings.contains_key(&pattern) {
            tracing::debug!(pattern = %pattern, "pathmap: ignored duplicate pattern");
            self.notify(&MappingEvent::Inserted {
                pattern: &pattern,
                added: false,
            });
            return false;
        }

        let entry = Arc::new(MappedRoute { pattern, resource });
        if let Some((slot, key)) = index_key(&entry.pattern) {
            let grow_factor = self.settings.grow_factor;
            let index = self.index_mut(slot);
            while !index.put(key, entry.clone()) {
                *index = index.grown(grow_factor);
                ::metrics::counter!(crate::metrics::INDEX_GROW_TOTAL, "index" => slot.as_str())
                    .increment(1);
                tracing::debug!(
                    index = slot.as_str(),
                    capacity = index.capacity(),
                    "pathmap: grew literal index"
                );
            }
        }

        self.mappings.insert(entry.pattern.clone(), entry.clone());
        tracing::debug!(
            pattern = %entry.pattern,
            group = entry.pattern.group().as_str(),
            size = self.mappings.len(),
            "pathmap: added pattern"
        );
        self.notify(&MappingEvent::Inserted {
            pattern: &entry.pattern,
            added: true,
        });
        true
    }

    /// Unregister `pattern`. Returns `false` if it was not present.
    pub fn remove(&mut self, pattern: &PathPattern) -> bool {
        if let Some((slot, key)) = index_key(pattern) {
            let index = self.index_mut(slot);
            // Leave the key alone if it points at a different pattern.
            let owned = index
                .get(key)
                .map_or(false, |entry| entry.pattern == *pattern);
            if owned {
                index.remove(key);
            }
        }

        let removed = self.mappings.remove(pattern).is_some();
        tracing::debug!(
            pattern = %pattern,
            removed,
            size = self.mappings.len(),
            "pathmap: remove pattern"
        );
        self.notify(&MappingEvent::Removed { pattern, removed });
        removed
    }

    /// Remove every entry the predicate selects, keeping the indexes in step.
    pub fn remove_if<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&MappedRoute<R>) -> bool,
    {
        let doomed: Vec<PathPattern> = self
            .mappings
            .values()
            .filter(|entry| predicate(entry))
            .map(|entry| entry.pattern.clone())
            .collect();
        for pattern in &doomed {
            self.remove(pattern);
        }
    }

    /// Drop every entry and empty all three indexes.
    pub fn reset(&mut self) {
        self.mappings.clear();
        self.exact_index.clear();
        self.prefix_index.clear();
        self.suffix_index.clear();
        tracing::debug!("pathmap: reset");
    }

    /// All entries matching `path`, most specific first.
    ///
    /// Plain scan of the ordered entries; the indexes are not consulted.
    pub fn get_matches(&self, path: &str) -> Vec<Arc<MappedRoute<R>>> {
        let is_root_path = path == "/";
        let matches: Vec<Arc<MappedRoute<R>>> = self
            .mappings
            .values()
            .filter(|entry| match entry.pattern.group() {
                PatternGroup::Root => is_root_path,
                PatternGroup::Default => is_root_path || entry.pattern.matches(path),
                _ => entry.pattern.matches(path),
            })
            .cloned()
            .collect();

        let result = if matches.is_empty() { "miss" } else { "hit" };
        ::metrics::counter!(crate::metrics::LOOKUPS_TOTAL, "kind" => "match_all", "result" => result)
            .increment(1);
        matches
    }

    /// The most specific entry matching `path`.
    ///
    /// Walks the ordered entries; on entering a run of exact, prefix-glob or
    /// suffix-glob patterns the matching literal index is asked for a
    /// candidate first. Every entry is still tested directly when the index
    /// produces nothing usable.
    pub fn get_match(&self, path: &str) -> Option<Arc<MappedRoute<R>>> {
        let mut last_group = None;

        for entry in self.mappings.values() {
            let group = entry.pattern.group();
            if last_group != Some(group) {
                let candidate = match group {
                    PatternGroup::Exact => best_prefix_match(&self.exact_index, path),
                    PatternGroup::PrefixGlob => best_prefix_match(&self.prefix_index, path),
                    PatternGroup::SuffixGlob => best_suffix_match(&self.suffix_index, path),
                    _ => None,
                };
                if let Some(found) = candidate {
                    record_match("indexed");
                    return Some(found.clone());
                }
            }

            if entry.pattern.matches(path) {
                record_match("direct");
                return Some(entry.clone());
            }

            last_group = Some(group);
        }

        record_match("miss");
        None
    }

    fn index_mut(&mut self, slot: IndexSlot) -> &mut RouteIndex<R> {
        match slot {
            IndexSlot::Exact => &mut self.exact_index,
            IndexSlot::Prefix => &mut self.prefix_index,
            IndexSlot::Suffix => &mut self.suffix_index,
        }
    }

    fn notify(&self, event: &MappingEvent<'_>) {
        if let Some(ref observer) = self.observer {
            observer(event);
        }
    }
}

impl<'a, R> IntoIterator for &'a PathMappings<R> {
    type Item = &'a Arc<MappedRoute<R>>;
    type IntoIter = btree_map::Values<'a, PathPattern, Arc<MappedRoute<R>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<R> fmt::Display for PathMappings<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathMappings[size={}]", self.mappings.len())
    }
}

impl<R: fmt::Debug> fmt::Debug for PathMappings<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathMappings")
            .field("mappings", &self.mappings.values().collect::<Vec<_>>())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Index slot and literal key for the accelerated groups.
fn index_key(pattern: &PathPattern) -> Option<(IndexSlot, &str)> {
    match pattern.group() {
        PatternGroup::Exact => pattern.prefix().map(|k| (IndexSlot::Exact, k)),
        PatternGroup::PrefixGlob => pattern.prefix().map(|k| (IndexSlot::Prefix, k)),
        PatternGroup::SuffixGlob => pattern.suffix().map(|k| (IndexSlot::Suffix, k)),
        _ => None,
    }
}

/// Longest indexed prefix whose pattern matches `path`, backing off to
/// shorter keys when a candidate's full pattern rejects the path.
fn best_prefix_match<'a, R>(
    index: &'a RouteIndex<R>,
    path: &str,
) -> Option<&'a Arc<MappedRoute<R>>> {
    let mut len = path.len();
    loop {
        let candidate = index.get_best(path, 0, len)?;
        if candidate.pattern.matches(path) {
            return Some(candidate);
        }
        let key_len = candidate.pattern.prefix().map_or(0, str::len);
        len = key_len.checked_sub(1)?;
    }
}

/// Try the text after each `.` in `path`, left to right, as a suffix key.
fn best_suffix_match<'a, R>(
    index: &'a RouteIndex<R>,
    path: &str,
) -> Option<&'a Arc<MappedRoute<R>>> {
    let bytes = path.as_bytes();
    let mut from = 0;
    while from < bytes.len() {
        let dot = from + bytes[from..].iter().position(|&b| b == b'.')?;
        let start = dot + 1;
        if let Some(candidate) = index.get_range(path, start, bytes.len() - start) {
            if candidate.pattern.matches(path) {
                return Some(candidate);
            }
        }
        from = start;
    }
    None
}

fn record_match(result: &'static str) {
    ::metrics::counter!(crate::metrics::LOOKUPS_TOTAL, "kind" => "match", "result" => result)
        .increment(1);
}
