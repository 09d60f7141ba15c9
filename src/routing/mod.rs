mod mappings;
mod shared;
mod ternary_trie;

pub use mappings::{IndexSettings, MappedRoute, MappingEvent, MappingObserver, PathMappings};
pub use shared::SharedPathMappings;
pub use ternary_trie::{TernaryTrie, DEFAULT_CAPACITY};
