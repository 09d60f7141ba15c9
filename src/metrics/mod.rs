mod registry;

pub use registry::Metrics;

/// Lookups by kind (`match`, `match_all`) and result (`indexed`, `direct`, `hit`, `miss`).
pub const LOOKUPS_TOTAL: &str = "pathmap_lookups_total";

/// Literal index rebuilds after running out of capacity, by index.
pub const INDEX_GROW_TOTAL: &str = "pathmap_index_grow_total";
