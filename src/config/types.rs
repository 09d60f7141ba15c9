use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a `T` that implements `Default`, treating JSON `null` the same
/// as a missing field.  Use with:
///   `#[serde(default, deserialize_with = "deserialize_null_default")]`
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level routing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub routes: Vec<RouteConfig>,
}

/// Sizing of the literal indexes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Node capacity each index starts with.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// Capacity multiplier applied when an index is full. Must exceed 1.0.
    #[serde(default = "default_grow_factor")]
    pub grow_factor: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            grow_factor: default_grow_factor(),
        }
    }
}

fn default_initial_capacity() -> usize {
    crate::routing::DEFAULT_CAPACITY
}

fn default_grow_factor() -> f64 {
    1.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default)]
    pub name: String,

    /// Path pattern: `/exact`, `/prefix/*`, `*.ext`, `/`, `^regex`, or a middle glob.
    pub pattern: String,

    /// Resource handle the route dispatches to. Falls back to `name`, then `pattern`.
    #[serde(default)]
    pub resource: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl RouteConfig {
    pub fn resource_name(&self) -> &str {
        match self.resource.as_deref() {
            Some(resource) if !resource.is_empty() => resource,
            _ if !self.name.is_empty() => &self.name,
            _ => &self.pattern,
        }
    }
}

fn default_enabled() -> bool {
    true
}
