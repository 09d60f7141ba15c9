pub mod types;


pub use types::*;

use crate::pattern::PathPattern;
use crate::routing::{IndexSettings, PathMappings};
use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

impl RouterConfig {
    /// Load configuration from a file (if it exists) and apply environment
    /// variable overrides for index sizing. When the file does not exist an
    /// empty routing table with default sizing is used.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: RouterConfig = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => toml::from_str(&content)?,
                Some("json") => serde_json::from_str(&content)?,
                Some(ext) => anyhow::bail!("unsupported config format: .{ext}, use .toml or .json"),
                None => anyhow::bail!("config file has no extension, use .toml or .json"),
            }
        } else {
            tracing::info!("config file not found at {}, using defaults", path.display());
            RouterConfig::default()
        };

        config.apply_env_overrides();

        config.validate()?;
        tracing::info!(
            routes = config.routes.len(),
            enabled = config.enabled_routes().count(),
            "loaded routing configuration"
        );
        Ok(config)
    }

    /// Index sizing can be tuned per deployment without touching the routes.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("HERMES_PATHMAP_INDEX_CAPACITY") {
            match v.parse::<usize>() {
                Ok(n) => self.index.initial_capacity = n,
                Err(e) => tracing::warn!("ignoring HERMES_PATHMAP_INDEX_CAPACITY={v}: {e}"),
            }
        }
        if let Some(v) = lookup("HERMES_PATHMAP_GROW_FACTOR") {
            match v.parse::<f64>() {
                Ok(f) => self.index.grow_factor = f,
                Err(e) => tracing::warn!("ignoring HERMES_PATHMAP_GROW_FACTOR={v}: {e}"),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.index.grow_factor > 1.0) {
            anyhow::bail!(
                "index grow_factor must be greater than 1.0, got {}",
                self.index.grow_factor
            );
        }

        let mut seen: HashSet<PathPattern> = HashSet::new();
        for route in self.enabled_routes() {
            let pattern = PathPattern::parse(&route.pattern).map_err(|e| {
                anyhow::anyhow!("route '{}' has an invalid pattern: {}", route.name, e)
            })?;
            if !seen.insert(pattern) {
                anyhow::bail!(
                    "route '{}' duplicates pattern '{}'",
                    route.name,
                    route.pattern
                );
            }
        }
        Ok(())
    }

    pub fn enabled_routes(&self) -> impl Iterator<Item = &RouteConfig> {
        self.routes.iter().filter(|r| r.enabled)
    }

    pub fn index_settings(&self) -> IndexSettings {
        IndexSettings {
            initial_capacity: self.index.initial_capacity,
            grow_factor: self.index.grow_factor,
        }
    }

    /// Compile the enabled routes into a routing table.
    pub fn build_mappings(&self) -> Result<PathMappings<String>> {
        let mut mappings = PathMappings::with_settings(self.index_settings());
        for route in self.enabled_routes() {
            tracing::debug!(
                "routing: compiled route entry, name={}, pattern={}, resource={}",
                route.name,
                route.pattern,
                route.resource_name(),
            );
            mappings.insert_str(&route.pattern, route.resource_name().to_string())?;
        }
        tracing::info!("routing: compiled path mappings, count={}", mappings.len());
        Ok(mappings)
    }
}
