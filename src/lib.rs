//! Prioritized path-pattern routing table.
//!
//! [`routing::PathMappings`] keeps route patterns in specificity order and
//! indexes exact, prefix-glob and suffix-glob patterns by their literal part,
//! so the best match for a request path is usually found without scanning
//! every registered pattern.

pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pattern;
pub mod routing;

pub use error::PatternError;
pub use pattern::{PathPattern, PatternGroup};
pub use routing::{MappedRoute, PathMappings, SharedPathMappings};
