use crate::config::RouterConfig;
use crate::metrics::Metrics;
use crate::routing::PathMappings;
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// CLI arguments forwarded from `main()`.
pub struct ResolveArgs {
    pub config_path: PathBuf,
    pub paths: Vec<String>,
    /// Print every matching route instead of only the best one.
    pub all: bool,
    pub print_metrics: bool,
}

/// Load the routing table and resolve each requested path to stdout.
pub fn run(args: ResolveArgs) -> Result<()> {
    init_tracing();

    let metrics = if args.print_metrics {
        Some(Metrics::install()?)
    } else {
        None
    };

    let config = RouterConfig::load(&args.config_path)?;
    let mappings = config.build_mappings()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for path in &args.paths {
        for line in resolve_lines(&mappings, path, args.all) {
            writeln!(out, "{line}")?;
        }
    }

    if let Some(metrics) = metrics {
        write!(out, "{}", metrics.render())?;
    }
    Ok(())
}

/// One line per resolved route: `PATH -> PATTERN => RESOURCE`.
pub fn resolve_lines(mappings: &PathMappings<String>, path: &str, all: bool) -> Vec<String> {
    let routes = if all {
        mappings.get_matches(path)
    } else {
        mappings.get_match(path).into_iter().collect()
    };

    if routes.is_empty() {
        return vec![format!("{path} -> (no match)")];
    }
    routes
        .iter()
        .map(|route| format!("{path} -> {} => {}", route.pattern(), route.resource()))
        .collect()
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let (non_blocking, _guard) = tracing_appender::non_blocking::NonBlockingBuilder::default()
        .buffered_lines_limit(128_000)
        .lossy(true)
        .finish(std::io::stderr());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false)
                .json(),
        )
        .init();

    std::mem::forget(_guard);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PathMappings<String> {
        let mut mappings = PathMappings::new();
        mappings.insert_str("/api/*", "api".to_string()).unwrap();
        mappings.insert_str("/", "default".to_string()).unwrap();
        mappings
    }

    #[test]
    fn test_resolve_best() {
        assert_eq!(
            resolve_lines(&table(), "/api/x", false),
            vec!["/api/x -> /api/* => api"]
        );
    }

    #[test]
    fn test_resolve_all() {
        assert_eq!(
            resolve_lines(&table(), "/api/x", true),
            vec!["/api/x -> /api/* => api", "/api/x -> / => default"]
        );
    }

    #[test]
    fn test_resolve_no_match() {
        let empty = PathMappings::new();
        assert_eq!(
            resolve_lines(&empty, "/x", false),
            vec!["/x -> (no match)"]
        );
    }
}
