use hermes_pathmap::config::RouterConfig;
use hermes_pathmap::SharedPathMappings;
use std::path::Path;

fn resolve(shared: &SharedPathMappings<String>, path: &str) -> Option<String> {
    shared.get_match(path).map(|m| m.resource().clone())
}

#[test]
fn sample_config_resolves_paths() {
    let config = RouterConfig::load(Path::new("config.toml")).unwrap();
    let shared = SharedPathMappings::new(config.build_mappings().unwrap());

    assert_eq!(resolve(&shared, "/login").as_deref(), Some("login-handler"));
    assert_eq!(resolve(&shared, "/api/users").as_deref(), Some("api-handler"));
    assert_eq!(resolve(&shared, "/api/v2/x").as_deref(), Some("api-v2-handler"));
    assert_eq!(resolve(&shared, "/users/42").as_deref(), Some("user-handler"));
    assert_eq!(
        resolve(&shared, "/static/v1/logo.png").as_deref(),
        Some("logo-handler")
    );
    assert_eq!(resolve(&shared, "/data/x.json").as_deref(), Some("json-handler"));
    // Disabled routes are not registered.
    assert_eq!(resolve(&shared, "/legacy/x").as_deref(), Some("default-handler"));
    assert_eq!(resolve(&shared, "/").as_deref(), Some("default-handler"));
}

#[test]
fn reloaded_table_replaces_snapshot() {
    let config = RouterConfig::load(Path::new("config.toml")).unwrap();
    let shared = SharedPathMappings::new(config.build_mappings().unwrap());
    let before = shared.load();

    let mut reduced = config.clone();
    reduced.routes.retain(|r| r.name != "api-v2");
    shared.replace(reduced.build_mappings().unwrap());

    assert_eq!(
        before.get_match("/api/v2/x").map(|m| m.resource().clone()).as_deref(),
        Some("api-v2-handler")
    );
    assert_eq!(resolve(&shared, "/api/v2/x").as_deref(), Some("api-handler"));
}
