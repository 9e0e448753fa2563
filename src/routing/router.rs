//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled proxy routes
//! - Look up matching route for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Longest prefix wins; equal lengths keep config order
//! - Explicit NoMatch rather than silent default

use url::{Position, Url};

use crate::config::schema::ProxySettings;
use crate::routing::matcher::{Matcher, PathPrefixMatcher};

/// A compiled proxy rule bound to the resolved backend origin.
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    matcher: PathPrefixMatcher,
    origin: Url,
    pub change_origin: bool,
    pub secure: bool,
}

impl ProxyRoute {
    pub fn new(prefix: impl Into<String>, origin: Url, change_origin: bool, secure: bool) -> Self {
        Self {
            matcher: PathPrefixMatcher::new(prefix),
            origin,
            change_origin,
            secure,
        }
    }

    /// Prefix this route was declared with. Also used as its metrics label.
    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// `host[:port]` of the backend, used when rewriting `Host`.
    pub fn authority(&self) -> &str {
        &self.origin[Position::BeforeHost..Position::AfterPort]
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    /// Absolute upstream URL. The full original path is kept, prefix included.
    pub fn target_uri(&self, path_and_query: &str) -> String {
        let base = self.origin.as_str().trim_end_matches('/');
        if path_and_query.starts_with('/') {
            format!("{}{}", base, path_and_query)
        } else {
            format!("{}/{}", base, path_and_query)
        }
    }
}

/// Immutable set of proxy routes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<ProxyRoute>,
    origin: Url,
}

impl RouteTable {
    /// Compile routes from configuration, all targeting `origin`.
    pub fn from_config(proxy: &ProxySettings, origin: Url) -> Self {
        let mut routes: Vec<ProxyRoute> = proxy
            .rules
            .iter()
            .map(|rule| ProxyRoute::new(rule.prefix.clone(), origin.clone(), rule.change_origin, rule.secure))
            .collect();

        // Stable sort keeps declaration order among equal lengths.
        routes.sort_by(|a, b| b.prefix().len().cmp(&a.prefix().len()));

        tracing::debug!(
            origin = %origin,
            routes = routes.len(),
            "Route table compiled"
        );

        Self { routes, origin }
    }

    /// Find the route for a path.
    pub fn match_path(&self, path: &str) -> Option<&ProxyRoute> {
        self.routes.iter().find(|route| route.matches(path))
    }

    /// Absolute upstream URL for a path, if any rule matches.
    pub fn resolve(&self, path_and_query: &str) -> Option<String> {
        let path = path_and_query.split('?').next().unwrap_or(path_and_query);
        self.match_path(path).map(|route| route.target_uri(path_and_query))
    }

    /// Backend origin all routes point at.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn routes(&self) -> &[ProxyRoute] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::{resolve_backend_origin, EnvLayer};
    use crate::config::schema::ProxyRuleConfig;

    fn table(env: &EnvLayer) -> RouteTable {
        let proxy = ProxySettings::default();
        let origin = resolve_backend_origin(&proxy, env).unwrap();
        RouteTable::from_config(&proxy, origin)
    }

    #[test]
    fn default_origin_preserves_path() {
        let table = table(&EnvLayer::default());
        assert_eq!(
            table.resolve("/api/v1/users?page=2").as_deref(),
            Some("http://localhost:8080/api/v1/users?page=2")
        );
        assert_eq!(table.resolve("/health").as_deref(), Some("http://localhost:8080/health"));
    }

    #[test]
    fn env_override_changes_origin() {
        let env = EnvLayer::from_pairs([("VITE_API_BASE_URL", "https://10.0.0.5:8443")]);
        let table = table(&env);
        assert_eq!(
            table.resolve("/api/items").as_deref(),
            Some("https://10.0.0.5:8443/api/items")
        );
    }

    #[test]
    fn unmatched_paths_resolve_to_none() {
        let table = table(&EnvLayer::default());
        assert_eq!(table.resolve("/"), None);
        assert_eq!(table.resolve("/assets/app.js"), None);
        assert_eq!(table.resolve("/v1?next=/api"), None);
    }

    #[test]
    fn longest_prefix_wins() {
        let mut proxy = ProxySettings::default();
        proxy.rules = vec![
            ProxyRuleConfig::new("/api"),
            ProxyRuleConfig { prefix: "/api/secure".into(), change_origin: false, secure: true },
        ];
        let table = RouteTable::from_config(&proxy, Url::parse("http://b:1").unwrap());

        let route = table.match_path("/api/secure/keys").unwrap();
        assert_eq!(route.prefix(), "/api/secure");
        assert!(route.secure);
        assert_eq!(table.match_path("/api/open").unwrap().prefix(), "/api");
    }

    #[test]
    fn origin_base_path_is_prepended() {
        let route = ProxyRoute::new("/api", Url::parse("http://b:1/backend/").unwrap(), true, false);
        assert_eq!(route.target_uri("/api/x"), "http://b:1/backend/api/x");
        assert_eq!(route.authority(), "b:1");
    }

    #[test]
    fn authority_omits_default_port() {
        let route = ProxyRoute::new("/api", Url::parse("https://example.com:443").unwrap(), true, false);
        assert_eq!(route.authority(), "example.com");
    }
}
