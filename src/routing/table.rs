//! Route table
//!
//! Ordered `(pattern, kind)` pairs evaluated first-match-wins. The table is
//! built once from configuration and always ends in a catch-all, so every
//! request path classifies to exactly one kind.

use std::fmt;

use crate::config::Config;

/// How a route matches the request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    /// Whole-path equality
    Exact(String),
    /// Directory-style prefix ending in `/`; also matches the bare directory
    /// (`/api/` matches `/api` and `/api/x`)
    Prefix(String),
    /// Every path
    Any,
}

impl RoutePattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Prefix(prefix) => {
                path.starts_with(prefix.as_str()) || path == prefix.trim_end_matches('/')
            }
            Self::Any => true,
        }
    }

    /// Glob form used by the hosting platform's routing manifest
    pub fn as_glob(&self) -> String {
        match self {
            Self::Exact(exact) => exact.clone(),
            Self::Prefix(prefix) => format!("{prefix}*"),
            Self::Any => "/*".to_string(),
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.as_glob())
    }
}

/// What serves a matched request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    /// Liveness / readiness probe
    Health,
    /// Dynamic API dispatch with CORS
    Api,
    /// File under the asset root named by the request path
    Static,
    /// One fixed file under the asset root
    Asset(String),
    /// SPA entry document
    Spa,
    /// Nothing serves this path (SPA fallback disabled)
    Unmatched,
}

impl RouteKind {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Api => "api",
            Self::Static => "static",
            Self::Asset(_) => "asset",
            Self::Spa => "spa",
            Self::Unmatched => "unmatched",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: RoutePattern,
    pub kind: RouteKind,
}

impl Route {
    const fn new(pattern: RoutePattern, kind: RouteKind) -> Self {
        Self { pattern, kind }
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build the table in precedence order:
    /// health probes, API prefix, static prefix, single assets, entry
    /// document paths, then the catch-all.
    pub fn from_config(config: &Config) -> Self {
        let mut routes = Vec::new();

        if config.health.enabled {
            for path in [&config.health.liveness_path, &config.health.readiness_path] {
                routes.push(Route::new(RoutePattern::Exact(path.clone()), RouteKind::Health));
            }
        }

        routes.push(Route::new(
            RoutePattern::Prefix(config.api.prefix.clone()),
            RouteKind::Api,
        ));
        routes.push(Route::new(
            RoutePattern::Prefix(config.assets.static_prefix.clone()),
            RouteKind::Static,
        ));

        for asset in &config.assets.single_assets {
            routes.push(Route::new(
                RoutePattern::Exact(asset.clone()),
                RouteKind::Asset(asset.clone()),
            ));
        }

        routes.push(Route::new(RoutePattern::Exact("/".to_string()), RouteKind::Spa));
        routes.push(Route::new(
            RoutePattern::Exact(format!("/{}", config.assets.index_file)),
            RouteKind::Spa,
        ));

        let fallback = if config.assets.spa_fallback {
            RouteKind::Spa
        } else {
            RouteKind::Unmatched
        };
        routes.push(Route::new(RoutePattern::Any, fallback));

        Self { routes }
    }

    /// First matching route; the trailing catch-all guarantees a result
    pub fn classify(&self, path: &str) -> &Route {
        let last = self.routes.len() - 1;
        self.routes
            .iter()
            .find(|route| route.pattern.matches(path))
            .unwrap_or(&self.routes[last])
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
