// API module entry
// Dynamic handlers behind the API prefix, dispatched by method and path pattern

mod handlers;
mod response;

use hyper::body::Bytes;
use hyper::{HeaderMap, Method};
use serde::de::DeserializeOwned;

use crate::config::{Bindings, Config};
use crate::error::RouterError;
use crate::http::HttpResponse;
use crate::routing::{BuildManifest, PathParams, PathPattern};

pub use response::{error_response, json_response};

/// Handler signature for every API route
pub type ApiHandler = fn(&ApiContext, &ApiRequest) -> Result<HttpResponse, RouterError>;

/// Shared, immutable inputs handed to every handler
#[derive(Debug, Clone)]
pub struct ApiContext {
    pub service: String,
    pub version: &'static str,
    pub bindings: Bindings,
    pub manifest: BuildManifest,
}

impl ApiContext {
    pub fn new(config: &Config, manifest: BuildManifest) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION"),
            bindings: config.bindings.clone(),
            manifest,
        }
    }
}

/// A fully-read API request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Percent-decoded path
    pub path: String,
    pub params: PathParams,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Deserialize the body as JSON; malformed input is a 400
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RouterError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| RouterError::bad_request(format!("invalid JSON body: {e}")))
    }
}

#[derive(Clone)]
struct ApiRoute {
    method: Method,
    pattern: PathPattern,
    handler: ApiHandler,
}

/// Ordered `(method, pattern, handler)` table
#[derive(Clone, Default)]
pub struct ApiDispatch {
    routes: Vec<ApiRoute>,
}

impl std::fmt::Debug for ApiDispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.routes
                    .iter()
                    .map(|r| format!("{} {}", r.method, r.pattern.as_str())),
            )
            .finish()
    }
}

impl ApiDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table preloaded with the service endpoints under `prefix`
    pub fn with_builtins(prefix: &str) -> Self {
        Self::new()
            .route(Method::GET, &format!("{prefix}health"), handlers::health)
            .route(Method::GET, &format!("{prefix}routes"), handlers::routes)
    }

    #[must_use]
    pub fn route(mut self, method: Method, pattern: &str, handler: ApiHandler) -> Self {
        self.routes.push(ApiRoute {
            method,
            pattern: PathPattern::parse(pattern),
            handler,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the handler for `method` on `path`.
    ///
    /// HEAD falls back to GET. A path that matches only under other methods
    /// is a 405 listing them.
    pub fn resolve(
        &self,
        method: &Method,
        path: &str,
    ) -> Result<(ApiHandler, PathParams), RouterError> {
        for route in &self.routes {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };
            if route.method == *method || (*method == Method::HEAD && route.method == Method::GET) {
                return Ok((route.handler, params));
            }
        }

        match self.allow(path) {
            Some(allow) => Err(RouterError::method_not_allowed(method, allow)),
            None => Err(RouterError::NotFound),
        }
    }

    /// `Allow` value for `path`, `None` when no route matches it
    pub fn allow(&self, path: &str) -> Option<String> {
        let mut allowed: Vec<&str> = Vec::new();
        for route in &self.routes {
            let method = route.method.as_str();
            if !allowed.contains(&method) && route.pattern.matches(path).is_some() {
                allowed.push(method);
            }
        }

        if allowed.is_empty() {
            return None;
        }
        if allowed.contains(&"GET") && !allowed.contains(&"HEAD") {
            allowed.push("HEAD");
        }
        if !allowed.contains(&"OPTIONS") {
            allowed.push("OPTIONS");
        }
        Some(allowed.join(", "))
    }
}
