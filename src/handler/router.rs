//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: target validation, route
//! classification, and dispatch to the API table or the static layer.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{
    HeaderMap, HeaderValue, ALLOW, CONTENT_LENGTH, IF_NONE_MATCH, RANGE, SERVER,
};
use hyper::http::request::Parts;
use hyper::{Method, Request};

use super::static_files::StaticAssets;
use crate::api::{self, ApiContext, ApiDispatch, ApiRequest};
use crate::config::{Config, ConfigError};
use crate::error::{RouterError, SITE_ALLOW};
use crate::http::{self, Conditions, CorsPolicy, HttpResponse};
use crate::routing::{BuildManifest, RouteKind, RouteTable};

/// Route kind that produced a response, stored in its extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteLabel(pub &'static str);

/// Stateless request router shared by every connection
#[derive(Debug)]
pub struct EdgeRouter {
    table: RouteTable,
    assets: StaticAssets,
    api: ApiDispatch,
    api_ctx: ApiContext,
    cors: Option<CorsPolicy>,
    max_body_size: u64,
    server_name: Option<HeaderValue>,
}

impl EdgeRouter {
    /// Router with the built-in API endpoints only
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Self::with_dispatch(config, ApiDispatch::with_builtins(&config.api.prefix))
    }

    /// Router serving `dispatch` under the API prefix
    pub fn with_dispatch(config: &Config, dispatch: ApiDispatch) -> Result<Self, ConfigError> {
        let table = RouteTable::from_config(config);
        let manifest = BuildManifest::from_table(&table);
        let server_name = if config.http.server_name.is_empty() {
            None
        } else {
            Some(
                HeaderValue::from_str(&config.http.server_name)
                    .map_err(|_| ConfigError::InvalidServerName(config.http.server_name.clone()))?,
            )
        };

        Ok(Self {
            table,
            assets: StaticAssets::new(&config.assets),
            api: dispatch,
            api_ctx: ApiContext::new(config, manifest),
            cors: CorsPolicy::from_config(&config.cors)?,
            max_body_size: config.http.max_body_size,
            server_name,
        })
    }

    /// Route table this router classifies against
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Handle one request; never fails, errors become responses
    pub async fn handle<B>(&self, req: Request<B>) -> HttpResponse
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let raw_path = req.uri().path().to_string();
        let decoded = http::decode_path(&raw_path);
        // Undecodable paths still classify, so API errors keep their CORS headers
        let lookup = match &decoded {
            Ok(path) => path.as_str(),
            Err(_) => raw_path.as_str(),
        };
        let route = self.table.classify(lookup);

        let mut response = match &route.kind {
            RouteKind::Api => self.serve_api(req, decoded).await,
            kind => {
                let (parts, _body) = req.into_parts();
                self.serve_site(kind, &parts, decoded).await
            }
        };

        response
            .extensions_mut()
            .insert(RouteLabel(route.kind.label()));
        if let Some(name) = &self.server_name {
            response.headers_mut().insert(SERVER, name.clone());
        }
        response
    }

    async fn serve_api<B>(&self, req: Request<B>, path: Result<String, RouterError>) -> HttpResponse
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();

        let result = match path {
            Ok(path) if parts.method == Method::OPTIONS => {
                Ok(self.api_options(&path, &parts.headers))
            }
            path => self.dispatch_api(&parts, body, path).await,
        };
        let mut response = match result {
            Ok(response) => response,
            Err(err) => {
                log_api_error(&parts, &err);
                api::error_response(&err)
            }
        };

        if let Some(cors) = &self.cors {
            cors.apply(&mut response, &parts.headers);
        }
        response
    }

    /// Every OPTIONS under the API prefix is answered, preflight or not
    fn api_options(&self, path: &str, headers: &HeaderMap) -> HttpResponse {
        let mut response = match &self.cors {
            Some(cors) => cors.preflight(headers),
            None => http::build_options_response(),
        };
        let allow = self.api.allow(path).unwrap_or_else(|| "OPTIONS".to_string());
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers_mut().insert(ALLOW, value);
        }
        response
    }

    async fn dispatch_api<B>(
        &self,
        parts: &Parts,
        body: B,
        path: Result<String, RouterError>,
    ) -> Result<HttpResponse, RouterError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let path = path?;
        check_body_size(&parts.headers, self.max_body_size)?;
        let (handler, params) = self.api.resolve(&parts.method, &path)?;

        let limit = usize::try_from(self.max_body_size).unwrap_or(usize::MAX);
        let body = Limited::new(body, limit)
            .collect()
            .await
            .map_err(|e| {
                if e.is::<LengthLimitError>() {
                    RouterError::PayloadTooLarge {
                        limit: self.max_body_size,
                    }
                } else {
                    RouterError::bad_request(format!("failed to read request body: {e}"))
                }
            })?
            .to_bytes();

        let request = ApiRequest {
            method: parts.method.clone(),
            path,
            params,
            query: parts.uri.query().map(ToString::to_string),
            headers: parts.headers.clone(),
            body,
        };
        let mut response = handler(&self.api_ctx, &request)?;

        if parts.method == Method::HEAD {
            let len = response.body().size_hint().exact().unwrap_or(0);
            *response.body_mut() = Full::new(Bytes::new());
            response.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(len));
        }
        Ok(response)
    }

    async fn serve_site(
        &self,
        kind: &RouteKind,
        parts: &Parts,
        path: Result<String, RouterError>,
    ) -> HttpResponse {
        let path = match path {
            Ok(path) => path,
            Err(err) => return http::build_error_response(&err),
        };

        match &parts.method {
            &Method::GET | &Method::HEAD => {}
            &Method::OPTIONS => return http::build_options_response(),
            method => {
                tracing::debug!(%method, path = %path, "method not allowed");
                return http::build_error_response(&RouterError::method_not_allowed(
                    method, SITE_ALLOW,
                ));
            }
        }

        let cond = Conditions {
            is_head: parts.method == Method::HEAD,
            if_none_match: header_str(&parts.headers, IF_NONE_MATCH),
            range: header_str(&parts.headers, RANGE),
        };

        let payload = match kind {
            RouteKind::Health => return http::build_health_response(cond.is_head),
            RouteKind::Static => self.assets.load(&path).await,
            RouteKind::Asset(file) => self.assets.load(file).await,
            RouteKind::Spa => Ok(self.assets.entry_document().await),
            RouteKind::Unmatched | RouteKind::Api => Err(RouterError::NotFound),
        };

        match payload {
            Ok(payload) => http::build_payload_response(&payload, cond),
            Err(err) => http::build_error_response(&err),
        }
    }
}

fn header_str(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Reject declared bodies over the limit before reading them
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Result<(), RouterError> {
    let Some(content_length) = headers.get(CONTENT_LENGTH) else {
        return Ok(());
    };
    match content_length.to_str().map(str::parse::<u64>) {
        Ok(Ok(size)) if size > max_body_size => {
            tracing::warn!(size, max_body_size, "request body too large");
            Err(RouterError::PayloadTooLarge {
                limit: max_body_size,
            })
        }
        Ok(Ok(_)) => Ok(()),
        _ => Err(RouterError::bad_request("invalid Content-Length header")),
    }
}

fn log_api_error(parts: &Parts, err: &RouterError) {
    match err {
        RouterError::Internal(detail) => {
            tracing::error!(method = %parts.method, path = parts.uri.path(), detail = %detail, "API handler failed");
        }
        other => {
            tracing::debug!(method = %parts.method, path = parts.uri.path(), error = %other, "API request rejected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CONTENT_TYPE};
    use hyper::StatusCode;

    fn router() -> EdgeRouter {
        let mut config = Config::default();
        config.assets.root = std::env::temp_dir().join("edge-router-no-such-root");
        EdgeRouter::new(&config).unwrap()
    }

    fn request(method: Method, uri: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_table_follows_config() {
        let router = router();
        assert_eq!(router.table().classify("/api/health").kind, RouteKind::Api);
        assert_eq!(router.table().classify("/healthz").kind, RouteKind::Health);
        assert_eq!(router.table().classify("/outlet/JKT-001").kind, RouteKind::Spa);
    }

    #[tokio::test]
    async fn test_api_not_found_has_cors() {
        let resp = router().handle(request(Method::GET, "/api/unknown")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(resp.extensions().get::<RouteLabel>(), Some(&RouteLabel("api")));
    }

    #[tokio::test]
    async fn test_site_rejects_post() {
        let resp = router().handle(request(Method::POST, "/dashboard")).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], SITE_ALLOW);
        assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_shell_served_without_root() {
        let resp = router().handle(request(Method::GET, "/outlet/JKT-001")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert!(resp.headers().contains_key(SERVER));
    }

    #[tokio::test]
    async fn test_bad_encoding() {
        let resp = router().handle(request(Method::GET, "/static/%ff%fe")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = router().handle(request(Method::GET, "/api/%zz")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_declared_body_too_large() {
        let mut config = Config::default();
        config.http.max_body_size = 4;
        let router = EdgeRouter::new(&config).unwrap();
        let req = Request::builder()
            .method(Method::GET)
            .uri("/api/health")
            .header(CONTENT_LENGTH, "5")
            .body(Full::new(Bytes::from_static(b"12345")))
            .unwrap();
        let resp = router.handle(req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_check_body_size() {
        let mut headers = HeaderMap::new();
        assert!(check_body_size(&headers, 10).is_ok());
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("10"));
        assert!(check_body_size(&headers, 10).is_ok());
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("11"));
        assert_eq!(
            check_body_size(&headers, 10).unwrap_err(),
            RouterError::PayloadTooLarge { limit: 10 }
        );
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("ten"));
        assert!(matches!(
            check_body_size(&headers, 10),
            Err(RouterError::BadRequest(_))
        ));
    }

    #[test]
    fn test_empty_server_name_omitted() {
        let mut config = Config::default();
        config.http.server_name = String::new();
        assert!(EdgeRouter::new(&config).unwrap().server_name.is_none());
    }
}
