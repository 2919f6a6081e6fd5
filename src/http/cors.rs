//! Cross-origin policy for the API surface
//!
//! Mirrors the permissive middleware the bundle was built against: every
//! origin by default, a fixed method list, request headers echoed back on
//! preflight when no explicit list is configured.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS,
    ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN,
    VARY,
};
use hyper::{Response, StatusCode};

use crate::config::{ConfigError, CorsConfig};

/// Compiled CORS policy, built once from `CorsConfig`
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    /// Empty means any origin
    origins: Vec<HeaderValue>,
    allow_methods: HeaderValue,
    allow_headers: Option<HeaderValue>,
    expose_headers: Option<HeaderValue>,
    allow_credentials: bool,
    max_age: Option<HeaderValue>,
}

impl CorsPolicy {
    /// `None` when the policy is disabled
    pub fn from_config(config: &CorsConfig) -> Result<Option<Self>, ConfigError> {
        if !config.enabled {
            return Ok(None);
        }
        let any_origin = config.allow_origins.iter().any(|o| o == "*");
        let origins = if any_origin {
            Vec::new()
        } else {
            config
                .allow_origins
                .iter()
                .map(|o| header_value(o))
                .collect::<Result<_, _>>()?
        };

        Ok(Some(Self {
            origins,
            allow_methods: header_value(&config.allow_methods.join(","))?,
            allow_headers: joined(&config.allow_headers)?,
            expose_headers: joined(&config.expose_headers)?,
            allow_credentials: config.allow_credentials,
            max_age: config.max_age.map(HeaderValue::from),
        }))
    }

    /// Origin value to send back for a request
    ///
    /// A fixed origin list answers with the request origin when listed and
    /// with the first configured origin otherwise, so the header is always
    /// present.
    fn allow_origin(&self, request_origin: Option<&HeaderValue>) -> HeaderValue {
        let Some(first) = self.origins.first() else {
            return HeaderValue::from_static("*");
        };
        request_origin
            .filter(|origin| self.origins.contains(*origin))
            .unwrap_or(first)
            .clone()
    }

    /// Attach the policy headers to any API response
    pub fn apply<B>(&self, response: &mut Response<B>, request_headers: &HeaderMap) {
        let origin = self.allow_origin(request_headers.get(ORIGIN));
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        if !self.origins.is_empty() {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
        if self.allow_credentials {
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        if let Some(expose) = &self.expose_headers {
            headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, expose.clone());
        }
    }

    /// 204 answer to any OPTIONS on the API; `apply` still has to run on it
    pub fn preflight(&self, request_headers: &HeaderMap) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::NO_CONTENT;
        let headers = response.headers_mut();

        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        if let Some(max_age) = &self.max_age {
            headers.insert(ACCESS_CONTROL_MAX_AGE, max_age.clone());
        }
        match &self.allow_headers {
            Some(allowed) => {
                headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allowed.clone());
            }
            None => {
                if let Some(requested) = request_headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
                    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
                    headers.append(
                        VARY,
                        HeaderValue::from_static("Access-Control-Request-Headers"),
                    );
                }
            }
        }
        response
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|_| ConfigError::InvalidCors(format!("invalid header value '{value}'")))
}

fn joined(values: &[String]) -> Result<Option<HeaderValue>, ConfigError> {
    if values.is_empty() {
        return Ok(None);
    }
    header_value(&values.join(",")).map(Some)
}
