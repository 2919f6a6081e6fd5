// Startup validation
// Rejects configurations that would break route table invariants

use hyper::header::{HeaderName, HeaderValue};
use hyper::Method;
use std::net::AddrParseError;
use thiserror::Error;

use super::types::{Config, CorsConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("{field} must start and end with '/', got '{value}'")]
    InvalidPrefix { field: &'static str, value: String },

    #[error("{field} must be an absolute path, got '{value}'")]
    InvalidPath { field: &'static str, value: String },

    #[error("api prefix '{api}' overlaps static prefix '{assets}'")]
    PrefixOverlap { api: String, assets: String },

    #[error("{field} '{value}' falls under the api prefix")]
    ShadowsApi { field: &'static str, value: String },

    #[error("index file '{0}' must be a plain file name inside the asset root")]
    InvalidIndexFile(String),

    #[error("invalid cors setting: {0}")]
    InvalidCors(String),

    #[error("server name '{0}' is not a valid header value")]
    InvalidServerName(String),

    #[error("binding {name} is not a valid URL: {source}")]
    InvalidBinding {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_prefix("api.prefix", &self.api.prefix)?;
        check_prefix("assets.static_prefix", &self.assets.static_prefix)?;

        let (api, assets) = (&self.api.prefix, &self.assets.static_prefix);
        if api.starts_with(assets.as_str()) || assets.starts_with(api.as_str()) {
            return Err(ConfigError::PrefixOverlap {
                api: api.clone(),
                assets: assets.clone(),
            });
        }

        for asset in &self.assets.single_assets {
            check_absolute("assets.single_assets", asset)?;
            check_outside_api("assets.single_assets", asset, api)?;
        }
        if self.health.enabled {
            for (field, path) in [
                ("health.liveness_path", &self.health.liveness_path),
                ("health.readiness_path", &self.health.readiness_path),
            ] {
                check_absolute(field, path)?;
                check_outside_api(field, path, api)?;
            }
        }

        let index = &self.assets.index_file;
        if index.is_empty() || index.contains('/') || index.contains('\\') || index == ".." {
            return Err(ConfigError::InvalidIndexFile(index.clone()));
        }

        if HeaderValue::from_str(&self.http.server_name).is_err() {
            return Err(ConfigError::InvalidServerName(self.http.server_name.clone()));
        }

        if self.cors.enabled {
            validate_cors(&self.cors)?;
        }

        if let Some(url) = &self.bindings.backend_url {
            url::Url::parse(url).map_err(|source| ConfigError::InvalidBinding {
                name: "backend_url",
                source,
            })?;
        }

        Ok(())
    }
}

fn check_prefix(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.len() < 2 || !value.starts_with('/') || !value.ends_with('/') {
        return Err(ConfigError::InvalidPrefix {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn check_absolute(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::InvalidPath {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Exact routes are matched before the API prefix, so one inside it would
/// hide an endpoint
fn check_outside_api(field: &'static str, value: &str, api: &str) -> Result<(), ConfigError> {
    if value.starts_with(api) || value == api.trim_end_matches('/') {
        return Err(ConfigError::ShadowsApi {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigError> {
    if cors.allow_origins.is_empty() {
        return Err(ConfigError::InvalidCors(
            "allow_origins must not be empty".to_string(),
        ));
    }
    let wildcard = cors.allow_origins.iter().any(|o| o == "*");
    if wildcard && cors.allow_credentials {
        return Err(ConfigError::InvalidCors(
            "allow_credentials cannot be combined with origin '*'".to_string(),
        ));
    }
    for origin in &cors.allow_origins {
        HeaderValue::from_str(origin)
            .map_err(|_| ConfigError::InvalidCors(format!("bad origin '{origin}'")))?;
    }
    for method in &cors.allow_methods {
        Method::from_bytes(method.as_bytes())
            .map_err(|_| ConfigError::InvalidCors(format!("bad method '{method}'")))?;
    }
    for header in cors.allow_headers.iter().chain(&cors.expose_headers) {
        HeaderName::from_bytes(header.as_bytes())
            .map_err(|_| ConfigError::InvalidCors(format!("bad header name '{header}'")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_prefix_shape() {
        let mut cfg = Config::default();
        cfg.api.prefix = "/api".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidPrefix { field: "api.prefix", .. })
        ));

        cfg.api.prefix = "/".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_prefix_overlap() {
        let mut cfg = Config::default();
        cfg.assets.static_prefix = "/api/static/".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::PrefixOverlap { .. })
        ));
    }

    #[test]
    fn test_index_file() {
        let mut cfg = Config::default();
        cfg.assets.index_file = "../secret.html".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidIndexFile(_))
        ));
    }

    #[test]
    fn test_single_asset_must_be_absolute() {
        let mut cfg = Config::default();
        cfg.assets.single_assets = vec!["favicon.ico".to_string()];
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidPath { .. })));
    }

    #[test]
    fn test_exact_routes_outside_api_prefix() {
        let mut cfg = Config::default();
        cfg.health.liveness_path = "/api/ping".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ShadowsApi { field: "health.liveness_path", .. })
        ));

        // Not routed when health is off
        cfg.health.enabled = false;
        cfg.validate().unwrap();

        let mut cfg = Config::default();
        cfg.health.readiness_path = "/api".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::ShadowsApi { .. })));

        let mut cfg = Config::default();
        cfg.assets.single_assets.push("/api/logo.png".to_string());
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ShadowsApi { field: "assets.single_assets", .. })
        ));

        // Shared leading characters are not a prefix match
        cfg.assets.single_assets = vec!["/apidocs.png".to_string()];
        cfg.validate().unwrap();
    }

    #[test]
    fn test_cors_rules() {
        let mut cfg = Config::default();
        cfg.cors.allow_credentials = true;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidCors(_))));

        cfg.cors.allow_origins = vec!["https://apd-oasis.pages.dev".to_string()];
        cfg.validate().unwrap();

        cfg.cors.allow_methods.push("NOT A METHOD".to_string());
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidCors(_))));

        // Disabled policy is not inspected
        cfg.cors.enabled = false;
        cfg.validate().unwrap();
    }

    #[test]
    fn test_server_name_header_safe() {
        let mut cfg = Config::default();
        cfg.http.server_name = "edge\nrouter".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidServerName(_))));
    }

    #[test]
    fn test_backend_url_binding() {
        let mut cfg = Config::default();
        cfg.bindings.backend_url = Some("not a url".to_string());
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidBinding { name: "backend_url", .. })
        ));
    }
}
