// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Main configuration structure, immutable once loaded
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub assets: AssetsConfig,
    pub api: ApiConfig,
    pub cors: CorsConfig,
    pub health: HealthConfig,
    pub bindings: Bindings,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads, CPU cores when unset
    pub workers: Option<usize>,
    /// Listen backlog passed to `listen(2)`
    pub backlog: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
            backlog: 1024,
        }
    }
}

/// Log output encoding
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub format: LogFormat,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            access_log: true,
            access_log_format: "combined".to_string(),
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PerformanceConfig {
    pub max_connections: Option<u64>,
    pub keep_alive: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_connections: None,
            keep_alive: true,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: concat!("edge-router/", env!("CARGO_PKG_VERSION")).to_string(),
            max_body_size: 10_485_760, // 10MB
        }
    }
}

/// Prebuilt bundle layout
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory the bundle was built into; request paths are joined onto it
    pub root: PathBuf,
    /// Prefix served from `root` (e.g. `/static/` reads `root/static/..`)
    pub static_prefix: String,
    /// SPA entry document, relative to `root`
    pub index_file: String,
    /// Individual files served from `root` by exact path
    pub single_assets: Vec<String>,
    /// Serve the entry document for every unmatched path
    pub spa_fallback: bool,
    /// Title of the built-in shell used when `index_file` is absent
    pub shell_title: String,
    pub cache_max_age: u32,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            static_prefix: "/static/".to_string(),
            index_file: "index.html".to_string(),
            single_assets: vec!["/favicon.ico".to_string()],
            spa_fallback: true,
            shell_title: "APD OASIS - Warehouse Logistic System".to_string(),
            cache_max_age: 3600,
        }
    }
}

/// Dynamic API surface
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/".to_string(),
        }
    }
}

/// Cross-origin policy applied to API responses
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    /// `*` allows every origin
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    /// Empty echoes `Access-Control-Request-Headers` on preflight
    pub allow_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_origins: vec!["*".to_string()],
            allow_methods: ["GET", "HEAD", "PUT", "POST", "DELETE", "PATCH"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            allow_headers: Vec::new(),
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age: None,
        }
    }
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HealthConfig {
    pub enabled: bool,
    pub liveness_path: String,
    pub readiness_path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            liveness_path: "/healthz".to_string(),
            readiness_path: "/readyz".to_string(),
        }
    }
}

/// Secrets and service endpoints handed to API handlers
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Bindings {
    pub jwt_secret: Option<Secret>,
    pub backend_url: Option<String>,
    pub backend_anon_key: Option<Secret>,
    pub backend_service_key: Option<Secret>,
}

impl Bindings {
    /// Names of the bindings that carry a value
    pub fn configured(&self) -> Vec<&'static str> {
        [
            ("jwt_secret", self.jwt_secret.is_some()),
            ("backend_url", self.backend_url.is_some()),
            ("backend_anon_key", self.backend_anon_key.is_some()),
            ("backend_service_key", self.backend_service_key.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

/// String that never appears in logs or serialized config
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}
