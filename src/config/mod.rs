// Configuration module entry point
// Loads the immutable process configuration and validates it once at startup

mod types;
mod validate;

use std::net::SocketAddr;

pub use types::{
    ApiConfig, AssetsConfig, Bindings, Config, CorsConfig, HealthConfig, HttpConfig, LogFormat,
    LoggingConfig, PerformanceConfig, Secret, ServerConfig,
};
pub use validate::ConfigError;

/// Environment variable prefix, e.g. `EDGE__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "EDGE";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| ConfigError::InvalidAddress { addr, source })
    }
}
