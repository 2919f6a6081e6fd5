//! Edge router for a prebuilt single-page application.
//!
//! Each request is classified against an ordered route table: API paths go
//! to dynamic handlers with CORS applied, static paths are served from the
//! asset root, and everything else receives the SPA entry document.

pub mod api;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use api::{ApiContext, ApiDispatch, ApiHandler, ApiRequest};
pub use config::{Config, ConfigError};
pub use error::RouterError;
pub use handler::EdgeRouter;
