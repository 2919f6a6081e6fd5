//! Routing module
//!
//! Static-vs-dynamic classification of request paths:
//! - Route table evaluated first-match-wins
//! - Build manifest derived from the table for the hosting platform
//! - Path patterns with parameters for the API dispatch table

pub mod manifest;
mod matcher;
mod table;

pub use manifest::{BuildManifest, ManifestClass, ManifestEntry};
pub use matcher::{PathParams, PathPattern};
pub use table::{Route, RouteKind, RoutePattern, RouteTable};
