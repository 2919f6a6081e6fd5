//! Request handler module
//!
//! The edge router itself: classifies each request and serves it from the
//! API dispatch table, the asset root or the SPA entry document.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{EdgeRouter, RouteLabel};
pub use static_files::StaticAssets;
