//! HTTP protocol layer module
//!
//! Protocol-level building blocks shared by the static and API halves of the
//! router: target decoding, caching, ranges, content types, CORS and response
//! builders.

pub mod cache;
pub mod cors;
pub mod mime;
pub mod path;
pub mod range;
pub mod response;

pub use cors::CorsPolicy;
pub use path::decode_path;
pub use response::{
    build_error_response, build_health_response, build_options_response, build_payload_response,
    Conditions, HttpResponse, Payload,
};
