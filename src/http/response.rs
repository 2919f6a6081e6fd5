//! HTTP response building module
//!
//! Builders shared by every route kind. Builder failures are logged and
//! degrade to an empty response rather than aborting the connection.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG,
};
use hyper::{Response, StatusCode};

use super::cache::{self, CachePolicy};
use super::range::{self, RangeOutcome};
use crate::error::{RouterError, SITE_ALLOW};

pub type HttpResponse = Response<Full<Bytes>>;

/// File or document body ready to be served
#[derive(Debug, Clone)]
pub struct Payload {
    pub data: Bytes,
    pub content_type: &'static str,
    pub cache: CachePolicy,
}

/// Conditional and partial request inputs
#[derive(Debug, Default, Clone, Copy)]
pub struct Conditions<'a> {
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub range: Option<&'a str>,
}

/// Serve a payload honouring `If-None-Match`, `Range` and HEAD
pub fn build_payload_response(payload: &Payload, cond: Conditions<'_>) -> HttpResponse {
    let etag = cache::generate_etag(&payload.data);
    let cache_control = payload.cache.to_header_value();
    let total = payload.data.len();

    if cache::check_etag_match(cond.if_none_match, &etag) {
        return finish(
            Response::builder()
                .status(StatusCode::NOT_MODIFIED)
                .header(ETAG, &etag)
                .header(CACHE_CONTROL, &cache_control),
            Bytes::new(),
            "304",
        );
    }

    let (builder, body) = match range::evaluate(cond.range, total) {
        RangeOutcome::Unsatisfiable => {
            return finish(
                Response::builder()
                    .status(StatusCode::RANGE_NOT_SATISFIABLE)
                    .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                    .header(CONTENT_RANGE, format!("bytes */{total}")),
                Bytes::from_static(b"416 Range Not Satisfiable"),
                "416",
            );
        }
        RangeOutcome::Partial(span) => (
            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(CONTENT_RANGE, span.content_range(total))
                .header(CONTENT_LENGTH, span.len()),
            payload.data.slice(span.start..=span.end),
        ),
        RangeOutcome::Full => (
            Response::builder()
                .status(StatusCode::OK)
                .header(CONTENT_LENGTH, total),
            payload.data.clone(),
        ),
    };

    let builder = builder
        .header(CONTENT_TYPE, payload.content_type)
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, &etag)
        .header(CACHE_CONTROL, &cache_control);
    let body = if cond.is_head { Bytes::new() } else { body };
    finish(builder, body, "payload")
}

/// Plain-text error response for non-API route kinds
pub fn build_error_response(err: &RouterError) -> HttpResponse {
    let status = err.status();
    let text = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8");
    if let Some(allow) = err.allow() {
        builder = builder.header(ALLOW, allow);
    }
    finish(builder, Bytes::from(text), status.as_str())
}

/// Answer to a non-preflight OPTIONS on a site route
pub fn build_options_response() -> HttpResponse {
    finish(
        Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header(ALLOW, SITE_ALLOW),
        Bytes::new(),
        "OPTIONS",
    )
}

/// Liveness / readiness probe body
pub fn build_health_response(is_head: bool) -> HttpResponse {
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(b"ok")
    };
    finish(
        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(CACHE_CONTROL, "no-store")
            .header(CONTENT_LENGTH, 2),
        body,
        "health",
    )
}

fn finish(builder: hyper::http::response::Builder, body: Bytes, what: &str) -> HttpResponse {
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to build {what} response");
        Response::new(Full::new(Bytes::new()))
    })
}
