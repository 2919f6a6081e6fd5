// Built-in API handlers

use hyper::StatusCode;
use serde::Serialize;

use super::response::json_response;
use super::{ApiContext, ApiRequest};
use crate::error::RouterError;
use crate::http::HttpResponse;

#[derive(Debug, Serialize)]
struct HealthBody<'a> {
    status: &'static str,
    service: &'a str,
    version: &'a str,
}

/// Service liveness as JSON
pub fn health(ctx: &ApiContext, _req: &ApiRequest) -> Result<HttpResponse, RouterError> {
    json_response(
        StatusCode::OK,
        &HealthBody {
            status: "ok",
            service: &ctx.service,
            version: ctx.version,
        },
    )
}

/// The build manifest the router was started with
pub fn routes(ctx: &ApiContext, _req: &ApiRequest) -> Result<HttpResponse, RouterError> {
    json_response(StatusCode::OK, &ctx.manifest)
}
