// API response utility functions module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{ALLOW, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::RouterError;
use crate::http::HttpResponse;

const JSON: &str = "application/json; charset=utf-8";

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<HttpResponse, RouterError> {
    let json = serde_json::to_vec(body)
        .map_err(|e| RouterError::Internal(format!("failed to serialize response: {e}")))?;

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON)
        .header(CACHE_CONTROL, "no-store")
        .body(Full::new(Bytes::from(json)))
        .map_err(|e| RouterError::Internal(format!("failed to build response: {e}")))
}

/// JSON error body: `{"error": "...", "status": 404}`
pub fn error_response(err: &RouterError) -> HttpResponse {
    let status = err.status();
    let message = match err {
        RouterError::Internal(_) => "internal server error".to_string(),
        other => other.to_string(),
    };
    let body = serde_json::json!({
        "error": message,
        "status": status.as_u16(),
    });

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON);
    if let Some(allow) = err.allow() {
        builder = builder.header(ALLOW, allow);
    }
    builder
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to build API error response");
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = status;
            fallback
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::Method;

    async fn body_json(resp: HttpResponse) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_json_response() {
        let resp = json_response(StatusCode::CREATED, &serde_json::json!({"id": 7})).unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()[CONTENT_TYPE], JSON);
        assert_eq!(body_json(resp).await["id"], 7);
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let resp = error_response(&RouterError::NotFound);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "not found");
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_method_not_allowed_sets_allow() {
        let resp = error_response(&RouterError::method_not_allowed(&Method::DELETE, "GET, HEAD"));
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_internal_detail_hidden() {
        let resp = error_response(&RouterError::Internal("db password wrong".into()));
        let body = body_json(resp).await;
        assert_eq!(body["error"], "internal server error");
    }
}
