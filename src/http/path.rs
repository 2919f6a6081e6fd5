//! Request target validation
//!
//! Percent-decodes the URI path once, before routing. Anything that cannot
//! be decoded into a clean absolute UTF-8 path is a `BadRequest`.

use crate::error::RouterError;

/// Decode an absolute request path
///
/// # Examples
/// ```
/// use edge_router::http::path::decode_path;
/// assert_eq!(decode_path("/static/my%20app.js").unwrap(), "/static/my app.js");
/// assert!(decode_path("/static/%zz").is_err());
/// ```
pub fn decode_path(raw: &str) -> Result<String, RouterError> {
    if !raw.starts_with('/') {
        return Err(RouterError::bad_request(format!(
            "request path must be absolute: '{raw}'"
        )));
    }

    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|pair| std::str::from_utf8(pair).ok())
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| {
                    RouterError::bad_request(format!("invalid percent-encoding in '{raw}'"))
                })?;
            decoded.push(hex);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }

    if decoded.contains(&0) {
        return Err(RouterError::bad_request("request path contains NUL"));
    }
    String::from_utf8(decoded)
        .map_err(|_| RouterError::bad_request("request path is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paths_pass_through() {
        assert_eq!(decode_path("/").unwrap(), "/");
        assert_eq!(decode_path("/api/warehouse/scan").unwrap(), "/api/warehouse/scan");
    }

    #[test]
    fn test_decodes_escapes() {
        assert_eq!(decode_path("/static/a%2Fb").unwrap(), "/static/a/b");
        assert_eq!(decode_path("/caf%C3%A9").unwrap(), "/café");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(decode_path("*"), Err(RouterError::BadRequest(_))));
        assert!(matches!(decode_path("/%"), Err(RouterError::BadRequest(_))));
        assert!(matches!(decode_path("/%4"), Err(RouterError::BadRequest(_))));
        assert!(matches!(decode_path("/%00"), Err(RouterError::BadRequest(_))));
        assert!(matches!(decode_path("/%FF%FE"), Err(RouterError::BadRequest(_))));
    }
}
