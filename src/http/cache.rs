//! HTTP cache control module
//!
//! `ETag` generation, conditional request handling and per-kind cache policy.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Strong `ETag` over length and content hash, e.g. `"1f-9a3c..."`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// True when `If-None-Match` names the current `ETag` (or `*`), i.e. respond 304
///
/// Handles comma separated lists and weak validators (`W/"..."`).
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.trim_start_matches("W/") == etag
        })
    })
}

/// Cache-Control policy chosen per route kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Fingerprinted or rarely changing bundle assets
    Public(u32),
    /// Entry document: always revalidate so new deploys are picked up
    NoCache,
}

impl CachePolicy {
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_is_quoted_and_stable() {
        let etag = generate_etag(b"console.log('Box & Container Tracking')");
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag, generate_etag(b"console.log('Box & Container Tracking')"));
        assert_ne!(etag, generate_etag(b"console.log('v2')"));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"3-abc\"";
        assert!(check_etag_match(Some("\"3-abc\""), etag));
        assert!(check_etag_match(Some("\"zzz\", \"3-abc\""), etag));
        assert!(check_etag_match(Some("W/\"3-abc\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"other\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_cache_policy() {
        assert_eq!(
            CachePolicy::Public(3600).to_header_value(),
            "public, max-age=3600"
        );
        assert_eq!(CachePolicy::NoCache.to_header_value(), "no-cache");
    }
}
