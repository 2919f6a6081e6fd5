//! API path pattern matching
//!
//! Patterns are `/`-separated segments. `:name` captures one non-empty
//! segment, a final `*` captures the remainder (possibly empty), anything
//! else must match literally. Matching is strict about trailing slashes.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Rest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Values captured by a matched pattern, in pattern order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Remainder captured by a trailing `*`
    pub fn rest(&self) -> Option<&str> {
        self.get("*")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let parts: Vec<&str> = pattern.trim_start_matches('/').split('/').collect();
        let last = parts.len() - 1;
        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, part)| match part.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ if *part == "*" && i == last => Segment::Rest,
                _ => Segment::Literal((*part).to_string()),
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a decoded absolute path, returning captured params
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let rest = path.strip_prefix('/')?;
        let mut parts = rest.split('/');
        let mut params = Vec::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Rest => {
                    let consumed: usize = self.segments[..i]
                        .iter()
                        .zip(rest.split('/'))
                        .map(|(_, part)| part.len() + 1)
                        .sum();
                    let remainder = rest.get(consumed..).unwrap_or("");
                    params.push(("*".to_string(), remainder.to_string()));
                    return Some(PathParams(params));
                }
                Segment::Literal(literal) => {
                    if parts.next()? != literal.as_str() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.next().filter(|v| !v.is_empty())?;
                    params.push((name.clone(), value.to_string()));
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(PathParams(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern() {
        let pattern = PathPattern::parse("/api/health");
        assert!(pattern.matches("/api/health").unwrap().is_empty());
        assert!(pattern.matches("/api/health/").is_none());
        assert!(pattern.matches("/api/healthz").is_none());
        assert!(pattern.matches("/api").is_none());
    }

    #[test]
    fn test_params() {
        let pattern = PathPattern::parse("/api/outlet/parcels/:outlet_code");
        let params = pattern.matches("/api/outlet/parcels/JKT-001").unwrap();
        assert_eq!(params.get("outlet_code"), Some("JKT-001"));
        assert!(pattern.matches("/api/outlet/parcels/").is_none());
        assert!(pattern.matches("/api/outlet/parcels/a/b").is_none());
    }

    #[test]
    fn test_multiple_params() {
        let pattern = PathPattern::parse("/api/admin/:resource/:id");
        let params = pattern.matches("/api/admin/users/42").unwrap();
        assert_eq!(params.get("resource"), Some("users"));
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_rest() {
        let pattern = PathPattern::parse("/api/files/*");
        assert_eq!(
            pattern.matches("/api/files/reports/2026/q1.csv").unwrap().rest(),
            Some("reports/2026/q1.csv")
        );
        assert_eq!(pattern.matches("/api/files/").unwrap().rest(), Some(""));
        assert!(pattern.matches("/api/other/x").is_none());
    }

    #[test]
    fn test_star_only_special_at_end() {
        let pattern = PathPattern::parse("/api/*/x");
        assert!(pattern.matches("/api/*/x").is_some());
        assert!(pattern.matches("/api/y/x").is_none());
    }
}
