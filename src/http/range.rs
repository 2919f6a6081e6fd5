//! HTTP Range request parsing module
//!
//! Single `bytes` range support (RFC 9110 section 14). Multi-range and unknown
//! units are ignored and the full body is served.

/// Inclusive byte span inside a body of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn len(self) -> usize {
        self.end - self.start + 1
    }

    pub fn content_range(self, total: usize) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Outcome of evaluating a `Range` header against a body
#[derive(Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    /// Serve the whole body with 200
    Full,
    /// Serve this span with 206
    Partial(ByteRange),
    /// Respond 416
    Unsatisfiable,
}

/// Evaluate a `Range` header for a body of `size` bytes
///
/// # Examples
/// ```
/// use edge_router::http::range::{evaluate, ByteRange, RangeOutcome};
///
/// assert_eq!(
///     evaluate(Some("bytes=0-9"), 100),
///     RangeOutcome::Partial(ByteRange { start: 0, end: 9 })
/// );
/// assert_eq!(evaluate(None, 100), RangeOutcome::Full);
/// ```
pub fn evaluate(header: Option<&str>, size: usize) -> RangeOutcome {
    let Some(spec) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };
    if spec.contains(',') {
        return RangeOutcome::Full;
    }
    let Some((first, last)) = spec.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        // Suffix form: the final `last` bytes
        return match last.parse::<usize>() {
            Ok(0) => RangeOutcome::Unsatisfiable,
            Ok(_) if size == 0 => RangeOutcome::Unsatisfiable,
            Ok(suffix) => RangeOutcome::Partial(ByteRange {
                start: size.saturating_sub(suffix),
                end: size - 1,
            }),
            Err(_) => RangeOutcome::Full,
        };
    }

    let Ok(start) = first.parse::<usize>() else {
        return RangeOutcome::Full;
    };
    if start >= size {
        return RangeOutcome::Unsatisfiable;
    }
    let end = if last.is_empty() {
        size - 1
    } else {
        match last.parse::<usize>() {
            // Malformed: ignored, full content served
            Ok(end) if end < start => return RangeOutcome::Full,
            Ok(end) => end.min(size - 1),
            Err(_) => return RangeOutcome::Full,
        }
    };
    RangeOutcome::Partial(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_and_open_ranges() {
        assert_eq!(
            evaluate(Some("bytes=0-9"), 100),
            RangeOutcome::Partial(ByteRange { start: 0, end: 9 })
        );
        let RangeOutcome::Partial(open) = evaluate(Some("bytes=50-"), 100) else {
            panic!("expected partial");
        };
        assert_eq!((open.start, open.end, open.len()), (50, 99, 50));
        assert_eq!(open.content_range(100), "bytes 50-99/100");
    }

    #[test]
    fn test_end_is_clamped() {
        assert_eq!(
            evaluate(Some("bytes=90-500"), 100),
            RangeOutcome::Partial(ByteRange { start: 90, end: 99 })
        );
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(
            evaluate(Some("bytes=-20"), 100),
            RangeOutcome::Partial(ByteRange { start: 80, end: 99 })
        );
        assert_eq!(
            evaluate(Some("bytes=-500"), 100),
            RangeOutcome::Partial(ByteRange { start: 0, end: 99 })
        );
        assert_eq!(evaluate(Some("bytes=-0"), 100), RangeOutcome::Unsatisfiable);
    }

    #[test]
    fn test_unsatisfiable() {
        assert_eq!(evaluate(Some("bytes=200-"), 100), RangeOutcome::Unsatisfiable);
        assert_eq!(evaluate(Some("bytes=0-"), 0), RangeOutcome::Unsatisfiable);
    }

    #[test]
    fn test_ignored_forms() {
        assert_eq!(evaluate(Some("bytes=a-b"), 100), RangeOutcome::Full);
        assert_eq!(evaluate(Some("bytes=0-9,20-29"), 100), RangeOutcome::Full);
        assert_eq!(evaluate(Some("items=0-9"), 100), RangeOutcome::Full);
        assert_eq!(evaluate(Some("bytes=20-10"), 100), RangeOutcome::Full);
    }
}
