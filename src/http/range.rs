//! HTTP Range request parsing module
//!
//! Range header parsing for partial-object tests, a subset of RFC 7233:
//! `bytes` unit only, and only the first range of a range set is honored.
//! Multipart/byteranges responses are not produced.

use hyper::header::HeaderValue;

use crate::error::RangeError;

/// A parsed Range header, before it has seen a body.
///
/// Either bound may be open:
/// - `start` only: from `start` to the end of the body
/// - `end` only: the last `end` bytes (suffix range)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

/// A resolved, inclusive byte range that fits the body it was resolved
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for a `Content-Range` header against a body of `total` bytes
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

impl RangeSpec {
    /// Resolve open bounds against a body of `body_len` bytes and check that
    /// `0 <= start <= end <= body_len - 1`.
    pub fn resolve(&self, body_len: u64) -> Result<ByteRange, RangeError> {
        let invalid = |start: u64, end: u64| RangeError::Invalid {
            start,
            end,
            len: body_len,
        };

        let (start, end) = match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            (Some(start), None) => (start, body_len.saturating_sub(1)),
            // Suffix larger than the body covers the whole body
            (None, Some(suffix)) => {
                if suffix == 0 {
                    return Err(invalid(body_len, body_len.saturating_sub(1)));
                }
                (body_len.saturating_sub(suffix), body_len.saturating_sub(1))
            }
            (None, None) => return Err(invalid(0, 0)),
        };

        if body_len == 0 || start > end || end >= body_len {
            return Err(invalid(start, end));
        }
        Ok(ByteRange { start, end })
    }
}

/// Parse a Range header value such as `bytes=0-99`, `bytes=100-` or
/// `bytes=-500`.
///
/// Ranges after the first comma-separated one are ignored.
///
/// # Examples
/// ```
/// use canned_origin::http::range::{parse_range_header, RangeSpec};
///
/// let range = parse_range_header("bytes=6-16").unwrap();
/// assert_eq!(range, RangeSpec { start: Some(6), end: Some(16) });
///
/// assert!(parse_range_header("items=0-1").is_err());
/// ```
pub fn parse_range_header(value: &str) -> Result<RangeSpec, RangeError> {
    let Some((unit, ranges)) = value.split_once('=') else {
        return Err(RangeError::malformed(value));
    };

    if unit.trim() != "bytes" {
        return Err(RangeError::malformed(value));
    }

    let mut ranges = ranges.split(',').map(str::trim).filter(|r| !r.is_empty());
    let Some(first) = ranges.next() else {
        return Err(RangeError::malformed(value));
    };

    // Later ranges still have to be well formed even though they are dropped
    let spec = parse_single_range(first, value)?;
    for extra in ranges {
        parse_single_range(extra, value)?;
    }
    Ok(spec)
}

/// Parse a raw header value; non-ASCII values are malformed
pub fn parse_range_value(value: &HeaderValue) -> Result<RangeSpec, RangeError> {
    value.to_str().map_or_else(
        |_| Err(RangeError::malformed(&String::from_utf8_lossy(value.as_bytes()))),
        parse_range_header,
    )
}

/// Parse one `start-end` element of a range set
fn parse_single_range(range: &str, header: &str) -> Result<RangeSpec, RangeError> {
    let Some((start_str, end_str)) = range.split_once('-') else {
        return Err(RangeError::malformed(header));
    };

    let start = parse_bound(start_str.trim(), header)?;
    let end = parse_bound(end_str.trim(), header)?;

    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(RangeError::malformed(header)),
        (None, None) => Err(RangeError::malformed(header)),
        _ => Ok(RangeSpec { start, end }),
    }
}

fn parse_bound(bound: &str, header: &str) -> Result<Option<u64>, RangeError> {
    if bound.is_empty() {
        return Ok(None);
    }
    bound
        .parse::<u64>()
        .map(Some)
        .map_err(|_| RangeError::malformed(header))
}
