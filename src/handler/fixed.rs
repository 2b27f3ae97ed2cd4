//! Fixed-length (non-chunked) responder
//!
//! The body is materialised once when the resource tree is built and served
//! from memory on every request, whole or as one byte range.

use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use hyper::{HeaderMap, Response, StatusCode};

use crate::config::ResourceConfig;
use crate::http::pattern;
use crate::http::range::{parse_range_value, ByteRange};
use crate::http::response::{full_body, with_headers, OriginBody};
use crate::logger;

#[derive(Debug, Clone)]
pub struct FixedResponder {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl FixedResponder {
    pub fn new(conf: &ResourceConfig) -> Self {
        let body = if conf.patterned {
            (0..conf.content_length).map(pattern::byte_at).collect::<Vec<_>>()
        } else {
            vec![conf.chunk_byte_value; usize::try_from(conf.content_length).unwrap_or(usize::MAX)]
        };

        let mut headers = conf.headers.clone();
        if !headers.contains_key(CONTENT_LENGTH) {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        Self {
            status: conf.status,
            headers,
            body: Bytes::from(body),
        }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Serve the whole body, or the requested range of it.
    ///
    /// A Range header that cannot be parsed or does not fit the body is
    /// logged and ignored.
    pub fn handle(&self, request_headers: &HeaderMap) -> Response<OriginBody> {
        let Some(range_header) = request_headers.get(RANGE) else {
            return self.full_response();
        };

        let range =
            parse_range_value(range_header).and_then(|spec| spec.resolve(self.body.len() as u64));

        match range {
            Ok(range) => self.partial_response(range),
            Err(e) => {
                logger::log_range_ignored(&e);
                self.full_response()
            }
        }
    }

    fn full_response(&self) -> Response<OriginBody> {
        with_headers(self.status, &self.headers, full_body(self.body.clone()))
    }

    fn partial_response(&self, range: ByteRange) -> Response<OriginBody> {
        // Resolved ranges always lie inside the body
        #[allow(clippy::cast_possible_truncation)]
        let slice = self.body.slice(range.start as usize..=range.end as usize);

        let mut response =
            with_headers(StatusCode::PARTIAL_CONTENT, &self.headers, full_body(slice));
        let headers = response.headers_mut();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(range.len()));
        if !self.headers.contains_key(CONTENT_RANGE) {
            if let Ok(value) = HeaderValue::from_str(&range.content_range(self.body.len() as u64)) {
                headers.insert(CONTENT_RANGE, value);
            }
        }
        response
    }
}
