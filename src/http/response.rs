//! HTTP response building module
//!
//! Body type shared by every responder plus the few canned responses the
//! router needs when no resource matches.

use std::convert::Infallible;

use futures::channel::mpsc;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{HeaderMap, Method, Response, StatusCode};

/// Body of every response the origin produces: either one buffered write or
/// a stream of chunk writes ending when the sender is dropped.
pub type OriginBody = http_body_util::combinators::UnsyncBoxBody<Bytes, Infallible>;

/// Sending half of a streamed body.
pub type BodySender = mpsc::Sender<Result<Frame<Bytes>, Infallible>>;

/// Body containing `data` in a single write
pub fn full_body(data: impl Into<Bytes>) -> OriginBody {
    Full::new(data.into()).boxed_unsync()
}

/// Zero-length body
pub fn empty_body() -> OriginBody {
    Empty::<Bytes>::new().boxed_unsync()
}

/// Streamed body and the sender that feeds it.
///
/// The channel holds a single frame so a slow client applies backpressure to
/// the chunk schedule.
pub fn streaming_body() -> (BodySender, OriginBody) {
    let (tx, rx) = mpsc::channel(1);
    (tx, StreamBody::new(rx).boxed_unsync())
}

/// Start a response with `status` and the resource's configured headers
pub fn with_headers(status: StatusCode, headers: &HeaderMap, body: OriginBody) -> Response<OriginBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().extend(headers.clone());
    response
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<OriginBody> {
    let mut response = Response::new(full_body("404 Not Found"));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// Build 405 Method Not Allowed response listing the methods that are
/// routed for the requested path
pub fn build_405_response(allowed: &[Method]) -> Response<OriginBody> {
    let mut response = Response::new(full_body("405 Method Not Allowed"));
    *response.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match HeaderValue::from_str(&allow) {
        Ok(value) => {
            headers.insert(ALLOW, value);
        }
        Err(e) => crate::logger::log_error(&format!("Failed to build Allow header: {e}")),
    }
    response
}
