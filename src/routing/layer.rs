use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use tower_http::classify::ServerErrorsFailureClass;
use tracing::{Level, Span};

pub use crate::net::layer::request_id::{RequestId, RIDLayer};
pub use crate::net::layer::timeout::TimeoutLayer;

pub fn make_span_with(request: &Request<Body>) -> Span {
    let req_id = RequestId::try_get(request)
        .expect("missing request id");

    tracing::span!(
        Level::INFO,
        "REQ",
        i = req_id.id(),
        v = ?request.version(),
        m = %request.method(),
        u = %request.uri(),
        s = tracing::field::Empty
    )
}

pub fn on_request(_request: &Request<Body>, _span: &Span) {
    /* do nothing */
}

pub fn on_response(response: &Response, latency: Duration, span: &Span) {
    span.record("s", response.status().as_u16());

    tracing::event!(
        Level::INFO,
        "{:#?}",
        latency
    )
}

pub fn on_failure(error: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    tracing::event!(
        Level::ERROR,
        "{} {:#?}",
        error,
        latency
    )
}
