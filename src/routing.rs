use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::debug_handler;
use axum::error_handling::HandleErrorLayer;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::Response;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::net;
use crate::net::error;
use crate::state::ArcShared;

mod layer;
mod query;
mod pages;
mod api;

async fn ping() -> (StatusCode, &'static str) {
    (StatusCode::OK, "pong")
}

/// resolves a request path inside the assets directory, rejecting any
/// traversal component before it touches the filesystem
fn resolve_asset(state: &ArcShared, uri: &Uri) -> error::Result<PathBuf> {
    let parts = uri.path().split('/');
    let mut working = state.assets().to_owned();

    for part in parts {
        if part == ".." || part == "." {
            return Err(error::Error::api(error::GeneralKind::InvalidUri));
        } else {
            working.push(part);
        }
    }

    Ok(working)
}

#[debug_handler]
async fn serve_file(
    State(state): State<ArcShared>,
    method: Method,
    uri: Uri
) -> error::Result<Response<Body>> {
    if method != Method::GET {
        return Err(error::Error::api(error::GeneralKind::InvalidMethod));
    }

    let working = resolve_asset(&state, &uri)?;

    if !working.try_exists()? {
        return Err(error::Error::api(error::GeneralKind::NotFound));
    }

    if !working.is_file() {
        return Err(error::Error::api(error::GeneralKind::InvalidRequest));
    }

    net::fs::stream_file(working).await
}

pub fn routes(state: &ArcShared) -> Router {
    Router::new()
        .nest("/api", api::routes())
        .route("/dashboard", get(pages::protected))
        .route("/dashboard/*path", get(pages::protected))
        .route("/profile", get(pages::protected))
        .route("/profile/*path", get(pages::protected))
        .route("/settings", get(pages::protected))
        .route("/settings/*path", get(pages::protected))
        .route("/ping", get(ping))
        .fallback(serve_file)
        .layer(ServiceBuilder::new()
            .layer(layer::RIDLayer::new())
            .layer(TraceLayer::new_for_http()
                .make_span_with(layer::make_span_with)
                .on_request(layer::on_request)
                .on_response(layer::on_response)
                .on_failure(layer::on_failure))
            .layer(HandleErrorLayer::new(error::handle_error))
            .layer(layer::TimeoutLayer::new(Duration::new(90, 0))))
        .with_state(state.clone())
}
