use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Redirect, Response};

use crate::net;
use crate::net::error;
use crate::sec::authn::initiator::{self, LookupError};
use crate::state::ArcShared;

/// edge guard for the protected page prefixes. runs ahead of any individual
/// api route check: no valid session, no page, just a redirect to the login
/// screen
pub async fn protected(
    State(state): State<ArcShared>,
    headers: HeaderMap,
    uri: Uri,
) -> error::Result<Response> {
    let conn = state.pool().get().await?;

    match initiator::lookup_header_map(state.sec(), &conn, &headers).await {
        Ok(_) => {},
        Err(LookupError::Database(err)) => {
            return Err(err.into());
        },
        Err(LookupError::HeaderToStr(err)) => {
            return Err(err.into());
        },
        Err(_) => {
            return Ok(Redirect::to("/login").into_response());
        }
    }

    serve_page(&state, &uri).await
}

/// pages resolve to a real asset when one exists and otherwise fall back to
/// the application shell
async fn serve_page(state: &ArcShared, uri: &Uri) -> error::Result<Response> {
    let parts = uri.path().split('/');
    let mut working = state.assets().to_owned();

    for part in parts {
        if part == ".." || part == "." {
            return Err(error::Error::api(error::GeneralKind::InvalidUri));
        } else {
            working.push(part);
        }
    }

    if !working.try_exists()? || !working.is_file() {
        working = state.assets().join("index.html");

        if !working.try_exists()? {
            return Err(error::Error::api(error::GeneralKind::NotFound));
        }
    }

    Ok(net::fs::stream_file(working).await?.into_response())
}
