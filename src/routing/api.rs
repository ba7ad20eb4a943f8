use axum::Router;
use axum::routing::{get, post, delete};

use crate::net::error;
use crate::state::ArcShared;

mod auth;
mod user;
mod filings;
mod documents;
mod tickets;
mod payments;

async fn not_found() -> error::Error {
    error::Error::api(error::GeneralKind::NotFound)
}

pub fn routes() -> Router<ArcShared> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", delete(auth::logout))
        .route("/auth/verify", get(auth::verify))
        .route("/auth/password", post(auth::password))
        .route(
            "/user",
            get(user::retrieve)
                .patch(user::update)
        )
        .route(
            "/filings/itr",
            get(filings::itr::list)
                .post(filings::itr::create)
        )
        .route(
            "/filings/itr/:filing_id",
            get(filings::itr::retrieve)
                .patch(filings::itr::update)
                .delete(filings::itr::delete)
        )
        .route("/filings/itr/:filing_id/status", post(filings::itr::status))
        .route(
            "/filings/gst",
            get(filings::gst::list)
                .post(filings::gst::create)
        )
        .route(
            "/filings/gst/:filing_id",
            get(filings::gst::retrieve)
                .patch(filings::gst::update)
                .delete(filings::gst::delete)
        )
        .route("/filings/gst/:filing_id/status", post(filings::gst::status))
        .route(
            "/documents",
            get(documents::list)
                .post(documents::upload)
        )
        .route(
            "/documents/:document_id",
            get(documents::retrieve)
                .delete(documents::delete)
        )
        .route("/documents/:document_id/dl", get(documents::download))
        .route("/documents/:document_id/verify", post(documents::verify))
        .route(
            "/tickets",
            get(tickets::list)
                .post(tickets::create)
        )
        .route(
            "/tickets/:ticket_id",
            get(tickets::retrieve)
                .patch(tickets::update)
        )
        .route(
            "/payments",
            get(payments::list)
                .post(payments::create)
        )
        .fallback(not_found)
}
