use axum::extract::Path;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use taxsetu_api::{Payload, Validator};
use taxsetu_api::filings::{FilingList, TransitionRequest};
use taxsetu_api::filings::gst::{CreateGstFiling, UpdateGstFiling};
use taxsetu_lib::ids;
use taxsetu_lib::filing::{FilingKind, FilingStatus, GstReturnType};
use taxsetu_lib::query::Page;

use crate::db;
use crate::filing::{self, GstFiling, TransitionData};
use crate::net::error;
use crate::sec::authn::Initiator;

use super::require_staff;

#[derive(Deserialize)]
pub struct PathParams {
    filing_id: ids::FilingId,
}

#[derive(Deserialize)]
pub struct ListQuery {
    status: Option<FilingStatus>,
    return_type: Option<GstReturnType>,
    period: Option<String>,

    #[serde(default)]
    page: Page,
    limit: Option<u8>,
}

pub async fn list(
    db::Conn(conn): db::Conn,
    initiator: Initiator,
    Query(query): Query<ListQuery>,
) -> error::Result<impl IntoResponse> {
    let limit = taxsetu_lib::query::Limit::from_query(query.limit);

    let (filings, total) = GstFiling::query_user(
        &conn,
        &initiator.user.id,
        query.status,
        query.return_type,
        query.period.as_deref(),
        query.page,
        limit,
    ).await?;

    let summary = filing::status_counts(&conn, FilingKind::Gst, &initiator.user.id).await?;

    let list = FilingList {
        filings: filings.into_iter()
            .map(GstFiling::into_api)
            .collect(),
        summary,
    };

    Ok(Payload::new(list).set_pagination((query.page, limit, total)))
}

pub async fn create(
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    axum::Json(json): axum::Json<CreateGstFiling>,
) -> error::Result<impl IntoResponse> {
    json.validate()?;

    let transaction = conn.transaction().await?;

    let created = GstFiling::create(
        &transaction,
        &initiator.user.id,
        &json.gstin,
        json.return_type,
        &json.period,
        json.form_data,
    ).await?;

    transaction.commit().await?;

    tracing::info!(user_id = initiator.user.id, filing_id = created.id, "created gst filing");

    Ok((
        StatusCode::CREATED,
        Payload::new(created.into_api())
    ))
}

pub async fn retrieve(
    db::Conn(conn): db::Conn,
    initiator: Initiator,
    Path(PathParams { filing_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let Some(found) = GstFiling::retrieve(&conn, &filing_id).await? else {
        return Err(error::Error::api(error::FilingKind::NotFound));
    };

    if found.user_id != initiator.user.id && !initiator.user.is_staff() {
        return Err(error::Error::api(error::AuthKind::PermissionDenied));
    }

    Ok(Payload::new(found.into_api()))
}

pub async fn update(
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    Path(PathParams { filing_id }): Path<PathParams>,
    axum::Json(json): axum::Json<UpdateGstFiling>,
) -> error::Result<impl IntoResponse> {
    json.assert_ok()?;

    let Some(found) = GstFiling::retrieve(&conn, &filing_id).await? else {
        return Err(error::Error::api(error::FilingKind::NotFound));
    };

    if found.user_id != initiator.user.id {
        return Err(error::Error::api(error::AuthKind::PermissionDenied));
    }

    let transaction = conn.transaction().await?;

    if let Some(form_data) = &json.form_data {
        if !GstFiling::update_draft_form(&transaction, &filing_id, form_data).await? {
            return Err(error::Error::api(error::FilingKind::NotEditable));
        }
    }

    if let Some(remarks) = &json.remarks {
        let applied = filing::update_remarks(
            &transaction,
            FilingKind::Gst,
            &filing_id,
            remarks.as_deref(),
        ).await?;

        if !applied {
            return Err(error::Error::api(error::FilingKind::NotEditable));
        }
    }

    if let Some(status) = json.status {
        filing::transition(
            &transaction,
            FilingKind::Gst,
            &filing_id,
            found.status,
            status,
            TransitionData::default(),
        ).await?;

        tracing::info!(user_id = initiator.user.id, filing_id, "gst filing submitted for review");
    }

    transaction.commit().await?;

    let Some(updated) = GstFiling::retrieve(&conn, &filing_id).await? else {
        return Err(error::Error::api(error::FilingKind::NotFound));
    };

    Ok(Payload::new(updated.into_api()))
}

pub async fn delete(
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    Path(PathParams { filing_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let Some(found) = GstFiling::retrieve(&conn, &filing_id).await? else {
        return Err(error::Error::api(error::FilingKind::NotFound));
    };

    if found.user_id != initiator.user.id {
        return Err(error::Error::api(error::AuthKind::PermissionDenied));
    }

    let transaction = conn.transaction().await?;

    if !filing::delete_draft(&transaction, FilingKind::Gst, &filing_id).await? {
        return Err(error::Error::api(error::FilingKind::NotDraft));
    }

    transaction.commit().await?;

    tracing::info!(user_id = initiator.user.id, filing_id, "deleted gst draft");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn status(
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    Path(PathParams { filing_id }): Path<PathParams>,
    axum::Json(json): axum::Json<TransitionRequest>,
) -> error::Result<impl IntoResponse> {
    require_staff(&initiator)?;

    json.validate()?;

    let Some(found) = GstFiling::retrieve(&conn, &filing_id).await? else {
        return Err(error::Error::api(error::FilingKind::NotFound));
    };

    // refunds are an income tax concept. the transition graph for GST
    // filings has no edge out of COMPLETED, so make the failure explicit
    if json.status == FilingStatus::RefundInitiated {
        return Err(error::Error::api(error::FilingKind::RefundUnavailable));
    }

    let transaction = conn.transaction().await?;

    filing::transition(
        &transaction,
        FilingKind::Gst,
        &filing_id,
        found.status,
        json.status,
        TransitionData {
            rejection_reason: json.reason.as_deref(),
            acknowledgment_no: json.acknowledgment_no.as_deref(),
        },
    ).await?;

    transaction.commit().await?;

    tracing::info!(
        staff_id = initiator.user.id,
        filing_id,
        status = %json.status,
        "gst filing transitioned"
    );

    let Some(updated) = GstFiling::retrieve(&conn, &filing_id).await? else {
        return Err(error::Error::api(error::FilingKind::NotFound));
    };

    Ok(Payload::new(updated.into_api()))
}
