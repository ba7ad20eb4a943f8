use axum::extract::Path;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use taxsetu_api::{Payload, Validator};
use taxsetu_api::filings::{FilingList, TransitionRequest};
use taxsetu_api::filings::itr::{CreateItrFiling, UpdateItrFiling};
use taxsetu_lib::ids;
use taxsetu_lib::filing::{FilingKind, FilingStatus};
use taxsetu_lib::query::Page;

use crate::db;
use crate::filing::{self, ItrFiling, TransitionData};
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
    assessment_year: Option<String>,

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

    let (filings, total) = ItrFiling::query_user(
        &conn,
        &initiator.user.id,
        query.status,
        query.assessment_year.as_deref(),
        query.page,
        limit,
    ).await?;

    let summary = filing::status_counts(&conn, FilingKind::Itr, &initiator.user.id).await?;

    let list = FilingList {
        filings: filings.into_iter()
            .map(ItrFiling::into_api)
            .collect(),
        summary,
    };

    Ok(Payload::new(list).set_pagination((query.page, limit, total)))
}

pub async fn create(
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    axum::Json(json): axum::Json<CreateItrFiling>,
) -> error::Result<impl IntoResponse> {
    json.validate()?;

    let transaction = conn.transaction().await?;

    let created = ItrFiling::create(
        &transaction,
        &initiator.user.id,
        &json.pan,
        &json.assessment_year,
        json.form_data,
    ).await?;

    transaction.commit().await?;

    tracing::info!(user_id = initiator.user.id, filing_id = created.id, "created itr filing");

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
    let Some(found) = ItrFiling::retrieve(&conn, &filing_id).await? else {
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
    axum::Json(json): axum::Json<UpdateItrFiling>,
) -> error::Result<impl IntoResponse> {
    json.assert_ok()?;

    let Some(found) = ItrFiling::retrieve(&conn, &filing_id).await? else {
        return Err(error::Error::api(error::FilingKind::NotFound));
    };

    if found.user_id != initiator.user.id {
        return Err(error::Error::api(error::AuthKind::PermissionDenied));
    }

    let transaction = conn.transaction().await?;

    if let Some(form_data) = &json.form_data {
        // conditional on DRAFT, so a concurrent submit cannot race content
        // back into a filing under review
        if !ItrFiling::update_draft_form(&transaction, &filing_id, form_data).await? {
            return Err(error::Error::api(error::FilingKind::NotEditable));
        }
    }

    if let Some(remarks) = &json.remarks {
        let applied = filing::update_remarks(
            &transaction,
            FilingKind::Itr,
            &filing_id,
            remarks.as_deref(),
        ).await?;

        if !applied {
            return Err(error::Error::api(error::FilingKind::NotEditable));
        }
    }

    if let Some(status) = json.status {
        // the validator only lets DOCUMENTS_PENDING through here. the owner
        // submit is the one transition the owner may trigger
        filing::transition(
            &transaction,
            FilingKind::Itr,
            &filing_id,
            found.status,
            status,
            TransitionData::default(),
        ).await?;

        tracing::info!(user_id = initiator.user.id, filing_id, "itr filing submitted for review");
    }

    transaction.commit().await?;

    let Some(updated) = ItrFiling::retrieve(&conn, &filing_id).await? else {
        return Err(error::Error::api(error::FilingKind::NotFound));
    };

    Ok(Payload::new(updated.into_api()))
}

pub async fn delete(
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    Path(PathParams { filing_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let Some(found) = ItrFiling::retrieve(&conn, &filing_id).await? else {
        return Err(error::Error::api(error::FilingKind::NotFound));
    };

    if found.user_id != initiator.user.id {
        return Err(error::Error::api(error::AuthKind::PermissionDenied));
    }

    let transaction = conn.transaction().await?;

    if !filing::delete_draft(&transaction, FilingKind::Itr, &filing_id).await? {
        return Err(error::Error::api(error::FilingKind::NotDraft));
    }

    transaction.commit().await?;

    tracing::info!(user_id = initiator.user.id, filing_id, "deleted itr draft");

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

    let Some(found) = ItrFiling::retrieve(&conn, &filing_id).await? else {
        return Err(error::Error::api(error::FilingKind::NotFound));
    };

    if json.status == FilingStatus::RefundInitiated {
        let computed = filing::tax::compute_itr(&found.form_data);

        if computed.refund_due <= rust_decimal::Decimal::ZERO {
            return Err(error::Error::api(error::FilingKind::RefundUnavailable));
        }
    }

    let transaction = conn.transaction().await?;

    filing::transition(
        &transaction,
        FilingKind::Itr,
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
        "itr filing transitioned"
    );

    let Some(updated) = ItrFiling::retrieve(&conn, &filing_id).await? else {
        return Err(error::Error::api(error::FilingKind::NotFound));
    };

    Ok(Payload::new(updated.into_api()))
}
