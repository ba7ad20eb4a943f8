use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use taxsetu_api::{Payload, Validator};
use taxsetu_api::tickets::{CreateTicket, UpdateTicket};
use taxsetu_lib::ids;
use taxsetu_lib::tickets::TicketPriority;

use crate::db;
use crate::net::error;
use crate::routing::query::PaginationQuery;
use crate::sec::authn::Initiator;
use crate::ticket::Ticket;

#[derive(Deserialize)]
pub struct PathParams {
    ticket_id: ids::TicketId,
}

pub async fn list(
    db::Conn(conn): db::Conn,
    initiator: Initiator,
    Query(query): Query<PaginationQuery>,
) -> error::Result<impl IntoResponse> {
    let limit = query.limit();

    let (found, total) = Ticket::query_user(
        &conn,
        &initiator.user.id,
        query.page,
        limit,
    ).await?;

    let list: Vec<_> = found.into_iter()
        .map(Ticket::into_api)
        .collect();

    Ok(Payload::new(list).set_pagination((query.page, limit, total)))
}

pub async fn create(
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    axum::Json(json): axum::Json<CreateTicket>,
) -> error::Result<impl IntoResponse> {
    json.validate()?;

    let priority = json.priority.unwrap_or(TicketPriority::Medium);

    let transaction = conn.transaction().await?;

    let created = Ticket::create(
        &transaction,
        &initiator.user.id,
        &json.subject,
        &json.body,
        priority,
    ).await?;

    transaction.commit().await?;

    tracing::info!(user_id = initiator.user.id, ticket_id = created.id, "opened ticket");

    Ok((
        StatusCode::CREATED,
        Payload::new(created.into_api())
    ))
}

pub async fn retrieve(
    db::Conn(conn): db::Conn,
    initiator: Initiator,
    Path(PathParams { ticket_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let Some(found) = Ticket::retrieve(&conn, &ticket_id).await? else {
        return Err(error::Error::api(error::TicketKind::NotFound));
    };

    if found.user_id != initiator.user.id && !initiator.user.is_staff() {
        return Err(error::Error::api(error::AuthKind::PermissionDenied));
    }

    Ok(Payload::new(found.into_api()))
}

/// support staff drive the ticket workflow. the opener only reads
pub async fn update(
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    Path(PathParams { ticket_id }): Path<PathParams>,
    axum::Json(json): axum::Json<UpdateTicket>,
) -> error::Result<impl IntoResponse> {
    if !initiator.user.is_staff() {
        return Err(error::Error::api(error::AuthKind::PermissionDenied));
    }

    let Some(mut found) = Ticket::retrieve(&conn, &ticket_id).await? else {
        return Err(error::Error::api(error::TicketKind::NotFound));
    };

    let transaction = conn.transaction().await?;

    found.update_status(&transaction, json.status).await?;

    transaction.commit().await?;

    Ok(Payload::new(found.into_api()))
}
