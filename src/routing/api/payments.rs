use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use taxsetu_api::{Payload, Validator};
use taxsetu_api::payments::CreatePayment;

use crate::db;
use crate::net::error;
use crate::payment::Payment;
use crate::routing::query::PaginationQuery;
use crate::sec::authn::Initiator;

pub async fn list(
    db::Conn(conn): db::Conn,
    initiator: Initiator,
    Query(query): Query<PaginationQuery>,
) -> error::Result<impl IntoResponse> {
    let limit = query.limit();

    let (found, total) = Payment::query_user(
        &conn,
        &initiator.user.id,
        query.page,
        limit,
    ).await?;

    let list: Vec<_> = found.into_iter()
        .map(Payment::into_api)
        .collect();

    Ok(Payload::new(list).set_pagination((query.page, limit, total)))
}

pub async fn create(
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    axum::Json(json): axum::Json<CreatePayment>,
) -> error::Result<impl IntoResponse> {
    json.validate()?;

    let transaction = conn.transaction().await?;

    let created = Payment::create(
        &transaction,
        &initiator.user.id,
        json.purpose,
        json.amount,
    ).await?;

    transaction.commit().await?;

    tracing::info!(
        user_id = initiator.user.id,
        payment_id = created.id,
        reference = %created.reference,
        "created payment"
    );

    Ok((
        StatusCode::CREATED,
        Payload::new(created.into_api())
    ))
}
