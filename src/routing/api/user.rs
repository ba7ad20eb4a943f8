use axum::response::IntoResponse;

use taxsetu_api::{Payload, Validator};
use taxsetu_api::users::UpdateUser;

use crate::db;
use crate::net::error;
use crate::sec::authn::Initiator;

pub async fn retrieve(
    initiator: Initiator,
) -> error::Result<impl IntoResponse> {
    Ok(Payload::new(initiator.user.into_api()))
}

pub async fn update(
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    axum::Json(json): axum::Json<UpdateUser>,
) -> error::Result<impl IntoResponse> {
    json.assert_ok()?;

    let mut user = initiator.user;

    if let Some(name) = json.name {
        user.name = name;
    }

    if let Some(phone) = json.phone {
        user.phone = phone;
    }

    let transaction = conn.transaction().await?;

    user.update(&transaction).await?;

    transaction.commit().await?;

    Ok(Payload::new(user.into_api()))
}
