use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use taxsetu_api::{Payload, Validator};
use taxsetu_api::auth::{RegisterUser, LoginUser, ChangePassword};
use taxsetu_lib::users::UserStatus;

use crate::net::error::{self, Detail};
use crate::sec::authn::{password, session};
use crate::sec::authn::initiator::{self, Initiator, LookupError};
use crate::sql;
use crate::state::ArcShared;
use crate::user;

pub async fn register(
    State(state): State<ArcShared>,
    axum::Json(json): axum::Json<RegisterUser>,
) -> error::Result<impl IntoResponse> {
    json.validate()?;

    let mut conn = state.pool().get().await?;
    let transaction = conn.transaction().await?;

    let created = match user::User::create(
        &transaction,
        &json.email,
        &json.name,
        json.phone.as_deref()
    ).await {
        Ok(created) => created,
        Err(err) => {
            if sql::unique_constraint_error(&err) == Some("users_email_key") {
                return Err(error::Error::api((
                    error::UserKind::EmailInUse,
                    Detail::with_key("email")
                )));
            }

            return Err(err.into());
        }
    };

    password::Password::create(&transaction, &created.id, &json.password).await?;

    transaction.commit().await?;

    tracing::info!(user_id = created.id, "registered user");

    Ok((
        StatusCode::CREATED,
        Payload::new(created.into_api())
    ))
}

pub async fn login(
    State(state): State<ArcShared>,
    headers: HeaderMap,
    axum::Json(json): axum::Json<LoginUser>,
) -> error::Result<impl IntoResponse> {
    json.validate()?;

    let mut conn = state.pool().get().await?;

    match initiator::lookup_header_map(state.sec(), &conn, &headers).await {
        Ok(_) => {
            return Err(error::Error::api(error::AuthKind::AlreadyAuthenticated));
        },
        Err(LookupError::Database(err)) => {
            return Err(err.into());
        },
        // a stale or damaged cookie does not block a fresh login
        Err(_) => {}
    }

    // the same failure for an unknown email and a wrong password, nothing to
    // enumerate accounts with
    let Some(found) = user::User::retrieve_email(&conn, &json.email).await? else {
        return Err(error::Error::api(error::AuthKind::InvalidCredentials));
    };

    let Some(stored) = password::Password::retrieve(&conn, &found.id).await? else {
        return Err(error::Error::api(error::AuthKind::InvalidCredentials));
    };

    if !stored.verify(&json.password)? {
        return Err(error::Error::api(error::AuthKind::InvalidCredentials));
    }

    if found.status == UserStatus::Suspended {
        return Err(error::Error::api(error::AuthKind::AccountSuspended));
    }

    let transaction = conn.transaction().await?;

    let mut builder = session::Session::builder(found.id);

    if let Some(user_agent) = headers.get("user-agent") {
        if let Ok(value) = user_agent.to_str() {
            builder.user_agent(value);
        }
    }

    let created = builder.build(&transaction).await?;

    transaction.commit().await?;

    let session_cookie = session::create_session_cookie(state.sec(), &created);

    tracing::info!(user_id = found.id, "user login");

    Ok((
        StatusCode::OK,
        session_cookie,
        Payload::new(found.into_api()),
    ))
}

pub async fn logout(
    State(state): State<ArcShared>,
    headers: HeaderMap,
) -> error::Result<impl IntoResponse> {
    let mut conn = state.pool().get().await?;

    let found = match initiator::lookup_header_map(state.sec(), &conn, &headers).await {
        Ok(initiator) => Some(initiator.session),
        Err(LookupError::Database(err)) => {
            return Err(err.into());
        },
        // deleting a session that is already gone is not an error
        Err(_) => None
    };

    if let Some(session) = found {
        let transaction = conn.transaction().await?;

        session.delete(&transaction).await?;

        transaction.commit().await?;

        tracing::info!(user_id = session.user_id, "user logout");
    }

    Ok((
        StatusCode::NO_CONTENT,
        session::expire_session_cookie(state.sec()),
        (),
    ))
}

pub async fn verify(
    initiator: Initiator,
) -> error::Result<impl IntoResponse> {
    Ok(Payload::new(initiator.user.into_api()))
}

pub async fn password(
    State(state): State<ArcShared>,
    initiator: Initiator,
    axum::Json(json): axum::Json<ChangePassword>,
) -> error::Result<impl IntoResponse> {
    json.validate()?;

    let mut conn = state.pool().get().await?;

    let Some(mut stored) = password::Password::retrieve(&conn, &initiator.user.id).await? else {
        return Err(error::Error::new()
            .source("user is missing an auth_password row"));
    };

    if !stored.verify(&json.current)? {
        return Err(error::Error::api(error::AuthKind::InvalidCredentials));
    }

    let transaction = conn.transaction().await?;

    // replaces the stored hash outright. sessions issued before the change
    // stay valid until they expire
    stored.update(&transaction, &json.updated).await?;

    transaction.commit().await?;

    tracing::info!(user_id = initiator.user.id, "password changed");

    Ok(StatusCode::NO_CONTENT)
}
