use std::future::Future;
use std::pin::Pin;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

pub use deadpool_postgres::Object;

use crate::config;
use crate::error;
use crate::net::error::Error as NetError;
use crate::state::ArcShared;

pub fn from_config(config: &config::Config) -> error::Result<Pool> {
    let db = &config.settings.db;

    let mut pg_config = tokio_postgres::Config::new();
    pg_config.user(db.user.as_str());
    pg_config.host(db.host.as_str());
    pg_config.port(db.port);
    pg_config.dbname(db.dbname.as_str());

    if let Some(password) = &db.password {
        pg_config.password(password.as_str());
    }

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast
        }
    );

    Ok(Pool::builder(manager)
        .max_size(db.pool_size)
        .build()?)
}

pub struct Conn(pub Object);

impl FromRequestParts<ArcShared> for Conn {
    type Rejection = NetError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        _parts: &'life0 mut Parts,
        state: &'life1 ArcShared
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait
    {
        let fut = state.pool().get();

        Box::pin(async move {
            match fut.await {
                Ok(obj) => Ok(Conn(obj)),
                Err(err) => Err(NetError::from(err)
                    .context("failed to retrieve database connection"))
            }
        })
    }
}
