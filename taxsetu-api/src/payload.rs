use http::StatusCode;
use axum_core::response::{Response, IntoResponse};
use serde::{Serialize, Deserialize};

use taxsetu_lib::query::{Limit, Page};

use crate::response::{serialize_json, error_json};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: Page,
    pub limit: i64,
    pub total: i64,
}

impl From<(Page, Limit, i64)> for Pagination {
    fn from((page, limit, total): (Page, Limit, i64)) -> Self {
        Pagination {
            page,
            limit: limit.as_i64(),
            total
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Payload<T> {
    #[serde(default, skip_serializing_if = "Option::is_none", flatten)]
    pagination: Option<Pagination>,

    payload: T
}

impl<T> Payload<T> {
    pub fn new(payload: T) -> Self {
        Self {
            pagination: None,
            payload
        }
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn set_pagination<P>(mut self, p: P) -> Self
    where
        P: Into<Pagination>
    {
        self.pagination = Some(p.into());
        self
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T> IntoResponse for Payload<T>
where
    T: Serialize
{
    fn into_response(self) -> Response {
        match serialize_json(StatusCode::OK, &self) {
            Ok(res) => res,
            Err(err) => {
                tracing::error!("failed serializing response payload: {err}");

                error_json()
            }
        }
    }
}
