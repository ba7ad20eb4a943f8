use serde::Deserialize;

use taxsetu_lib::query::{Limit, Page};

/// the common page + limit pair accepted by listing endpoints. the raw limit
/// is coerced to the closest permitted page size
#[derive(Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub page: Page,

    pub limit: Option<u8>,
}

impl PaginationQuery {
    pub fn limit(&self) -> Limit {
        Limit::from_query(self.limit)
    }
}
