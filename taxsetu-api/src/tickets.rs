use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use taxsetu_lib::ids;
use taxsetu_lib::tickets::{TicketStatus, TicketPriority};

use crate::{Validator, ApiError, ApiErrorKind, Detail};
use crate::error::GeneralKind;

#[derive(Debug, Serialize, Deserialize)]
pub struct Ticket {
    pub id: ids::TicketId,
    pub user_id: ids::UserId,
    pub subject: String,
    pub body: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTicket {
    pub subject: String,
    pub body: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
}

impl Validator for CreateTicket {
    fn validate(&self) -> Result<(), ApiError> {
        let mut invalid = Vec::new();

        if !taxsetu_lib::tickets::subject_valid(&self.subject) {
            invalid.push("subject");
        }

        if self.body.is_empty() || self.body.chars().count() > taxsetu_lib::tickets::MAX_BODY_CHARS {
            invalid.push("body");
        }

        if !invalid.is_empty() {
            Err(ApiError::from((
                ApiErrorKind::General(GeneralKind::ValidationFailed),
                Detail::mult_keys(invalid)
            )))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateTicket {
    pub status: TicketStatus,
}
