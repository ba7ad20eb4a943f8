use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Deserialize};

use taxsetu_lib::ids;
use taxsetu_lib::payments::{PaymentStatus, PaymentPurpose};

use crate::{Validator, ApiError, ApiErrorKind, Detail};
use crate::error::GeneralKind;

#[derive(Debug, Serialize, Deserialize)]
pub struct Payment {
    pub id: ids::PaymentId,
    pub user_id: ids::UserId,
    pub purpose: PaymentPurpose,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub reference: String,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePayment {
    pub purpose: PaymentPurpose,
    pub amount: Decimal,
}

impl Validator for CreatePayment {
    fn validate(&self) -> Result<(), ApiError> {
        if self.amount <= Decimal::ZERO {
            Err(ApiError::from((
                ApiErrorKind::General(GeneralKind::ValidationFailed),
                Detail::with_key("amount")
            )))
        } else {
            Ok(())
        }
    }
}
