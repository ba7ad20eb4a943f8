use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use taxsetu_lib::ids;
use taxsetu_lib::documents::{DocumentStatus, DocumentType};
use taxsetu_lib::filing::FilingKind;

use crate::{Validator, ApiError, ApiErrorKind, Detail};

#[derive(Debug, Serialize, Deserialize)]
pub struct Document {
    pub id: ids::DocumentId,
    pub user_id: ids::UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_kind: Option<FilingKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_id: Option<ids::FilingId>,
    pub original_name: String,
    pub mime: String,
    pub size: u64,
    pub doc_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_year: Option<String>,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerifyOutcome {
    Verified,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyDocument {
    pub outcome: VerifyOutcome,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Validator for VerifyDocument {
    fn validate(&self) -> Result<(), ApiError> {
        if self.outcome == VerifyOutcome::Rejected {
            let missing = match &self.reason {
                Some(reason) => reason.trim().is_empty(),
                None => true
            };

            if missing {
                return Err(ApiError::from((
                    ApiErrorKind::General(crate::error::GeneralKind::MissingData),
                    Detail::with_key("reason")
                )));
            }
        }

        Ok(())
    }
}
