use serde::{Serialize, Deserialize};

use taxsetu_lib::filing::FilingStatus;

use crate::{Validator, ApiError, ApiErrorKind, Detail};
use crate::error::FilingKind;

pub mod itr;
pub mod gst;

/// per-status row counts returned alongside filing listings
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: FilingStatus,
    pub count: i64,
}

/// a page of filings plus the per-status summary for the owning user
#[derive(Debug, Serialize, Deserialize)]
pub struct FilingList<T> {
    pub filings: Vec<T>,
    pub summary: Vec<StatusCount>,
}

/// a staff/system driven status change. rejections carry the reason, the
/// move into FILED carries the acknowledgment number issued by the authority
#[derive(Debug, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: FilingStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledgment_no: Option<String>,
}

impl Validator for TransitionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        match self.status {
            FilingStatus::Rejected => {
                let missing = match &self.reason {
                    Some(reason) => reason.trim().is_empty(),
                    None => true
                };

                if missing {
                    return Err(ApiError::from((
                        ApiErrorKind::Filing(FilingKind::RejectionReasonRequired),
                        Detail::with_key("reason")
                    )));
                }
            }
            FilingStatus::Filed => {
                let missing = match &self.acknowledgment_no {
                    Some(ack) => ack.trim().is_empty(),
                    None => true
                };

                if missing {
                    return Err(ApiError::from((
                        ApiErrorKind::Filing(FilingKind::AcknowledgmentRequired),
                        Detail::with_key("acknowledgment_no")
                    )));
                }
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn request(status: FilingStatus) -> TransitionRequest {
        TransitionRequest {
            status,
            reason: None,
            acknowledgment_no: None,
        }
    }

    #[test]
    fn rejection_requires_a_reason() {
        assert!(request(FilingStatus::Rejected).validate().is_err());

        let mut with_blank = request(FilingStatus::Rejected);
        with_blank.reason = Some(String::from("   "));

        assert!(with_blank.validate().is_err());

        let mut with_reason = request(FilingStatus::Rejected);
        with_reason.reason = Some(String::from("blurry scan"));

        assert!(with_reason.validate().is_ok());
    }

    #[test]
    fn filing_requires_an_acknowledgment() {
        assert!(request(FilingStatus::Filed).validate().is_err());

        let mut with_ack = request(FilingStatus::Filed);
        with_ack.acknowledgment_no = Some(String::from("ACK1234567890"));

        assert!(with_ack.validate().is_ok());
    }

    #[test]
    fn plain_forward_moves_need_nothing_extra() {
        assert!(request(FilingStatus::UnderReview).validate().is_ok());
        assert!(request(FilingStatus::Completed).validate().is_ok());
    }
}
