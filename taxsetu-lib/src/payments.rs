use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Created,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(PaymentStatus::Created),
            1 => Some(PaymentStatus::Success),
            2 => Some(PaymentStatus::Failed),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            PaymentStatus::Created => 0,
            PaymentStatus::Success => 1,
            PaymentStatus::Failed => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentPurpose {
    FilingFee,
    TaxDue,
    Plan,
}

impl PaymentPurpose {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(PaymentPurpose::FilingFee),
            1 => Some(PaymentPurpose::TaxDue),
            2 => Some(PaymentPurpose::Plan),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            PaymentPurpose::FilingFee => 0,
            PaymentPurpose::TaxDue => 1,
            PaymentPurpose::Plan => 2,
        }
    }
}
