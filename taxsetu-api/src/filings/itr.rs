use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Deserialize};

use taxsetu_lib::ids;
use taxsetu_lib::filing::FilingStatus;
use taxsetu_lib::serde::nested_option;

use crate::{Validator, ApiError, ApiErrorKind, Detail};
use crate::error::GeneralKind;

/// income and deduction figures entered by the taxpayer. amounts are
/// decimals serialized as strings so currency values survive the wire
/// without float coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItrFormData {
    #[serde(default)]
    pub salary_income: Decimal,
    #[serde(default)]
    pub business_income: Decimal,
    #[serde(default)]
    pub capital_gains: Decimal,
    #[serde(default)]
    pub other_income: Decimal,

    #[serde(default)]
    pub deduction_80c: Decimal,
    #[serde(default)]
    pub deduction_80d: Decimal,
    #[serde(default)]
    pub home_loan_interest: Decimal,

    #[serde(default)]
    pub tds_deducted: Decimal,
}

impl ItrFormData {
    fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();

        for (key, value) in [
            ("salary_income", &self.salary_income),
            ("business_income", &self.business_income),
            ("capital_gains", &self.capital_gains),
            ("other_income", &self.other_income),
            ("deduction_80c", &self.deduction_80c),
            ("deduction_80d", &self.deduction_80d),
            ("home_loan_interest", &self.home_loan_interest),
            ("tds_deducted", &self.tds_deducted),
        ] {
            if value.is_sign_negative() {
                invalid.push(key);
            }
        }

        invalid
    }
}

impl Default for ItrFormData {
    fn default() -> Self {
        ItrFormData {
            salary_income: Decimal::ZERO,
            business_income: Decimal::ZERO,
            capital_gains: Decimal::ZERO,
            other_income: Decimal::ZERO,
            deduction_80c: Decimal::ZERO,
            deduction_80d: Decimal::ZERO,
            home_loan_interest: Decimal::ZERO,
            tds_deducted: Decimal::ZERO,
        }
    }
}

/// derived totals. pure function of the form data, recomputed on read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItrComputation {
    pub gross_income: Decimal,
    pub standard_deduction: Decimal,
    pub total_deductions: Decimal,
    pub taxable_income: Decimal,
    pub slab_tax: Decimal,
    pub rebate: Decimal,
    pub cess: Decimal,
    pub total_tax: Decimal,
    pub tds_deducted: Decimal,
    pub tax_payable: Decimal,
    pub refund_due: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItrFiling {
    pub id: ids::FilingId,
    pub user_id: ids::UserId,
    pub pan: String,
    pub assessment_year: String,
    pub form_data: ItrFormData,
    pub status: FilingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledgment_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computation: Option<ItrComputation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateItrFiling {
    pub pan: String,
    pub assessment_year: String,

    #[serde(default)]
    pub form_data: ItrFormData,
}

impl Validator for CreateItrFiling {
    fn validate(&self) -> Result<(), ApiError> {
        let mut invalid = Vec::new();

        if !taxsetu_lib::tax::pan_valid(&self.pan) {
            invalid.push("pan");
        }

        if !taxsetu_lib::tax::assessment_year_valid(&self.assessment_year) {
            invalid.push("assessment_year");
        }

        invalid.extend(self.form_data.invalid_fields());

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

/// owner-side update. form data is writable while the filing is a draft,
/// remarks until a terminal state, and the only status an owner may request
/// is the submit for review
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateItrFiling {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<ItrFormData>,

    #[serde(default, deserialize_with = "nested_option", skip_serializing_if = "Option::is_none")]
    pub remarks: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FilingStatus>,
}

impl Validator for UpdateItrFiling {
    fn validate(&self) -> Result<(), ApiError> {
        let mut invalid = Vec::new();

        if let Some(form_data) = &self.form_data {
            invalid.extend(form_data.invalid_fields());
        }

        if let Some(status) = &self.status {
            if *status != FilingStatus::DocumentsPending {
                invalid.push("status");
            }
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

    fn has_work(&self) -> bool {
        self.form_data.is_some() || self.remarks.is_some() || self.status.is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn form_data_survives_the_wire_exactly() {
        let form = ItrFormData {
            salary_income: "1200000.55".parse().unwrap(),
            deduction_80c: "150000.01".parse().unwrap(),
            ..Default::default()
        };

        let json = serde_json::to_string(&form).unwrap();

        // currency amounts travel as strings, never floats
        assert!(json.contains("\"1200000.55\""), "{json}");

        let back: ItrFormData = serde_json::from_str(&json).unwrap();

        assert_eq!(back, form);
    }

    #[test]
    fn create_rejects_bad_identity_fields() {
        let create = CreateItrFiling {
            pan: String::from("not-a-pan"),
            assessment_year: String::from("2024-26"),
            form_data: Default::default(),
        };

        assert!(create.validate().is_err());
    }

    #[test]
    fn negative_amounts_rejected() {
        let create = CreateItrFiling {
            pan: String::from("ABCDE1234F"),
            assessment_year: String::from("2024-25"),
            form_data: ItrFormData {
                salary_income: "-1".parse().unwrap(),
                ..Default::default()
            },
        };

        assert!(create.validate().is_err());
    }

    #[test]
    fn owner_may_only_request_submit() {
        let update = UpdateItrFiling {
            form_data: None,
            remarks: None,
            status: Some(FilingStatus::Filed),
        };

        assert!(update.validate().is_err());

        let update = UpdateItrFiling {
            form_data: None,
            remarks: None,
            status: Some(FilingStatus::DocumentsPending),
        };

        assert!(update.validate().is_ok());
    }
}
