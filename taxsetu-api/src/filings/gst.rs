use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Deserialize};

use taxsetu_lib::ids;
use taxsetu_lib::filing::{FilingStatus, GstReturnType};
use taxsetu_lib::serde::nested_option;

use crate::{Validator, ApiError, ApiErrorKind, Detail};
use crate::error::GeneralKind;

/// outward supply figures with the tax already charged, plus the input tax
/// credit claimed on inward supplies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstFormData {
    #[serde(default)]
    pub outward_taxable_value: Decimal,
    #[serde(default)]
    pub outward_cgst: Decimal,
    #[serde(default)]
    pub outward_sgst: Decimal,
    #[serde(default)]
    pub outward_igst: Decimal,

    #[serde(default)]
    pub inward_taxable_value: Decimal,
    #[serde(default)]
    pub itc_cgst: Decimal,
    #[serde(default)]
    pub itc_sgst: Decimal,
    #[serde(default)]
    pub itc_igst: Decimal,
}

impl GstFormData {
    fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();

        for (key, value) in [
            ("outward_taxable_value", &self.outward_taxable_value),
            ("outward_cgst", &self.outward_cgst),
            ("outward_sgst", &self.outward_sgst),
            ("outward_igst", &self.outward_igst),
            ("inward_taxable_value", &self.inward_taxable_value),
            ("itc_cgst", &self.itc_cgst),
            ("itc_sgst", &self.itc_sgst),
            ("itc_igst", &self.itc_igst),
        ] {
            if value.is_sign_negative() {
                invalid.push(key);
            }
        }

        invalid
    }
}

impl Default for GstFormData {
    fn default() -> Self {
        GstFormData {
            outward_taxable_value: Decimal::ZERO,
            outward_cgst: Decimal::ZERO,
            outward_sgst: Decimal::ZERO,
            outward_igst: Decimal::ZERO,
            inward_taxable_value: Decimal::ZERO,
            itc_cgst: Decimal::ZERO,
            itc_sgst: Decimal::ZERO,
            itc_igst: Decimal::ZERO,
        }
    }
}

/// net liability after offsetting input tax credit, floored at zero per head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstComputation {
    pub output_tax_total: Decimal,
    pub itc_total: Decimal,
    pub payable_cgst: Decimal,
    pub payable_sgst: Decimal,
    pub payable_igst: Decimal,
    pub total_payable: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GstFiling {
    pub id: ids::FilingId,
    pub user_id: ids::UserId,
    pub gstin: String,
    pub return_type: GstReturnType,
    pub period: String,
    pub form_data: GstFormData,
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
    pub computation: Option<GstComputation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGstFiling {
    pub gstin: String,
    pub return_type: GstReturnType,
    pub period: String,

    #[serde(default)]
    pub form_data: GstFormData,
}

impl Validator for CreateGstFiling {
    fn validate(&self) -> Result<(), ApiError> {
        let mut invalid = Vec::new();

        if !taxsetu_lib::tax::gstin_valid(&self.gstin) {
            invalid.push("gstin");
        }

        if !taxsetu_lib::tax::period_valid(&self.period) {
            invalid.push("period");
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

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateGstFiling {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<GstFormData>,

    #[serde(default, deserialize_with = "nested_option", skip_serializing_if = "Option::is_none")]
    pub remarks: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FilingStatus>,
}

impl Validator for UpdateGstFiling {
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
