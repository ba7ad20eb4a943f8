use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use taxsetu_lib::ids;
use taxsetu_lib::serde::nested_option;
use taxsetu_lib::users::{UserRole, UserStatus};

use crate::{Validator, ApiError, ApiErrorKind, Detail};
use crate::error::GeneralKind;

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub id: ids::UserId,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nested_option", skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
}

impl Validator for UpdateUser {
    fn validate(&self) -> Result<(), ApiError> {
        let mut invalid = Vec::new();

        if let Some(name) = &self.name {
            if !taxsetu_lib::users::name_valid(name) {
                invalid.push("name");
            }
        }

        if let Some(Some(phone)) = &self.phone {
            if !taxsetu_lib::users::phone_valid(phone) {
                invalid.push("phone");
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
        self.name.is_some() || self.phone.is_some()
    }
}
