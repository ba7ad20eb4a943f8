use serde::{Serialize, Deserialize};

use crate::{Validator, ApiError, ApiErrorKind, Detail};
use crate::error::GeneralKind;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Validator for RegisterUser {
    fn validate(&self) -> Result<(), ApiError> {
        let mut invalid = Vec::new();

        if !taxsetu_lib::users::name_valid(&self.name) {
            invalid.push("name");
        }

        if !taxsetu_lib::users::email_valid(&self.email) {
            invalid.push("email");
        }

        if !taxsetu_lib::users::password_valid(&self.password) {
            invalid.push("password");
        }

        if let Some(phone) = &self.phone {
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
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

impl Validator for LoginUser {
    fn validate(&self) -> Result<(), ApiError> {
        if self.email.is_empty() || self.password.is_empty() {
            Err(ApiError::from((
                ApiErrorKind::General(GeneralKind::MissingData),
                Detail::mult_keys(["email", "password"])
            )))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangePassword {
    pub current: String,
    pub updated: String,
}

impl Validator for ChangePassword {
    fn validate(&self) -> Result<(), ApiError> {
        if !taxsetu_lib::users::password_valid(&self.updated) {
            Err(ApiError::from((
                ApiErrorKind::General(GeneralKind::ValidationFailed),
                Detail::with_key("updated")
            )))
        } else {
            Ok(())
        }
    }
}
