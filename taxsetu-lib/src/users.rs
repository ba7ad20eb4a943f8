use email_address::EmailAddress;
use serde::{Serialize, Deserialize};

use crate::validation::{check_control_whitespace, check_control_leading_trailing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Staff,
}

impl UserRole {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(UserRole::User),
            1 => Some(UserRole::Staff),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            UserRole::User => 0,
            UserRole::Staff => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Suspended,
    PendingVerification,
}

impl UserStatus {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(UserStatus::Active),
            1 => Some(UserStatus::Suspended),
            2 => Some(UserStatus::PendingVerification),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            UserStatus::Active => 0,
            UserStatus::Suspended => 1,
            UserStatus::PendingVerification => 2,
        }
    }
}

pub const MAX_NAME_CHARS: usize = 128;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_PASSWORD_CHARS: usize = 128;

pub fn name_valid(given: &str) -> bool {
    !given.is_empty() && check_control_leading_trailing(given, Some(MAX_NAME_CHARS))
}

pub fn email_valid(given: &str) -> bool {
    EmailAddress::is_valid(given)
}

/// Indian mobile numbers: ten digits, optionally prefixed with +91
pub fn phone_valid(given: &str) -> bool {
    let digits = given.strip_prefix("+91").unwrap_or(given);

    digits.len() == 10 && digits.chars().all(|ch| ch.is_ascii_digit())
}

pub fn password_valid(given: &str) -> bool {
    let count = given.chars().count();

    count >= MIN_PASSWORD_CHARS
        && count <= MAX_PASSWORD_CHARS
        && check_control_whitespace(given, Some(MAX_PASSWORD_CHARS))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn phone_formats() {
        assert!(phone_valid("9876543210"));
        assert!(phone_valid("+919876543210"));
        assert!(!phone_valid("98765"));
        assert!(!phone_valid("98765432ab"));
    }

    #[test]
    fn password_length_bounds() {
        assert!(!password_valid("Aa1!aaa"));
        assert!(password_valid("Aa1!aaaa"));
    }
}
