use serde::{Serialize, Deserialize};

use crate::validation::check_control_leading_trailing;

pub const MAX_SUBJECT_CHARS: usize = 200;
pub const MAX_BODY_CHARS: usize = 5000;

pub fn subject_valid(given: &str) -> bool {
    !given.is_empty() && check_control_leading_trailing(given, Some(MAX_SUBJECT_CHARS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(TicketStatus::Open),
            1 => Some(TicketStatus::InProgress),
            2 => Some(TicketStatus::Resolved),
            3 => Some(TicketStatus::Closed),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            TicketStatus::Open => 0,
            TicketStatus::InProgress => 1,
            TicketStatus::Resolved => 2,
            TicketStatus::Closed => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

impl TicketPriority {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(TicketPriority::Low),
            1 => Some(TicketPriority::Medium),
            2 => Some(TicketPriority::High),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            TicketPriority::Low => 0,
            TicketPriority::Medium => 1,
            TicketPriority::High => 2,
        }
    }
}
