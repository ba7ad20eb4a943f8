use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilingKind {
    Itr,
    Gst,
}

impl FilingKind {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(FilingKind::Itr),
            1 => Some(FilingKind::Gst),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            FilingKind::Itr => 0,
            FilingKind::Gst => 1,
        }
    }
}

#[derive(Debug)]
pub struct UnknownFilingKind;

impl std::fmt::Display for UnknownFilingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("unknown filing kind")
    }
}

impl std::error::Error for UnknownFilingKind {}

impl std::str::FromStr for FilingKind {
    type Err = UnknownFilingKind;

    fn from_str(given: &str) -> Result<Self, Self::Err> {
        match given {
            "ITR" => Ok(FilingKind::Itr),
            "GST" => Ok(FilingKind::Gst),
            _ => Err(UnknownFilingKind)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilingStatus {
    Draft,
    DocumentsPending,
    UnderReview,
    CaAssigned,
    Processing,
    Filed,
    Acknowledged,
    Completed,
    Rejected,
    RefundInitiated,
}

pub const ALL_STATUSES: [FilingStatus; 10] = [
    FilingStatus::Draft,
    FilingStatus::DocumentsPending,
    FilingStatus::UnderReview,
    FilingStatus::CaAssigned,
    FilingStatus::Processing,
    FilingStatus::Filed,
    FilingStatus::Acknowledged,
    FilingStatus::Completed,
    FilingStatus::Rejected,
    FilingStatus::RefundInitiated,
];

impl FilingStatus {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(FilingStatus::Draft),
            1 => Some(FilingStatus::DocumentsPending),
            2 => Some(FilingStatus::UnderReview),
            3 => Some(FilingStatus::CaAssigned),
            4 => Some(FilingStatus::Processing),
            5 => Some(FilingStatus::Filed),
            6 => Some(FilingStatus::Acknowledged),
            7 => Some(FilingStatus::Completed),
            8 => Some(FilingStatus::Rejected),
            9 => Some(FilingStatus::RefundInitiated),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            FilingStatus::Draft => 0,
            FilingStatus::DocumentsPending => 1,
            FilingStatus::UnderReview => 2,
            FilingStatus::CaAssigned => 3,
            FilingStatus::Processing => 4,
            FilingStatus::Filed => 5,
            FilingStatus::Acknowledged => 6,
            FilingStatus::Completed => 7,
            FilingStatus::Rejected => 8,
            FilingStatus::RefundInitiated => 9,
        }
    }

    /// the transition table. every legal next status for a filing of the
    /// given kind currently in `self`
    pub fn allowed_next(&self, kind: FilingKind) -> &'static [FilingStatus] {
        match self {
            FilingStatus::Draft => &[FilingStatus::DocumentsPending, FilingStatus::Rejected],
            FilingStatus::DocumentsPending => &[FilingStatus::UnderReview, FilingStatus::Rejected],
            FilingStatus::UnderReview => &[FilingStatus::CaAssigned, FilingStatus::Rejected],
            FilingStatus::CaAssigned => &[FilingStatus::Processing, FilingStatus::Rejected],
            FilingStatus::Processing => &[FilingStatus::Filed, FilingStatus::Rejected],
            FilingStatus::Filed => &[FilingStatus::Acknowledged, FilingStatus::Rejected],
            FilingStatus::Acknowledged => &[FilingStatus::Completed, FilingStatus::Rejected],
            FilingStatus::Completed => match kind {
                FilingKind::Itr => &[FilingStatus::RefundInitiated],
                FilingKind::Gst => &[],
            },
            FilingStatus::Rejected => &[],
            FilingStatus::RefundInitiated => &[],
        }
    }

    pub fn can_transition(&self, kind: FilingKind, to: FilingStatus) -> bool {
        self.allowed_next(kind).contains(&to)
    }

    pub fn is_terminal(&self, kind: FilingKind) -> bool {
        self.allowed_next(kind).is_empty()
    }

    /// the owner may freely mutate content fields only before submitting
    pub fn owner_editable(&self) -> bool {
        matches!(self, FilingStatus::Draft)
    }

    /// remarks stay writable by the owner until the filing reaches a
    /// terminal state
    pub fn remarks_editable(&self, kind: FilingKind) -> bool {
        !self.is_terminal(kind)
    }

    /// transitions past the submit boundary are reserved to staff
    pub fn staff_only_transition(&self, to: FilingStatus) -> bool {
        !matches!(
            (self, to),
            (FilingStatus::Draft, FilingStatus::DocumentsPending)
        )
    }
}

impl std::fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FilingStatus::Draft => "DRAFT",
            FilingStatus::DocumentsPending => "DOCUMENTS_PENDING",
            FilingStatus::UnderReview => "UNDER_REVIEW",
            FilingStatus::CaAssigned => "CA_ASSIGNED",
            FilingStatus::Processing => "PROCESSING",
            FilingStatus::Filed => "FILED",
            FilingStatus::Acknowledged => "ACKNOWLEDGED",
            FilingStatus::Completed => "COMPLETED",
            FilingStatus::Rejected => "REJECTED",
            FilingStatus::RefundInitiated => "REFUND_INITIATED",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GstReturnType {
    #[serde(rename = "GSTR-1")]
    Gstr1,
    #[serde(rename = "GSTR-3B")]
    Gstr3b,
    #[serde(rename = "GSTR-4")]
    Gstr4,
    #[serde(rename = "GSTR-9")]
    Gstr9,
    #[serde(rename = "GSTR-9C")]
    Gstr9c,
}

impl GstReturnType {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(GstReturnType::Gstr1),
            1 => Some(GstReturnType::Gstr3b),
            2 => Some(GstReturnType::Gstr4),
            3 => Some(GstReturnType::Gstr9),
            4 => Some(GstReturnType::Gstr9c),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            GstReturnType::Gstr1 => 0,
            GstReturnType::Gstr3b => 1,
            GstReturnType::Gstr4 => 2,
            GstReturnType::Gstr9 => 3,
            GstReturnType::Gstr9c => 4,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use FilingStatus::*;

    #[test]
    fn forward_walk_is_legal() {
        let walk = [
            Draft, DocumentsPending, UnderReview, CaAssigned,
            Processing, Filed, Acknowledged, Completed,
        ];

        for pair in walk.windows(2) {
            assert!(
                pair[0].can_transition(FilingKind::Itr, pair[1]),
                "{} -> {} should be legal",
                pair[0],
                pair[1]
            );
            assert!(pair[0].can_transition(FilingKind::Gst, pair[1]));
        }
    }

    #[test]
    fn no_skipping_ahead() {
        assert!(!Draft.can_transition(FilingKind::Itr, Filed));
        assert!(!Draft.can_transition(FilingKind::Itr, UnderReview));
        assert!(!DocumentsPending.can_transition(FilingKind::Gst, Processing));
    }

    #[test]
    fn no_walking_backward() {
        assert!(!UnderReview.can_transition(FilingKind::Itr, Draft));
        assert!(!Filed.can_transition(FilingKind::Itr, Processing));
        assert!(!Completed.can_transition(FilingKind::Itr, Acknowledged));
    }

    #[test]
    fn rejected_reachable_before_completion() {
        for status in [Draft, DocumentsPending, UnderReview, CaAssigned, Processing, Filed, Acknowledged] {
            assert!(status.can_transition(FilingKind::Itr, Rejected));
            assert!(status.can_transition(FilingKind::Gst, Rejected));
        }
    }

    #[test]
    fn terminal_states_have_no_exit() {
        assert!(Rejected.allowed_next(FilingKind::Itr).is_empty());
        assert!(Rejected.allowed_next(FilingKind::Gst).is_empty());
        assert!(RefundInitiated.allowed_next(FilingKind::Itr).is_empty());
        assert!(Completed.allowed_next(FilingKind::Gst).is_empty());
    }

    #[test]
    fn refund_is_itr_only() {
        assert!(Completed.can_transition(FilingKind::Itr, RefundInitiated));
        assert!(!Completed.can_transition(FilingKind::Gst, RefundInitiated));
        assert!(!Acknowledged.can_transition(FilingKind::Itr, RefundInitiated));
    }

    #[test]
    fn i16_round_trip() {
        for status in ALL_STATUSES {
            assert_eq!(FilingStatus::from_i16(status.as_i16()), Some(status));
        }

        assert_eq!(FilingStatus::from_i16(10), None);
        assert_eq!(FilingStatus::from_i16(-1), None);
    }

    #[test]
    fn owner_boundary() {
        assert!(Draft.owner_editable());
        assert!(!DocumentsPending.owner_editable());
        assert!(!Draft.staff_only_transition(DocumentsPending));
        assert!(Draft.staff_only_transition(Rejected));
        assert!(DocumentsPending.staff_only_transition(UnderReview));
    }
}
