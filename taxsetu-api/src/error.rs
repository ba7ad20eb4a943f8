use http::StatusCode;
use serde::{Serialize, Deserialize};
use strum::{AsRefStr as StrumAsRefStr};

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum AuthKind {
    PermissionDenied,
    Unauthenticated,
    AlreadyAuthenticated,

    InvalidCredentials,
    AccountSuspended,

    InvalidSession,
    SessionExpired,
    SessionNotFound,

    MechanismNotFound
}

impl std::fmt::Display for AuthKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&AuthKind> for StatusCode {
    fn from(kind: &AuthKind) -> Self {
        match kind {
            AuthKind::PermissionDenied |
            AuthKind::AccountSuspended => StatusCode::FORBIDDEN,
            AuthKind::Unauthenticated |
            AuthKind::InvalidCredentials |
            AuthKind::InvalidSession |
            AuthKind::SessionExpired |
            AuthKind::SessionNotFound |
            AuthKind::MechanismNotFound => StatusCode::UNAUTHORIZED,
            AuthKind::AlreadyAuthenticated => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum UserKind {
    NotFound,
    EmailInUse,
}

impl std::fmt::Display for UserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&UserKind> for StatusCode {
    fn from(kind: &UserKind) -> Self {
        match kind {
            UserKind::NotFound => StatusCode::NOT_FOUND,
            UserKind::EmailInUse => StatusCode::CONFLICT,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum FilingKind {
    NotFound,

    InvalidTransition,
    NotDraft,
    NotEditable,

    RejectionReasonRequired,
    AcknowledgmentRequired,
    RefundUnavailable,
}

impl std::fmt::Display for FilingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&FilingKind> for StatusCode {
    fn from(kind: &FilingKind) -> Self {
        match kind {
            FilingKind::NotFound => StatusCode::NOT_FOUND,
            FilingKind::InvalidTransition |
            FilingKind::NotDraft |
            FilingKind::NotEditable => StatusCode::CONFLICT,
            FilingKind::RejectionReasonRequired |
            FilingKind::AcknowledgmentRequired |
            FilingKind::RefundUnavailable => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum DocumentKind {
    NotFound,
    MaxSize,
    UnsupportedType,
    NoContentType,
    AlreadyFinalized,
    Verified,
    FilingMismatch,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&DocumentKind> for StatusCode {
    fn from(kind: &DocumentKind) -> Self {
        match kind {
            DocumentKind::NotFound => StatusCode::NOT_FOUND,
            DocumentKind::MaxSize => StatusCode::PAYLOAD_TOO_LARGE,
            DocumentKind::UnsupportedType |
            DocumentKind::NoContentType |
            DocumentKind::FilingMismatch => StatusCode::BAD_REQUEST,
            DocumentKind::AlreadyFinalized => StatusCode::CONFLICT,
            DocumentKind::Verified => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum TicketKind {
    NotFound,
}

impl std::fmt::Display for TicketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&TicketKind> for StatusCode {
    fn from(kind: &TicketKind) -> Self {
        match kind {
            TicketKind::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum PaymentKind {
    NotFound,
}

impl std::fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&PaymentKind> for StatusCode {
    fn from(kind: &PaymentKind) -> Self {
        match kind {
            PaymentKind::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    StrumAsRefStr,
    Serialize, Deserialize
)]
pub enum GeneralKind {
    InternalFailure,
    Timeout,

    AlreadyExists,
    NotFound,

    NoWork,

    ValidationFailed,
    InvalidData,
    MissingData,

    InvalidUri,
    InvalidHeaderValue,
    InvalidMimeType,
    InvalidMethod,
    InvalidRequest,
}

impl std::fmt::Display for GeneralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

impl From<&GeneralKind> for StatusCode {
    fn from(kind: &GeneralKind) -> StatusCode {
        match kind {
            GeneralKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
            GeneralKind::Timeout => StatusCode::REQUEST_TIMEOUT,
            GeneralKind::AlreadyExists => StatusCode::CONFLICT,
            GeneralKind::NotFound => StatusCode::NOT_FOUND,
            GeneralKind::NoWork |
            GeneralKind::ValidationFailed |
            GeneralKind::InvalidData |
            GeneralKind::MissingData |
            GeneralKind::InvalidUri |
            GeneralKind::InvalidHeaderValue |
            GeneralKind::InvalidMimeType |
            GeneralKind::InvalidRequest => StatusCode::BAD_REQUEST,
            GeneralKind::InvalidMethod => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq,
    Serialize, Deserialize
)]
pub enum ApiErrorKind {
    General(GeneralKind),
    Auth(AuthKind),
    User(UserKind),
    Filing(FilingKind),
    Document(DocumentKind),
    Ticket(TicketKind),
    Payment(PaymentKind),
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiErrorKind::General(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::Auth(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::User(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::Filing(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::Document(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::Ticket(v) => std::fmt::Display::fmt(v, f),
            ApiErrorKind::Payment(v) => std::fmt::Display::fmt(v, f),
        }
    }
}

impl From<GeneralKind> for ApiErrorKind {
    fn from(v: GeneralKind) -> Self {
        ApiErrorKind::General(v)
    }
}

impl From<AuthKind> for ApiErrorKind {
    fn from(v: AuthKind) -> Self {
        ApiErrorKind::Auth(v)
    }
}

impl From<UserKind> for ApiErrorKind {
    fn from(v: UserKind) -> Self {
        ApiErrorKind::User(v)
    }
}

impl From<FilingKind> for ApiErrorKind {
    fn from(v: FilingKind) -> Self {
        ApiErrorKind::Filing(v)
    }
}

impl From<DocumentKind> for ApiErrorKind {
    fn from(v: DocumentKind) -> Self {
        ApiErrorKind::Document(v)
    }
}

impl From<TicketKind> for ApiErrorKind {
    fn from(v: TicketKind) -> Self {
        ApiErrorKind::Ticket(v)
    }
}

impl From<PaymentKind> for ApiErrorKind {
    fn from(v: PaymentKind) -> Self {
        ApiErrorKind::Payment(v)
    }
}

impl From<&ApiErrorKind> for StatusCode {
    fn from(kind: &ApiErrorKind) -> Self {
        match kind {
            ApiErrorKind::General(v) => v.into(),
            ApiErrorKind::Auth(v) => v.into(),
            ApiErrorKind::User(v) => v.into(),
            ApiErrorKind::Filing(v) => v.into(),
            ApiErrorKind::Document(v) => v.into(),
            ApiErrorKind::Ticket(v) => v.into(),
            ApiErrorKind::Payment(v) => v.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Detail {
    Keys(Vec<String>),
}

impl Detail {
    pub fn with_key(key: impl Into<String>) -> Self {
        Detail::Keys(vec![key.into()])
    }

    pub fn mult_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Detail::Keys(keys.into_iter().map(Into::into).collect())
    }
}

impl std::fmt::Display for Detail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Detail::Keys(list) => {
                let mut iter = list.iter();

                if let Some(first) = iter.next() {
                    write!(f, "{}", first)?;

                    while let Some(key) = iter.next() {
                        write!(f, ",{}", key)?;
                    }
                }
            },
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    kind: ApiErrorKind,
    detail: Option<Detail>,
    msg: Option<String>,
}

impl ApiError {
    pub fn new() -> Self {
        ApiError {
            kind: ApiErrorKind::General(GeneralKind::InternalFailure),
            detail: None,
            msg: None
        }
    }

    pub fn with_kind<K>(mut self, kind: K) -> Self
    where
        K: Into<ApiErrorKind>
    {
        self.kind = kind.into();
        self
    }

    pub fn with_detail(mut self, detail: Detail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_message<M>(mut self, msg: M) -> Self
    where
        M: Into<String>
    {
        self.msg = Some(msg.into());
        self
    }

    pub fn kind(&self) -> &ApiErrorKind {
        &self.kind
    }

    pub fn detail(&self) -> Option<&Detail> {
        self.detail.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.msg.as_ref().map(|v| v.as_str())
    }
}

impl std::default::Default for ApiError {
    fn default() -> Self {
        ApiError::new()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }

        if let Some(msg) = &self.msg {
            write!(f, ": {}", msg)?;
        }

        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl<K> From<K> for ApiError
where
    K: Into<ApiErrorKind>
{
    fn from(kind: K) -> Self {
        ApiError {
            kind: kind.into(),
            detail: None,
            msg: None
        }
    }
}

impl<K,M> From<(K, M)> for ApiError
where
    K: Into<ApiErrorKind>,
    M: Into<String>,
{
    fn from((kind, msg): (K, M)) -> Self {
        ApiError {
            kind: kind.into(),
            detail: None,
            msg: Some(msg.into())
        }
    }
}

impl<K> From<(K, Detail)> for ApiError
where
    K: Into<ApiErrorKind>
{
    fn from((kind, detail): (K, Detail)) -> Self {
        ApiError {
            kind: kind.into(),
            detail: Some(detail),
            msg: None
        }
    }
}

impl<K,M> From<(K, Detail, M)> for ApiError
where
    K: Into<ApiErrorKind>,
    M: Into<String>
{
    fn from((kind, detail, msg): (K, Detail, M)) -> Self {
        ApiError {
            kind: kind.into(),
            detail: Some(detail),
            msg: Some(msg.into())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kinds_map_to_stable_statuses() {
        let cases: [(ApiErrorKind, StatusCode); 10] = [
            (GeneralKind::ValidationFailed.into(), StatusCode::BAD_REQUEST),
            (GeneralKind::InternalFailure.into(), StatusCode::INTERNAL_SERVER_ERROR),
            (GeneralKind::Timeout.into(), StatusCode::REQUEST_TIMEOUT),
            (AuthKind::Unauthenticated.into(), StatusCode::UNAUTHORIZED),
            (AuthKind::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (AuthKind::AccountSuspended.into(), StatusCode::FORBIDDEN),
            (UserKind::EmailInUse.into(), StatusCode::CONFLICT),
            (FilingKind::InvalidTransition.into(), StatusCode::CONFLICT),
            (DocumentKind::MaxSize.into(), StatusCode::PAYLOAD_TOO_LARGE),
            (DocumentKind::NotFound.into(), StatusCode::NOT_FOUND),
        ];

        for (kind, expected) in cases {
            assert_eq!(StatusCode::from(&kind), expected, "{kind}");
        }
    }

    #[test]
    fn wire_shape_is_stable() {
        let error = ApiError::from((
            ApiErrorKind::Filing(FilingKind::InvalidTransition),
            Detail::with_key("status"),
            "filing was already transitioned"
        ));

        let json = serde_json::to_string(&error).unwrap();

        assert!(json.contains("\"Filing\":\"InvalidTransition\""), "{json}");

        let back: ApiError = serde_json::from_str(&json).unwrap();

        assert_eq!(back.kind(), error.kind());
        assert_eq!(back.message(), error.message());
    }
}
