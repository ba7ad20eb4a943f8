mod response;

pub mod error;
pub use error::{ApiError, ApiErrorKind, Detail};

pub mod traits;
pub use traits::Validator;

pub mod users;
pub mod auth;
pub mod filings;
pub mod documents;
pub mod tickets;
pub mod payments;

mod payload;
pub use payload::{Payload, Pagination};
