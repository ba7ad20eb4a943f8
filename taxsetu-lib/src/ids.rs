pub type UserId = i64;
pub type FilingId = i64;
pub type DocumentId = i64;
pub type TicketId = i64;
pub type PaymentId = i64;
