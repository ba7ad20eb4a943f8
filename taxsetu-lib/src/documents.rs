use mime::Mime;
use serde::{Serialize, Deserialize};

/// hard cap on a single uploaded document
pub const MAX_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Verified,
    Rejected,
}

impl DocumentStatus {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(DocumentStatus::Uploaded),
            1 => Some(DocumentStatus::Processing),
            2 => Some(DocumentStatus::Verified),
            3 => Some(DocumentStatus::Rejected),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            DocumentStatus::Uploaded => 0,
            DocumentStatus::Processing => 1,
            DocumentStatus::Verified => 2,
            DocumentStatus::Rejected => 3,
        }
    }

    /// verification moves one way. a rejected document is replaced by a
    /// fresh upload, never resurrected
    pub fn finalized(&self) -> bool {
        matches!(self, DocumentStatus::Verified | DocumentStatus::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    PanCard,
    Aadhaar,
    Form16,
    SalarySlip,
    BankStatement,
    InvestmentProof,
    GstInvoice,
    PurchaseRegister,
    SalesRegister,
    Other,
}

impl DocumentType {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(DocumentType::PanCard),
            1 => Some(DocumentType::Aadhaar),
            2 => Some(DocumentType::Form16),
            3 => Some(DocumentType::SalarySlip),
            4 => Some(DocumentType::BankStatement),
            5 => Some(DocumentType::InvestmentProof),
            6 => Some(DocumentType::GstInvoice),
            7 => Some(DocumentType::PurchaseRegister),
            8 => Some(DocumentType::SalesRegister),
            9 => Some(DocumentType::Other),
            _ => None
        }
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            DocumentType::PanCard => 0,
            DocumentType::Aadhaar => 1,
            DocumentType::Form16 => 2,
            DocumentType::SalarySlip => 3,
            DocumentType::BankStatement => 4,
            DocumentType::InvestmentProof => 5,
            DocumentType::GstInvoice => 6,
            DocumentType::PurchaseRegister => 7,
            DocumentType::SalesRegister => 8,
            DocumentType::Other => 9,
        }
    }
}

#[derive(Debug)]
pub struct UnknownDocumentType;

impl std::fmt::Display for UnknownDocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("unknown document type")
    }
}

impl std::error::Error for UnknownDocumentType {}

impl std::str::FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(given: &str) -> Result<Self, Self::Err> {
        match given {
            "PAN_CARD" => Ok(DocumentType::PanCard),
            "AADHAAR" => Ok(DocumentType::Aadhaar),
            "FORM_16" => Ok(DocumentType::Form16),
            "SALARY_SLIP" => Ok(DocumentType::SalarySlip),
            "BANK_STATEMENT" => Ok(DocumentType::BankStatement),
            "INVESTMENT_PROOF" => Ok(DocumentType::InvestmentProof),
            "GST_INVOICE" => Ok(DocumentType::GstInvoice),
            "PURCHASE_REGISTER" => Ok(DocumentType::PurchaseRegister),
            "SALES_REGISTER" => Ok(DocumentType::SalesRegister),
            "OTHER" => Ok(DocumentType::Other),
            _ => Err(UnknownDocumentType)
        }
    }
}

const XLS: &str = "vnd.ms-excel";
const XLSX: &str = "vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// PDF, JPEG, PNG and the two spreadsheet formats
pub fn mime_allowed(mime: &Mime) -> bool {
    match (mime.type_(), mime.subtype()) {
        (mime::APPLICATION, mime::PDF) => true,
        (mime::IMAGE, mime::JPEG) => true,
        (mime::IMAGE, mime::PNG) => true,
        (mime::APPLICATION, subtype) => subtype.as_str() == XLS || subtype.as_str() == XLSX,
        _ => false
    }
}

/// extension for the server side file name, derived from the mime type and
/// never from the user supplied name
pub fn extension_for(mime: &Mime) -> &'static str {
    match (mime.type_(), mime.subtype()) {
        (mime::APPLICATION, mime::PDF) => "pdf",
        (mime::IMAGE, mime::JPEG) => "jpg",
        (mime::IMAGE, mime::PNG) => "png",
        (mime::APPLICATION, subtype) if subtype.as_str() == XLS => "xls",
        (mime::APPLICATION, subtype) if subtype.as_str() == XLSX => "xlsx",
        _ => "bin"
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn allow_list() {
        for allowed in [
            "application/pdf",
            "image/jpeg",
            "image/png",
            "application/vnd.ms-excel",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ] {
            assert!(mime_allowed(&Mime::from_str(allowed).unwrap()), "{allowed}");
        }

        for denied in ["text/html", "application/zip", "image/gif", "video/mp4"] {
            assert!(!mime_allowed(&Mime::from_str(denied).unwrap()), "{denied}");
        }
    }

    #[test]
    fn status_one_directional() {
        assert!(!DocumentStatus::Uploaded.finalized());
        assert!(!DocumentStatus::Processing.finalized());
        assert!(DocumentStatus::Verified.finalized());
        assert!(DocumentStatus::Rejected.finalized());
    }

    #[test]
    fn i16_round_trip() {
        for v in 0..4 {
            assert_eq!(DocumentStatus::from_i16(v).unwrap().as_i16(), v);
        }

        for v in 0..10 {
            assert_eq!(DocumentType::from_i16(v).unwrap().as_i16(), v);
        }

        assert!(DocumentStatus::from_i16(4).is_none());
        assert!(DocumentType::from_i16(10).is_none());
    }
}
