use std::str::FromStr;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use mime::Mime;
use serde::Deserialize;
use tokio::fs::File;

use taxsetu_api::{Payload, Validator};
use taxsetu_api::documents::{VerifyDocument, VerifyOutcome};
use taxsetu_lib::ids;
use taxsetu_lib::documents::{self, DocumentStatus, DocumentType};
use taxsetu_lib::filing::FilingKind;
use taxsetu_lib::query::Page;
use taxsetu_lib::tax::financial_year_valid;

use crate::db;
use crate::document::{Document, CreateDocument};
use crate::filing::{ItrFiling, GstFiling};
use crate::net::{self, error};
use crate::net::error::{Context, Detail};
use crate::sec::authn::Initiator;
use crate::state::ArcShared;
use crate::storage;

#[derive(Deserialize)]
pub struct PathParams {
    document_id: ids::DocumentId,
}

#[derive(Deserialize)]
pub struct ListQuery {
    status: Option<DocumentStatus>,

    #[serde(rename = "type")]
    doc_type: Option<DocumentType>,

    #[serde(default)]
    page: Page,
    limit: Option<u8>,
}

pub async fn list(
    db::Conn(conn): db::Conn,
    initiator: Initiator,
    Query(query): Query<ListQuery>,
) -> error::Result<impl IntoResponse> {
    let limit = taxsetu_lib::query::Limit::from_query(query.limit);

    let (found, total) = Document::query_user(
        &conn,
        &initiator.user.id,
        query.status,
        query.doc_type,
        query.page,
        limit,
    ).await?;

    let list: Vec<_> = found.into_iter()
        .map(Document::into_api)
        .collect();

    Ok(Payload::new(list).set_pagination((query.page, limit, total)))
}

/// the metadata fields collected off the multipart form ahead of the file
/// itself
#[derive(Default)]
struct UploadFields {
    doc_type: Option<DocumentType>,
    financial_year: Option<String>,
    filing_kind: Option<FilingKind>,
    filing_id: Option<ids::FilingId>,
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> error::Result<String> {
    Ok(field.text().await?)
}

async fn check_filing_link(
    conn: &impl deadpool_postgres::GenericClient,
    initiator: &Initiator,
    kind: FilingKind,
    filing_id: &ids::FilingId,
) -> error::Result<()> {
    let owner = match kind {
        FilingKind::Itr => ItrFiling::retrieve(conn, filing_id)
            .await?
            .map(|found| found.user_id),
        FilingKind::Gst => GstFiling::retrieve(conn, filing_id)
            .await?
            .map(|found| found.user_id),
    };

    match owner {
        Some(owner) if owner == initiator.user.id => Ok(()),
        _ => Err(error::Error::api(error::DocumentKind::FilingMismatch))
    }
}

pub async fn upload(
    State(state): State<ArcShared>,
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    mut multipart: Multipart,
) -> error::Result<impl IntoResponse> {
    let mut fields = UploadFields::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name() else {
            continue;
        };

        match name {
            "type" => {
                let value = read_text_field(field).await?;

                let Ok(parsed) = DocumentType::from_str(&value) else {
                    return Err(error::Error::api((
                        error::GeneralKind::InvalidData,
                        Detail::with_key("type")
                    )));
                };

                fields.doc_type = Some(parsed);
            },
            "financial_year" | "assessment_year" => {
                let value = read_text_field(field).await?;

                if !financial_year_valid(&value) {
                    return Err(error::Error::api((
                        error::GeneralKind::InvalidData,
                        Detail::with_key("financial_year")
                    )));
                }

                fields.financial_year = Some(value);
            },
            "filing_kind" => {
                let value = read_text_field(field).await?;

                let Ok(parsed) = FilingKind::from_str(&value) else {
                    return Err(error::Error::api((
                        error::GeneralKind::InvalidData,
                        Detail::with_key("filing_kind")
                    )));
                };

                fields.filing_kind = Some(parsed);
            },
            "filing_id" => {
                let value = read_text_field(field).await?;

                let Ok(parsed) = value.parse() else {
                    return Err(error::Error::api((
                        error::GeneralKind::InvalidData,
                        Detail::with_key("filing_id")
                    )));
                };

                fields.filing_id = Some(parsed);
            },
            "file" => {
                // metadata fields must precede the file in the form body.
                // everything is validated before a byte hits storage
                let Some(doc_type) = fields.doc_type else {
                    return Err(error::Error::api((
                        error::GeneralKind::MissingData,
                        Detail::with_key("type")
                    )));
                };

                let filing_link = match (fields.filing_kind, fields.filing_id) {
                    (Some(kind), Some(filing_id)) => {
                        check_filing_link(&conn, &initiator, kind, &filing_id).await?;

                        Some((kind, filing_id))
                    },
                    (None, None) => None,
                    _ => {
                        return Err(error::Error::api((
                            error::DocumentKind::FilingMismatch,
                            "filing_kind and filing_id must be provided together"
                        )));
                    }
                };

                let Some(content_type) = field.content_type() else {
                    return Err(error::Error::api(error::DocumentKind::NoContentType));
                };

                let mime = Mime::from_str(content_type)?;

                if !documents::mime_allowed(&mime) {
                    return Err(error::Error::api(error::DocumentKind::UnsupportedType));
                }

                let original_name = field.file_name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| String::from("upload"));

                let dir = storage::ensure_user_dir(state.documents(), &initiator.user.id)
                    .await
                    .context("failed creating user document directory")?;

                let stored_name = storage::gen_stored_name(&mime);
                let tmp = storage::tmp_path(&dir, &stored_name);
                let full = dir.join(&stored_name);

                tracing::debug!("tmp path: \"{}\"", tmp.display());

                let tmp_file = File::create(&tmp)
                    .await
                    .context("failed creating tmp file for upload")?;

                let size = match storage::write_stream(tmp_file, field).await {
                    Ok(size) => size,
                    Err(err) => {
                        storage::remove_orphan(&tmp).await;

                        return Err(err.into());
                    }
                };

                let transaction = conn.transaction().await?;

                let create = CreateDocument {
                    user_id: initiator.user.id,
                    filing_kind: filing_link.map(|(kind, _)| kind),
                    filing_id: filing_link.map(|(_, filing_id)| filing_id),
                    stored_name: &stored_name,
                    original_name: &original_name,
                    mime: &mime,
                    size,
                    doc_type,
                    financial_year: fields.financial_year.as_deref(),
                };

                let created = match Document::create(&transaction, create).await {
                    Ok(created) => created,
                    Err(err) => {
                        storage::remove_orphan(&tmp).await;

                        return Err(err.into());
                    }
                };

                if let Err(err) = tokio::fs::rename(&tmp, &full).await {
                    storage::remove_orphan(&tmp).await;

                    return Err(error::Error::from(err)
                        .context("failed moving tmp file into place"));
                }

                if let Err(err) = transaction.commit().await {
                    storage::remove_orphan(&full).await;

                    return Err(err.into());
                }

                tracing::info!(
                    user_id = initiator.user.id,
                    document_id = created.id,
                    size,
                    "document uploaded"
                );

                return Ok((
                    StatusCode::CREATED,
                    Payload::new(created.into_api())
                ));
            },
            _ => {
                // unknown fields are drained and dropped
                let _ = field.bytes().await?;
            }
        }
    }

    Err(error::Error::api((
        error::GeneralKind::MissingData,
        Detail::with_key("file")
    )))
}

pub async fn retrieve(
    db::Conn(conn): db::Conn,
    initiator: Initiator,
    Path(PathParams { document_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let Some(found) = Document::retrieve(&conn, &document_id).await? else {
        return Err(error::Error::api(error::DocumentKind::NotFound));
    };

    if found.user_id != initiator.user.id && !initiator.user.is_staff() {
        return Err(error::Error::api(error::AuthKind::PermissionDenied));
    }

    Ok(Payload::new(found.into_api()))
}

pub async fn download(
    State(state): State<ArcShared>,
    db::Conn(conn): db::Conn,
    initiator: Initiator,
    Path(PathParams { document_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let Some(found) = Document::retrieve(&conn, &document_id).await? else {
        return Err(error::Error::api(error::DocumentKind::NotFound));
    };

    if found.user_id != initiator.user.id && !initiator.user.is_staff() {
        return Err(error::Error::api(error::AuthKind::PermissionDenied));
    }

    let path = storage::user_dir(state.documents(), &found.user_id)
        .join(&found.stored_name);

    if !path.try_exists()? {
        return Err(error::Error::api(error::DocumentKind::NotFound)
            .context("document row exists but the blob is missing"));
    }

    net::fs::attachment_file(&found.original_name, &found.mime, path).await
}

pub async fn verify(
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    Path(PathParams { document_id }): Path<PathParams>,
    axum::Json(json): axum::Json<VerifyDocument>,
) -> error::Result<impl IntoResponse> {
    if !initiator.user.is_staff() {
        return Err(error::Error::api(error::AuthKind::PermissionDenied));
    }

    json.validate()?;

    let Some(found) = Document::retrieve(&conn, &document_id).await? else {
        return Err(error::Error::api(error::DocumentKind::NotFound));
    };

    if found.status.finalized() {
        return Err(error::Error::api(error::DocumentKind::AlreadyFinalized));
    }

    let (outcome, reason) = match json.outcome {
        VerifyOutcome::Verified => (DocumentStatus::Verified, None),
        VerifyOutcome::Rejected => (DocumentStatus::Rejected, json.reason.as_deref()),
    };

    let transaction = conn.transaction().await?;

    let applied = Document::apply_verification(
        &transaction,
        &document_id,
        &initiator.user.id,
        outcome,
        reason,
    ).await?;

    if !applied {
        // somebody else finalized it between the read and the write
        return Err(error::Error::api(error::DocumentKind::AlreadyFinalized));
    }

    transaction.commit().await?;

    tracing::info!(
        staff_id = initiator.user.id,
        document_id,
        outcome = ?json.outcome,
        "document verification applied"
    );

    let Some(updated) = Document::retrieve(&conn, &document_id).await? else {
        return Err(error::Error::api(error::DocumentKind::NotFound));
    };

    Ok(Payload::new(updated.into_api()))
}

pub async fn delete(
    State(state): State<ArcShared>,
    db::Conn(mut conn): db::Conn,
    initiator: Initiator,
    Path(PathParams { document_id }): Path<PathParams>,
) -> error::Result<impl IntoResponse> {
    let Some(found) = Document::retrieve(&conn, &document_id).await? else {
        return Err(error::Error::api(error::DocumentKind::NotFound));
    };

    if found.user_id != initiator.user.id {
        return Err(error::Error::api(error::AuthKind::PermissionDenied));
    }

    if found.status == DocumentStatus::Verified {
        return Err(error::Error::api(error::DocumentKind::Verified));
    }

    let transaction = conn.transaction().await?;

    if !Document::delete_unverified(&transaction, &document_id).await? {
        // lost a race against a verification
        return Err(error::Error::api(error::DocumentKind::Verified));
    }

    transaction.commit().await?;

    // the row is gone, the blob follows. a failure here leaves an orphaned
    // blob, not an orphaned row
    let path = storage::user_dir(state.documents(), &found.user_id)
        .join(&found.stored_name);

    storage::remove_orphan(&path).await;

    tracing::info!(user_id = initiator.user.id, document_id, "document deleted");

    Ok(StatusCode::NO_CONTENT)
}
