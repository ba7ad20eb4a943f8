use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mime::Mime;
use tokio_postgres::Error as PgError;
use deadpool_postgres::GenericClient;

use taxsetu_lib::ids;
use taxsetu_lib::documents::{DocumentStatus, DocumentType};
use taxsetu_lib::filing::FilingKind;
use taxsetu_lib::query::{Limit, Page};

use crate::sql;

#[derive(Debug)]
pub struct Document {
    pub id: ids::DocumentId,
    pub user_id: ids::UserId,
    pub filing_kind: Option<FilingKind>,
    pub filing_id: Option<ids::FilingId>,
    pub stored_name: String,
    pub original_name: String,
    pub mime: Mime,
    pub size: u64,
    pub doc_type: DocumentType,
    pub financial_year: Option<String>,
    pub status: DocumentStatus,
    pub rejection_reason: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<ids::UserId>,
    pub created: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "\
    documents.id, \
    documents.user_id, \
    documents.filing_kind, \
    documents.filing_id, \
    documents.stored_name, \
    documents.original_name, \
    documents.mime_type, \
    documents.mime_subtype, \
    documents.size, \
    documents.doc_type, \
    documents.financial_year, \
    documents.status, \
    documents.rejection_reason, \
    documents.verified_at, \
    documents.verified_by, \
    documents.created";

fn from_row(row: tokio_postgres::Row) -> Document {
    let filing_kind: Option<i16> = row.get(2);

    Document {
        id: row.get(0),
        user_id: row.get(1),
        filing_kind: filing_kind.map(|v| FilingKind::from_i16(v)
            .expect("invalid filing kind returned from database for document")),
        filing_id: row.get(3),
        stored_name: row.get(4),
        original_name: row.get(5),
        mime: sql::mime_from_sql(row.get(6), row.get(7)),
        size: sql::u64_from_sql(row.get(8)),
        doc_type: DocumentType::from_i16(row.get(9))
            .expect("invalid doc type returned from database for document"),
        financial_year: row.get(10),
        status: DocumentStatus::from_i16(row.get(11))
            .expect("invalid status returned from database for document"),
        rejection_reason: row.get(12),
        verified_at: row.get(13),
        verified_by: row.get(14),
        created: row.get(15),
    }
}

pub struct CreateDocument<'a> {
    pub user_id: ids::UserId,
    pub filing_kind: Option<FilingKind>,
    pub filing_id: Option<ids::FilingId>,
    pub stored_name: &'a str,
    pub original_name: &'a str,
    pub mime: &'a Mime,
    pub size: u64,
    pub doc_type: DocumentType,
    pub financial_year: Option<&'a str>,
}

impl Document {
    pub async fn retrieve(
        conn: &impl GenericClient,
        id: &ids::DocumentId,
    ) -> Result<Option<Document>, PgError> {
        let query = format!("select {SELECT_COLUMNS} from documents where documents.id = $1");

        Ok(conn.query_opt(query.as_str(), &[id])
            .await?
            .map(from_row))
    }

    /// the metadata row. only inserted after the blob write completed
    pub async fn create(
        conn: &impl GenericClient,
        create: CreateDocument<'_>,
    ) -> Result<Document, PgError> {
        let status = DocumentStatus::Uploaded;
        let created = Utc::now();

        let filing_kind_int = create.filing_kind.map(|v| v.as_i16());
        let mime_type = create.mime.type_().as_str();
        let mime_subtype = create.mime.subtype().as_str();
        let size_int = create.size as i64;

        let row = conn.query_one(
            "\
            insert into documents (\
                user_id, \
                filing_kind, \
                filing_id, \
                stored_name, \
                original_name, \
                mime_type, \
                mime_subtype, \
                size, \
                doc_type, \
                financial_year, \
                status, \
                created\
            ) values \
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
            returning id",
            &[
                &create.user_id,
                &filing_kind_int,
                &create.filing_id,
                &create.stored_name,
                &create.original_name,
                &mime_type,
                &mime_subtype,
                &size_int,
                &create.doc_type.as_i16(),
                &create.financial_year,
                &status.as_i16(),
                &created,
            ]
        ).await?;

        Ok(Document {
            id: row.get(0),
            user_id: create.user_id,
            filing_kind: create.filing_kind,
            filing_id: create.filing_id,
            stored_name: create.stored_name.to_owned(),
            original_name: create.original_name.to_owned(),
            mime: create.mime.clone(),
            size: create.size,
            doc_type: create.doc_type,
            financial_year: create.financial_year.map(str::to_owned),
            status,
            rejection_reason: None,
            verified_at: None,
            verified_by: None,
            created,
        })
    }

    /// verification is one conditional update: only a document that has not
    /// been finalized can move, and the losing side of a race sees zero rows
    pub async fn apply_verification(
        conn: &impl GenericClient,
        id: &ids::DocumentId,
        staff_id: &ids::UserId,
        outcome: DocumentStatus,
        reason: Option<&str>,
    ) -> Result<bool, PgError> {
        let verified_at = Utc::now();
        let open = vec![
            DocumentStatus::Uploaded.as_i16(),
            DocumentStatus::Processing.as_i16(),
        ];

        let count = conn.execute(
            "\
            update documents \
            set status = $3, \
                rejection_reason = $4, \
                verified_at = $5, \
                verified_by = $6 \
            where id = $1 and status = any($2)",
            &[id, &open, &outcome.as_i16(), &reason, &verified_at, staff_id]
        ).await?;

        Ok(count == 1)
    }

    /// row delete, conditional on the document not having been verified
    pub async fn delete_unverified(
        conn: &impl GenericClient,
        id: &ids::DocumentId,
    ) -> Result<bool, PgError> {
        let verified = DocumentStatus::Verified.as_i16();

        let count = conn.execute(
            "delete from documents where id = $1 and status != $2",
            &[id, &verified]
        ).await?;

        Ok(count == 1)
    }

    pub async fn query_user(
        conn: &impl GenericClient,
        user_id: &ids::UserId,
        status: Option<DocumentStatus>,
        doc_type: Option<DocumentType>,
        page: Page,
        limit: Limit,
    ) -> Result<(Vec<Document>, i64), PgError> {
        let mut params: sql::ParamsVec = vec![user_id];
        let mut filters = String::from("where documents.user_id = $1");

        let status_int = status.map(|v| v.as_i16());
        let doc_type_int = doc_type.map(|v| v.as_i16());

        if let Some(status_int) = &status_int {
            let index = sql::push_param(&mut params, status_int);

            filters.push_str(&format!(" and documents.status = ${index}"));
        }

        if let Some(doc_type_int) = &doc_type_int {
            let index = sql::push_param(&mut params, doc_type_int);

            filters.push_str(&format!(" and documents.doc_type = ${index}"));
        }

        let total: i64 = {
            let query = format!("select count(id) from documents {filters}");

            conn.query_one(query.as_str(), params.as_slice()).await?.get(0)
        };

        let offset = limit.sql_offset(page);
        let limit_index = sql::push_param(&mut params, &limit);
        let offset_index = sql::push_param(&mut params, &offset);

        let query = format!(
            "\
            select {SELECT_COLUMNS} \
            from documents \
            {filters} \
            order by documents.created desc, documents.id desc \
            limit ${limit_index} offset ${offset_index}"
        );

        let stream = conn.query_raw(query.as_str(), params).await?;

        futures::pin_mut!(stream);

        let mut list = Vec::new();

        while let Some(row) = stream.try_next().await? {
            list.push(from_row(row));
        }

        Ok((list, total))
    }

    pub fn into_api(self) -> taxsetu_api::documents::Document {
        taxsetu_api::documents::Document {
            id: self.id,
            user_id: self.user_id,
            filing_kind: self.filing_kind,
            filing_id: self.filing_id,
            original_name: self.original_name,
            mime: self.mime.to_string(),
            size: self.size,
            doc_type: self.doc_type,
            financial_year: self.financial_year,
            status: self.status,
            rejection_reason: self.rejection_reason,
            verified_at: self.verified_at,
            created: self.created,
        }
    }
}
