use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use tokio_postgres::Error as PgError;
use deadpool_postgres::GenericClient;

use taxsetu_lib::ids;
use taxsetu_lib::filing::{FilingKind, FilingStatus, GstReturnType};
use taxsetu_lib::query::{Limit, Page};
use taxsetu_api::filings::StatusCount;
use taxsetu_api::filings::itr::ItrFormData;
use taxsetu_api::filings::gst::GstFormData;

use crate::net::error::Error as NetError;
use crate::net::error::FilingKind as FilingErrorKind;
use crate::sql;

pub mod tax;

fn lifecycle_table(kind: FilingKind) -> &'static str {
    match kind {
        FilingKind::Itr => "itr_filing",
        FilingKind::Gst => "gst_filing",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    /// either the requested edge is not in the transition graph or a
    /// concurrent request moved the filing first. indistinguishable by
    /// design, both lose the same way
    #[error("transition is not allowed from the filing's current status")]
    InvalidTransition,

    #[error("a rejection requires a non-empty reason")]
    ReasonRequired,

    #[error("filing requires an acknowledgment number")]
    AcknowledgmentRequired,

    #[error(transparent)]
    Db(#[from] PgError),
}

impl From<TransitionError> for NetError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition => NetError::api(FilingErrorKind::InvalidTransition),
            TransitionError::ReasonRequired => NetError::api(FilingErrorKind::RejectionReasonRequired),
            TransitionError::AcknowledgmentRequired => NetError::api(FilingErrorKind::AcknowledgmentRequired),
            TransitionError::Db(err) => err.into(),
        }
    }
}

/// the extra columns a transition writes alongside the status
#[derive(Debug, Default)]
pub struct TransitionData<'a> {
    pub rejection_reason: Option<&'a str>,
    pub acknowledgment_no: Option<&'a str>,
}

/// check-and-apply in a single conditional update keyed on the status the
/// caller read. zero rows affected means the graph said no or somebody got
/// there first, and nothing was written either way
pub async fn transition(
    conn: &impl GenericClient,
    kind: FilingKind,
    id: &ids::FilingId,
    from: FilingStatus,
    to: FilingStatus,
    data: TransitionData<'_>,
) -> Result<DateTime<Utc>, TransitionError> {
    if !from.can_transition(kind, to) {
        return Err(TransitionError::InvalidTransition);
    }

    let updated = Utc::now();
    let table = lifecycle_table(kind);

    let count = match to {
        FilingStatus::Rejected => {
            let Some(reason) = data.rejection_reason.filter(|v| !v.trim().is_empty()) else {
                return Err(TransitionError::ReasonRequired);
            };

            let query = format!(
                "\
                update {table} \
                set status = $3, \
                    rejection_reason = $4, \
                    updated = $5 \
                where id = $1 and status = $2"
            );

            conn.execute(
                query.as_str(),
                &[id, &from.as_i16(), &to.as_i16(), &reason, &updated]
            ).await?
        },
        FilingStatus::Filed => {
            let Some(ack) = data.acknowledgment_no.filter(|v| !v.trim().is_empty()) else {
                return Err(TransitionError::AcknowledgmentRequired);
            };

            // acknowledgment and filing timestamp land atomically with the
            // status write and are never touched again
            let query = format!(
                "\
                update {table} \
                set status = $3, \
                    acknowledgment_no = $4, \
                    filed_at = $5, \
                    updated = $5 \
                where id = $1 and status = $2 and acknowledgment_no is null"
            );

            conn.execute(
                query.as_str(),
                &[id, &from.as_i16(), &to.as_i16(), &ack, &updated]
            ).await?
        },
        _ => {
            let query = format!(
                "\
                update {table} \
                set status = $3, \
                    updated = $4 \
                where id = $1 and status = $2"
            );

            conn.execute(
                query.as_str(),
                &[id, &from.as_i16(), &to.as_i16(), &updated]
            ).await?
        }
    };

    if count != 1 {
        return Err(TransitionError::InvalidTransition);
    }

    Ok(updated)
}

/// owner delete, legal only while the filing is still a draft
pub async fn delete_draft(
    conn: &impl GenericClient,
    kind: FilingKind,
    id: &ids::FilingId,
) -> Result<bool, PgError> {
    let table = lifecycle_table(kind);
    let draft = FilingStatus::Draft.as_i16();

    let query = format!("delete from {table} where id = $1 and status = $2");

    let count = conn.execute(query.as_str(), &[id, &draft]).await?;

    Ok(count == 1)
}

/// remarks stay writable by the owner until the filing reaches a terminal
/// state. conditional on the non-terminal statuses for the kind
pub async fn update_remarks(
    conn: &impl GenericClient,
    kind: FilingKind,
    id: &ids::FilingId,
    remarks: Option<&str>,
) -> Result<bool, PgError> {
    let table = lifecycle_table(kind);
    let updated = Utc::now();

    let writable: Vec<i16> = taxsetu_lib::filing::ALL_STATUSES.iter()
        .filter(|status| status.remarks_editable(kind))
        .map(|status| status.as_i16())
        .collect();

    let query = format!(
        "update {table} set remarks = $3, updated = $4 \
        where id = $1 and status = any($2)"
    );

    let count = conn.execute(
        query.as_str(),
        &[id, &writable, &remarks, &updated]
    ).await?;

    Ok(count == 1)
}

pub async fn status_counts(
    conn: &impl GenericClient,
    kind: FilingKind,
    user_id: &ids::UserId,
) -> Result<Vec<StatusCount>, PgError> {
    let table = lifecycle_table(kind);

    let query = format!(
        "select status, count(id) from {table} where user_id = $1 group by status"
    );

    let params: sql::ParamsVec = vec![user_id];

    let stream = conn.query_raw(query.as_str(), params).await?;

    futures::pin_mut!(stream);

    let mut list = Vec::new();

    while let Some(row) = stream.try_next().await? {
        let Some(status) = FilingStatus::from_i16(row.get(0)) else {
            continue;
        };

        list.push(StatusCount {
            status,
            count: row.get(1),
        });
    }

    Ok(list)
}

// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct ItrFiling {
    pub id: ids::FilingId,
    pub user_id: ids::UserId,
    pub pan: String,
    pub assessment_year: String,
    pub form_data: ItrFormData,
    pub status: FilingStatus,
    pub acknowledgment_no: Option<String>,
    pub filed_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub rejection_reason: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

const ITR_COLUMNS: &str = "\
    itr_filing.id, \
    itr_filing.user_id, \
    itr_filing.pan, \
    itr_filing.assessment_year, \
    itr_filing.form_data, \
    itr_filing.status, \
    itr_filing.acknowledgment_no, \
    itr_filing.filed_at, \
    itr_filing.remarks, \
    itr_filing.rejection_reason, \
    itr_filing.created, \
    itr_filing.updated";

fn itr_from_row(row: tokio_postgres::Row) -> ItrFiling {
    ItrFiling {
        id: row.get(0),
        user_id: row.get(1),
        pan: row.get(2),
        assessment_year: row.get(3),
        form_data: sql::de_from_sql(row.get(4)),
        status: FilingStatus::from_i16(row.get(5))
            .expect("invalid status returned from database for itr filing"),
        acknowledgment_no: row.get(6),
        filed_at: row.get(7),
        remarks: row.get(8),
        rejection_reason: row.get(9),
        created: row.get(10),
        updated: row.get(11),
    }
}

impl ItrFiling {
    pub async fn retrieve(
        conn: &impl GenericClient,
        id: &ids::FilingId,
    ) -> Result<Option<ItrFiling>, PgError> {
        let query = format!("select {ITR_COLUMNS} from itr_filing where itr_filing.id = $1");

        Ok(conn.query_opt(query.as_str(), &[id])
            .await?
            .map(itr_from_row))
    }

    pub async fn create(
        conn: &impl GenericClient,
        user_id: &ids::UserId,
        pan: &str,
        assessment_year: &str,
        form_data: ItrFormData,
    ) -> Result<ItrFiling, PgError> {
        let status = FilingStatus::Draft;
        let created = Utc::now();

        let row = conn.query_one(
            "\
            insert into itr_filing (user_id, pan, assessment_year, form_data, status, created) \
            values ($1, $2, $3, $4, $5, $6) \
            returning id",
            &[
                user_id,
                &pan,
                &assessment_year,
                &sql::ser_to_sql(&form_data),
                &status.as_i16(),
                &created,
            ]
        ).await?;

        Ok(ItrFiling {
            id: row.get(0),
            user_id: *user_id,
            pan: pan.to_owned(),
            assessment_year: assessment_year.to_owned(),
            form_data,
            status,
            acknowledgment_no: None,
            filed_at: None,
            remarks: None,
            rejection_reason: None,
            created,
            updated: None,
        })
    }

    /// content fields only move while the filing is a draft. the status
    /// condition closes the window against a concurrent submit
    pub async fn update_draft_form(
        conn: &impl GenericClient,
        id: &ids::FilingId,
        form_data: &ItrFormData,
    ) -> Result<bool, PgError> {
        let updated = Utc::now();
        let draft = FilingStatus::Draft.as_i16();

        let count = conn.execute(
            "\
            update itr_filing \
            set form_data = $3, \
                updated = $4 \
            where id = $1 and status = $2",
            &[id, &draft, &sql::ser_to_sql(form_data), &updated]
        ).await?;

        Ok(count == 1)
    }

    pub async fn query_user(
        conn: &impl GenericClient,
        user_id: &ids::UserId,
        status: Option<FilingStatus>,
        assessment_year: Option<&str>,
        page: Page,
        limit: Limit,
    ) -> Result<(Vec<ItrFiling>, i64), PgError> {
        let mut params: sql::ParamsVec = vec![user_id];
        let mut filters = String::from("where itr_filing.user_id = $1");

        let status_int = status.map(|v| v.as_i16());

        if let Some(status_int) = &status_int {
            let index = sql::push_param(&mut params, status_int);

            filters.push_str(&format!(" and itr_filing.status = ${index}"));
        }

        if let Some(assessment_year) = &assessment_year {
            let index = sql::push_param(&mut params, assessment_year);

            filters.push_str(&format!(" and itr_filing.assessment_year = ${index}"));
        }

        let total: i64 = {
            let query = format!("select count(id) from itr_filing {filters}");

            conn.query_one(query.as_str(), params.as_slice()).await?.get(0)
        };

        let offset = limit.sql_offset(page);
        let limit_index = sql::push_param(&mut params, &limit);
        let offset_index = sql::push_param(&mut params, &offset);

        let query = format!(
            "\
            select {ITR_COLUMNS} \
            from itr_filing \
            {filters} \
            order by itr_filing.created desc, itr_filing.id desc \
            limit ${limit_index} offset ${offset_index}"
        );

        let stream = conn.query_raw(query.as_str(), params).await?;

        futures::pin_mut!(stream);

        let mut list = Vec::new();

        while let Some(row) = stream.try_next().await? {
            list.push(itr_from_row(row));
        }

        Ok((list, total))
    }

    pub fn into_api(self) -> taxsetu_api::filings::itr::ItrFiling {
        let computation = tax::compute_itr(&self.form_data);

        taxsetu_api::filings::itr::ItrFiling {
            id: self.id,
            user_id: self.user_id,
            pan: self.pan,
            assessment_year: self.assessment_year,
            form_data: self.form_data,
            status: self.status,
            acknowledgment_no: self.acknowledgment_no,
            filed_at: self.filed_at,
            remarks: self.remarks,
            rejection_reason: self.rejection_reason,
            created: self.created,
            updated: self.updated,
            computation: Some(computation),
        }
    }
}

// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct GstFiling {
    pub id: ids::FilingId,
    pub user_id: ids::UserId,
    pub gstin: String,
    pub return_type: GstReturnType,
    pub period: String,
    pub form_data: GstFormData,
    pub status: FilingStatus,
    pub acknowledgment_no: Option<String>,
    pub filed_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub rejection_reason: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

const GST_COLUMNS: &str = "\
    gst_filing.id, \
    gst_filing.user_id, \
    gst_filing.gstin, \
    gst_filing.return_type, \
    gst_filing.period, \
    gst_filing.form_data, \
    gst_filing.status, \
    gst_filing.acknowledgment_no, \
    gst_filing.filed_at, \
    gst_filing.remarks, \
    gst_filing.rejection_reason, \
    gst_filing.created, \
    gst_filing.updated";

fn gst_from_row(row: tokio_postgres::Row) -> GstFiling {
    GstFiling {
        id: row.get(0),
        user_id: row.get(1),
        gstin: row.get(2),
        return_type: GstReturnType::from_i16(row.get(3))
            .expect("invalid return type returned from database for gst filing"),
        period: row.get(4),
        form_data: sql::de_from_sql(row.get(5)),
        status: FilingStatus::from_i16(row.get(6))
            .expect("invalid status returned from database for gst filing"),
        acknowledgment_no: row.get(7),
        filed_at: row.get(8),
        remarks: row.get(9),
        rejection_reason: row.get(10),
        created: row.get(11),
        updated: row.get(12),
    }
}

impl GstFiling {
    pub async fn retrieve(
        conn: &impl GenericClient,
        id: &ids::FilingId,
    ) -> Result<Option<GstFiling>, PgError> {
        let query = format!("select {GST_COLUMNS} from gst_filing where gst_filing.id = $1");

        Ok(conn.query_opt(query.as_str(), &[id])
            .await?
            .map(gst_from_row))
    }

    pub async fn create(
        conn: &impl GenericClient,
        user_id: &ids::UserId,
        gstin: &str,
        return_type: GstReturnType,
        period: &str,
        form_data: GstFormData,
    ) -> Result<GstFiling, PgError> {
        let status = FilingStatus::Draft;
        let created = Utc::now();

        let row = conn.query_one(
            "\
            insert into gst_filing (user_id, gstin, return_type, period, form_data, status, created) \
            values ($1, $2, $3, $4, $5, $6, $7) \
            returning id",
            &[
                user_id,
                &gstin,
                &return_type.as_i16(),
                &period,
                &sql::ser_to_sql(&form_data),
                &status.as_i16(),
                &created,
            ]
        ).await?;

        Ok(GstFiling {
            id: row.get(0),
            user_id: *user_id,
            gstin: gstin.to_owned(),
            return_type,
            period: period.to_owned(),
            form_data,
            status,
            acknowledgment_no: None,
            filed_at: None,
            remarks: None,
            rejection_reason: None,
            created,
            updated: None,
        })
    }

    pub async fn update_draft_form(
        conn: &impl GenericClient,
        id: &ids::FilingId,
        form_data: &GstFormData,
    ) -> Result<bool, PgError> {
        let updated = Utc::now();
        let draft = FilingStatus::Draft.as_i16();

        let count = conn.execute(
            "\
            update gst_filing \
            set form_data = $3, \
                updated = $4 \
            where id = $1 and status = $2",
            &[id, &draft, &sql::ser_to_sql(form_data), &updated]
        ).await?;

        Ok(count == 1)
    }

    pub async fn query_user(
        conn: &impl GenericClient,
        user_id: &ids::UserId,
        status: Option<FilingStatus>,
        return_type: Option<GstReturnType>,
        period: Option<&str>,
        page: Page,
        limit: Limit,
    ) -> Result<(Vec<GstFiling>, i64), PgError> {
        let mut params: sql::ParamsVec = vec![user_id];
        let mut filters = String::from("where gst_filing.user_id = $1");

        let status_int = status.map(|v| v.as_i16());
        let return_type_int = return_type.map(|v| v.as_i16());

        if let Some(status_int) = &status_int {
            let index = sql::push_param(&mut params, status_int);

            filters.push_str(&format!(" and gst_filing.status = ${index}"));
        }

        if let Some(return_type_int) = &return_type_int {
            let index = sql::push_param(&mut params, return_type_int);

            filters.push_str(&format!(" and gst_filing.return_type = ${index}"));
        }

        if let Some(period) = &period {
            let index = sql::push_param(&mut params, period);

            filters.push_str(&format!(" and gst_filing.period = ${index}"));
        }

        let total: i64 = {
            let query = format!("select count(id) from gst_filing {filters}");

            conn.query_one(query.as_str(), params.as_slice()).await?.get(0)
        };

        let offset = limit.sql_offset(page);
        let limit_index = sql::push_param(&mut params, &limit);
        let offset_index = sql::push_param(&mut params, &offset);

        let query = format!(
            "\
            select {GST_COLUMNS} \
            from gst_filing \
            {filters} \
            order by gst_filing.created desc, gst_filing.id desc \
            limit ${limit_index} offset ${offset_index}"
        );

        let stream = conn.query_raw(query.as_str(), params).await?;

        futures::pin_mut!(stream);

        let mut list = Vec::new();

        while let Some(row) = stream.try_next().await? {
            list.push(gst_from_row(row));
        }

        Ok((list, total))
    }

    pub fn into_api(self) -> taxsetu_api::filings::gst::GstFiling {
        let computation = tax::compute_gst(&self.form_data);

        taxsetu_api::filings::gst::GstFiling {
            id: self.id,
            user_id: self.user_id,
            gstin: self.gstin,
            return_type: self.return_type,
            period: self.period,
            form_data: self.form_data,
            status: self.status,
            acknowledgment_no: self.acknowledgment_no,
            filed_at: self.filed_at,
            remarks: self.remarks,
            rejection_reason: self.rejection_reason,
            created: self.created,
            updated: self.updated,
            computation: Some(computation),
        }
    }
}
