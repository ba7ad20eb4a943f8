use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use rust_decimal::Decimal;
use tokio_postgres::Error as PgError;
use deadpool_postgres::GenericClient;

use taxsetu_lib::ids;
use taxsetu_lib::payments::{PaymentStatus, PaymentPurpose};
use taxsetu_lib::query::{Limit, Page};

use crate::sql;

pub const CURRENCY: &str = "INR";

#[derive(Debug)]
pub struct Payment {
    pub id: ids::PaymentId,
    pub user_id: ids::UserId,
    pub purpose: PaymentPurpose,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub reference: String,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

const SELECT_COLUMNS: &str = "\
    payments.id, \
    payments.user_id, \
    payments.purpose, \
    payments.amount, \
    payments.currency, \
    payments.status, \
    payments.reference, \
    payments.created, \
    payments.updated";

fn from_row(row: tokio_postgres::Row) -> Payment {
    Payment {
        id: row.get(0),
        user_id: row.get(1),
        purpose: PaymentPurpose::from_i16(row.get(2))
            .expect("invalid purpose returned from database for payment"),
        amount: row.get(3),
        currency: row.get(4),
        status: PaymentStatus::from_i16(row.get(5))
            .expect("invalid status returned from database for payment"),
        reference: row.get(6),
        created: row.get(7),
        updated: row.get(8),
    }
}

impl Payment {
    pub async fn retrieve(
        conn: &impl GenericClient,
        id: &ids::PaymentId,
    ) -> Result<Option<Payment>, PgError> {
        let query = format!("select {SELECT_COLUMNS} from payments where payments.id = $1");

        Ok(conn.query_opt(query.as_str(), &[id])
            .await?
            .map(from_row))
    }

    /// the gateway side is stubbed. the record is created locally with a
    /// server generated reference and stays in CREATED until reconciled
    pub async fn create(
        conn: &impl GenericClient,
        user_id: &ids::UserId,
        purpose: PaymentPurpose,
        amount: Decimal,
    ) -> Result<Payment, PgError> {
        let status = PaymentStatus::Created;
        let created = Utc::now();
        let reference = format!("pay_{}", nanoid::nanoid!());

        let row = conn.query_one(
            "\
            insert into payments (user_id, purpose, amount, currency, status, reference, created) \
            values ($1, $2, $3, $4, $5, $6, $7) \
            returning id",
            &[
                user_id,
                &purpose.as_i16(),
                &amount,
                &CURRENCY,
                &status.as_i16(),
                &reference,
                &created,
            ]
        ).await?;

        Ok(Payment {
            id: row.get(0),
            user_id: *user_id,
            purpose,
            amount,
            currency: CURRENCY.to_owned(),
            status,
            reference,
            created,
            updated: None,
        })
    }

    pub async fn query_user(
        conn: &impl GenericClient,
        user_id: &ids::UserId,
        page: Page,
        limit: Limit,
    ) -> Result<(Vec<Payment>, i64), PgError> {
        let total: i64 = conn.query_one(
            "select count(id) from payments where user_id = $1",
            &[user_id]
        ).await?.get(0);

        let offset = limit.sql_offset(page);

        let query = format!(
            "\
            select {SELECT_COLUMNS} \
            from payments \
            where payments.user_id = $1 \
            order by payments.created desc, payments.id desc \
            limit $2 offset $3"
        );

        let params: sql::ParamsVec = vec![user_id, &limit, &offset];

        let stream = conn.query_raw(query.as_str(), params).await?;

        futures::pin_mut!(stream);

        let mut list = Vec::new();

        while let Some(row) = stream.try_next().await? {
            list.push(from_row(row));
        }

        Ok((list, total))
    }

    pub fn into_api(self) -> taxsetu_api::payments::Payment {
        taxsetu_api::payments::Payment {
            id: self.id,
            user_id: self.user_id,
            purpose: self.purpose,
            amount: self.amount,
            currency: self.currency,
            status: self.status,
            reference: self.reference,
            created: self.created,
            updated: self.updated,
        }
    }
}
