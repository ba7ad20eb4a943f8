use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use tokio_postgres::Error as PgError;
use deadpool_postgres::GenericClient;

use taxsetu_lib::ids;
use taxsetu_lib::tickets::{TicketStatus, TicketPriority};
use taxsetu_lib::query::{Limit, Page};

use crate::sql;

#[derive(Debug)]
pub struct Ticket {
    pub id: ids::TicketId,
    pub user_id: ids::UserId,
    pub subject: String,
    pub body: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

const SELECT_COLUMNS: &str = "\
    tickets.id, \
    tickets.user_id, \
    tickets.subject, \
    tickets.body, \
    tickets.status, \
    tickets.priority, \
    tickets.created, \
    tickets.updated";

fn from_row(row: tokio_postgres::Row) -> Ticket {
    Ticket {
        id: row.get(0),
        user_id: row.get(1),
        subject: row.get(2),
        body: row.get(3),
        status: TicketStatus::from_i16(row.get(4))
            .expect("invalid status returned from database for ticket"),
        priority: TicketPriority::from_i16(row.get(5))
            .expect("invalid priority returned from database for ticket"),
        created: row.get(6),
        updated: row.get(7),
    }
}

impl Ticket {
    pub async fn retrieve(
        conn: &impl GenericClient,
        id: &ids::TicketId,
    ) -> Result<Option<Ticket>, PgError> {
        let query = format!("select {SELECT_COLUMNS} from tickets where tickets.id = $1");

        Ok(conn.query_opt(query.as_str(), &[id])
            .await?
            .map(from_row))
    }

    pub async fn create(
        conn: &impl GenericClient,
        user_id: &ids::UserId,
        subject: &str,
        body: &str,
        priority: TicketPriority,
    ) -> Result<Ticket, PgError> {
        let status = TicketStatus::Open;
        let created = Utc::now();

        let row = conn.query_one(
            "\
            insert into tickets (user_id, subject, body, status, priority, created) \
            values ($1, $2, $3, $4, $5, $6) \
            returning id",
            &[
                user_id,
                &subject,
                &body,
                &status.as_i16(),
                &priority.as_i16(),
                &created,
            ]
        ).await?;

        Ok(Ticket {
            id: row.get(0),
            user_id: *user_id,
            subject: subject.to_owned(),
            body: body.to_owned(),
            status,
            priority,
            created,
            updated: None,
        })
    }

    pub async fn update_status(
        &mut self,
        conn: &impl GenericClient,
        status: TicketStatus,
    ) -> Result<(), PgError> {
        let updated = Utc::now();

        let _ = conn.execute(
            "update tickets set status = $2, updated = $3 where id = $1",
            &[&self.id, &status.as_i16(), &updated]
        ).await?;

        self.status = status;
        self.updated = Some(updated);

        Ok(())
    }

    pub async fn query_user(
        conn: &impl GenericClient,
        user_id: &ids::UserId,
        page: Page,
        limit: Limit,
    ) -> Result<(Vec<Ticket>, i64), PgError> {
        let total: i64 = conn.query_one(
            "select count(id) from tickets where user_id = $1",
            &[user_id]
        ).await?.get(0);

        let offset = limit.sql_offset(page);

        let query = format!(
            "\
            select {SELECT_COLUMNS} \
            from tickets \
            where tickets.user_id = $1 \
            order by tickets.created desc, tickets.id desc \
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

    pub fn into_api(self) -> taxsetu_api::tickets::Ticket {
        taxsetu_api::tickets::Ticket {
            id: self.id,
            user_id: self.user_id,
            subject: self.subject,
            body: self.body,
            status: self.status,
            priority: self.priority,
            created: self.created,
            updated: self.updated,
        }
    }
}
