use chrono::{DateTime, Utc};
use tokio_postgres::Error as PgError;
use deadpool_postgres::GenericClient;

use taxsetu_lib::ids;
use taxsetu_lib::users::{UserRole, UserStatus};

#[derive(Debug)]
pub struct User {
    pub id: ids::UserId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

fn from_row(row: tokio_postgres::Row) -> User {
    User {
        id: row.get(0),
        email: row.get(1),
        name: row.get(2),
        phone: row.get(3),
        role: UserRole::from_i16(row.get(4))
            .expect("invalid role returned from database for user"),
        status: UserStatus::from_i16(row.get(5))
            .expect("invalid status returned from database for user"),
        email_verified: row.get(6),
        created: row.get(7),
        updated: row.get(8),
    }
}

const SELECT_COLUMNS: &str = "\
    users.id, \
    users.email, \
    users.name, \
    users.phone, \
    users.role, \
    users.status, \
    users.email_verified, \
    users.created, \
    users.updated";

impl User {
    pub async fn retrieve(
        conn: &impl GenericClient,
        id: &ids::UserId,
    ) -> Result<Option<User>, PgError> {
        let query = format!(
            "select {SELECT_COLUMNS} from users where users.id = $1"
        );

        Ok(conn.query_opt(query.as_str(), &[id])
            .await?
            .map(from_row))
    }

    pub async fn retrieve_email(
        conn: &impl GenericClient,
        email: &str,
    ) -> Result<Option<User>, PgError> {
        let query = format!(
            "select {SELECT_COLUMNS} from users where users.email = $1"
        );

        Ok(conn.query_opt(query.as_str(), &[&email])
            .await?
            .map(from_row))
    }

    /// inserts a new regular user. a duplicate email surfaces as the unique
    /// constraint violation on users.email
    pub async fn create(
        conn: &impl GenericClient,
        email: &str,
        name: &str,
        phone: Option<&str>,
    ) -> Result<User, PgError> {
        let role = UserRole::User;
        let status = UserStatus::Active;
        let created = Utc::now();

        let row = conn.query_one(
            "\
            insert into users (email, name, phone, role, status, email_verified, created) \
            values ($1, $2, $3, $4, $5, false, $6) \
            returning id",
            &[
                &email,
                &name,
                &phone,
                &role.as_i16(),
                &status.as_i16(),
                &created,
            ]
        ).await?;

        Ok(User {
            id: row.get(0),
            email: email.to_owned(),
            name: name.to_owned(),
            phone: phone.map(str::to_owned),
            role,
            status,
            email_verified: false,
            created,
            updated: None,
        })
    }

    pub async fn update(&mut self, conn: &impl GenericClient) -> Result<(), PgError> {
        let updated = Utc::now();

        let _ = conn.execute(
            "update users set name = $2, phone = $3, updated = $4 where id = $1",
            &[&self.id, &self.name, &self.phone, &updated]
        ).await?;

        self.updated = Some(updated);

        Ok(())
    }

    pub fn is_staff(&self) -> bool {
        self.role == UserRole::Staff
    }

    pub fn into_api(self) -> taxsetu_api::users::User {
        taxsetu_api::users::User {
            id: self.id,
            email: self.email,
            name: self.name,
            phone: self.phone,
            role: self.role,
            status: self.status,
            email_verified: self.email_verified,
            created: self.created,
        }
    }
}
