use chrono::Utc;
use tokio_postgres::Error as PgError;
use deadpool_postgres::GenericClient;
use argon2::Variant;
use rand::RngCore;

use taxsetu_lib::ids;

use crate::net::error::Error as NetError;

pub const SALT_LEN: usize = 32;

pub type Salt = [u8; SALT_LEN];

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed updating password")]
    UpdateFailed,

    #[error("failed creating password")]
    CreateFailed,

    #[error(transparent)]
    Rand(#[from] rand::Error),

    #[error(transparent)]
    Argon2(#[from] argon2::Error),

    #[error(transparent)]
    Db(#[from] PgError)
}

impl From<PasswordError> for NetError {
    fn from(err: PasswordError) -> Self {
        NetError::new().source(err)
    }
}

pub fn gen_salt() -> Result<Salt, rand::Error> {
    let mut salt = [0u8; SALT_LEN];

    rand::thread_rng().try_fill_bytes(&mut salt)?;

    Ok(salt)
}

pub fn gen_hash(password: &str, salt: &[u8]) -> Result<String, argon2::Error> {
    let mut config = argon2::Config::default();
    config.mem_cost = 19456;
    config.variant = Variant::Argon2id;

    argon2::hash_encoded(
        password.as_bytes(),
        salt,
        &config
    )
}

pub struct Password {
    pub user_id: ids::UserId,
    pub hash: String,
}

impl Password {
    pub async fn retrieve(
        conn: &impl GenericClient,
        user_id: &ids::UserId,
    ) -> Result<Option<Password>, PgError> {
        if let Some(row) = conn.query_opt(
            "\
            select auth_password.user_id, \
                   auth_password.hash \
            from auth_password \
            where auth_password.user_id = $1",
            &[user_id]
        ).await? {
            Ok(Some(Password {
                user_id: row.get(0),
                hash: row.get(1)
            }))
        } else {
            Ok(None)
        }
    }

    pub async fn create(
        conn: &impl GenericClient,
        user_id: &ids::UserId,
        password: &str,
    ) -> Result<Self, PasswordError> {
        let salt = gen_salt()?;
        let hash = gen_hash(password, &salt)?;
        let updated = Utc::now();

        let result = conn.execute(
            "\
            insert into auth_password (user_id, hash, updated) values \
            ($1, $2, $3)",
            &[user_id, &hash, &updated]
        ).await?;

        if result != 1 {
            return Err(PasswordError::CreateFailed);
        }

        Ok(Password {
            user_id: *user_id,
            hash,
        })
    }

    /// replaces the stored hash. the previous hash is gone once this
    /// commits, there is no in place mutation to roll back
    pub async fn update(
        &mut self,
        conn: &impl GenericClient,
        update: &str,
    ) -> Result<(), PasswordError> {
        let salt = gen_salt()?;
        let hash = gen_hash(update, &salt)?;
        let updated = Utc::now();

        let result = conn.execute(
            "update auth_password set hash = $2, updated = $3 where user_id = $1",
            &[&self.user_id, &hash, &updated]
        ).await?;

        if result != 1 {
            return Err(PasswordError::UpdateFailed);
        }

        self.hash = hash;

        Ok(())
    }

    pub fn verify<C>(&self, check: C) -> Result<bool, PasswordError>
    where
        C: AsRef<[u8]>
    {
        Ok(argon2::verify_encoded_ext(&self.hash, check.as_ref(), &[], &[])?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let salt = gen_salt().expect("failed to generate salt");
        let hash = gen_hash("Aa1!aaaa", &salt).expect("failed to hash password");

        assert!(argon2::verify_encoded_ext(&hash, b"Aa1!aaaa", &[], &[]).unwrap());
        assert!(!argon2::verify_encoded_ext(&hash, b"Aa1!aaab", &[], &[]).unwrap());
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let salt = gen_salt().expect("failed to generate salt");
        let hash = gen_hash("super secret password", &salt).expect("failed to hash password");

        assert!(!hash.contains("super secret password"));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn salted_hashes_differ() {
        let first = gen_hash("Aa1!aaaa", &gen_salt().unwrap()).unwrap();
        let second = gen_hash("Aa1!aaaa", &gen_salt().unwrap()).unwrap();

        assert_ne!(first, second);
    }
}
