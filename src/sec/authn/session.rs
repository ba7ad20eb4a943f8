use chrono::Utc;
use base64::{Engine, engine::general_purpose::URL_SAFE};
use tokio_postgres::Error as PgError;
use deadpool_postgres::GenericClient;

use taxsetu_lib::ids;

use crate::sec::state;
use crate::net::error::Error as NetError;
use crate::net::cookie::{SameSite, SetCookie};

pub mod token;

pub const SESSION_COOKIE: &str = "auth-token";
pub const SESSION_DAYS: i64 = 7;

pub enum BuilderError {
    TokenAttempts,
    UtcOverflow,

    Pg(PgError),
    Rand(rand::Error),
}

impl From<PgError> for BuilderError {
    fn from(err: PgError) -> Self {
        BuilderError::Pg(err)
    }
}

impl From<rand::Error> for BuilderError {
    fn from(err: rand::Error) -> Self {
        BuilderError::Rand(err)
    }
}

impl From<token::UniqueError> for BuilderError {
    fn from(err: token::UniqueError) -> Self {
        match err {
            token::UniqueError::Rand(err) => BuilderError::Rand(err),
            token::UniqueError::Pg(err) => BuilderError::Pg(err)
        }
    }
}

impl From<BuilderError> for NetError {
    fn from(err: BuilderError) -> NetError {
        match err {
            BuilderError::TokenAttempts => NetError::new()
                .source("ran out of token attempts"),
            BuilderError::UtcOverflow => NetError::new()
                .source("date time value overflowed"),
            BuilderError::Pg(err) => err.into(),
            BuilderError::Rand(err) => err.into(),
        }
    }
}

pub struct SessionBuilder {
    user_id: ids::UserId,
    ip: Option<String>,
    user_agent: Option<String>,
}

impl SessionBuilder {
    pub fn ip<I>(&mut self, ip: I) -> &mut Self
    where
        I: Into<String>
    {
        self.ip = Some(ip.into());
        self
    }

    pub fn user_agent<U>(&mut self, user_agent: U) -> &mut Self
    where
        U: Into<String>
    {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub async fn build(self, conn: &impl GenericClient) -> Result<Session, BuilderError> {
        let user_id = self.user_id;
        let issued_on = Utc::now();
        let duration = chrono::Duration::days(SESSION_DAYS);

        let Some(token) = token::SessionToken::unique(conn, 10).await? else {
            return Err(BuilderError::TokenAttempts);
        };

        let Some(expires) = issued_on.checked_add_signed(duration) else {
            return Err(BuilderError::UtcOverflow);
        };

        let _ = conn.execute(
            "\
            insert into auth_session (token, user_id, issued_on, expires, ip, user_agent) \
            values ($1, $2, $3, $4, $5, $6)",
            &[
                &token.as_slice(),
                &user_id,
                &issued_on,
                &expires,
                &self.ip,
                &self.user_agent,
            ]
        ).await?;

        Ok(Session {
            token,
            user_id,
            issued_on,
            expires,
            ip: self.ip,
            user_agent: self.user_agent,
        })
    }
}

#[derive(Debug)]
pub struct Session {
    pub token: token::SessionToken,
    pub user_id: ids::UserId,
    pub issued_on: chrono::DateTime<chrono::Utc>,
    pub expires: chrono::DateTime<chrono::Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl Session {
    pub fn builder(user_id: ids::UserId) -> SessionBuilder {
        SessionBuilder {
            user_id,
            ip: None,
            user_agent: None,
        }
    }

    pub async fn retrieve_token(
        conn: &impl GenericClient,
        token: &token::SessionToken
    ) -> Result<Option<Session>, PgError> {
        if let Some(row) = conn.query_opt(
            "\
            select auth_session.token, \
                   auth_session.user_id, \
                   auth_session.issued_on, \
                   auth_session.expires, \
                   auth_session.ip, \
                   auth_session.user_agent \
            from auth_session \
            where auth_session.token = $1",
            &[&token.as_slice()]
        ).await? {
            Ok(Some(Session {
                token: token::SessionToken::from_vec(row.get(0)),
                user_id: row.get(1),
                issued_on: row.get(2),
                expires: row.get(3),
                ip: row.get(4),
                user_agent: row.get(5),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn expired(&self) -> bool {
        self.expires < Utc::now()
    }

    pub async fn delete(&self, conn: &impl GenericClient) -> Result<(), PgError> {
        let _ = conn.execute(
            "delete from auth_session where token = $1",
            &[&self.token.as_slice()]
        ).await?;

        Ok(())
    }
}

pub type Hash = blake3::Hash;

pub fn create_hash<T>(auth: &state::Sec, token: T) -> Hash
where
    T: AsRef<[u8]>
{
    blake3::keyed_hash(auth.session_info().key(), token.as_ref())
}

pub fn encode_base64<T>(token: T, hash: Hash) -> String
where
    T: AsRef<[u8]>
{
    let token_ref = token.as_ref();

    let slice = hash.as_bytes();

    let mut joined = Vec::with_capacity(token_ref.len() + slice.len());
    joined.extend_from_slice(token_ref);
    joined.extend_from_slice(slice);

    URL_SAFE.encode(joined)
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("given string is not valid base64")]
    InvalidString,

    #[error("decoded bytes do not have the expected length")]
    InvalidLength,

    #[error("keyed hash does not match the token")]
    InvalidHash,
}

pub fn decode_base64<S>(
    auth: &state::Sec,
    session_id: S
) -> Result<(token::SessionToken, Hash), DecodeError>
where
    S: AsRef<[u8]>
{
    let Ok(mut bytes) = URL_SAFE.decode(session_id) else {
        return Err(DecodeError::InvalidString);
    };

    if bytes.len() != token::SESSION_ID_BYTES + blake3::OUT_LEN {
        return Err(DecodeError::InvalidLength);
    };

    let token = token::SessionToken::drain_vec(&mut bytes);
    let hash: [u8; blake3::OUT_LEN] = bytes.try_into()
        .expect("remaining bytes do not match expected length");
    let given = blake3::Hash::from(hash);

    let expected = blake3::keyed_hash(auth.session_info().key(), token.as_slice());

    if given != expected {
        Err(DecodeError::InvalidHash)
    } else {
        Ok((token, given))
    }
}

pub fn create_session_cookie(auth: &state::Sec, session: &Session) -> SetCookie {
    let hash = create_hash(auth, &session.token);
    let encoded_token = encode_base64(&session.token, hash);

    let mut cookie = SetCookie::new(SESSION_COOKIE, encoded_token)
        .with_expires(session.expires)
        .with_path("/")
        .with_http_only(true)
        .with_secure(*auth.session_info().secure())
        .with_same_site(SameSite::Strict);

    if let Some(domain) = auth.session_info().domain() {
        cookie.set_domain(domain);
    }

    cookie
}

pub fn expire_session_cookie(auth: &state::Sec) -> SetCookie {
    let mut cookie = SetCookie::new(SESSION_COOKIE, "")
        .with_max_age(std::time::Duration::new(0, 0))
        .with_path("/")
        .with_http_only(true)
        .with_secure(*auth.session_info().secure())
        .with_same_site(SameSite::Strict);

    if let Some(domain) = auth.session_info().domain() {
        cookie.set_domain(domain);
    }

    cookie
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_state() -> state::Sec {
        state::Sec::test_with_master_key("sessions test master key")
    }

    #[test]
    fn encode_decode_round_trip() {
        let auth = test_state();

        let bytes = [7; token::SESSION_ID_BYTES];
        let token = token::SessionToken::from(bytes);
        let hash = create_hash(&auth, &token);

        let encoded = encode_base64(&token, hash);

        let (decode_token, decode_hash) = decode_base64(&auth, &encoded)
            .expect("failed to decode session id");

        assert_eq!(token, decode_token, "tokens do not match");
        assert_eq!(hash, decode_hash, "hashes do not match");
    }

    #[test]
    fn tampered_token_rejected() {
        let auth = test_state();

        let token = token::SessionToken::from([7; token::SESSION_ID_BYTES]);
        let hash = create_hash(&auth, &token);

        let mut encoded = encode_base64(&token, hash).into_bytes();
        // flip a character inside the token portion
        encoded[0] = if encoded[0] == b'A' { b'B' } else { b'A' };

        match decode_base64(&auth, &encoded) {
            Err(DecodeError::InvalidHash) => {},
            other => panic!("expected InvalidHash, got {other:?}")
        }
    }

    #[test]
    fn truncated_rejected() {
        let auth = test_state();

        match decode_base64(&auth, URL_SAFE.encode([0u8; 12])) {
            Err(DecodeError::InvalidLength) => {},
            other => panic!("expected InvalidLength, got {other:?}")
        }

        match decode_base64(&auth, "not//valid??base64") {
            Err(DecodeError::InvalidString) => {},
            other => panic!("expected InvalidString, got {other:?}")
        }
    }
}
