use crate::error;
use crate::config;

pub const SESSION_KEY_INFO: &[u8] = b"taxsetu.sec.sessions";
pub const SESSION_KEY_LEN: usize = 32;

pub type SessionKey = [u8; SESSION_KEY_LEN];

#[derive(Debug)]
pub struct SessionInfo {
    key: SessionKey,
    domain: Option<String>,
    secure: bool,
}

impl SessionInfo {
    pub fn from_config(config: &config::Config) -> error::Result<Self> {
        tracing::debug!("creating SessionInfo state");

        let mut key = [0u8; SESSION_KEY_LEN];

        if config.kdf.expand(SESSION_KEY_INFO, &mut key).is_err() {
            return Err(error::Error::new()
                .kind("KDFExpandFailed")
                .message("failed to expand session key from master key"));
        }

        Ok(SessionInfo {
            key,
            domain: config.settings.sec.session.domain.clone(),
            secure: config.settings.sec.session.secure,
        })
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn domain(&self) -> Option<&String> {
        self.domain.as_ref()
    }

    pub fn secure(&self) -> &bool {
        &self.secure
    }
}

#[derive(Debug)]
pub struct Sec {
    session_info: SessionInfo,
}

impl Sec {
    pub fn from_config(config: &config::Config) -> error::Result<Sec> {
        tracing::debug!("creating Sec state");

        Ok(Sec {
            session_info: SessionInfo::from_config(config)?,
        })
    }

    pub fn session_info(&self) -> &SessionInfo {
        &self.session_info
    }

    #[cfg(test)]
    pub fn test_with_master_key(master_key: &str) -> Sec {
        let kdf = config::Kdf::new(None, master_key.as_bytes());
        let mut key = [0u8; SESSION_KEY_LEN];

        kdf.expand(SESSION_KEY_INFO, &mut key)
            .expect("failed to expand test session key");

        Sec {
            session_info: SessionInfo {
                key,
                domain: None,
                secure: false,
            }
        }
    }
}
