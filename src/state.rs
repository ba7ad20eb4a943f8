use std::path::{Path, PathBuf};
use std::sync::Arc;

use deadpool_postgres::Pool;

use crate::error;
use crate::config;
use crate::db;
use crate::sec;

#[derive(Debug)]
pub struct Shared {
    assets: PathBuf,
    documents: PathBuf,
    pool: Pool,
    sec: sec::state::Sec,
}

pub type ArcShared = Arc<Shared>;

impl Shared {
    pub fn from_config(config: &config::Config) -> error::Result<Shared> {
        tracing::debug!("creating Shared state");

        Ok(Shared {
            assets: config.settings.assets.clone(),
            documents: config.settings.data.join("documents"),
            pool: db::from_config(config)?,
            sec: sec::state::Sec::from_config(config)?,
        })
    }

    pub fn assets(&self) -> &Path {
        &self.assets
    }

    pub fn documents(&self) -> &Path {
        &self.documents
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn sec(&self) -> &sec::state::Sec {
        &self.sec
    }

    #[inline]
    pub fn auth(&self) -> &sec::state::Sec {
        self.sec()
    }
}

impl AsRef<Pool> for Shared {
    fn as_ref(&self) -> &Pool {
        &self.pool
    }
}

impl AsRef<sec::state::Sec> for Shared {
    fn as_ref(&self) -> &sec::state::Sec {
        &self.sec
    }
}
