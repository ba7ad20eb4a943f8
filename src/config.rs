use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use crate::error::{self, Context};

pub type Kdf = hkdf::Hkdf<sha3::Sha3_512>;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// a config path or directory to load file from
    #[arg(long)]
    config: Vec<PathBuf>
}

#[derive(Debug)]
pub struct Config {
    pub settings: Settings,
    pub kdf: Kdf,
}

#[derive(Debug)]
pub struct Settings {
    pub listeners: HashMap<String, Listener>,
    pub data: PathBuf,
    pub assets: PathBuf,
    pub db: DbSettings,
    pub sec: SecSettings,
}

#[derive(Debug, Clone)]
pub struct Listener {
    pub addr: SocketAddr,
}

#[derive(Debug)]
pub struct DbSettings {
    pub user: String,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub pool_size: usize,
}

#[derive(Debug)]
pub struct SecSettings {
    pub master_key: Option<String>,
    pub session: SessionSettings,
}

#[derive(Debug)]
pub struct SessionSettings {
    pub domain: Option<String>,
    pub secure: bool,
}

impl std::default::Default for Settings {
    fn default() -> Self {
        Settings {
            listeners: HashMap::from([(
                String::from("main"),
                Listener { addr: SocketAddr::from(([0, 0, 0, 0], 4885)) }
            )]),
            data: PathBuf::from("./data"),
            assets: PathBuf::from("./assets"),
            db: DbSettings {
                user: String::from("postgres"),
                password: None,
                host: String::from("localhost"),
                port: 5432,
                dbname: String::from("taxsetu"),
                pool_size: 16,
            },
            sec: SecSettings {
                master_key: None,
                session: SessionSettings {
                    domain: None,
                    secure: false,
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SettingsShape {
    listeners: Option<HashMap<String, ListenerShape>>,
    data: Option<PathBuf>,
    assets: Option<PathBuf>,
    db: Option<DbShape>,
    sec: Option<SecShape>,
}

#[derive(Debug, Deserialize)]
struct ListenerShape {
    addr: SocketAddr,
}

#[derive(Debug, Deserialize)]
struct DbShape {
    user: Option<String>,
    password: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    dbname: Option<String>,
    pool_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct SecShape {
    master_key: Option<String>,
    session: Option<SessionShape>,
}

#[derive(Debug, Deserialize)]
struct SessionShape {
    domain: Option<String>,
    secure: Option<bool>,
}

impl Settings {
    fn merge(&mut self, shape: SettingsShape) {
        if let Some(listeners) = shape.listeners {
            for (key, listener) in listeners {
                self.listeners.insert(key, Listener { addr: listener.addr });
            }
        }

        if let Some(data) = shape.data {
            self.data = data;
        }

        if let Some(assets) = shape.assets {
            self.assets = assets;
        }

        if let Some(db) = shape.db {
            if let Some(user) = db.user {
                self.db.user = user;
            }

            if db.password.is_some() {
                self.db.password = db.password;
            }

            if let Some(host) = db.host {
                self.db.host = host;
            }

            if let Some(port) = db.port {
                self.db.port = port;
            }

            if let Some(dbname) = db.dbname {
                self.db.dbname = dbname;
            }

            if let Some(pool_size) = db.pool_size {
                self.db.pool_size = pool_size;
            }
        }

        if let Some(sec) = shape.sec {
            if sec.master_key.is_some() {
                self.sec.master_key = sec.master_key;
            }

            if let Some(session) = sec.session {
                if session.domain.is_some() {
                    self.sec.session.domain = session.domain;
                }

                if let Some(secure) = session.secure {
                    self.sec.session.secure = secure;
                }
            }
        }
    }
}

impl Config {
    pub fn from_args(args: CliArgs) -> error::Result<Self> {
        let cwd = std::env::current_dir()
            .context("failed to retrieve cwd for Settings")?;
        let mut settings = Settings::default();

        for config_path in args.config {
            let full = if config_path.is_absolute() {
                config_path
            } else {
                cwd.join(config_path)
            };

            tracing::debug!("loading config file \"{}\"", full.display());

            let file = std::fs::File::open(&full)
                .context(format!("failed to open config file \"{}\"", full.display()))?;

            let shape: SettingsShape = serde_yaml::from_reader(file)
                .context(format!("failed to parse config file \"{}\"", full.display()))?;

            settings.merge(shape);
        }

        {
            let meta = std::fs::metadata(&settings.data).context(
                "failed to retrieve metadata for settings.data"
            )?;

            if !meta.is_dir() {
                return Err(error::Error::new().message(
                    "settings.data is not a directory"
                ));
            }
        }

        {
            let meta = std::fs::metadata(&settings.assets).context(
                "failed to retrieve metadata for settings.assets"
            )?;

            if !meta.is_dir() {
                return Err(error::Error::new().message(
                    "settings.assets is not a directory"
                ));
            }
        }

        let Some(master_key) = settings.sec.master_key.as_ref() else {
            return Err(error::Error::new().message(
                "settings.sec.master_key was not provided"
            ));
        };

        if master_key.is_empty() {
            return Err(error::Error::new().message(
                "settings.sec.master_key cannot be empty"
            ));
        }

        let kdf = Kdf::new(None, master_key.as_bytes());

        Ok(Config {
            settings,
            kdf,
        })
    }
}

pub fn get_config() -> error::Result<Config> {
    Config::from_args(CliArgs::parse())
}
