use anyhow::{anyhow, bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fmt::Display,
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use crate::feed::publisher::DEFAULT_FEED_INTERVAL;

/// Path of an optional JSON settings file.
pub const CONFIG_ENV: &str = "TEAMPULSE_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Sqlite { path: PathBuf },
    Redis { url: String },
}

impl Default for StoreBackend {
    fn default() -> Self {
        StoreBackend::Sqlite {
            path: PathBuf::from("data/feedback.sqlite3"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    pub store: StoreBackend,
    pub feed_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            store: StoreBackend::default(),
            feed_interval_secs: DEFAULT_FEED_INTERVAL.as_secs(),
        }
    }
}

impl Settings {
    /// Defaults, then the JSON file named by `TEAMPULSE_CONFIG`, then env overrides.
    pub fn load() -> Result<Self> {
        let mut settings = match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        settings.apply_overrides(|key| env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = parse_var(&lookup, "TEAMPULSE_HOST")? {
            self.host = host;
        }
        if let Some(port) = parse_var(&lookup, "TEAMPULSE_PORT")? {
            self.port = port;
        }
        if let Some(secs) = parse_var(&lookup, "TEAMPULSE_FEED_INTERVAL_SECS")? {
            self.feed_interval_secs = secs;
        }

        let kind = lookup("TEAMPULSE_STORE");
        let db_path = lookup("TEAMPULSE_DB_PATH");
        let redis_url = lookup("TEAMPULSE_REDIS_URL");

        if let Some(kind) = kind {
            self.store = match kind.trim().to_ascii_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "sqlite" => StoreBackend::Sqlite {
                    path: db_path
                        .clone()
                        .map(PathBuf::from)
                        .unwrap_or_else(|| match &self.store {
                            StoreBackend::Sqlite { path } => path.clone(),
                            _ => PathBuf::from("data/feedback.sqlite3"),
                        }),
                },
                "redis" => StoreBackend::Redis {
                    url: redis_url
                        .clone()
                        .unwrap_or_else(|| match &self.store {
                            StoreBackend::Redis { url } => url.clone(),
                            _ => "redis://127.0.0.1:6379".to_string(),
                        }),
                },
                other => bail!("Invalid TEAMPULSE_STORE value: {other}"),
            };
        }

        match &mut self.store {
            StoreBackend::Sqlite { path } => {
                if let Some(db_path) = db_path {
                    *path = PathBuf::from(db_path);
                }
            }
            StoreBackend::Redis { url } => {
                if let Some(redis_url) = redis_url {
                    *url = redis_url;
                }
            }
            StoreBackend::Memory => {}
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed_interval_secs == 0 {
            bail!("feed_interval_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn feed_interval(&self) -> Duration {
        Duration::from_secs(self.feed_interval_secs)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            info!("{key} set, overriding default");
            raw.trim()
                .parse()
                .map(Some)
                .map_err(|err| anyhow!("Invalid {key} value '{raw}': {err}"))
        }
        None => Ok(None),
    }
}
