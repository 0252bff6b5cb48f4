use media_sync_models::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const ENV_IMDB_AT_MAIN: &str = "IMDB_COOKIE_AT_MAIN";
pub const ENV_IMDB_UBID_MAIN: &str = "IMDB_COOKIE_UBID_MAIN";
pub const ENV_IMDB_RATINGS_LIST_ID: &str = "IMDB_RATINGS_LIST_ID";
pub const ENV_IMDB_WATCHLIST_LIST_ID: &str = "IMDB_WATCHLIST_LIST_ID";
pub const ENV_IMDB_BASE_URL: &str = "IMDB_BASE_URL";
pub const ENV_TRAKT_CLIENT_ID: &str = "TRAKT_CLIENT_ID";
pub const ENV_TRAKT_ACCESS_TOKEN: &str = "TRAKT_ACCESS_TOKEN";
pub const ENV_TRAKT_BASE_URL: &str = "TRAKT_BASE_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "SYNC_HTTP_TIMEOUT_SECS";
pub const ENV_WRITE_DELAY_MS: &str = "SYNC_WRITE_DELAY_MS";
pub const ENV_PAGE_LIMIT: &str = "SYNC_PAGE_LIMIT";
pub const ENV_FETCH_CAP: &str = "SYNC_FETCH_CAP";
pub const ENV_TRACE: &str = "SYNC_TRACE";

pub const DEFAULT_IMDB_BASE_URL: &str = "https://www.imdb.com";
pub const DEFAULT_TRAKT_BASE_URL: &str = "https://api.trakt.tv";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_WRITE_DELAY_MS: u64 = 1000;
/// Lower bound for the pause between destination writes
const MIN_WRITE_DELAY_MS: u64 = 1000;
const DEFAULT_PAGE_LIMIT: u32 = 1000;
const DEFAULT_FETCH_CAP: usize = 10_000;

/// Credential or token that must never show up in logs
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First four characters followed by asterisks, for `config show`
    pub fn masked(&self) -> String {
        let visible: String = self.0.chars().take(4).collect();
        if self.0.chars().count() <= 4 {
            "****".to_string()
        } else {
            format!("{}****", visible)
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

/// Fully validated runtime configuration, passed explicitly to the orchestrator
#[derive(Debug, Clone)]
pub struct Config {
    pub imdb: ImdbConfig,
    pub trakt: TraktConfig,
    pub http: HttpConfig,
    /// Log every request and response body through the shared HTTP wrapper
    pub trace: bool,
}

#[derive(Debug, Clone)]
pub struct ImdbConfig {
    pub at_main: Secret,
    pub ubid_main: Secret,
    pub ratings_list_id: String,
    pub watchlist_list_id: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct TraktConfig {
    pub client_id: String,
    pub access_token: Secret,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub write_delay: Duration,
    pub page_limit: u32,
    pub fetch_cap: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            write_delay: Duration::from_millis(DEFAULT_WRITE_DELAY_MS),
            page_limit: DEFAULT_PAGE_LIMIT,
            fetch_cap: DEFAULT_FETCH_CAP,
        }
    }
}

/// On-disk TOML layout; every field optional so env vars can fill the gaps
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub imdb: ImdbSection,
    #[serde(default)]
    pub trakt: TraktSection,
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub trace: Option<bool>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ImdbSection {
    pub at_main: Option<String>,
    pub ubid_main: Option<String>,
    pub ratings_list_id: Option<String>,
    pub watchlist_list_id: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TraktSection {
    pub client_id: Option<String>,
    pub access_token: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct HttpSection {
    pub timeout_secs: Option<u64>,
    pub write_delay_ms: Option<u64>,
    pub page_limit: Option<u32>,
    pub fetch_cap: Option<usize>,
}

impl FileConfig {
    /// Reads the TOML file at `path`; a missing file yields an empty config
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, relying on environment");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            SyncError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// The `trace` setting after the environment overlay; `SYNC_TRACE` wins over the file
    pub fn trace_enabled<F>(&self, env: F) -> Result<bool>
    where
        F: Fn(&str) -> Option<String>,
    {
        match env(ENV_TRACE).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(raw) => parse_bool(ENV_TRACE, &raw),
            None => Ok(self.trace.unwrap_or(false)),
        }
    }
}

impl Config {
    /// Loads the file at `path` and overlays the process environment
    pub fn load(path: &Path) -> Result<Self> {
        let file = FileConfig::from_path(path)?;
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merges `file` with values returned by `env` (env wins) and validates the result.
    ///
    /// Every missing required key is reported in a single error so the user can
    /// fix their environment in one pass.
    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let trace = file.trace_enabled(&env)?;
        let lookup = |key: &str, fallback: Option<String>| -> Option<String> {
            env(key)
                .or(fallback)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let at_main = lookup(ENV_IMDB_AT_MAIN, file.imdb.at_main);
        let ubid_main = lookup(ENV_IMDB_UBID_MAIN, file.imdb.ubid_main);
        let ratings_list_id = lookup(ENV_IMDB_RATINGS_LIST_ID, file.imdb.ratings_list_id);
        let watchlist_list_id = lookup(ENV_IMDB_WATCHLIST_LIST_ID, file.imdb.watchlist_list_id);
        let client_id = lookup(ENV_TRAKT_CLIENT_ID, file.trakt.client_id);
        let access_token = lookup(ENV_TRAKT_ACCESS_TOKEN, file.trakt.access_token);

        let mut missing = Vec::new();
        for (value, env_name, toml_key) in [
            (&at_main, ENV_IMDB_AT_MAIN, "imdb.at_main"),
            (&ubid_main, ENV_IMDB_UBID_MAIN, "imdb.ubid_main"),
            (&ratings_list_id, ENV_IMDB_RATINGS_LIST_ID, "imdb.ratings_list_id"),
            (&watchlist_list_id, ENV_IMDB_WATCHLIST_LIST_ID, "imdb.watchlist_list_id"),
            (&client_id, ENV_TRAKT_CLIENT_ID, "trakt.client_id"),
            (&access_token, ENV_TRAKT_ACCESS_TOKEN, "trakt.access_token"),
        ] {
            if value.is_none() {
                missing.push(format!("{} ({})", env_name, toml_key));
            }
        }
        if !missing.is_empty() {
            return Err(SyncError::Configuration(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let (
            Some(at_main),
            Some(ubid_main),
            Some(ratings_list_id),
            Some(watchlist_list_id),
            Some(client_id),
            Some(access_token),
        ) = (at_main, ubid_main, ratings_list_id, watchlist_list_id, client_id, access_token)
        else {
            return Err(SyncError::Configuration("missing required settings".to_string()));
        };

        validate_list_id(ENV_IMDB_RATINGS_LIST_ID, &ratings_list_id)?;
        validate_list_id(ENV_IMDB_WATCHLIST_LIST_ID, &watchlist_list_id)?;

        let timeout_secs = parse_number(
            ENV_HTTP_TIMEOUT_SECS,
            lookup(ENV_HTTP_TIMEOUT_SECS, None),
            file.http.timeout_secs,
            DEFAULT_TIMEOUT_SECS,
        )?;
        let write_delay_ms = parse_number(
            ENV_WRITE_DELAY_MS,
            lookup(ENV_WRITE_DELAY_MS, None),
            file.http.write_delay_ms,
            DEFAULT_WRITE_DELAY_MS,
        )?;
        let page_limit = parse_number(
            ENV_PAGE_LIMIT,
            lookup(ENV_PAGE_LIMIT, None),
            file.http.page_limit,
            DEFAULT_PAGE_LIMIT,
        )?;
        let fetch_cap = parse_number(
            ENV_FETCH_CAP,
            lookup(ENV_FETCH_CAP, None),
            file.http.fetch_cap,
            DEFAULT_FETCH_CAP,
        )?;

        if timeout_secs == 0 {
            return Err(SyncError::Configuration(format!(
                "{} must be greater than zero",
                ENV_HTTP_TIMEOUT_SECS
            )));
        }
        if write_delay_ms < MIN_WRITE_DELAY_MS {
            return Err(SyncError::Configuration(format!(
                "{} must be at least {} (got {})",
                ENV_WRITE_DELAY_MS, MIN_WRITE_DELAY_MS, write_delay_ms
            )));
        }
        if page_limit == 0 || fetch_cap == 0 {
            return Err(SyncError::Configuration(format!(
                "{} and {} must be greater than zero",
                ENV_PAGE_LIMIT, ENV_FETCH_CAP
            )));
        }

        Ok(Self {
            imdb: ImdbConfig {
                at_main: Secret::new(at_main),
                ubid_main: Secret::new(ubid_main),
                ratings_list_id,
                watchlist_list_id,
                base_url: trim_base_url(
                    lookup(ENV_IMDB_BASE_URL, file.imdb.base_url)
                        .unwrap_or_else(|| DEFAULT_IMDB_BASE_URL.to_string()),
                ),
            },
            trakt: TraktConfig {
                client_id,
                access_token: Secret::new(access_token),
                base_url: trim_base_url(
                    lookup(ENV_TRAKT_BASE_URL, file.trakt.base_url)
                        .unwrap_or_else(|| DEFAULT_TRAKT_BASE_URL.to_string()),
                ),
            },
            http: HttpConfig {
                timeout: Duration::from_secs(timeout_secs),
                write_delay: Duration::from_millis(write_delay_ms),
                page_limit,
                fetch_cap,
            },
            trace,
        })
    }

    /// Configuration with secrets masked, for display
    pub fn masked_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "imdb": {
                "at_main": self.imdb.at_main.masked(),
                "ubid_main": self.imdb.ubid_main.masked(),
                "ratings_list_id": self.imdb.ratings_list_id,
                "watchlist_list_id": self.imdb.watchlist_list_id,
                "base_url": self.imdb.base_url,
            },
            "trakt": {
                "client_id": self.trakt.client_id,
                "access_token": self.trakt.access_token.masked(),
                "base_url": self.trakt.base_url,
            },
            "http": {
                "timeout_secs": self.http.timeout.as_secs(),
                "write_delay_ms": self.http.write_delay.as_millis() as u64,
                "page_limit": self.http.page_limit,
                "fetch_cap": self.http.fetch_cap,
            },
            "trace": self.trace,
        })
    }
}

/// List ids are `ls` (custom list) or `ur` (user) followed by digits
fn validate_list_id(env_name: &str, id: &str) -> Result<()> {
    let digits = id.strip_prefix("ls").or_else(|| id.strip_prefix("ur"));
    match digits {
        Some(d) if !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()) => Ok(()),
        _ => Err(SyncError::Configuration(format!(
            "{} must look like 'ls123456789' or 'ur12345678' (got {:?})",
            env_name, id
        ))),
    }
}

fn parse_number<T>(env_name: &str, env_value: Option<String>, file_value: Option<T>, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match env_value {
        Some(raw) => raw.parse::<T>().map_err(|_| {
            SyncError::Configuration(format!("{} must be a non-negative integer (got {:?})", env_name, raw))
        }),
        None => Ok(file_value.unwrap_or(default)),
    }
}

fn parse_bool(env_name: &str, raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SyncError::Configuration(format!(
            "{} must be true or false (got {:?})",
            env_name, raw
        ))),
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
