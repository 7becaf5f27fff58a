//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

pub use cli::{CliArgs, Command, DatabaseOverride, SeedArgs, ServeArgs, ServeOverrides, StoreOverrides};

use std::{fmt, net::SocketAddr, num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "pagestash";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_STORE_REGION: &str = "us-east-1";
const DEFAULT_STORE_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SITE_TITLE: &str = "Блог";
const DEFAULT_SITE_DESCRIPTION: &str = "Главная страница блога";
const DEFAULT_SEED_FILE: &str = "data/articles.json";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub store: StoreSettings,
    pub site: SiteSettings,
    pub articles: ArticleSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub public_addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub bucket: String,
    /// Endpoint URL without a trailing slash.
    pub endpoint: String,
    pub region: String,
    pub allow_http: bool,
    /// `None` means unsigned requests against a public bucket.
    pub credentials: Option<StoreCredentials>,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct StoreCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ArticleSettings {
    pub seed_file: PathBuf,
    pub seed_on_empty: bool,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("failed to read command-line settings: {0}")]
    Cli(#[from] clap::Error),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("PAGESTASH").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Seed(args)) => {
            raw.apply_database_override(&args.database);
            raw.apply_store_overrides(&args.store);
        }
        None => raw.apply_serve_overrides(&ServeArgs::from_env()?.overrides),
    }

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    store: RawStoreSettings,
    site: RawSiteSettings,
    articles: RawArticleSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(path) = overrides.seed_file.as_ref() {
            self.articles.seed_file = Some(path.clone());
        }
        if let Some(enabled) = overrides.seed_on_empty {
            self.articles.seed_on_empty = Some(enabled);
        }

        self.apply_database_override(&overrides.database);
        self.apply_store_overrides(&overrides.store);
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }

    fn apply_store_overrides(&mut self, overrides: &StoreOverrides) {
        if let Some(bucket) = overrides.bucket.as_ref() {
            self.store.bucket = Some(bucket.clone());
        }
        if let Some(endpoint) = overrides.endpoint.as_ref() {
            self.store.endpoint = Some(endpoint.clone());
        }
        if let Some(region) = overrides.region.as_ref() {
            self.store.region = Some(region.clone());
        }
        if let Some(key) = overrides.access_key_id.as_ref() {
            self.store.access_key_id = Some(key.clone());
        }
        if let Some(secret) = overrides.secret_access_key.as_ref() {
            self.store.secret_access_key = Some(secret.clone());
        }
        if let Some(timeout) = overrides.timeout_ms {
            self.store.timeout_ms = Some(timeout);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            store,
            site,
            articles,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            store: build_store_settings(store)?,
            site: build_site_settings(site),
            articles: build_article_settings(articles)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let public_addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.public_addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        public_addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = non_blank(database.url);
    let max_connections = non_zero_u32(
        database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .into(),
        "database.max_connections",
    )?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_store_settings(store: RawStoreSettings) -> Result<StoreSettings, LoadError> {
    let bucket = non_blank(store.bucket)
        .ok_or_else(|| LoadError::invalid("store.bucket", "bucket name is not set"))?;

    let endpoint = non_blank(store.endpoint)
        .ok_or_else(|| LoadError::invalid("store.endpoint", "endpoint is not set"))?;
    let endpoint_url = Url::parse(&endpoint)
        .map_err(|err| LoadError::invalid("store.endpoint", format!("invalid URL: {err}")))?;
    let allow_http = match endpoint_url.scheme() {
        "http" => true,
        "https" => false,
        other => {
            return Err(LoadError::invalid(
                "store.endpoint",
                format!("unsupported scheme `{other}`"),
            ));
        }
    };

    let region = non_blank(store.region).unwrap_or_else(|| DEFAULT_STORE_REGION.to_string());

    let credentials = match (
        non_blank(store.access_key_id),
        non_blank(store.secret_access_key),
    ) {
        (Some(access_key_id), Some(secret_access_key)) => Some(StoreCredentials {
            access_key_id,
            secret_access_key,
        }),
        (None, None) => None,
        _ => {
            return Err(LoadError::invalid(
                "store.credentials",
                "access key id and secret access key must be set together",
            ));
        }
    };

    let timeout_ms = store.timeout_ms.unwrap_or(DEFAULT_STORE_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(LoadError::invalid(
            "store.timeout_ms",
            "must be greater than zero",
        ));
    }

    Ok(StoreSettings {
        bucket,
        endpoint: endpoint_url.as_str().trim_end_matches('/').to_string(),
        region,
        allow_http,
        credentials,
        timeout: Duration::from_millis(timeout_ms),
    })
}

fn build_site_settings(site: RawSiteSettings) -> SiteSettings {
    SiteSettings {
        title: non_blank(site.title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string()),
        description: site
            .description
            .unwrap_or_else(|| DEFAULT_SITE_DESCRIPTION.to_string()),
    }
}

fn build_article_settings(articles: RawArticleSettings) -> Result<ArticleSettings, LoadError> {
    let seed_file = articles
        .seed_file
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_FILE));
    if seed_file.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "articles.seed_file",
            "path must not be empty",
        ));
    }

    Ok(ArticleSettings {
        seed_file,
        seed_on_empty: articles.seed_on_empty.unwrap_or(true),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStoreSettings {
    bucket: Option<String>,
    endpoint: Option<String>,
    region: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawArticleSettings {
    seed_file: Option<PathBuf>,
    seed_on_empty: Option<bool>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

#[cfg(test)]
mod tests;
