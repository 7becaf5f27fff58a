use std::path::PathBuf;

use clap::{Args, FromArgMatches, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the pagestash binary.
#[derive(Debug, Parser)]
#[command(
    name = "pagestash",
    version,
    about = "Blog server that renders pages once and serves them from an object store"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "PAGESTASH_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public HTTP service.
    Serve(Box<ServeArgs>),
    /// Import articles from a JSON file into the database.
    Seed(SeedArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

impl ServeArgs {
    /// Serve arguments for a bare `pagestash` invocation. No flags are
    /// present, so only the `env` fallbacks contribute values.
    pub fn from_env() -> Result<Self, clap::Error> {
        let command = Self::augment_args(clap::Command::new("pagestash"));
        let matches = command.try_get_matches_from(["pagestash"])?;
        Self::from_arg_matches(&matches)
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", env = "DATABASE_URL", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct StoreOverrides {
    /// Bucket holding rendered pages.
    #[arg(long = "store-bucket", env = "S3_BUCKET_NAME", value_name = "NAME")]
    pub bucket: Option<String>,

    /// Object store endpoint URL.
    #[arg(long = "store-endpoint", env = "S3_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Object store signing region.
    #[arg(long = "store-region", env = "S3_REGION", value_name = "REGION")]
    pub region: Option<String>,

    /// Access key id; omit together with the secret for anonymous access.
    #[arg(long = "store-access-key-id", env = "S3_ACCESS_KEY", value_name = "KEY")]
    pub access_key_id: Option<String>,

    /// Secret access key.
    #[arg(
        long = "store-secret-access-key",
        env = "S3_SECRET_KEY",
        value_name = "SECRET",
        hide_env_values = true
    )]
    pub secret_access_key: Option<String>,

    /// Per-call timeout for store reads and writes.
    #[arg(long = "store-timeout-ms", value_name = "MILLISECONDS")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub database: DatabaseOverride,

    #[command(flatten)]
    pub store: StoreOverrides,

    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the JSON file used to seed an empty database.
    #[arg(long = "articles-seed-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub seed_file: Option<PathBuf>,

    /// Toggle seeding when the articles table is empty.
    #[arg(
        long = "articles-seed-on-empty",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub seed_on_empty: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct SeedArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    #[command(flatten)]
    pub store: StoreOverrides,

    /// JSON array of articles to insert.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}
