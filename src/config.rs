use anyhow::{Context, Result};
use clap::Parser;
use std::{env, str::FromStr};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    pub bucket: String,
    pub public_base_url: String,
    pub signing_secret: String,
    pub auth_secret: String,
    pub client_id: Option<String>,
    pub environment: String,
    pub upload_max_attempts: u32,
}

/// Secrets are left out so the config can be logged at startup.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("storage_dir", &self.storage_dir)
            .field("database_url", &self.database_url)
            .field("bucket", &self.bucket)
            .field("public_base_url", &self.public_base_url)
            .field("client_id", &self.client_id)
            .field("environment", &self.environment)
            .field("upload_max_attempts", &self.upload_max_attempts)
            .finish_non_exhaustive()
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Job application tracker API")]
pub struct Args {
    /// Host to bind to (overrides JOB_TRACKER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides JOB_TRACKER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where uploaded files are stored (overrides JOB_TRACKER_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides JOB_TRACKER_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Storage container for resumes (overrides JOB_TRACKER_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Externally reachable base URL used in signed links (overrides JOB_TRACKER_PUBLIC_BASE_URL)
    #[arg(long)]
    pub public_base_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

const DEV_SECRET: &str = "dev-key-please-change";

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();

        let env_host = env::var("JOB_TRACKER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_env("JOB_TRACKER_PORT", 8080u16)?;
        let port = args.port.unwrap_or(env_port);
        let env_storage =
            env::var("JOB_TRACKER_STORAGE_DIR").unwrap_or_else(|_| "./data/objects".into());
        let env_db = env::var("JOB_TRACKER_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/job_tracker.db".into());
        let env_bucket =
            env::var("JOB_TRACKER_BUCKET").unwrap_or_else(|_| "job-tracker-resumes".into());
        let env_base_url = env::var("JOB_TRACKER_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{}", port));

        let environment =
            env::var("JOB_TRACKER_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let signing_secret = secret_var("JOB_TRACKER_SIGNING_SECRET", &environment)?;
        let auth_secret = secret_var("JOB_TRACKER_AUTH_SECRET", &environment)?;
        let client_id = env::var("JOB_TRACKER_CLIENT_ID").ok();
        if client_id.is_none() {
            tracing::warn!("JOB_TRACKER_CLIENT_ID not set; token audience will not be checked");
        }

        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port,
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            bucket: args.bucket.unwrap_or(env_bucket),
            public_base_url: args.public_base_url.unwrap_or(env_base_url),
            signing_secret,
            auth_secret,
            client_id,
            environment,
            upload_max_attempts: parse_env("JOB_TRACKER_UPLOAD_MAX_ATTEMPTS", 4u32)?,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read and parse `name`, falling back to `default` when unset.
fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

/// Secrets may only fall back to the development key outside production.
fn secret_var(name: &str, environment: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ if environment == "production" => anyhow::bail!("{} must be set in production", name),
        _ => {
            tracing::warn!("{} not set; using development key", name);
            Ok(DEV_SECRET.to_string())
        }
    }
}
