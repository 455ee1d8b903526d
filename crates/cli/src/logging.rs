// Logging setup
// Logs go to stderr so `list --output -` can stream keys on stdout

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "backup=info";
const LOG_FORMAT_ENV: &str = "BACKUP_LOG_FORMAT";

/// Initialise the global subscriber
///
/// # Environment Variables
///
/// - `RUST_LOG`: filter directives (default: `backup=info`)
/// - `BACKUP_LOG_FORMAT`: `json` for structured output, anything else for human output
pub fn init() -> Result<()> {
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    }
    .context("Failed to install tracing subscriber")
}
