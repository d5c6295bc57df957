use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use confess_api::{ApiClient, CaptchaWidget};
use confess_shared::config::{AppConfig, CliOverrides};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "confess",
    version,
    about = "Terminal client for the anonymous confessions board"
)]
struct Cli {
    /// Open the comment dialog for this confession directly instead of
    /// starting on the feed
    #[arg(long)]
    id: Option<String>,

    /// Base URL of the confession API
    #[arg(long, env = "CONFESS_API_URL")]
    api_url: Option<String>,

    /// hCaptcha site key (staging boards use their own)
    #[arg(long, env = "CONFESS_SITE_KEY")]
    site_key: Option<String>,

    /// Config file path (default: ~/.config/confess/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Route logs to a file; the TUI owns stdout/stderr for the app's lifetime.
/// Returns the guard that flushes the non-blocking writer on shutdown.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let dir = dirs::data_local_dir()?.join("confess");
    std::fs::create_dir_all(&dir).ok()?;
    let appender = tracing_appender::rolling::never(dir, "confess.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("CONFESS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("confess").join("config.toml"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing();

    let config_path = cli.config.clone().or_else(default_config_path);
    let overrides = CliOverrides {
        api_url: cli.api_url.clone(),
        site_key: cli.site_key.clone(),
    };
    let config = AppConfig::load(config_path.as_deref(), &overrides)
        .context("invalid configuration")?;

    tracing::info!(api_url = %config.api_url, "starting confess");

    let client = ApiClient::new(config.api_url.clone());
    let captcha = CaptchaWidget::new(config.site_key.clone(), config.challenge_url.clone());

    confess_tui::run(confess_tui::AppOptions {
        client,
        captcha,
        confession_id: cli.id,
    })
    .await
}
