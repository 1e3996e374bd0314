use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use feedpost::app::App;
use feedpost::config::Config;
use feedpost::signals;

#[derive(Parser, Debug)]
#[command(name = "feedpost", version, about = "Posts new RSS/Atom feed items to X/Twitter")]
struct Args {
    /// TOML config file (flags and environment override its values)
    #[arg(short, long, env = "FEEDPOST_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// RSS/Atom feed url
    #[arg(short, long, env = "FEED")]
    feed: Option<String>,

    /// Refresh interval in seconds [default: 30]
    #[arg(short, long, env = "REFRESH", value_name = "SECS")]
    refresh: Option<u64>,

    /// Feed fetch timeout in seconds [default: 5]
    #[arg(short, long, env = "TIMEOUT", value_name = "SECS")]
    timeout: Option<u64>,

    /// Twitter consumer key
    #[arg(long, env = "TWI_CONSUMER_KEY", hide_env_values = true)]
    consumer_key: Option<String>,

    /// Twitter consumer secret
    #[arg(long, env = "TWI_CONSUMER_SECRET", hide_env_values = true)]
    consumer_secret: Option<String>,

    /// Twitter access token
    #[arg(long, env = "TWI_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Twitter access secret
    #[arg(long, env = "TWI_ACCESS_SECRET", hide_env_values = true)]
    access_secret: Option<String>,

    /// Message template [default: "{Title} - {Link}"]
    #[arg(long, env = "TEMPLATE")]
    template: Option<String>,

    /// Exclusion patterns file [default: exclusion-patterns.txt]
    #[arg(long, env = "EXCLUSIONS", value_name = "FILE")]
    exclusions: Option<PathBuf>,

    /// Posting API base url
    #[arg(long, env = "API_BASE", hide = true)]
    api_base: Option<String>,

    /// Dry mode, log messages instead of posting
    #[arg(long, env = "DRY")]
    dry: bool,

    /// Debug logging
    #[arg(long, env = "DEBUG")]
    dbg: bool,
}

impl Args {
    /// Overlays flags and environment values on top of the file config.
    fn apply(self, config: &mut Config) {
        if let Some(feed) = self.feed {
            config.feed = Some(feed);
        }
        if let Some(refresh) = self.refresh {
            config.refresh = refresh;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(template) = self.template {
            config.template = template;
        }
        if let Some(exclusions) = self.exclusions {
            config.exclusions = exclusions;
        }
        if let Some(api_base) = self.api_base {
            config.api_base = api_base;
        }
        config.consumer_key = self.consumer_key.or(config.consumer_key.take());
        config.consumer_secret = self.consumer_secret.or(config.consumer_secret.take());
        config.access_token = self.access_token.or(config.access_token.take());
        config.access_secret = self.access_secret.or(config.access_secret.take());
        config.dry |= self.dry;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.dbg { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    println!("feedpost - {}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => Config::default(),
    };
    args.apply(&mut config);
    tracing::debug!(config = ?config, "Effective configuration");

    let settings = config.validate().context("Failed to setup")?;

    let cancel = CancellationToken::new();
    signals::install(cancel.clone()).context("Failed to install signal handlers")?;

    let app = App::new(settings).context("Failed to create application")?;
    tracing::info!(sink = app.sink_name(), "Publisher ready");

    let stats = app.run(cancel).await;
    tracing::info!(
        delivered = stats.delivered,
        excluded = stats.excluded,
        failed = stats.failed,
        "Terminated"
    );
    Ok(())
}
