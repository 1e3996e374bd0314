//! Pipeline wiring.
//!
//! [`App`] owns one notifier, one formatter and one publisher, built from
//! validated [`Settings`]. The sink (console or X/Twitter) is picked here,
//! once, and never changes for the lifetime of the process.

use crate::config::{Settings, SinkSettings};
use crate::feed::FeedFetcher;
use crate::format::{MessageFormatter, TWEET_MAX_LEN};
use crate::notify::Notifier;
use crate::publish::{ConsoleSink, ExclusionList, Publisher, Sink, TwitterSink};
use crate::relay::{self, RelayStats};
use tokio_util::sync::CancellationToken;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Main application state.
pub struct App {
    notifier: Notifier,
    formatter: MessageFormatter,
    publisher: Publisher,
}

impl App {
    /// Creates the application from validated settings.
    ///
    /// Reads the exclusion pattern file; a missing file only logs a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialization failure).
    pub fn new(settings: Settings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let exclusions = ExclusionList::load(&settings.exclusions);

        let sink: Box<dyn Sink> = match settings.sink {
            SinkSettings::Console => {
                tracing::info!("Dry mode");
                Box::new(ConsoleSink)
            }
            SinkSettings::Twitter {
                api_base,
                credentials,
            } => Box::new(TwitterSink::new(client.clone(), &api_base, credentials)),
        };

        let fetcher = FeedFetcher::new(client, settings.feed.as_str(), settings.timeout);

        Ok(Self {
            notifier: Notifier::new(fetcher, settings.refresh),
            formatter: MessageFormatter::new(&settings.template, TWEET_MAX_LEN),
            publisher: Publisher::new(sink, exclusions),
        })
    }

    pub fn sink_name(&self) -> &'static str {
        self.publisher.sink_name()
    }

    /// Runs until `cancel` fires and the event stream drains.
    pub async fn run(&self, cancel: CancellationToken) -> RelayStats {
        relay::run(&self.notifier, &self.formatter, &self.publisher, cancel).await
    }
}
