//! Delivery of formatted messages.
//!
//! A [`Publisher`] checks each message against the [`ExclusionList`] and
//! hands the survivors to a [`Sink`]. The sink is chosen once at startup:
//! [`ConsoleSink`] in dry mode, [`TwitterSink`] otherwise.

mod console;
mod exclusion;
mod twitter;

pub use console::ConsoleSink;
pub use exclusion::ExclusionList;
pub use twitter::{TwitterCredentials, TwitterSink, DEFAULT_API_BASE};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The posting API answered with a non-2xx status
    #[error("API error: status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Failed to sign request: {0}")]
    Signing(String),
}

/// Destination for formatted messages.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn deliver(&self, message: &str) -> Result<(), PublishError>;
}

/// What happened to a message handed to [`Publisher::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Matched an exclusion pattern and was dropped silently.
    Excluded,
}

pub struct Publisher {
    sink: Box<dyn Sink>,
    exclusions: ExclusionList,
}

impl Publisher {
    pub fn new(sink: Box<dyn Sink>, exclusions: ExclusionList) -> Self {
        Self { sink, exclusions }
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    pub async fn publish(&self, message: &str) -> Result<Delivery, PublishError> {
        if self.exclusions.is_excluded(message) {
            return Ok(Delivery::Excluded);
        }

        tracing::info!(sink = self.sink.name(), "Publish message");
        self.sink.deliver(message).await?;
        Ok(Delivery::Delivered)
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("sink", &self.sink.name())
            .field("exclusions", &self.exclusions.len())
            .finish()
    }
}
