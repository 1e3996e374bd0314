use super::{PublishError, Sink};
use async_trait::async_trait;

/// Writes messages to the log instead of posting them (dry mode).
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

#[async_trait]
impl Sink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, message: &str) -> Result<(), PublishError> {
        tracing::info!("event - {}", message);
        Ok(())
    }
}
