//! Consumer side of the pipeline: feed events in, posts out.

use crate::format::MessageFormatter;
use crate::notify::EventSource;
use crate::publish::{Delivery, Publisher};
use tokio_util::sync::CancellationToken;

/// Counters reported when the relay stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub delivered: usize,
    pub excluded: usize,
    pub failed: usize,
}

/// Formats and publishes every event from `source` until its stream closes.
///
/// Each event is fully delivered before the next one is read. Publish
/// failures are logged and the event is dropped; nothing is retried.
/// Once `cancel` fires no further event is published, even one already
/// waiting in the channel.
pub async fn run<S: EventSource + ?Sized>(
    source: &S,
    formatter: &MessageFormatter,
    publisher: &Publisher,
    cancel: CancellationToken,
) -> RelayStats {
    tracing::info!(
        template = %formatter.template(),
        max_len = formatter.max_len(),
        "Message template"
    );

    let mut stats = RelayStats::default();
    let mut events = source.start(cancel.clone());

    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };
        let message = formatter.format(&event);
        match publisher.publish(&message).await {
            Ok(Delivery::Delivered) => stats.delivered += 1,
            Ok(Delivery::Excluded) => stats.excluded += 1,
            Err(e) => {
                stats.failed += 1;
                tracing::warn!(guid = %event.guid, error = %e, "Failed to publish");
            }
        }
    }

    tracing::debug!(
        delivered = stats.delivered,
        excluded = stats.excluded,
        failed = stats.failed,
        "Event stream closed"
    );
    stats
}
