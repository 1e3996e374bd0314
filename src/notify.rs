//! Feed change notifier.
//!
//! A [`Notifier`] polls one feed on a fixed interval and emits the newest
//! entry whenever its GUID changes. Events travel over a single-slot channel,
//! so the poll task waits for the consumer before it fetches again.
//!
//! Only the newest entry of each poll is examined. Several items published
//! between two polls collapse into the latest one; there is no backlog.

use crate::feed::{FeedEvent, FeedFetcher};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Outcome of comparing a fetched entry against the last seen one.
#[derive(Debug, PartialEq, Eq)]
pub enum Observation {
    /// First entry ever seen; recorded without notification.
    Baseline,
    /// Same GUID as last time.
    Unchanged,
    /// A different entry is now on top of the feed.
    Changed(FeedEvent),
}

/// Remembers the GUID of the newest entry seen so far.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_guid: Option<String>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_guid(&self) -> Option<&str> {
        self.last_guid.as_deref()
    }

    pub fn observe(&mut self, event: FeedEvent) -> Observation {
        match self.last_guid.as_deref() {
            Some(last) if last == event.guid => Observation::Unchanged,
            Some(_) => {
                self.last_guid = Some(event.guid.clone());
                Observation::Changed(event)
            }
            None => {
                self.last_guid = Some(event.guid);
                Observation::Baseline
            }
        }
    }
}

/// Source of feed events that runs until the token is cancelled.
///
/// The returned stream closes once the source stops.
pub trait EventSource {
    fn start(&self, cancel: CancellationToken) -> mpsc::Receiver<FeedEvent>;
}

/// Polls a feed and reports new entries.
#[derive(Debug, Clone)]
pub struct Notifier {
    fetcher: FeedFetcher,
    interval: Duration,
}

impl Notifier {
    pub fn new(fetcher: FeedFetcher, interval: Duration) -> Self {
        Self { fetcher, interval }
    }

    async fn run(self, tx: mpsc::Sender<FeedEvent>, cancel: CancellationToken) {
        tracing::debug!(timeout = ?self.fetcher.timeout(), "Notifier uses http timeout");
        let mut detector = ChangeDetector::new();

        loop {
            match self.fetcher.fetch_newest().await {
                Ok(event) => match detector.observe(event) {
                    Observation::Changed(event) => {
                        tracing::info!(guid = %event.guid, title = %event.title, "New event");
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => break,
                            sent = tx.send(event) => {
                                if sent.is_err() {
                                    tracing::debug!("Event receiver dropped, stopping notifier");
                                    break;
                                }
                            }
                        }
                    }
                    Observation::Baseline => {
                        tracing::info!(
                            guid = detector.last_guid().unwrap_or_default(),
                            "Ignore first event"
                        );
                    }
                    Observation::Unchanged => {
                        tracing::trace!("Feed unchanged");
                    }
                },
                Err(e) => {
                    tracing::warn!(feed = %self.fetcher.url(), error = %e, "Failed to fetch/parse feed");
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::warn!(feed = %self.fetcher.url(), "Notifier canceled");
    }
}

impl EventSource for Notifier {
    fn start(&self, cancel: CancellationToken) -> mpsc::Receiver<FeedEvent> {
        tracing::info!(
            feed = %self.fetcher.url(),
            interval = ?self.interval,
            "Start notifier"
        );
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(self.clone().run(tx, cancel));
        rx
    }
}
