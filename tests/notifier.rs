//! Integration tests for the feed notifier against a mock HTTP feed.
//!
//! Each test starts its own `wiremock` server. Poll intervals are kept short
//! (tens of milliseconds) so the suite runs on the real clock.

use feedpost::feed::FeedFetcher;
use feedpost::notify::{EventSource, Notifier};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const INTERVAL: Duration = Duration::from_millis(50);

fn rss(guid: &str, title: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Test Channel</title>
    <item>
        <guid>{guid}</guid>
        <title>{title}</title>
        <link>https://example.com/{guid}</link>
        <description>About {title}</description>
    </item>
    <item>
        <guid>older</guid>
        <title>Older</title>
    </item>
</channel></rss>"#
    )
}

fn ok(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("Content-Type", "application/rss+xml")
}

fn notifier(server: &MockServer) -> Notifier {
    let fetcher = FeedFetcher::new(
        reqwest::Client::new(),
        format!("{}/rss", server.uri()),
        Duration::from_secs(2),
    );
    Notifier::new(fetcher, INTERVAL)
}

// ============================================================================
// Change detection
// ============================================================================

#[tokio::test]
async fn test_second_poll_emits_changed_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("1", "First")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("2", "Second")))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut events = notifier(&server).start(cancel.clone());

    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within timeout")
        .expect("stream open");

    assert_eq!(event.guid, "2");
    assert_eq!(event.title, "Second");
    assert_eq!(event.link, "https://example.com/2");
    assert_eq!(event.text, "About Second");
    assert_eq!(event.channel_title, "Test Channel");

    // Same GUID on every later poll: nothing more
    let more = tokio::time::timeout(INTERVAL * 6, events.recv()).await;
    assert!(more.is_err(), "should not get any more events");

    cancel.cancel();
}

#[tokio::test]
async fn test_first_poll_never_emits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("1", "Only")))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut events = notifier(&server).start(cancel.clone());

    let got = tokio::time::timeout(INTERVAL * 6, events.recv()).await;
    assert!(got.is_err(), "baseline entry must not be reported");

    cancel.cancel();
}

#[tokio::test]
async fn test_fetch_errors_are_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("1", "First")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<garbage"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("2", "Second")))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut events = notifier(&server).start(cancel.clone());

    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within timeout")
        .expect("stream open");
    assert_eq!(event.guid, "2");

    cancel.cancel();
}

#[tokio::test]
async fn test_empty_feed_does_not_set_baseline() {
    let empty = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Empty</title></channel></rss>"#;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(empty.to_string()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("1", "First")))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut events = notifier(&server).start(cancel.clone());

    // "1" is the first entry ever seen, so it only becomes the baseline
    let got = tokio::time::timeout(INTERVAL * 6, events.recv()).await;
    assert!(got.is_err());

    cancel.cancel();
}

#[tokio::test]
async fn test_entry_without_guid_is_not_emitted() {
    let no_guid = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Test Channel</title>
    <item>
        <title>No guid here</title>
        <link>https://example.com/none</link>
    </item>
</channel></rss>"#;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("1", "First")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ok(no_guid.to_string()))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut events = notifier(&server).start(cancel.clone());

    let got = tokio::time::timeout(INTERVAL * 6, events.recv()).await;
    assert!(got.is_err(), "entry without guid must be treated as a fetch failure");

    cancel.cancel();
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_closes_stream_during_wait() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("1", "First")))
        .mount(&server)
        .await;

    let fetcher = FeedFetcher::new(
        reqwest::Client::new(),
        format!("{}/rss", server.uri()),
        Duration::from_secs(2),
    );
    // Long interval: the loop sits in its wait when cancelled
    let cancel = CancellationToken::new();
    let mut events = Notifier::new(fetcher, Duration::from_secs(3600)).start(cancel.clone());

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();

    let closed = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("stream should close promptly");
    assert!(closed.is_none());
}

#[tokio::test]
async fn test_cancel_before_start_closes_stream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("1", "First")))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut events = notifier(&server).start(cancel);

    let closed = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("stream should close promptly");
    assert!(closed.is_none());
}

#[tokio::test]
async fn test_cancel_with_full_slot_closes_stream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("1", "First")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("2", "Second")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ok(rss("3", "Third")))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut events = notifier(&server).start(cancel.clone());

    // Let "2" fill the slot and "3" wait behind it. The sender must give up
    // on "3" instead of blocking; the relay discards "2" on its own.
    tokio::time::sleep(INTERVAL * 6).await;
    cancel.cancel();

    let mut received = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(1), events.recv()).await {
        received.push(event.guid);
    }
    assert_eq!(received, vec!["2".to_string()]);
}
