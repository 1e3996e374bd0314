use feed_rs::parser;
use thiserror::Error;

/// The newest entry of a feed, as handed to the formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEvent {
    pub channel_title: String,
    pub title: String,
    pub link: String,
    pub text: String,
    pub guid: String,
}

#[derive(Debug, Error)]
pub enum ParseError {
    /// Document is neither RSS nor Atom
    #[error("Invalid feed document: {0}")]
    Invalid(String),
    #[error("No items in feed")]
    NoItems,
    /// First entry carries no usable identifier
    #[error("No guid for feed entry {0:?}")]
    MissingGuid(String),
}

/// Parses a feed document and returns its first (newest) entry.
///
/// Feeds list the most recent item first, so only `entries[0]` is inspected.
/// Titles and descriptions are returned as published; markup is stripped later
/// by the formatter.
pub fn parse_newest(bytes: &[u8]) -> Result<FeedEvent, ParseError> {
    // No synthesized ids: an entry without <guid>/<id> must stay empty
    let feed = parser::Builder::new()
        .id_generator(|_, _, _| String::new())
        .build()
        .parse(bytes)
        .map_err(|e| ParseError::Invalid(e.to_string()))?;

    let channel_title = feed.title.map(|t| t.content).unwrap_or_default();
    let entry = feed.entries.into_iter().next().ok_or(ParseError::NoItems)?;

    let title = entry.title.map(|t| t.content).unwrap_or_default();

    let guid = entry.id.trim();
    if guid.is_empty() {
        return Err(ParseError::MissingGuid(title));
    }
    let guid = guid.to_string();

    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();
    let text = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    Ok(FeedEvent {
        channel_title,
        title,
        link,
        text,
        guid,
    })
}
