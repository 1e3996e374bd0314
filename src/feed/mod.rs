//! Feed retrieval for RSS/Atom documents.
//!
//! - [`parser`] - Extracts the newest entry using the `feed-rs` crate
//! - [`fetcher`] - Bounded HTTP retrieval (timeout and body size limit)
//!
//! # Example
//!
//! ```ignore
//! use feedpost::feed::FeedFetcher;
//!
//! let fetcher = FeedFetcher::new(client, "https://example.com/rss", timeout);
//! let newest = fetcher.fetch_newest().await?;
//! ```

mod fetcher;
mod parser;

pub use fetcher::{FeedFetcher, FetchError};
pub use parser::{parse_newest, FeedEvent, ParseError};
