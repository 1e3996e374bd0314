//! feedpost watches a single RSS/Atom feed and posts each new item.
//!
//! The pipeline is two tasks joined by a single-slot channel:
//!
//! - [`notify::Notifier`] polls the feed and emits the newest entry when its
//!   GUID changes (the first poll only records a baseline)
//! - [`relay::run`] formats each event with [`format::MessageFormatter`] and
//!   hands it to a [`publish::Publisher`]
//!
//! [`app::App`] wires both from validated [`config::Settings`].

pub mod app;
pub mod config;
pub mod feed;
pub mod format;
pub mod notify;
pub mod publish;
pub mod relay;
pub mod signals;
