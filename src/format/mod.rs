//! Message formatting for feed events.
//!
//! Renders a [`Template`] against a [`FeedEvent`] and fits the result into a
//! character budget. When the template contains `{Link}`, the link is
//! budgeted at the platform's shortened-link width ([`SHORT_LINK_LEN`]) and
//! only the free-text field is shortened, so the link always appears whole.

mod template;
mod text;

pub use template::{Field, Template, TemplateError};
pub use text::{strip_html, trim_with_dots, ELLIPSIS};

use crate::feed::FeedEvent;

/// Maximum post length on X/Twitter.
pub const TWEET_MAX_LEN: usize = 279;

/// Every URL counts as this many characters once the platform shortens it,
/// whatever its real length.
pub const SHORT_LINK_LEN: usize = 23;

pub const DEFAULT_TEMPLATE: &str = "{Title} - {Link}";

/// Formats feed events into size-bounded messages.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    source: String,
    template: Option<Template>,
    max_len: usize,
}

impl MessageFormatter {
    /// Builds a formatter for `template`.
    ///
    /// A malformed template is not an error: it is logged once and every
    /// message falls back to `"{Title} - {Link}"`.
    pub fn new(template: &str, max_len: usize) -> Self {
        let parsed = match Template::parse(template) {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!(
                    template = %template,
                    error = %e,
                    "Invalid message template, using fallback format"
                );
                None
            }
        };

        Self {
            source: template.to_string(),
            template: parsed,
            max_len,
        }
    }

    pub fn template(&self) -> &str {
        &self.source
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn format(&self, event: &FeedEvent) -> String {
        let mut event = event.clone();
        event.title = strip_html(&event.title).into_owned();
        event.text = strip_html(&event.text).into_owned();

        let rendered = match &self.template {
            Some(template) if template.references(Field::Link) => {
                self.render_with_link(template, event)
            }
            Some(template) => trim_with_dots(&template.render(&event), self.max_len).into_owned(),
            None => self.fallback(&event),
        };

        expand_newlines(rendered)
    }

    fn render_with_link(&self, template: &Template, mut event: FeedEvent) -> String {
        let budget = self
            .max_len
            .saturating_sub(SHORT_LINK_LEN)
            .saturating_sub(template.fixed_width(&event));

        if template.references(Field::Text) {
            event.text = trim_with_dots(&event.text, budget).into_owned();
        } else if template.references(Field::Title) {
            event.title = trim_with_dots(&event.title, budget).into_owned();
        }

        template.render(&event)
    }

    fn fallback(&self, event: &FeedEvent) -> String {
        let msg = format!("{} - {}", event.title, event.link);
        trim_with_dots(&msg, self.max_len).into_owned()
    }
}

/// Turns the two-character sequence `\n` into a real newline.
fn expand_newlines(s: String) -> String {
    if s.contains("\\n") {
        s.replace("\\n", "\n")
    } else {
        s
    }
}
