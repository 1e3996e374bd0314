use crate::feed::FeedEvent;
use thiserror::Error;

/// Event fields a template can interpolate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ChannelTitle,
    Title,
    Link,
    Text,
    Guid,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ChannelTitle" | "ChanTitle" => Some(Self::ChannelTitle),
            "Title" => Some(Self::Title),
            "Link" => Some(Self::Link),
            "Text" => Some(Self::Text),
            "Guid" | "GUID" => Some(Self::Guid),
            _ => None,
        }
    }

    fn value<'a>(&self, event: &'a FeedEvent) -> &'a str {
        match self {
            Self::ChannelTitle => &event.channel_title,
            Self::Title => &event.title,
            Self::Link => &event.link,
            Self::Text => &event.text,
            Self::Guid => &event.guid,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unknown template field {{{0}}}")]
    UnknownField(String),
    #[error("Unclosed '{{' at position {0}")]
    Unclosed(usize),
    #[error("Unmatched '}}' at position {0}")]
    Unmatched(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed message template such as `{Title} - {Link}`.
///
/// Placeholders name a [`Field`]; `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.next_if(|&(_, c)| c == '{').is_some() => literal.push('{'),
                '}' if chars.next_if(|&(_, c)| c == '}').is_some() => literal.push('}'),
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, c)) => name.push(c),
                            None => return Err(TemplateError::Unclosed(pos)),
                        }
                    }
                    let field = Field::from_name(name.trim())
                        .ok_or(TemplateError::UnknownField(name))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                '}' => return Err(TemplateError::Unmatched(pos)),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    pub fn references(&self, field: Field) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Field(f) if *f == field))
    }

    /// Number of characters the template contributes besides Title, Text
    /// and Link. Channel title and GUID are fixed per event, so they count
    /// toward this width too.
    pub fn fixed_width(&self, event: &FeedEvent) -> usize {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.chars().count(),
                Segment::Field(Field::Title | Field::Text | Field::Link) => 0,
                Segment::Field(f) => f.value(event).chars().count(),
            })
            .sum()
    }

    pub fn render(&self, event: &FeedEvent) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(field.value(event)),
            }
        }
        out
    }
}
