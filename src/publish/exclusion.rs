use regex::{Regex, RegexBuilder};
use std::path::Path;

/// Case-insensitive patterns that suppress delivery of a message.
///
/// Loaded once at startup from a plain text file, one pattern per line.
/// Blank lines and lines starting with `#` are comments.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    patterns: Vec<Regex>,
}

impl ExclusionList {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compiles every non-comment line. Lines that are not valid regular
    /// expressions are logged and skipped.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = lines
            .into_iter()
            .filter_map(|line| {
                let line = line.as_ref().trim_end_matches('\r');
                if line.trim().is_empty() || line.trim_start().starts_with('#') {
                    return None;
                }
                match RegexBuilder::new(line).case_insensitive(true).build() {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::warn!(pattern = %line, error = %e, "Invalid exclusion pattern, skipping");
                        None
                    }
                }
            })
            .collect();

        Self { patterns }
    }

    pub fn parse(content: &str) -> Self {
        Self::from_lines(content.lines())
    }

    /// Reads patterns from `path`.
    ///
    /// The file is optional: when it cannot be read the list is empty and
    /// every message is delivered.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let list = Self::parse(&content);
                tracing::info!(path = %path.display(), patterns = list.len(), "Loaded exclusion patterns");
                list
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read exclusion patterns file");
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the first pattern matching `message`, in file order.
    pub fn matching(&self, message: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|re| re.is_match(message))
            .map(Regex::as_str)
    }

    pub fn is_excluded(&self, message: &str) -> bool {
        match self.matching(message) {
            Some(pattern) => {
                tracing::info!(pattern = %pattern, message = %message, "Excluded");
                true
            }
            None => false,
        }
    }
}
