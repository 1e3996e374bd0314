use std::borrow::Cow;

/// Appended to truncated text. The trailing space keeps it apart from
/// whatever the template places after the field.
pub const ELLIPSIS: &str = "... ";
const ELLIPSIS_LEN: usize = 4;

/// Shortens `s` to at most `max` characters, cutting on a word boundary.
///
/// Strings that already fit are returned unchanged, and so is everything
/// when `max` leaves no room for the ellipsis (`max < 4`). Otherwise the
/// first `max - 4` characters are kept, backed off to the last space so the
/// final word is not split, and [`ELLIPSIS`] is appended. A snippet without
/// any space is kept as cut.
///
/// Lengths are counted in `char`s, not bytes or terminal columns.
///
/// # Examples
///
/// ```
/// use feedpost::format::trim_with_dots;
///
/// assert_eq!(trim_with_dots("Short", 10), "Short");
/// assert_eq!(trim_with_dots("blah xyx something 122", 15), "blah xyx... ");
/// assert_eq!(trim_with_dots("anything", 3), "anything");
/// ```
pub fn trim_with_dots(s: &str, max: usize) -> Cow<'_, str> {
    if max < ELLIPSIS_LEN {
        return Cow::Borrowed(s);
    }

    let keep = max - ELLIPSIS_LEN;
    let mut cut = None;
    for (count, (idx, _)) in s.char_indices().enumerate() {
        if count == keep {
            cut = Some(idx);
        }
        if count == max {
            // More than `max` characters: truncation needed
            let cut = cut.unwrap_or(idx);
            let snippet = &s[..cut];
            let snippet = match snippet.rfind(' ') {
                Some(space) => &snippet[..space],
                None => snippet,
            };
            return Cow::Owned(format!("{}{}", snippet, ELLIPSIS));
        }
    }

    Cow::Borrowed(s)
}

/// Removes HTML tags and decodes character entities.
///
/// A `<` only opens a tag when followed by a letter, `/`, `!` or `?`, so
/// plain comparisons like `a < b` survive. An unterminated tag is kept as
/// text.
///
/// Returns `Cow::Borrowed` when the input contains neither `<` nor `&`.
pub fn strip_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '&']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let starts_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));

        match after.find('>') {
            Some(close) if starts_tag => {
                out.push_str(&rest[..open]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(html_escape::decode_html_entities(&out).into_owned())
}
