//! Text shaping shared by every adapter

/// `"{title}\n{message}"` when a non-empty title is given, else the message
pub fn compose_text(message: &str, title: Option<&str>) -> String {
    match title.filter(|t| !t.is_empty()) {
        Some(title) => format!("{}\n{}", title, message),
        None => message.to_string(),
    }
}

/// Cut `text` to at most `max_chars` characters, never splitting a char
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Pick the explicit recipient, falling back to the configured default.
/// Blank strings count as absent.
pub fn resolve_recipient<'a>(explicit: Option<&'a str>, default: Option<&'a str>) -> Option<&'a str> {
    explicit
        .filter(|r| !r.trim().is_empty())
        .or(default.filter(|r| !r.trim().is_empty()))
}
