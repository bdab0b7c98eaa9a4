/// Truncate to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_text(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out = s.chars().take(max_chars).collect::<String>();
    out.push_str("...");
    out
}

/// Split `/cmd@botname args` into a lowercase command name and its arguments.
pub fn parse_command(text: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

/// Whether a free-form message looks like it carries a link.
pub fn mentions_link(text: &str) -> bool {
    text.to_lowercase().contains("http")
}

/// First whitespace-separated word that contains `http` (any case).
pub fn find_link(text: &str) -> Option<&str> {
    text.split_whitespace()
        .find(|word| word.to_lowercase().contains("http"))
}
