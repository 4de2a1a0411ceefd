use chrono::{DateTime, Local, Utc};

/// Remove HTML tags, leaving the text between them.
/// Matches the editor's character counting, which drops anything inside `<...>`.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a timestamp as a short local date, e.g. "May 01, 2024"
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%b %d, %Y").to_string()
}

/// Format an optional timestamp, returning a default if None
pub fn format_optional_date(date: Option<&DateTime<Utc>>, default: &str) -> String {
    date.map(format_date).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
        assert_eq!(strip_html("no tags"), "no tags");
        assert_eq!(strip_html("<br/>"), "");
        assert_eq!(strip_html("a > b"), "a > b");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("héllo wörld", 6), "hél...");
    }

    #[test]
    fn test_format_optional_date_default() {
        assert_eq!(format_optional_date(None, "-"), "-");
    }
}
