//! HTML escaping.
//!
//! The pipeline escapes the raw body once, before any handler runs. Handlers
//! therefore see entity-encoded text, and any `<` left in it is markup some
//! earlier handler produced.

/// Escapes the five HTML special characters.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Reverses [`escape_html`].
///
/// Used when a value lifted out of escaped text (a URL, say) is stored in a
/// [`Node`](crate::Node), which escapes attribute values itself on output.
pub fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // &amp; last, so "&amp;lt;" decodes to "&lt;" and not "<".
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_specials() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(escape_html("hello world"), "hello world");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn unescape_reverses() {
        let raw = r#"a<b>&"c"'d'"#;
        assert_eq!(unescape_html(&escape_html(raw)), raw);
    }

    #[test]
    fn unescape_does_not_double_decode() {
        assert_eq!(unescape_html("&amp;lt;"), "&lt;");
    }
}
