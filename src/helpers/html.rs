//! HTML helper functions

/// Escape text for HTML content and attribute values
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for XML; `&apos;` is valid here, unlike in HTML4
pub fn escape_xml(s: &str) -> String {
    html_escape(s).replace("&#39;", "&apos;")
}

/// `<meta name="generator">` naming this crate
pub fn meta_generator() -> String {
    format!(
        r#"<meta name="generator" content="folio {}">"#,
        env!("CARGO_PKG_VERSION")
    )
}

/// Whitespace-collapsed text cut to at most `length` characters.
///
/// A cut ends on a word boundary when there is one, followed by `...`.
pub fn excerpt(text: &str, length: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= length {
        return text;
    }

    let keep = length.saturating_sub(3);
    let cut: String = text.chars().take(keep).collect();
    let cut = match cut.rfind(' ') {
        Some(space) if space > 0 => &cut[..space],
        _ => cut.as_str(),
    };
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(html_escape("naïve"), "naïve");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & 'b' <c>"), "a &amp; &apos;b&apos; &lt;c&gt;");
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("  Short\n text ", 20), "Short text");
        assert_eq!(excerpt("Hello wonderful world", 14), "Hello...");
        assert_eq!(excerpt("Supercalifragilistic", 8), "Super...");
    }
}
