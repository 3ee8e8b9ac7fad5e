//! Text helpers shared by the formatter.

/// Escapes the characters Telegram's HTML parse mode gives a meaning to.
///
/// `&` is replaced first so produced entities are not escaped twice.
///
/// # Examples
///
/// ```
/// let escaped = escape_html("a < b & c");
/// assert_eq!(escaped, "a &lt; b &amp; c");
/// ```
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
