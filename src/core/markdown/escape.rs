//! HTML entity escaping for code content.

/// Escape the five HTML-reserved characters. Ampersand goes first so the entities
/// produced by the later substitutions are not escaped twice.
pub fn escape_html(unsafe_text: &str) -> String {
    unsafe_text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}
