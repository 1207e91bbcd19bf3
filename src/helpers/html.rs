//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Whether a link leaves the site (opens in a new tab)
pub fn is_external(href: &str) -> bool {
    href.starts_with("http")
}

/// Generate an anchor tag around already-rendered inner HTML
///
/// External links get `target="_blank"` and `rel="noopener noreferrer"`.
pub fn link_to(href: &str, inner_html: &str, class: Option<&str>) -> String {
    let class_attr = class
        .map(|c| format!(r#" class="{}""#, html_escape(c)))
        .unwrap_or_default();

    if is_external(href) {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer"{}>{}</a>"#,
            html_escape(href),
            class_attr,
            inner_html
        )
    } else {
        format!(
            r#"<a href="{}"{}>{}</a>"#,
            html_escape(href),
            class_attr,
            inner_html
        )
    }
}
