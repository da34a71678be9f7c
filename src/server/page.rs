//! Chat page rendering

use crate::constants::server::GREETING;

const PAGE_TEMPLATE: &str = include_str!("page.html");

/// Render the chat page with the greeting in the response box
pub fn render_page() -> String {
    PAGE_TEMPLATE.replace("{{greeting}}", &escape_html(GREETING))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
