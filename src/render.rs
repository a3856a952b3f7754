use crate::paste::DisplayMode;
use tracing::error;

/// Renders paste content the way the preview panel shows it.
pub fn generate_html(content: &str, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Markdown => markdown_to_html(content),
        DisplayMode::PlainCode => format!("<pre><code>{}</code></pre>", escape_html(content)),
        DisplayMode::PlainText => plain_text_to_html(content),
    }
}

fn markdown_to_html(content: &str) -> String {
    markdown::to_html_with_options(content, &markdown::Options::gfm()).unwrap_or_else(|err| {
        error!("Failed to render markdown: {}", err);
        format!(
            "<p>Error rendering markdown: {}</p>",
            escape_html(&err.to_string())
        )
    })
}

// Newlines go first so the <br> tags survive the space replacement
fn plain_text_to_html(content: &str) -> String {
    escape_html(content)
        .replace('\n', "<br>")
        .replace(' ', "&nbsp;")
        .replace('\t', "&emsp;")
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
