//! HTML template system for gated pages
//!
//! Pages are assembled from trusted [`Html`] fragments. Post content arrives
//! already rendered and is inserted verbatim; anything else that reaches a
//! page as text goes through [`escape_html`].

pub mod prompts;

use std::fmt;

/// Trusted HTML fragment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Html(String);

impl Html {
    /// Wrap markup that is already safe to emit
    pub fn trusted(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// Escape plain text into a fragment
    pub fn text(text: &str) -> Self {
        Self(escape_html(text))
    }

    /// Borrow the markup
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the markup
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape the five HTML-significant characters
pub fn escape_html(text: &str) -> String {
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

/// Page layout configuration
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Site name shown in titles and the header
    pub site_name: String,
    /// Custom CSS appended after the built-in styles
    pub custom_css: Option<String>,
    /// Theme configuration
    pub theme: ThemeConfig,
}

/// Theme configuration for gated pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    /// Button color
    pub primary_color: String,
    /// Button hover color
    pub primary_hover_color: String,
    /// Background color
    pub background_color: String,
    /// Text color
    pub text_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_color: "#3b82f6".to_string(),
            primary_hover_color: "#1d4ed8".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#1a1a1a".to_string(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            site_name: "Members Blog".to_string(),
            custom_css: None,
            theme: ThemeConfig::default(),
        }
    }
}

impl PageConfig {
    /// Create a new page config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the site name
    pub fn with_site_name(mut self, name: impl Into<String>) -> Self {
        self.site_name = name.into();
        self
    }

    /// Set custom CSS
    pub fn with_custom_css(mut self, css: impl Into<String>) -> Self {
        self.custom_css = Some(css.into());
        self
    }

    /// Set theme configuration
    pub fn with_theme(mut self, theme: ThemeConfig) -> Self {
        self.theme = theme;
        self
    }
}

impl ThemeConfig {
    /// Create a new theme config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set button color
    pub fn with_primary_color(mut self, color: impl Into<String>) -> Self {
        self.primary_color = color.into();
        self
    }

    /// Set button hover color
    pub fn with_primary_hover_color(mut self, color: impl Into<String>) -> Self {
        self.primary_hover_color = color.into();
        self
    }

    /// Set background color
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = color.into();
        self
    }

    /// Set text color
    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = color.into();
        self
    }
}

/// Built-in styles: the utility classes the prompts use plus markdown typography
const BASE_CSS: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 2rem 1rem; background: var(--background-color); color: var(--text-color); }
    header { max-width: 42rem; margin: 0 auto 2rem; }
    header a { color: inherit; text-decoration: none; font-weight: 700; }
    .max-w-2xl { max-width: 42rem; }
    .mx-auto { margin-left: auto; margin-right: auto; }
    .mb-4 { margin-bottom: 1rem; }
    .rounded { border-radius: 0.25rem; }
    .font-bold { font-weight: 700; }
    .py-2 { padding-top: 0.5rem; padding-bottom: 0.5rem; }
    .px-4 { padding-left: 1rem; padding-right: 1rem; }
    .text-white { color: #ffffff; }
    .bg-blue-500 { background: var(--primary-color); border: none; cursor: pointer; }
    .hover\:bg-blue-700:hover { background: var(--primary-hover-color); }
    .markdown { font-size: 1.125rem; line-height: 1.75; }
    .markdown p, .markdown ul, .markdown ol, .markdown blockquote { margin: 1.5rem 0; }
    .markdown h2 { font-size: 2rem; margin-top: 3rem; margin-bottom: 1rem; line-height: 1.375; }
    .markdown h3 { font-size: 1.5rem; margin-top: 2rem; margin-bottom: 1rem; line-height: 1.375; }
    .markdown pre { overflow-x: auto; padding: 1rem; background: #f4f4f5; }
"#;

fn theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#"
    :root {{
      --primary-color: {};
      --primary-hover-color: {};
      --background-color: {};
      --text-color: {};
    }}"#,
        theme.primary_color, theme.primary_hover_color, theme.background_color, theme.text_color
    )
}

/// Wrap a body fragment in a full HTML document
///
/// `refresh_secs` adds a meta refresh so the browser re-requests the page,
/// used while a membership read is still pending.
pub fn render_page(
    title: &str,
    body: &Html,
    config: &PageConfig,
    refresh_secs: Option<u32>,
) -> Html {
    let refresh = refresh_secs
        .map(|secs| format!("\n  <meta http-equiv=\"refresh\" content=\"{}\">", secs))
        .unwrap_or_default();
    let custom_css = config
        .custom_css
        .as_deref()
        .map(|css| format!("\n  <style>{}</style>", css))
        .unwrap_or_default();

    Html::trusted(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">{refresh}
  <title>{title} | {site}</title>
  <style>{theme}
{base}  </style>{custom_css}
</head>
<body>
  <header><a href="/">{site}</a></header>
  <main>
{body}
  </main>
</body>
</html>"#,
        refresh = refresh,
        title = escape_html(title),
        site = escape_html(&config.site_name),
        theme = theme_css(&config.theme),
        base = BASE_CSS,
        custom_css = custom_css,
        body = body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_html_text_is_escaped_and_trusted_is_not() {
        assert_eq!(Html::text("<b>").as_str(), "&lt;b&gt;");
        assert_eq!(Html::trusted("<b>").as_str(), "<b>");
    }

    #[test]
    fn test_render_page() {
        let config = PageConfig::new().with_site_name("Unlock <Blog>");
        let page = render_page("Hello", &Html::trusted("<p>body</p>"), &config, None);

        assert!(page.as_str().starts_with("<!DOCTYPE html>"));
        assert!(page.as_str().contains("<title>Hello | Unlock &lt;Blog&gt;</title>"));
        assert!(page.as_str().contains("<p>body</p>"));
        assert!(!page.as_str().contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_render_page_with_refresh_and_theme() {
        let config = PageConfig::new()
            .with_theme(ThemeConfig::new().with_primary_color("#ff0000"))
            .with_custom_css(".markdown { color: red; }");
        let page = render_page("Hello", &Html::default(), &config, Some(2));

        assert!(page.as_str().contains(r#"<meta http-equiv="refresh" content="2">"#));
        assert!(page.as_str().contains("--primary-color: #ff0000;"));
        assert!(page.as_str().contains(".markdown { color: red; }"));
    }
}
