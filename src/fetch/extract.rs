//! HTML to plain text extraction.

use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

/// Elements whose text is never part of the article body.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "nav", "header", "footer"];

/// Candidate containers of the main text, most specific first.
static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "article",
        ".article-body",
        ".content",
        "main",
        "#content",
        ".post-content",
        "body",
    ]
    .iter()
    .filter_map(|css| Selector::parse(css).ok())
    .collect()
});

static TITLE_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("title").ok());

static AUTHOR_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse(r#"meta[name="author"]"#).ok());

static PUBLISHED_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="article:published_time"], meta[name="date"]"#).ok()
});

/// Text and metadata pulled out of an HTML document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    pub text: String,
    pub author: Option<String>,
    pub published_at: Option<String>,
}

/// Extract the readable text of `html`, truncated to `max_chars` characters.
pub fn extract_page(html: &str, max_chars: usize) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = TITLE_SELECTOR
        .as_ref()
        .and_then(|selector| document.select(selector).next())
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|title| !title.is_empty());

    // first container with any text; an empty <main> must not hide the body
    let text = CONTENT_SELECTORS
        .iter()
        .filter_map(|selector| document.select(selector).next())
        .map(element_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default();
    let text = truncate_chars(&text, max_chars);

    ExtractedPage {
        title,
        text,
        author: meta_content(&document, &AUTHOR_SELECTOR),
        published_at: meta_content(&document, &PUBLISHED_SELECTOR),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

fn meta_content(document: &Html, selector: &Option<Selector>) -> Option<String> {
    selector
        .as_ref()
        .and_then(|selector| document.select(selector).next())
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

/// Collapse all runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head>
            <title>  Ukraine   aktuell </title>
            <meta name="author" content="MDR Redaktion">
            <meta property="article:published_time" content="2026-01-03T06:00:00Z">
            <style>body { color: red; }</style>
          </head>
          <body>
            <header>Menü</header>
            <nav>Startseite | Politik</nav>
            <article>
              <h1>Sicherheitsberater beraten in Kiew</h1>
              <p>Im Bemühen um ein Ende des Krieges
                 kommen heute Berater zusammen.</p>
              <script>trackVisit();</script>
            </article>
            <footer>Impressum</footer>
          </body>
        </html>
    "#;

    #[test]
    fn test_extracts_article_text_and_metadata() {
        let page = extract_page(PAGE, 10_000);

        assert_eq!(page.title.as_deref(), Some("Ukraine aktuell"));
        assert_eq!(
            page.text,
            "Sicherheitsberater beraten in Kiew Im Bemühen um ein Ende des Krieges kommen heute Berater zusammen."
        );
        assert_eq!(page.author.as_deref(), Some("MDR Redaktion"));
        assert_eq!(page.published_at.as_deref(), Some("2026-01-03T06:00:00Z"));
    }

    #[test]
    fn test_falls_back_to_body_without_boilerplate() {
        let html = "<html><body><nav>Links</nav><p>Nur Text</p><footer>Fuß</footer></body></html>";
        let page = extract_page(html, 10_000);

        assert_eq!(page.text, "Nur Text");
        assert!(page.title.is_none());
    }

    #[test]
    fn test_selector_priority() {
        let html = r#"<body><main>Main text</main><div class="content">Content text</div></body>"#;
        assert_eq!(extract_page(html, 10_000).text, "Content text");
    }

    #[test]
    fn test_empty_container_falls_through_to_body() {
        let html = "<html><body><main></main><p>Echter Artikeltext hier</p></body></html>";
        assert_eq!(extract_page(html, 10_000).text, "Echter Artikeltext hier");
    }

    #[test]
    fn test_title_alone_is_no_text() {
        let html = "<html><head><title>Nur Titel</title></head><body></body></html>";
        let page = extract_page(html, 100);
        assert!(page.text.is_empty());
        assert_eq!(page.title.as_deref(), Some("Nur Titel"));
    }

    #[test]
    fn test_empty_document() {
        let page = extract_page("<html><body><script>x()</script></body></html>", 100);
        assert!(page.text.is_empty());
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("Übergröße", 4), "Über");
        assert_eq!(truncate_chars("kurz", 10), "kurz");
        assert_eq!(extract_page("<p>abcdefghij</p>", 3).text, "abc");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
    }
}
