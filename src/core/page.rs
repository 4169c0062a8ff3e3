//! Page content: fetch or read a page and reduce it to its visible text.

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::core::app;
use crate::core::turn::TurnError;

/// Supplies the visible text of the current page.
pub trait PageSource {
    async fn page_text(&self) -> Result<String, TurnError>;
}

/// Where the page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageInput {
    Url(Url),
    File(PathBuf),
    /// Content captured up front (e.g. piped on stdin).
    Text(String),
}

impl PageInput {
    /// `http(s)://...` is fetched, anything else is a local path.
    pub fn from_arg(arg: &str) -> Self {
        match Url::parse(arg) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => PageInput::Url(url),
            _ => PageInput::File(PathBuf::from(arg)),
        }
    }
}

/// Loads the page on every turn so the answer reflects its current content.
pub struct PageLoader {
    input: Option<PageInput>,
    http: reqwest::Client,
    max_chars: usize,
}

impl PageLoader {
    pub fn new(input: Option<PageInput>, http: reqwest::Client, max_chars: usize) -> Self {
        Self {
            input,
            http,
            max_chars,
        }
    }

    async fn fetch(&self, url: &Url) -> Result<String, TurnError> {
        log::info!("fetching page {}", url);
        let response = self
            .http
            .get(url.clone())
            .header(
                reqwest::header::USER_AGENT,
                format!("{}/{}", app::NAME, app::VERSION),
            )
            .send()
            .await
            .map_err(|e| TurnError::extraction(format!("fetch failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TurnError::extraction(format!("HTTP {}", status)));
        }
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("html"));
        let body = response
            .text()
            .await
            .map_err(|e| TurnError::extraction(format!("unreadable body: {}", e)))?;
        Ok(if is_html || looks_like_html(&body) {
            visible_text(&body)
        } else {
            body
        })
    }
}

impl PageSource for PageLoader {
    async fn page_text(&self) -> Result<String, TurnError> {
        let text = match &self.input {
            None => return Err(TurnError::extraction("no page given (use --page)")),
            Some(PageInput::Url(url)) => self.fetch(url).await?,
            Some(PageInput::File(path)) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| TurnError::extraction(format!("{}: {}", path.display(), e)))?;
                as_visible_text(&raw)
            }
            Some(PageInput::Text(raw)) => as_visible_text(raw),
        };
        Ok(truncate_chars(&text, self.max_chars))
    }
}

fn as_visible_text(raw: &str) -> String {
    if looks_like_html(raw) {
        visible_text(raw)
    } else {
        raw.trim().to_string()
    }
}

fn looks_like_html(s: &str) -> bool {
    let head = s.trim_start();
    head.starts_with('<')
        && (head.get(..5).is_some_and(|h| h.eq_ignore_ascii_case("<!doc"))
            || head.contains("<html")
            || head.contains("<body")
            || head.contains("<div")
            || head.contains("<p"))
}

struct Patterns {
    hidden: Regex,
    block: Regex,
    tag: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        hidden: Regex::new(
            r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>|<noscript[^>]*>.*?</noscript>|<head\b[^>]*>.*?</head>|<!--.*?-->",
        )
        .expect("valid regex"),
        block: Regex::new(r"(?i)</?(p|div|section|article|header|footer|h[1-6]|li|ul|ol|tr|td|th|br|pre|blockquote)\b[^>]*>")
            .expect("valid regex"),
        tag: Regex::new(r"(?s)<[^>]+>").expect("valid regex"),
    })
}

/// Approximate the text a browser shows for a document: hidden elements removed,
/// block elements on their own lines, whitespace collapsed within lines.
pub fn visible_text(html: &str) -> String {
    let p = patterns();
    let text = p.hidden.replace_all(html, " ");
    let text = p.block.replace_all(&text, "\n");
    let text = p.tag.replace_all(&text, " ");
    let text = decode_common_entities(&text);
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_common_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

/// First `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>T</title><style>body { color: red }</style></head>
<body>
  <h1>Rust   Book</h1>
  <script>var hidden = "nope";</script>
  <p>Ownership &amp; borrowing<br>are <b>core</b>.</p>
  <!-- comment -->
  <ul><li>one</li><li>two</li></ul>
</body></html>"#;

    #[test]
    fn visible_text_strips_hidden_content_and_tags() {
        assert_eq!(
            visible_text(PAGE),
            "Rust Book\nOwnership & borrowing\nare core .\none\ntwo"
        );
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn page_input_from_arg() {
        assert!(matches!(
            PageInput::from_arg("https://example.com/a"),
            PageInput::Url(_)
        ));
        assert_eq!(
            PageInput::from_arg("notes/page.html"),
            PageInput::File(PathBuf::from("notes/page.html"))
        );
    }

    #[tokio::test]
    async fn text_input_is_bounded() {
        let loader = PageLoader::new(
            Some(PageInput::Text("x".repeat(5000))),
            reqwest::Client::new(),
            2000,
        );
        assert_eq!(loader.page_text().await.unwrap().chars().count(), 2000);
    }

    #[tokio::test]
    async fn missing_page_is_an_extraction_failure() {
        let loader = PageLoader::new(None, reqwest::Client::new(), 2000);
        assert!(matches!(
            loader.page_text().await,
            Err(TurnError::Extraction(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_an_extraction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let loader = PageLoader::new(
            Some(PageInput::File(dir.path().join("absent.html"))),
            reqwest::Client::new(),
            2000,
        );
        assert!(matches!(
            loader.page_text().await,
            Err(TurnError::Extraction(_))
        ));
    }

    #[tokio::test]
    async fn fetches_and_extracts_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string(PAGE),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/article", server.uri())).unwrap();
        let loader = PageLoader::new(Some(PageInput::Url(url)), reqwest::Client::new(), 9);
        assert_eq!(loader.page_text().await.unwrap(), "Rust Book");
    }

    #[tokio::test]
    async fn http_error_is_an_extraction_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let loader = PageLoader::new(Some(PageInput::Url(url)), reqwest::Client::new(), 2000);
        let err = loader.page_text().await.unwrap_err();
        assert!(err.to_string().contains("404"), "{}", err);
    }
}
