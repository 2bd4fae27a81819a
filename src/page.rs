//! Page-side extraction: article text and YouTube video detection.
//!
//! Everything that would run inside the page is reached through
//! [`PageBridge`], a typed request/response contract. [`Tab`] answers it
//! from a fetched HTML document.

use std::future::Future;
use std::sync::LazyLock;

use eyre::Result;
use log::debug;
use regex::Regex;
use select::document::Document;
use select::node::Node;
use select::predicate::Name;
use serde::{Deserialize, Serialize};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Elements whose contents are never rendered as text
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

const EMBED_MARKER: &str = "youtube.com/embed/";

static DIRECT_VIDEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtube\.com/watch\?v=|youtube\.com/shorts|youtu\.be/").unwrap());

/// Requests the coordinator can send to a page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageRequest {
    GetArticleText,
    GetEmbeddedVideoUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PageResponse {
    ArticleText { text: String },
    EmbeddedVideoUrl { src: Option<String> },
}

/// Bridge between the coordinator and whatever hosts the page
pub trait PageBridge {
    /// URL of the page as the host reports it
    fn url(&self) -> &str;

    fn request(&self, request: PageRequest) -> impl Future<Output = Result<PageResponse>> + Send;
}

/// A loaded page: its URL and HTML source
#[derive(Debug, Clone)]
pub struct Tab {
    url: String,
    html: String,
}

impl Tab {
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    /// Fetch a page over HTTP
    pub async fn load(client: &reqwest::Client, url: &str) -> Result<Self> {
        debug!("Fetching page: {url}");
        let html = client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!("Fetched {} bytes from {url}", html.len());
        Ok(Self::from_html(url, html))
    }

    /// Answer a page request synchronously
    pub fn handle(&self, request: &PageRequest) -> PageResponse {
        match request {
            PageRequest::GetArticleText => PageResponse::ArticleText {
                text: article_text(&self.html),
            },
            PageRequest::GetEmbeddedVideoUrl => PageResponse::EmbeddedVideoUrl {
                src: embedded_video_src(&self.html),
            },
        }
    }
}

impl PageBridge for Tab {
    fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, request: PageRequest) -> Result<PageResponse> {
        Ok(self.handle(&request))
    }
}

/// Main text of a page: the first `<article>`, else every `<p>` joined by newlines
pub fn article_text(html: &str) -> String {
    let document = Document::from(html);

    if let Some(article) = document.find(Name("article")).next() {
        return rendered_text(article);
    }

    document
        .find(Name("p"))
        .map(rendered_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `src` of the first iframe that embeds a YouTube player
pub fn embedded_video_src(html: &str) -> Option<String> {
    let document = Document::from(html);
    document
        .find(Name("iframe"))
        .filter_map(|n| n.attr("src"))
        .find(|src| src.contains(EMBED_MARKER))
        .map(|src| src.to_string())
}

pub fn is_direct_video_url(url: &str) -> bool {
    DIRECT_VIDEO_RE.is_match(url)
}

/// Canonical watch URL for an embed source, e.g. `.../embed/ABC?x=y` -> `...watch?v=ABC`
pub fn watch_url_from_embed(src: &str) -> Option<String> {
    let (_, rest) = src.split_once("embed/")?;
    let video_id = rest.split('?').next().unwrap_or_default();
    if video_id.is_empty() {
        return None;
    }
    Some(format!("https://www.youtube.com/watch?v={video_id}"))
}

/// Find the video on a page: the page URL itself, or an embedded player
pub async fn detect_video_url<B: PageBridge>(bridge: &B) -> Result<Option<String>> {
    let url = bridge.url();
    if is_direct_video_url(url) {
        debug!("Direct video URL: {url}");
        return Ok(Some(url.to_string()));
    }

    match bridge.request(PageRequest::GetEmbeddedVideoUrl).await? {
        PageResponse::EmbeddedVideoUrl { src: Some(src) } => {
            debug!("Embedded player found: {src}");
            Ok(watch_url_from_embed(&src))
        }
        _ => Ok(None),
    }
}

fn rendered_text(node: Node) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out.trim().to_string()
}

fn collect_text(node: Node, out: &mut String) {
    if let Some(text) = node.as_text() {
        out.push_str(text);
        return;
    }
    if node.name().is_some_and(|name| HIDDEN_ELEMENTS.contains(&name)) {
        return;
    }
    for child in node.children() {
        collect_text(child, out);
    }
}
