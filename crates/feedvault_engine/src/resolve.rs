use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;
use vault_logging::vault_debug;

use feedvault_core::{channel_id_from_feed_url, ChannelId};

/// Outcome of resolving arbitrary user input to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    pub id: ChannelId,
    /// Display name scraped opportunistically; `None` when the page gave
    /// nothing usable.
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("resolver construction failed: {0}")]
    Init(String),
    #[error("could not turn {0:?} into a fetchable YouTube page")]
    UnrecognizedInput(String),
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },
    #[error("no channel id found at {0}")]
    NoChannelId(String),
}

/// Best-effort mapping from user input (feed URL, channel URL, handle,
/// video URL or raw id) to a channel identifier.
///
/// Deliberately a narrow seam: the scraping behind [`PageScrapeResolver`]
/// is brittle by nature and should be replaceable by a proper API client
/// without touching the repository layer.
#[async_trait]
pub trait ChannelResolver: Send + Sync {
    async fn resolve(&self, input: &str) -> Result<ResolvedChannel, ResolveError>;
}

#[derive(Debug, Clone)]
pub struct ResolveSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Resolver that downloads the page behind the input and scrapes a channel
/// id out of it, trying known embeddings in descending order of
/// reliability.
pub struct PageScrapeResolver {
    client: reqwest::Client,
    id_in_script: Regex,
    author_in_script: Regex,
}

impl PageScrapeResolver {
    pub fn new(settings: ResolveSettings) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ResolveError::Init(err.to_string()))?;
        // Watch pages expose the uploader as externalChannelId; channel
        // pages use channelId/browseId in their embedded player/page JSON.
        let id_in_script =
            Regex::new(r#""(?:channelId|browseId|externalChannelId)"\s*:\s*"(UC[0-9A-Za-z_-]{22})""#)
                .map_err(|err| ResolveError::Init(err.to_string()))?;
        let author_in_script = Regex::new(r#""author"\s*:\s*"([^"]+)""#)
            .map_err(|err| ResolveError::Init(err.to_string()))?;
        Ok(Self {
            client,
            id_in_script,
            author_in_script,
        })
    }

    async fn fetch_page(&self, url: &Url) -> Result<String, ResolveError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| ResolveError::Fetch {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Fetch {
                url: url.to_string(),
                message: status.to_string(),
            });
        }
        response.text().await.map_err(|err| ResolveError::Fetch {
            url: url.to_string(),
            message: err.to_string(),
        })
    }

    fn extract_channel_id(&self, html: &str) -> Option<ChannelId> {
        let doc = Html::parse_document(html);

        // Canonical link is the most reliable embedding on channel pages.
        if let Ok(sel) = Selector::parse(r#"link[rel="canonical"]"#) {
            for node in doc.select(&sel) {
                if let Some(id) = node.value().attr("href").and_then(channel_id_from_page_url) {
                    return Some(id);
                }
            }
        }
        if let Ok(sel) = Selector::parse(r#"meta[property="og:url"]"#) {
            for node in doc.select(&sel) {
                if let Some(id) = node.value().attr("content").and_then(channel_id_from_page_url) {
                    return Some(id);
                }
            }
        }
        // Last resort: ids embedded in script JSON, video pages included.
        self.id_in_script
            .captures(html)
            .and_then(|caps| ChannelId::new(caps[1].to_string()).ok())
    }

    fn extract_name(&self, html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        if let Ok(sel) = Selector::parse(r#"meta[property="og:title"]"#) {
            if let Some(title) = doc
                .select(&sel)
                .next()
                .and_then(|node| node.value().attr("content"))
                .map(str::trim)
                .filter(|title| !title.is_empty())
            {
                return Some(title.to_string());
            }
        }
        self.author_in_script
            .captures(html)
            .map(|caps| caps[1].to_string())
    }
}

#[async_trait]
impl ChannelResolver for PageScrapeResolver {
    async fn resolve(&self, input: &str) -> Result<ResolvedChannel, ResolveError> {
        let trimmed = input.trim();

        // A literal feed URL carries the id directly; no network involved.
        if let Some(id) = channel_id_from_feed_url(trimmed) {
            return Ok(ResolvedChannel { id, name: None });
        }
        // So does a raw channel id.
        if let Ok(id) = ChannelId::new(trimmed) {
            return Ok(ResolvedChannel { id, name: None });
        }

        let url = page_url(trimmed)
            .ok_or_else(|| ResolveError::UnrecognizedInput(input.to_string()))?;
        vault_debug!("resolving {input:?} via page {url}");
        let html = self.fetch_page(&url).await?;
        let id = self
            .extract_channel_id(&html)
            .ok_or_else(|| ResolveError::NoChannelId(url.to_string()))?;
        let name = self.extract_name(&html);
        Ok(ResolvedChannel { id, name })
    }
}

/// Extracts the id from a channel page URL (`.../channel/UC...`).
fn channel_id_from_page_url(raw: &str) -> Option<ChannelId> {
    let parsed = Url::parse(raw).ok()?;
    let mut segments = parsed.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == "channel" {
            return segments.next().and_then(|id| ChannelId::new(id).ok());
        }
    }
    None
}

/// Normalizes loose input into a fetchable page URL: bare handles, bare
/// site paths and scheme-less host forms all become `https` YouTube URLs.
fn page_url(input: &str) -> Option<Url> {
    if input.is_empty() {
        return None;
    }
    if input.starts_with("http://") || input.starts_with("https://") {
        return Url::parse(input).ok();
    }
    if input.starts_with('@') {
        return Url::parse(&format!("https://www.youtube.com/{input}")).ok();
    }
    if let Some(rest) = input
        .strip_prefix("www.youtube.com/")
        .or_else(|| input.strip_prefix("youtube.com/"))
        .or_else(|| input.strip_prefix("m.youtube.com/"))
    {
        return Url::parse(&format!("https://www.youtube.com/{rest}")).ok();
    }
    if input.contains(char::is_whitespace) {
        return None;
    }
    Url::parse(&format!(
        "https://www.youtube.com/{}",
        input.trim_start_matches('/')
    ))
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_normalizes_handles_and_paths() {
        assert_eq!(
            page_url("@SomeCreator").unwrap().as_str(),
            "https://www.youtube.com/@SomeCreator"
        );
        assert_eq!(
            page_url("c/SomeCreator").unwrap().as_str(),
            "https://www.youtube.com/c/SomeCreator"
        );
        assert_eq!(
            page_url("youtube.com/user/SomeCreator").unwrap().as_str(),
            "https://www.youtube.com/user/SomeCreator"
        );
        assert_eq!(
            page_url("https://www.youtube.com/watch?v=abc").unwrap().as_str(),
            "https://www.youtube.com/watch?v=abc"
        );
        assert_eq!(page_url(""), None);
        assert_eq!(page_url("two words"), None);
    }

    #[test]
    fn channel_page_url_yields_id() {
        let id = channel_id_from_page_url("https://www.youtube.com/channel/UC_x5XG1OV2P6uZZ5FSM9Ttw");
        assert_eq!(id.unwrap().as_str(), "UC_x5XG1OV2P6uZZ5FSM9Ttw");
        assert_eq!(
            channel_id_from_page_url("https://www.youtube.com/@SomeCreator"),
            None
        );
    }
}
