use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

/// Stable external key for a YouTube channel: `UC` followed by 22
/// alphanumeric, hyphen or underscore characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a valid channel id: {0:?}")]
pub struct ChannelIdError(pub String);

impl ChannelId {
    pub fn new(raw: impl Into<String>) -> Result<Self, ChannelIdError> {
        let raw = raw.into();
        if Self::is_valid(&raw) {
            Ok(Self(raw))
        } else {
            Err(ChannelIdError(raw))
        }
    }

    /// True when `raw` matches `UC[A-Za-z0-9_-]{22}`.
    pub fn is_valid(raw: &str) -> bool {
        raw.len() == 24
            && raw.starts_with("UC")
            && raw[2..]
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChannelId {
    type Err = ChannelIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChannelId {
    type Error = ChannelIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelId> for String {
    fn from(id: ChannelId) -> String {
        id.0
    }
}

/// Builds the canonical feed URL for a channel.
pub fn feed_url(id: &ChannelId) -> String {
    format!("https://www.youtube.com/feeds/videos.xml?channel_id={id}")
}

/// Extracts the channel id from a feed URL of the canonical form, if any.
pub fn channel_id_from_feed_url(raw: &str) -> Option<ChannelId> {
    let parsed = Url::parse(raw).ok()?;
    if parsed.host_str() != Some("www.youtube.com") || parsed.path() != "/feeds/videos.xml" {
        return None;
    }
    parsed
        .query_pairs()
        .find(|(key, _)| key == "channel_id")
        .and_then(|(_, value)| ChannelId::new(value.into_owned()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_ids() {
        assert!(ChannelId::is_valid("UC_x5XG1OV2P6uZZ5FSM9Ttw"));
        assert!(ChannelId::is_valid("UCabcdefghij1234567890-_"));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(!ChannelId::is_valid("UCshort"));
        assert!(!ChannelId::is_valid("XX_x5XG1OV2P6uZZ5FSM9Ttw"));
        assert!(!ChannelId::is_valid("UC_x5XG1OV2P6uZZ5FSM9Tt!"));
        assert!(!ChannelId::is_valid(""));
    }

    #[test]
    fn feed_url_round_trips() {
        let id = ChannelId::new("UC_x5XG1OV2P6uZZ5FSM9Ttw").unwrap();
        let url = feed_url(&id);
        assert_eq!(channel_id_from_feed_url(&url), Some(id));
    }

    #[test]
    fn feed_url_parser_rejects_other_urls() {
        assert_eq!(channel_id_from_feed_url("not a url"), None);
        assert_eq!(
            channel_id_from_feed_url("https://example.com/feeds/videos.xml?channel_id=UC_x5XG1OV2P6uZZ5FSM9Ttw"),
            None
        );
        assert_eq!(
            channel_id_from_feed_url("https://www.youtube.com/watch?v=abc"),
            None
        );
        assert_eq!(
            channel_id_from_feed_url("https://www.youtube.com/feeds/videos.xml?channel_id=bogus"),
            None
        );
    }
}
