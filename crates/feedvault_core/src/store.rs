use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::channel::{feed_url, ChannelId};
use crate::target::is_persisted_target;
use crate::view::DisplayItem;

/// One subscription: the display name plus the Discord channel that
/// receives notifications (`"0"` when unset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub name: String,
    #[serde(rename = "discordChannel")]
    pub discord_channel: String,
}

/// The whole persisted file: a mapping from channel id to entry.
///
/// Never cached between operations; callers fetch a fresh copy from the
/// remote store, mutate it in memory and write the whole file back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedStore(BTreeMap<ChannelId, ChannelEntry>);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreFormatError {
    #[error("content is not valid JSON: {0}")]
    NotJson(String),
    #[error("top-level value must be an object, not an array or scalar")]
    NotObject,
    #[error("key {0:?} is not a valid channel id")]
    InvalidKey(String),
    #[error("entry for {0:?} must be an object with \"name\" and \"discordChannel\" strings")]
    InvalidEntry(String),
    #[error("entry for {0:?} has a malformed \"discordChannel\" value")]
    InvalidTarget(String),
}

impl FeedStore {
    /// Parses file content, checking structure only: top-level object, valid
    /// channel-id keys, entries with the two required string fields.
    ///
    /// This is the policy applied on every read; callers downgrade a failure
    /// to an empty store so that a damaged file never takes the dashboard
    /// down with it.
    pub fn parse_lenient(content: &str) -> Result<Self, StoreFormatError> {
        Self::parse(content, false)
    }

    /// Parses proposed replacement content with the full validation applied
    /// before any write: structure as in [`parse_lenient`], plus the
    /// persisted notification-target format for every entry.
    ///
    /// [`parse_lenient`]: FeedStore::parse_lenient
    pub fn parse_strict(content: &str) -> Result<Self, StoreFormatError> {
        Self::parse(content, true)
    }

    fn parse(content: &str, check_targets: bool) -> Result<Self, StoreFormatError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let value: Value =
            serde_json::from_str(trimmed).map_err(|err| StoreFormatError::NotJson(err.to_string()))?;
        let object = match value {
            Value::Object(map) => map,
            _ => return Err(StoreFormatError::NotObject),
        };

        let mut entries = BTreeMap::new();
        for (key, value) in object {
            let id = ChannelId::new(key.clone())
                .map_err(|_| StoreFormatError::InvalidKey(key.clone()))?;
            let entry = match value {
                Value::Object(fields) => ChannelEntry {
                    name: string_field(&fields, "name")
                        .ok_or_else(|| StoreFormatError::InvalidEntry(key.clone()))?,
                    discord_channel: string_field(&fields, "discordChannel")
                        .ok_or_else(|| StoreFormatError::InvalidEntry(key.clone()))?,
                },
                _ => return Err(StoreFormatError::InvalidEntry(key)),
            };
            if check_targets && !is_persisted_target(&entry.discord_channel) {
                return Err(StoreFormatError::InvalidTarget(key));
            }
            entries.insert(id, entry);
        }
        Ok(Self(entries))
    }

    /// Serializes the store back to file content. An empty store becomes `{}`.
    pub fn to_json_string(&self) -> String {
        // BTreeMap keys and String values cannot fail to serialize.
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: &ChannelId) -> bool {
        self.0.contains_key(id)
    }

    pub fn get(&self, id: &ChannelId) -> Option<&ChannelEntry> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &ChannelId) -> Option<&mut ChannelEntry> {
        self.0.get_mut(id)
    }

    pub fn insert(&mut self, id: ChannelId, entry: ChannelEntry) -> Option<ChannelEntry> {
        self.0.insert(id, entry)
    }

    pub fn remove(&mut self, id: &ChannelId) -> Option<ChannelEntry> {
        self.0.remove(id)
    }

    /// Projects every entry into its display form, feed URL included.
    pub fn display_items(&self) -> Vec<DisplayItem> {
        self.0
            .iter()
            .map(|(id, entry)| DisplayItem {
                channel_id: id.clone(),
                url: feed_url(id),
                name: entry.name.clone(),
                discord_channel: entry.discord_channel.clone(),
            })
            .collect()
    }
}

fn string_field(fields: &serde_json::Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(str::to_string)
}
