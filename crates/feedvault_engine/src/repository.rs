use vault_logging::{vault_info, vault_warn};

use feedvault_core::{
    channel_id_from_feed_url, feed_url, parse_notification_target, ChannelEntry, ChannelId,
    DisplayItem, FeedStore, StoreFormatError, TargetParseError, UNSET_TARGET,
};

use crate::resolve::{ChannelResolver, ResolveError};
use crate::store::{FileStore, FileStoreError, Revision};

/// Name inserted when a page gave us an id but no usable title.
const PLACEHOLDER_NAME: &str = "New Channel (please edit)";

/// Errors reported back to the caller by repository operations.
///
/// None of these are panics or early process exits; the `Display` text of
/// each variant is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("a feed for channel {0} already exists")]
    DuplicateChannel(ChannelId),
    #[error("no feed stored for channel {0}")]
    UnknownChannel(ChannelId),
    #[error(transparent)]
    InvalidTarget(#[from] TargetParseError),
    #[error(transparent)]
    InvalidContent(#[from] StoreFormatError),
    #[error(transparent)]
    Store(#[from] FileStoreError),
}

/// Channel-centric operations over the remote feed file.
///
/// Every operation is one read-modify-write cycle: fetch the current file
/// and revision, validate and mutate in memory, write the whole file back
/// with the revision as a compare-and-swap guard. Nothing is cached between
/// calls, and a conflicting concurrent write surfaces as
/// [`FileStoreError::Conflict`] for the caller to retry.
pub struct FeedRepository<S> {
    store: S,
    resolver: Box<dyn ChannelResolver>,
}

impl<S: FileStore> FeedRepository<S> {
    pub fn new(store: S, resolver: Box<dyn ChannelResolver>) -> Self {
        Self { store, resolver }
    }

    /// Projects every stored entry into its display form.
    pub async fn list_feeds(&self) -> Result<Vec<DisplayItem>, RepoError> {
        let (store, _) = self.load().await?;
        Ok(store.display_items())
    }

    /// Returns the exact current file text, for direct editing by the
    /// caller.
    pub async fn raw_content(&self) -> Result<String, RepoError> {
        let file = self.store.fetch().await?;
        Ok(file.content)
    }

    /// Resolves `input` to a channel and adds a feed for it.
    ///
    /// Fails when the input cannot be resolved or the channel is already
    /// present; retrying a successful add therefore fails the second time.
    pub async fn add_feed(&self, input: &str) -> Result<DisplayItem, RepoError> {
        let resolved = self.resolver.resolve(input).await?;
        let (mut store, revision) = self.load().await?;
        if store.contains(&resolved.id) {
            return Err(RepoError::DuplicateChannel(resolved.id));
        }

        let entry = ChannelEntry {
            name: resolved.name.unwrap_or_else(|| PLACEHOLDER_NAME.to_string()),
            discord_channel: UNSET_TARGET.to_string(),
        };
        store.insert(resolved.id.clone(), entry.clone());
        self.persist(&store, &format!("Add feed for channel {}", resolved.id), revision)
            .await?;
        vault_info!("added feed for channel {}", resolved.id);
        Ok(DisplayItem {
            url: feed_url(&resolved.id),
            channel_id: resolved.id,
            name: entry.name,
            discord_channel: entry.discord_channel,
        })
    }

    /// Removes the entries behind the given feed URLs.
    ///
    /// URLs that do not parse or do not match a stored entry are skipped
    /// silently; the call succeeds regardless of how many actually matched.
    /// Returns the number of entries removed.
    pub async fn delete_feeds(&self, urls: &[String]) -> Result<usize, RepoError> {
        let (mut store, revision) = self.load().await?;
        let mut removed = 0;
        for url in urls {
            if let Some(id) = channel_id_from_feed_url(url) {
                if store.remove(&id).is_some() {
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            let noun = if removed == 1 { "feed" } else { "feeds" };
            self.persist(&store, &format!("Remove {removed} {noun}"), revision)
                .await?;
            vault_info!("removed {removed} {noun}");
        }
        Ok(removed)
    }

    /// Replaces the whole file with caller-provided JSON.
    ///
    /// The replacement is validated in full before any store call, so a
    /// malformed proposal causes zero remote writes.
    pub async fn replace_raw(&self, new_content: &str) -> Result<(), RepoError> {
        let store = FeedStore::parse_strict(new_content)?;
        let file = self.store.fetch().await?;
        self.persist(&store, "Replace feed store contents", file.revision)
            .await?;
        vault_info!("replaced feed store contents ({} entries)", store.len());
        Ok(())
    }

    /// Updates the notification target of one stored channel.
    ///
    /// Accepts a bare numeric id, the unset sentinel, or the
    /// `#name-numericId` display form; only the numeric component is
    /// persisted. Malformed input or an unknown channel leaves the store
    /// untouched.
    pub async fn set_notification_target(
        &self,
        channel_id: &ChannelId,
        raw_input: &str,
    ) -> Result<DisplayItem, RepoError> {
        let target = parse_notification_target(raw_input)?;
        let (mut store, revision) = self.load().await?;
        let entry = store
            .get_mut(channel_id)
            .ok_or_else(|| RepoError::UnknownChannel(channel_id.clone()))?;
        entry.discord_channel = target;
        let entry = entry.clone();
        self.persist(
            &store,
            &format!("Set notification target for {channel_id}"),
            revision,
        )
        .await?;
        Ok(DisplayItem {
            channel_id: channel_id.clone(),
            url: feed_url(channel_id),
            name: entry.name,
            discord_channel: entry.discord_channel,
        })
    }

    /// Fetches the current file and parses it leniently: structurally
    /// invalid content is downgraded to an empty store so that one damaged
    /// file cannot brick every operation.
    async fn load(&self) -> Result<(FeedStore, Option<Revision>), RepoError> {
        let file = self.store.fetch().await?;
        let store = match FeedStore::parse_lenient(&file.content) {
            Ok(store) => store,
            Err(err) => {
                vault_warn!("stored feed file is invalid ({err}); treating it as empty");
                FeedStore::default()
            }
        };
        Ok((store, file.revision))
    }

    async fn persist(
        &self,
        store: &FeedStore,
        message: &str,
        revision: Option<Revision>,
    ) -> Result<(), RepoError> {
        self.store
            .put(&store.to_json_string(), message, revision.as_ref())
            .await?;
        Ok(())
    }
}
