//! Feedvault engine: remote file store, channel resolution and the feed
//! repository layered on top of them.
mod config;
mod repository;
mod resolve;
mod store;
mod suggest;

pub use config::{ConfigError, StoreConfig};
pub use repository::{FeedRepository, RepoError};
pub use resolve::{
    ChannelResolver, PageScrapeResolver, ResolveError, ResolveSettings, ResolvedChannel,
};
pub use store::{FileStore, FileStoreError, GithubFileStore, Revision, StoredFile};
pub use suggest::{simplify_feeds, FeedSuggester, SuggestError};
