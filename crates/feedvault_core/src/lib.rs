//! Feedvault core: pure domain model for the channel subscription store.
mod channel;
mod store;
mod target;
mod view;

pub use channel::{channel_id_from_feed_url, feed_url, ChannelId, ChannelIdError};
pub use store::{ChannelEntry, FeedStore, StoreFormatError};
pub use target::{is_persisted_target, parse_notification_target, TargetParseError, UNSET_TARGET};
pub use view::DisplayItem;
