/// Read-side projection of one store entry, for display by a caller.
///
/// Derived, never persisted: `url` is reconstructed from the channel id on
/// every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub channel_id: crate::ChannelId,
    pub url: String,
    pub name: String,
    pub discord_channel: String,
}
