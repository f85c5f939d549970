use feedvault_core::{feed_url, ChannelEntry, ChannelId, FeedStore, StoreFormatError};
use pretty_assertions::assert_eq;

const ID_A: &str = "UC_x5XG1OV2P6uZZ5FSM9Ttw";
const ID_B: &str = "UCBR8-60-B28hp2BmDPdntcQ";

fn id(raw: &str) -> ChannelId {
    ChannelId::new(raw).unwrap()
}

#[test]
fn empty_store_serializes_as_empty_object() {
    let store = FeedStore::default();
    assert_eq!(store.to_json_string(), "{}");
}

#[test]
fn empty_and_blank_content_parse_to_empty_store() {
    assert!(FeedStore::parse_lenient("{}").unwrap().is_empty());
    assert!(FeedStore::parse_lenient("").unwrap().is_empty());
    assert!(FeedStore::parse_lenient("  \n").unwrap().is_empty());
}

#[test]
fn serialized_store_round_trips_through_strict_parse() {
    let mut store = FeedStore::default();
    store.insert(
        id(ID_A),
        ChannelEntry {
            name: "Google Developers".into(),
            discord_channel: "123456789012345678".into(),
        },
    );
    store.insert(
        id(ID_B),
        ChannelEntry {
            name: "Veritasium".into(),
            discord_channel: "0".into(),
        },
    );

    let text = store.to_json_string();
    let reparsed = FeedStore::parse_strict(&text).unwrap();
    assert_eq!(reparsed, store);

    let items = reparsed.display_items();
    assert_eq!(items.len(), 2);
    let first = items.iter().find(|item| item.channel_id == id(ID_A)).unwrap();
    assert_eq!(first.url, feed_url(&id(ID_A)));
    assert_eq!(first.name, "Google Developers");
    assert_eq!(first.discord_channel, "123456789012345678");
}

#[test]
fn top_level_array_is_rejected() {
    assert_eq!(
        FeedStore::parse_lenient("[]").unwrap_err(),
        StoreFormatError::NotObject
    );
    assert_eq!(
        FeedStore::parse_lenient("\"text\"").unwrap_err(),
        StoreFormatError::NotObject
    );
}

#[test]
fn malformed_json_is_rejected() {
    assert!(matches!(
        FeedStore::parse_lenient("{not json").unwrap_err(),
        StoreFormatError::NotJson(_)
    ));
}

#[test]
fn bad_key_is_named_in_the_error() {
    let content = r#"{"bad-key": {"name": "x", "discordChannel": "0"}}"#;
    assert_eq!(
        FeedStore::parse_strict(content).unwrap_err(),
        StoreFormatError::InvalidKey("bad-key".into())
    );
}

#[test]
fn entry_missing_fields_is_rejected() {
    let content = format!(r#"{{"{ID_A}": {{"name": "x"}}}}"#);
    assert_eq!(
        FeedStore::parse_lenient(&content).unwrap_err(),
        StoreFormatError::InvalidEntry(ID_A.into())
    );

    let content = format!(r#"{{"{ID_A}": {{"name": 7, "discordChannel": "0"}}}}"#);
    assert_eq!(
        FeedStore::parse_lenient(&content).unwrap_err(),
        StoreFormatError::InvalidEntry(ID_A.into())
    );

    let content = format!(r#"{{"{ID_A}": "flat"}}"#);
    assert_eq!(
        FeedStore::parse_lenient(&content).unwrap_err(),
        StoreFormatError::InvalidEntry(ID_A.into())
    );
}

#[test]
fn strict_parse_checks_target_format_but_lenient_does_not() {
    let content = format!(r#"{{"{ID_A}": {{"name": "x", "discordChannel": "not-numeric"}}}}"#);
    // A legacy file with a malformed target still loads for display.
    assert_eq!(FeedStore::parse_lenient(&content).unwrap().len(), 1);
    assert_eq!(
        FeedStore::parse_strict(&content).unwrap_err(),
        StoreFormatError::InvalidTarget(ID_A.into())
    );
}
