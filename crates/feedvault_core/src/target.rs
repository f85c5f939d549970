use thiserror::Error;

/// Sentinel persisted when no Discord channel has been assigned yet.
pub const UNSET_TARGET: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetParseError {
    #[error("notification target {0:?} is neither a Discord channel id nor a #name-id form")]
    Unrecognized(String),
}

fn is_snowflake(raw: &str) -> bool {
    // Discord channel ids are snowflakes, currently 17-19 decimal digits.
    (17..=19).contains(&raw.len()) && raw.bytes().all(|b| b.is_ascii_digit())
}

/// True for values that may be stored in the `discordChannel` field:
/// the unset sentinel or a bare numeric id.
pub fn is_persisted_target(raw: &str) -> bool {
    raw == UNSET_TARGET || is_snowflake(raw)
}

/// Parses user input for a notification target.
///
/// Accepts a bare numeric id, the unset sentinel `"0"`, or the display form
/// `#<label>-<numeric id>` as copied from a Discord client. Only the numeric
/// component is returned for persistence.
pub fn parse_notification_target(raw: &str) -> Result<String, TargetParseError> {
    let trimmed = raw.trim();
    if is_persisted_target(trimmed) {
        return Ok(trimmed.to_string());
    }
    if let Some(rest) = trimmed.strip_prefix('#') {
        if let Some((label, id)) = rest.rsplit_once('-') {
            if !label.is_empty() && is_snowflake(id) {
                return Ok(id.to_string());
            }
        }
    }
    Err(TargetParseError::Unrecognized(raw.to_string()))
}
