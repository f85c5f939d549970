use async_trait::async_trait;
use vault_logging::vault_warn;

/// External collaborator that proposes ways to simplify a feed list.
///
/// The engine only invokes this contract; the actual suggestion engine
/// (typically an AI call) lives outside this crate.
#[async_trait]
pub trait FeedSuggester: Send + Sync {
    async fn simplify(&self, feed_urls: &[String]) -> Result<Vec<String>, SuggestError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("suggestion engine failed: {0}")]
pub struct SuggestError(pub String);

/// Invokes the collaborator with the contract's fallback semantics: the
/// result is never empty and never an error, so the caller always has
/// something to display.
pub async fn simplify_feeds(suggester: &dyn FeedSuggester, feed_urls: &[String]) -> Vec<String> {
    if feed_urls.is_empty() {
        return vec!["No feed URLs provided to simplify.".to_string()];
    }
    match suggester.simplify(feed_urls).await {
        Ok(suggestions) if !suggestions.is_empty() => suggestions,
        Ok(_) => vec!["No suggestions were returned.".to_string()],
        Err(err) => {
            vault_warn!("{err}");
            vec!["An error occurred while simplifying feeds.".to_string()]
        }
    }
}
