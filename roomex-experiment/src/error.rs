use std::time::Duration;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SequencerError {
    #[error("trial fetch failed: {0}")]
    FetchFailed(String),
    #[error("malformed trial payload: {0}")]
    MalformedPayload(String),
    #[error("trial fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("trial fetch cancelled")]
    Cancelled,
}

impl SequencerError {
    /// Whether the menu should offer "retry". Cancellation only happens on
    /// teardown, so there is nobody to offer it to.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SequencerError::Cancelled)
    }
}
