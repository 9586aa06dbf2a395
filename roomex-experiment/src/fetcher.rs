use crate::batch::{prepare_batch, TrialBatch};
use crate::config::SequencerConfig;
use crate::error::SequencerError;
use crate::source::TrialSource;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs trial requests with a deadline and a lifetime-bound cancellation.
#[derive(Clone)]
pub struct TrialFetcher {
    source: Arc<dyn TrialSource>,
    config: SequencerConfig,
    cancel: CancellationToken,
}

/// Cancels every outstanding fetch of its fetcher when dropped.
#[derive(Debug)]
pub struct FetchScope {
    cancel: CancellationToken,
}

impl Drop for FetchScope {
    fn drop(&mut self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!("fetch scope closed, cancelling outstanding trial requests");
            self.cancel.cancel();
        }
    }
}

impl TrialFetcher {
    /// Creates a fetcher together with the scope that owns its lifetime.
    pub fn scoped(source: Arc<dyn TrialSource>, config: SequencerConfig) -> (Self, FetchScope) {
        let cancel = CancellationToken::new();
        let scope = FetchScope {
            cancel: cancel.clone(),
        };
        (
            Self {
                source,
                config,
                cancel,
            },
            scope,
        )
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn fetch(&self, trial_type: &str) -> Result<TrialBatch, SequencerError> {
        let timeout = self.config.fetch_timeout;
        let request = tokio::time::timeout(timeout, self.source.fetch_session(trial_type));

        let session = tokio::select! {
            _ = self.cancel.cancelled() => return Err(SequencerError::Cancelled),
            outcome = request => match outcome {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(?timeout, "trial request timed out");
                    return Err(SequencerError::Timeout(timeout));
                }
            },
        };

        let batch = prepare_batch(session, self.config.practice_duration_ms)?;
        tracing::info!(
            trials = batch.trials.len(),
            resume_index = batch.resume_index,
            last_trial_index = batch.last_trial_index,
            "trial batch received"
        );
        Ok(batch)
    }
}
