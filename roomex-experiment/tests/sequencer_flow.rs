use async_trait::async_trait;
use roomex_core::{TrialData, TrialListSession};
use roomex_experiment::{
    SequencerConfig, SequencerError, TrialFetcher, TrialSequencer, TrialSource,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct StaticSource {
    session: Result<TrialListSession, SequencerError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StaticSource {
    fn ok(trials: Vec<TrialData>) -> Self {
        Self {
            session: Ok(TrialListSession {
                trials,
                last_trial_index: 0,
            }),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(error: SequencerError) -> Self {
        Self {
            session: Err(error),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl TrialSource for StaticSource {
    async fn fetch_session(&self, trial_type: &str) -> Result<TrialListSession, SequencerError> {
        assert_eq!(trial_type, "T");
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.session.clone()
    }
}

fn two_trials() -> Vec<TrialData> {
    vec![TrialData::new(1, 4000), TrialData::new(2, 4000)]
}

#[tokio::test]
async fn practice_batch_end_to_end() {
    let (fetcher, _scope) =
        TrialFetcher::scoped(Arc::new(StaticSource::ok(two_trials())), SequencerConfig::default());
    let mut seq = TrialSequencer::default();

    let (trials, resume) = seq.request_trial_batch(&fetcher, "T").await.unwrap();
    assert_eq!(resume, 0);
    assert_eq!(trials[0].duration, 6000);
    assert_eq!(trials[1].duration, 4000);
    assert_eq!(seq.current_trial().map(|t| t.duration), Some(6000));

    seq.advance();
    assert_eq!(seq.current_index(), 1);
    assert_eq!(seq.trials().len(), 2);

    seq.advance();
    assert!(seq.trials().is_empty());
    assert!(seq.current_trial().is_none());
    assert_eq!(seq.attempt_count(), 2);
}

#[tokio::test]
async fn resumes_at_first_unfinished_trial() {
    let trials = vec![
        TrialData::new(1, 4000).done(true),
        TrialData::new(2, 4000).done(true),
        TrialData::new(3, 4000),
    ];
    let (fetcher, _scope) =
        TrialFetcher::scoped(Arc::new(StaticSource::ok(trials)), SequencerConfig::default());
    let mut seq = TrialSequencer::default();

    let (trials, resume) = seq.request_trial_batch(&fetcher, "T").await.unwrap();
    assert_eq!(resume, 2);
    assert_eq!(trials[0].duration, 6000);
    assert_eq!(seq.current_trial().map(|t| t.id.to_string()), Some("3".into()));
    assert!(seq.shows_helper());
}

#[tokio::test]
async fn empty_batch_surfaces_malformed_payload() {
    let (fetcher, _scope) =
        TrialFetcher::scoped(Arc::new(StaticSource::ok(vec![])), SequencerConfig::default());
    let mut seq = TrialSequencer::default();

    let err = seq.request_trial_batch(&fetcher, "T").await.unwrap_err();
    assert!(matches!(err, SequencerError::MalformedPayload(_)));
    assert!(seq.phase().is_idle());
    assert!(seq.last_error().is_some_and(|e| e.is_retryable()));
}

#[tokio::test]
async fn transport_failure_can_be_retried() {
    let source = Arc::new(StaticSource::failing(SequencerError::FetchFailed(
        "connection refused".into(),
    )));
    let (fetcher, _scope) = TrialFetcher::scoped(source.clone(), SequencerConfig::default());
    let mut seq = TrialSequencer::default();

    for _ in 0..2 {
        let err = seq.request_trial_batch(&fetcher, "T").await.unwrap_err();
        assert!(matches!(err, SequencerError::FetchFailed(_)));
        assert!(seq.phase().is_idle());
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn stalled_request_times_out() {
    let source = StaticSource::ok(two_trials()).slow(Duration::from_secs(60));
    let config = SequencerConfig {
        fetch_timeout: Duration::from_secs(2),
        ..SequencerConfig::default()
    };
    let (fetcher, _scope) = TrialFetcher::scoped(Arc::new(source), config);
    let mut seq = TrialSequencer::default();

    let err = seq.request_trial_batch(&fetcher, "T").await.unwrap_err();
    assert_eq!(err, SequencerError::Timeout(Duration::from_secs(2)));
    assert!(seq.phase().is_idle());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_scope_cancels_outstanding_fetches() {
    let source = StaticSource::ok(two_trials()).slow(Duration::from_secs(5));
    let (fetcher, scope) = TrialFetcher::scoped(Arc::new(source), SequencerConfig::default());

    let pending = tokio::spawn({
        let fetcher = fetcher.clone();
        async move { fetcher.fetch("T").await }
    });
    tokio::task::yield_now().await;
    drop(scope);

    let result = pending.await.unwrap();
    assert_eq!(result, Err(SequencerError::Cancelled));
    assert!(fetcher.is_cancelled());
    assert!(!SequencerError::Cancelled.is_retryable());
}
