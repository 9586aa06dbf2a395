use crate::batch::TrialBatch;
use crate::config::SequencerConfig;
use crate::error::SequencerError;
use crate::fetcher::TrialFetcher;
use roomex_core::{SequencerPhase, TrialData};

/// Identifies one trial request. Later tickets are newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Decides which trial is current.
///
/// `Idle -> Fetching -> Presenting(i) -> Presenting(i + 1) | Idle`. The list is
/// replaced wholesale by every successful fetch and emptied once its last trial
/// completes.
#[derive(Debug)]
pub struct TrialSequencer {
    trials: Vec<TrialData>,
    index: usize,
    attempts: usize,
    last_trial_index: i64,
    phase: SequencerPhase,
    last_error: Option<SequencerError>,
    issued: u64,
    applied: u64,
    helper_trials: usize,
}

impl Default for TrialSequencer {
    fn default() -> Self {
        Self::new(&SequencerConfig::default())
    }
}

impl TrialSequencer {
    pub fn new(config: &SequencerConfig) -> Self {
        Self {
            trials: Vec::new(),
            index: 0,
            attempts: 0,
            last_trial_index: 0,
            phase: SequencerPhase::Idle,
            last_error: None,
            issued: 0,
            applied: 0,
            helper_trials: config.helper_trials,
        }
    }

    /// Starts a request. While a list is showing it stays on screen until the
    /// response arrives.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.last_error = None;
        if self.trials.is_empty() {
            self.phase = SequencerPhase::Fetching;
        }
        tracing::debug!(ticket = self.issued, "trial fetch started");
        FetchTicket(self.issued)
    }

    /// Applies a finished request. The newest successful response wins:
    /// anything older than what is already applied is dropped, and a failure
    /// only counts when no newer request is outstanding. Returns whether the
    /// trial list changed.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<TrialBatch, SequencerError>,
    ) -> bool {
        match result {
            Ok(batch) => {
                if ticket.0 <= self.applied {
                    tracing::debug!(ticket = ticket.0, applied = self.applied, "stale trial batch dropped");
                    return false;
                }
                self.applied = ticket.0;
                self.index = batch.resume_index;
                self.last_trial_index = batch.last_trial_index;
                self.trials = batch.trials;
                self.last_error = None;
                self.phase = SequencerPhase::Presenting { index: self.index };
                tracing::info!(
                    index = self.index,
                    trials = self.trials.len(),
                    "presenting trial batch"
                );
                true
            }
            Err(error) => {
                if ticket.0 != self.issued || ticket.0 <= self.applied {
                    tracing::debug!(ticket = ticket.0, %error, "superseded trial fetch failed");
                    return false;
                }
                tracing::warn!(%error, "trial fetch failed");
                self.last_error = Some(error);
                if self.trials.is_empty() {
                    self.phase = SequencerPhase::Idle;
                }
                false
            }
        }
    }

    /// Fetches a batch and applies it. Returns the presented list and its
    /// resume index.
    pub async fn request_trial_batch(
        &mut self,
        fetcher: &TrialFetcher,
        trial_type: &str,
    ) -> Result<(Vec<TrialData>, usize), SequencerError> {
        let ticket = self.begin_fetch();
        match fetcher.fetch(trial_type).await {
            Ok(batch) => {
                let presented = (batch.trials.clone(), batch.resume_index);
                self.complete_fetch(ticket, Ok(batch));
                Ok(presented)
            }
            Err(error) => {
                self.complete_fetch(ticket, Err(error.clone()));
                Err(error)
            }
        }
    }

    pub fn current_trial(&self) -> Option<&TrialData> {
        self.trials.get(self.index)
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Marks the current trial complete. Completing the last trial empties
    /// the list; nothing wraps. Returns `false` when there was no current
    /// trial.
    pub fn advance(&mut self) -> bool {
        if self.index >= self.trials.len() {
            return false;
        }
        self.attempts += 1;
        self.step_past_current();
        true
    }

    /// Moves past a trial that could not be shown. Unlike [`advance`], this
    /// is not an attempt, so it never unlocks skipping the practice.
    ///
    /// [`advance`]: TrialSequencer::advance
    pub fn skip(&mut self) -> bool {
        if self.index >= self.trials.len() {
            return false;
        }
        tracing::warn!(index = self.index, "trial skipped");
        self.step_past_current();
        true
    }

    fn step_past_current(&mut self) {
        self.index += 1;
        if self.index == self.trials.len() {
            tracing::info!(attempts = self.attempts, "end of batch, back to menu");
            self.trials.clear();
            self.phase = SequencerPhase::Idle;
        } else {
            self.phase = SequencerPhase::Presenting { index: self.index };
        }
    }

    /// Leaves an all-done batch and returns to the menu.
    pub fn dismiss(&mut self) {
        self.trials.clear();
        self.phase = SequencerPhase::Idle;
    }

    /// Trials completed this session. Survives refetches.
    pub fn attempt_count(&self) -> usize {
        self.attempts
    }

    pub fn phase(&self) -> SequencerPhase {
        self.phase
    }

    pub fn trials(&self) -> &[TrialData] {
        &self.trials
    }

    pub fn last_trial_index(&self) -> i64 {
        self.last_trial_index
    }

    pub fn last_error(&self) -> Option<&SequencerError> {
        self.last_error.as_ref()
    }

    /// A fetched batch in which every trial was already done.
    pub fn all_done(&self) -> bool {
        !self.trials.is_empty() && self.index >= self.trials.len()
    }

    pub fn shows_helper(&self) -> bool {
        self.current_trial().is_some() && self.index < self.helper_trials
    }

    pub fn menu_label(&self) -> &'static str {
        if self.attempts > 0 {
            "Restart practice"
        } else {
            "Start practice"
        }
    }

    pub fn can_skip_practice(&self) -> bool {
        self.attempts > 0
    }
}
