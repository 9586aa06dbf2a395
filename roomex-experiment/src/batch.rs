use crate::error::SequencerError;
use roomex_core::{TrialData, TrialListSession};

/// A fetched batch ready to present
#[derive(Debug, Clone, PartialEq)]
pub struct TrialBatch {
    pub trials: Vec<TrialData>,
    pub resume_index: usize,
    pub last_trial_index: i64,
}

impl TrialBatch {
    pub fn all_done(&self) -> bool {
        self.resume_index >= self.trials.len()
    }
}

/// Index of the first unfinished trial, or `trials.len()` when every trial is
/// done.
pub fn resume_index(trials: &[TrialData]) -> usize {
    trials
        .iter()
        .position(|t| !t.done)
        .unwrap_or(trials.len())
}

/// Validates a server session and applies the practice override to the
/// in-memory copy of the first trial.
pub fn prepare_batch(
    session: TrialListSession,
    practice_duration_ms: u64,
) -> Result<TrialBatch, SequencerError> {
    let TrialListSession {
        mut trials,
        last_trial_index,
    } = session;

    let Some(first) = trials.first_mut() else {
        return Err(SequencerError::MalformedPayload(
            "server returned an empty trial list".to_string(),
        ));
    };
    first.duration = practice_duration_ms;

    Ok(TrialBatch {
        resume_index: resume_index(&trials),
        trials,
        last_trial_index,
    })
}
