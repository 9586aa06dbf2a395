use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// `trial_type` query value sent to the server.
    pub trial_type: String,
    /// Exposure forced onto the first trial of every practice batch.
    pub practice_duration_ms: u64,
    pub fetch_timeout: Duration,
    /// Trials (from index 0) that show the helper text.
    pub helper_trials: usize,
    pub probe_scale_range: (f32, f32),
    /// Relative scale change per wheel notch.
    pub probe_step: f32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            trial_type: "T".to_string(),
            practice_duration_ms: 6000,
            fetch_timeout: Duration::from_secs(10),
            helper_trials: 3,
            probe_scale_range: (0.1, 10.0),
            probe_step: 0.1,
        }
    }
}
