use crate::config::SequencerConfig;
use roomex_core::{ReproductionResponse, TrialData, TrialId, TrialState};
use roomex_timing::Timer;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TrialDurations {
    pub exposure_ms: u64,
}

#[derive(Debug, Clone)]
pub struct TrialTimestamps {
    pub start: u64,
    pub reproduction_start: Option<u64>,
    pub response: Option<u64>,
}

/// Exposure, then reproduction, for one presented trial.
pub struct TrialFlow<T: Timer> {
    pub id: TrialId,
    pub durations: TrialDurations,
    pub timestamps: TrialTimestamps,
    pub state: TrialState,
    probe_scale: f32,
    probe_range: (f32, f32),
    probe_step: f32,
    timer: T,
}

impl<T: Timer> TrialFlow<T> {
    pub fn start(trial: &TrialData, config: &SequencerConfig, timer: T) -> Self {
        let now = timer.now();
        tracing::info!(id = %trial.id, exposure_ms = trial.duration, "trial started");
        Self {
            id: trial.id.clone(),
            durations: TrialDurations {
                exposure_ms: trial.duration,
            },
            timestamps: TrialTimestamps {
                start: now,
                reproduction_start: None,
                response: None,
            },
            state: TrialState::Exposure,
            probe_scale: 1.0,
            probe_range: config.probe_scale_range,
            probe_step: config.probe_step,
            timer,
        }
    }

    /// Moves from exposure to reproduction once the exposure time is up.
    /// Returns the new state when it changed.
    pub fn update(&mut self) -> Option<TrialState> {
        if self.state != TrialState::Exposure {
            return None;
        }
        let now = self.timer.now();
        let elapsed = Duration::from_nanos(now.saturating_sub(self.timestamps.start));
        if elapsed >= Duration::from_millis(self.durations.exposure_ms) {
            self.state = TrialState::Reproduction;
            self.timestamps.reproduction_start = Some(now);
            tracing::debug!(id = %self.id, "exposure over, reproduction started");
            return Some(self.state);
        }
        None
    }

    /// Remaining exposure time in milliseconds, zero outside exposure.
    pub fn exposure_remaining_ms(&self) -> u64 {
        if self.state != TrialState::Exposure {
            return 0;
        }
        let elapsed_ms = self.timer.now().saturating_sub(self.timestamps.start) / 1_000_000;
        self.durations.exposure_ms.saturating_sub(elapsed_ms)
    }

    /// Scales the probe by wheel notches; ignored outside reproduction.
    pub fn adjust_probe(&mut self, notches: f32) {
        if self.state != TrialState::Reproduction || !notches.is_finite() {
            return;
        }
        let factor = (1.0 + self.probe_step).powf(notches);
        let (min, max) = self.probe_range;
        self.probe_scale = (self.probe_scale * factor).clamp(min, max);
    }

    pub fn probe_scale(&self) -> f32 {
        self.probe_scale
    }

    /// Confirms the reproduction. Only valid during reproduction.
    pub fn confirm(&mut self) -> Option<ReproductionResponse> {
        if self.state != TrialState::Reproduction {
            return None;
        }
        let now = self.timer.now();
        self.timestamps.response = Some(now);
        self.state = TrialState::Complete;

        let response_ns = now.saturating_sub(self.timestamps.reproduction_start.unwrap_or(now));
        let response = ReproductionResponse {
            trial_id: self.id.clone(),
            scale: self.probe_scale,
            exposure_ms: self.durations.exposure_ms,
            response_ns,
        };
        tracing::info!(
            id = %self.id,
            scale = response.scale,
            response_ms = response_ns as f64 / 1_000_000.0,
            "reproduction recorded"
        );
        Some(response)
    }

    pub fn is_exposure(&self) -> bool {
        self.state == TrialState::Exposure
    }

    pub fn is_complete(&self) -> bool {
        self.state == TrialState::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomex_timing::ManualTimer;

    fn flow(timer: &ManualTimer) -> TrialFlow<ManualTimer> {
        TrialFlow::start(
            &TrialData::new(9, 6000),
            &SequencerConfig::default(),
            timer.clone(),
        )
    }

    #[test]
    fn exposure_lasts_the_trial_duration() {
        let timer = ManualTimer::new();
        let mut flow = flow(&timer);

        timer.advance(Duration::from_millis(5999));
        assert_eq!(flow.update(), None);
        assert_eq!(flow.exposure_remaining_ms(), 1);

        timer.advance(Duration::from_millis(1));
        assert_eq!(flow.update(), Some(TrialState::Reproduction));
        assert_eq!(flow.update(), None);
        assert_eq!(flow.exposure_remaining_ms(), 0);
    }

    #[test]
    fn very_long_exposure_keeps_running() {
        let trial: TrialData =
            serde_json::from_value(serde_json::json!({ "id": 1, "duration": 20_000_000_000_000u64 }))
                .unwrap();
        let timer = ManualTimer::new();
        let mut flow = TrialFlow::start(&trial, &SequencerConfig::default(), timer.clone());

        timer.advance(Duration::from_millis(16));
        assert_eq!(flow.update(), None);
        assert!(flow.is_exposure());
        assert_eq!(flow.exposure_remaining_ms(), 20_000_000_000_000 - 16);

        let mut endless = TrialFlow::start(
            &TrialData::new(2, u64::MAX),
            &SequencerConfig::default(),
            timer.clone(),
        );
        timer.advance(Duration::from_secs(3600));
        assert_eq!(endless.update(), None);
    }

    #[test]
    fn probe_only_moves_during_reproduction_and_is_clamped() {
        let timer = ManualTimer::new();
        let mut flow = flow(&timer);
        flow.adjust_probe(3.0);
        assert_eq!(flow.probe_scale(), 1.0);

        timer.advance(Duration::from_secs(6));
        flow.update();
        flow.adjust_probe(1.0);
        assert!((flow.probe_scale() - 1.1).abs() < 1e-5);

        flow.adjust_probe(1000.0);
        assert_eq!(flow.probe_scale(), 10.0);
        flow.adjust_probe(-10_000.0);
        assert!((flow.probe_scale() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn confirm_records_response_once() {
        let timer = ManualTimer::new();
        let mut flow = flow(&timer);
        assert!(flow.confirm().is_none());

        timer.advance(Duration::from_secs(6));
        flow.update();
        timer.advance(Duration::from_millis(1500));
        let response = flow.confirm().unwrap();
        assert_eq!(response.trial_id, TrialId::Number(9));
        assert_eq!(response.exposure_ms, 6000);
        assert_eq!(response.response_ns, 1_500_000_000);
        assert!(flow.is_complete());
        assert!(flow.confirm().is_none());
    }
}
