use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque trial identifier. The server may send numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrialId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TrialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialId::Number(n) => write!(f, "{n}"),
            TrialId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TrialId {
    fn from(n: i64) -> Self {
        TrialId::Number(n)
    }
}

impl From<&str> for TrialId {
    fn from(s: &str) -> Self {
        TrialId::Text(s.to_string())
    }
}

/// One trial definition as served by `make_or_get_trial`.
///
/// Everything besides `id`, `done` and `duration` lands in `params` and is
/// handed to the room builder untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialData {
    pub id: TrialId,
    #[serde(default)]
    pub done: bool,
    /// Exposure time in milliseconds.
    #[serde(deserialize_with = "millis")]
    pub duration: u64,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl TrialData {
    pub fn new(id: impl Into<TrialId>, duration: u64) -> Self {
        Self {
            id: id.into(),
            done: false,
            duration,
            params: Map::new(),
        }
    }

    pub fn done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

/// Millisecond counts arrive as plain JSON numbers, `4000` or `4000.0`.
/// Fractions round to the nearest millisecond.
pub(crate) fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let ms = f64::deserialize(deserializer)?;
    if !ms.is_finite() || ms < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative number of milliseconds, got {ms}"
        )));
    }
    Ok(ms.round() as u64)
}

/// Server batch. Field names are a wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialListSession {
    pub trials: Vec<TrialData>,
    #[serde(default)]
    pub last_trial_index: i64,
}

/// Per-trial flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    Exposure,
    Reproduction,
    Complete,
}

/// Recorded reproduction per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReproductionResponse {
    pub trial_id: TrialId,
    /// Probe scale relative to its starting size.
    pub scale: f32,
    pub exposure_ms: u64,
    pub response_ns: u64,
}
