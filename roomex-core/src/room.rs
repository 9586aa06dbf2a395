use crate::trial::TrialData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoomConfigError {
    #[error("trial payload has no `{0}` field")]
    MissingField(&'static str),
    #[error("room {field} must be a positive finite number, got {value}")]
    InvalidDimension { field: &'static str, value: f64 },
    #[error("`{field}` must be a non-negative integer variant index")]
    InvalidVariant { field: &'static str },
}

fn default_duration() -> u64 {
    10_000
}

/// Rendering parameters for one trial. Dimensions are metres, duration is
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Wall texture set.
    #[serde(default)]
    pub wall: usize,
    /// Ground texture set.
    #[serde(default)]
    pub ground: usize,
    #[serde(default = "default_duration", deserialize_with = "crate::trial::millis")]
    pub duration: u64,
}

impl RoomConfig {
    pub fn validate(&self) -> Result<(), RoomConfigError> {
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(RoomConfigError::InvalidDimension {
                    field,
                    value: value as f64,
                });
            }
        }
        Ok(())
    }

    /// Reads the room out of a trial payload: a nested `room` object wins over
    /// top-level fields. The trial's own duration is always used.
    pub fn from_trial(trial: &TrialData) -> Result<Self, RoomConfigError> {
        let source = match trial.params.get("room") {
            Some(Value::Object(room)) => room,
            _ => &trial.params,
        };

        let config = RoomConfig {
            width: dimension(source, "width")?,
            height: dimension(source, "height")?,
            depth: dimension(source, "depth")?,
            wall: variant(source, "wall")?,
            ground: variant(source, "ground")?,
            duration: trial.duration,
        };
        config.validate()?;
        Ok(config)
    }
}

impl TryFrom<&TrialData> for RoomConfig {
    type Error = RoomConfigError;

    fn try_from(trial: &TrialData) -> Result<Self, Self::Error> {
        RoomConfig::from_trial(trial)
    }
}

fn dimension(source: &Map<String, Value>, field: &'static str) -> Result<f32, RoomConfigError> {
    let value = source
        .get(field)
        .ok_or(RoomConfigError::MissingField(field))?;
    let number = value
        .as_f64()
        .ok_or(RoomConfigError::InvalidDimension { field, value: f64::NAN })?;
    if !number.is_finite() || number <= 0.0 {
        return Err(RoomConfigError::InvalidDimension { field, value: number });
    }
    Ok(number as f32)
}

fn variant(source: &Map<String, Value>, field: &'static str) -> Result<usize, RoomConfigError> {
    match source.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => value
            .as_u64()
            .map(|v| v as usize)
            .ok_or(RoomConfigError::InvalidVariant { field }),
    }
}
