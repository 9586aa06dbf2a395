use std::f32::consts::PI;

/// Fully open rotation about the hinge, radians (about 138°, swinging outward).
pub const DOOR_OPEN_ANGLE: f32 = -PI / 1.3;

/// Angular speed of the door, radians per second.
pub const DOOR_SPEED: f32 = 3.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Door animation state, owned by the scene and stepped once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DoorState {
    open: bool,
    rotation: f32,
    target: f32,
}

impl DoorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the open flag and retargets; the panel keeps its current angle.
    pub fn toggle(&mut self) {
        self.open = !self.open;
        self.target = if self.open { DOOR_OPEN_ANGLE } else { 0.0 };
        tracing::debug!(open = self.open, "door toggled");
    }

    /// Rotates toward the target without passing it. Zero, negative or
    /// non-finite deltas leave the door where it is. Returns whether the door
    /// moved.
    pub fn step(&mut self, dt: f32) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        let delta = DOOR_SPEED * dt;
        if self.rotation > self.target {
            self.rotation = (self.rotation - delta).max(self.target);
        } else if self.rotation < self.target {
            self.rotation = (self.rotation + delta).min(self.target);
        } else {
            return false;
        }
        true
    }

    pub fn phase(&self) -> DoorPhase {
        match (self.open, self.rotation == self.target) {
            (true, true) => DoorPhase::Open,
            (false, true) => DoorPhase::Closed,
            (true, false) => DoorPhase::Opening,
            (false, false) => DoorPhase::Closing,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}
