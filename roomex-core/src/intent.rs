/// Single active movement direction driven by the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionIntent {
    Forward,
    Backward,
    Left,
    Right,
    #[default]
    None,
}

impl MotionIntent {
    /// Maps a key-down to an intent. Only the four lowercase bindings move;
    /// everything else clears.
    pub fn from_key(key: &str) -> Self {
        match key {
            "w" => MotionIntent::Forward,
            "s" => MotionIntent::Backward,
            "a" => MotionIntent::Left,
            "d" => MotionIntent::Right,
            _ => MotionIntent::None,
        }
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self, MotionIntent::None)
    }

    /// Signed unit steps along the camera's (forward, right) axes.
    pub fn axes(&self) -> (f32, f32) {
        match self {
            MotionIntent::Forward => (1.0, 0.0),
            MotionIntent::Backward => (-1.0, 0.0),
            MotionIntent::Left => (0.0, -1.0),
            MotionIntent::Right => (0.0, 1.0),
            MotionIntent::None => (0.0, 0.0),
        }
    }
}
