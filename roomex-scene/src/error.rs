use roomex_core::RoomConfigError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Config(#[from] RoomConfigError),
    #[error("room {dimension} {value} m leaves no room for the doorway (needs more than {minimum} m)")]
    TooSmall {
        dimension: &'static str,
        value: f32,
        minimum: f32,
    },
}
