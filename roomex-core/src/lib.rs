pub mod intent;
pub mod phase;
pub mod room;
pub mod trial;

pub use intent::MotionIntent;
pub use phase::SequencerPhase;
pub use room::{RoomConfig, RoomConfigError};
pub use trial::{ReproductionResponse, TrialData, TrialId, TrialListSession, TrialState};
