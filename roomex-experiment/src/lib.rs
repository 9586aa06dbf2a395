pub mod batch;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod sequencer;
pub mod source;
pub mod trial;

pub use batch::{prepare_batch, resume_index, TrialBatch};
pub use config::SequencerConfig;
pub use error::SequencerError;
pub use fetcher::{FetchScope, TrialFetcher};
pub use sequencer::{FetchTicket, TrialSequencer};
pub use source::{HttpTrialSource, TrialSource};
pub use trial::{TrialDurations, TrialFlow, TrialTimestamps};
