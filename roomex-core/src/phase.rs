/// Where the trial sequencer is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencerPhase {
    /// No trial list; the practice menu is showing.
    #[default]
    Idle,
    Fetching,
    Presenting {
        index: usize,
    },
}

impl SequencerPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, SequencerPhase::Idle)
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self, SequencerPhase::Fetching)
    }

    pub fn is_presenting(&self) -> bool {
        matches!(self, SequencerPhase::Presenting { .. })
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            SequencerPhase::Presenting { index } => Some(*index),
            _ => None,
        }
    }
}
