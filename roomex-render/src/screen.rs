/// Everything shown outside the room itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen<'a> {
    Menu {
        label: &'a str,
        can_skip: bool,
    },
    Fetching,
    FetchFailed {
        message: &'a str,
    },
    Done,
    Reproduction {
        scale: f32,
        helper: bool,
    },
}

pub const ROOM_HELPER: &str = "Look around and take in the size of the room";
pub const PROBE_HELPER: &str = "Scroll to resize the shape to the room, Enter to confirm";

impl Screen<'_> {
    /// Lines of text, top to bottom.
    pub fn lines(&self) -> Vec<String> {
        match *self {
            Screen::Menu { label, can_skip } => {
                let mut lines = vec![format!("{label} (Space)")];
                if can_skip {
                    lines.push("Skip practice (Enter)".to_string());
                }
                lines
            }
            Screen::Fetching => vec!["Loading trials...".to_string()],
            Screen::FetchFailed { message } => vec![
                "Could not load trials".to_string(),
                message.to_string(),
                "Press Space to retry".to_string(),
            ],
            Screen::Done => vec![
                "All trials complete".to_string(),
                "Press Space to return".to_string(),
            ],
            Screen::Reproduction { helper, .. } => {
                if helper {
                    vec![PROBE_HELPER.to_string()]
                } else {
                    Vec::new()
                }
            }
        }
    }
}
