//! CPU rendering of room scenes and experiment screens.

pub mod raster;
pub mod render;
pub mod screen;
pub mod text;

pub use render::{FrameStats, SoftwareRenderer};
pub use screen::{Screen, PROBE_HELPER, ROOM_HELPER};
pub use text::{load_font, render_text_pixmap, TextCache};
