mod input;
mod stats;

pub use input::{InputSystem, ScrollEvent};
pub use stats::FrameStatsSystem;
