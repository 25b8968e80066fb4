//! Components seeded on the application entity

use std::time::Instant;

use crate::ecs::Component;

/// Marks the single application entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppTag;

impl Component for AppTag {}

/// Application-wide flags that systems may flip.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub name: String,
    pub request_shutdown: bool,
}

impl AppState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            request_shutdown: false,
        }
    }
}

impl Component for AppState {}

/// Frame timing, refreshed by the application driver every update.
#[derive(Clone, Debug, Default)]
pub struct TimeComp {
    /// When the current (or last) frame started
    pub start: Option<Instant>,
    /// Duration of the last completed frame, in seconds
    pub dt: f64,
    /// Sum of all completed frame durations, in seconds
    pub elapsed: f64,
    /// Completed frames
    pub frame: u64,
}

impl Component for TimeComp {}

/// A single scroll movement, in scroll units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollInput {
    pub dx: f64,
    pub dy: f64,
}

/// Scroll state of the application.
///
/// `pending` collects inputs pushed between frames; the input system drains it
/// into the accumulated position and the per-frame deltas.
#[derive(Clone, Debug, Default)]
pub struct InputComp {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub scroll_dx: f64,
    pub scroll_dy: f64,
    pub pending: Vec<ScrollInput>,
}

impl InputComp {
    pub fn push_scroll(&mut self, dx: f64, dy: f64) {
        self.pending.push(ScrollInput { dx, dy });
    }
}

impl Component for InputComp {}
