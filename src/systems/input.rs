use anyhow::Result;
use tracing::debug;

use crate::{
    app::{app_component, app_component_mut, System},
    components::{InputComp, ScrollInput, TimeComp},
    config::ScriptedScroll,
    ecs::Registry,
    event::{Event, EventEmitter},
};

/// Published once per scroll input applied during a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    pub dx: f64,
    pub dy: f64,
    /// Accumulated position after this input
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Event for ScrollEvent {}

/// Applies queued and scripted scroll inputs to [`InputComp`].
pub struct InputSystem {
    script: Vec<ScriptedScroll>,
    /// Last frame whose script entries were queued; a retried frame keeps its number
    scripted_frame: Option<u64>,
}

impl InputSystem {
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    /// Inject `script` entries on the frame each one names (0-based).
    pub fn with_script(script: Vec<ScriptedScroll>) -> Self {
        Self {
            script,
            scripted_frame: None,
        }
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for InputSystem {
    fn name(&self) -> &str {
        "input"
    }

    fn update(&mut self, registry: &mut Registry) -> Result<()> {
        let frame = app_component::<TimeComp>(registry)?.frame;

        let input = app_component_mut::<InputComp>(registry)?;
        input.scroll_dx = 0.0;
        input.scroll_dy = 0.0;
        if self.scripted_frame != Some(frame) {
            self.scripted_frame = Some(frame);
            input.pending.extend(
                self.script
                    .iter()
                    .filter(|entry| entry.frame == frame)
                    .map(|entry| ScrollInput {
                        dx: entry.dx,
                        dy: entry.dy,
                    }),
            );
        }
        if input.pending.is_empty() {
            return Ok(());
        }

        let mut events = Vec::with_capacity(input.pending.len());
        for scroll in input.pending.drain(..) {
            input.scroll_dx += scroll.dx;
            input.scroll_dy += scroll.dy;
            input.scroll_x += scroll.dx;
            input.scroll_y += scroll.dy;
            events.push(ScrollEvent {
                dx: scroll.dx,
                dy: scroll.dy,
                scroll_x: input.scroll_x,
                scroll_y: input.scroll_y,
            });
        }

        let emitter = app_component_mut::<EventEmitter>(registry)?;
        if !emitter.is_registered::<ScrollEvent>() {
            debug!(frame, inputs = events.len(), "no scroll listeners");
            return Ok(());
        }
        for event in &events {
            emitter.publish(event)?;
        }
        Ok(())
    }
}
