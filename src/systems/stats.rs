use anyhow::Result;
use tracing::info;

use crate::{
    app::{app_component, System},
    components::TimeComp,
    ecs::Registry,
};

/// Logs frame timing every `interval_frames` frames and once at shutdown.
pub struct FrameStatsSystem {
    interval_frames: u64,
    worst_dt: f64,
    reports: u64,
}

impl FrameStatsSystem {
    pub fn new(interval_frames: u64) -> Self {
        Self {
            interval_frames: interval_frames.max(1),
            worst_dt: 0.0,
            reports: 0,
        }
    }

    /// Slowest completed frame seen so far, in seconds
    pub fn worst_frame_secs(&self) -> f64 {
        self.worst_dt
    }

    /// Periodic reports logged so far
    pub fn reports(&self) -> u64 {
        self.reports
    }
}

impl Default for FrameStatsSystem {
    fn default() -> Self {
        Self::new(60)
    }
}

impl System for FrameStatsSystem {
    fn name(&self) -> &str {
        "frame_stats"
    }

    fn update(&mut self, registry: &mut Registry) -> Result<()> {
        // TimeComp still describes the previous frame here
        let time = app_component::<TimeComp>(registry)?;
        if time.frame == 0 {
            return Ok(());
        }
        self.worst_dt = self.worst_dt.max(time.dt);

        if time.frame % self.interval_frames == 0 {
            self.reports += 1;
            info!(
                frame = time.frame,
                last_ms = time.dt * 1_000.0,
                mean_ms = time.elapsed / time.frame as f64 * 1_000.0,
                worst_ms = self.worst_dt * 1_000.0,
                "frame stats"
            );
        }
        Ok(())
    }

    fn shutdown(&mut self, registry: &mut Registry) -> Result<()> {
        let time = app_component::<TimeComp>(registry)?;
        info!(
            frames = time.frame,
            elapsed_secs = time.elapsed,
            worst_ms = self.worst_dt * 1_000.0,
            "final frame stats"
        );
        Ok(())
    }
}
