//! Application driver: seeds the registry and steps systems frame by frame

use std::any::type_name;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::components::{AppState, AppTag, InputComp, TimeComp};
use crate::ecs::{Component, Entity, Registry};
use crate::event::EventEmitter;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("application has not been initialised")]
    NotInitialized,
    #[error("application was already initialised")]
    AlreadyInitialized,
    #[error("frame rate {0} has no representable frame budget")]
    InvalidFrameRate(String),
    #[error("application entity has no `{0}` component")]
    MissingComponent(&'static str),
}

/// Lifecycle hooks run by [`App`] over the shared registry.
pub trait System {
    fn name(&self) -> &str;

    fn init(&mut self, _registry: &mut Registry) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, registry: &mut Registry) -> Result<()>;

    fn shutdown(&mut self, _registry: &mut Registry) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    /// Target frames per second; 0 runs frames back to back.
    pub frame_rate: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "tiny-ecs".to_string(),
            frame_rate: 0.0,
        }
    }
}

pub struct AppBuilder {
    settings: AppSettings,
    systems: Vec<Box<dyn System>>,
}

impl AppBuilder {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> App {
        App {
            settings: self.settings,
            systems: self.systems,
            registry: Registry::new(),
            app_entity: None,
            phase: Phase::Built,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Built,
    Running,
    ShutDown,
}

/// Totals reported once a run finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub name: String,
    pub frames: u64,
    pub elapsed_secs: f64,
    pub mean_frame_ms: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub shutdown_requested: bool,
}

pub struct App {
    settings: AppSettings,
    systems: Vec<Box<dyn System>>,
    registry: Registry,
    app_entity: Option<Entity>,
    phase: Phase,
}

impl App {
    /// Seed the application entity and run every system's `init` in order.
    pub fn init(&mut self) -> Result<()> {
        if self.phase != Phase::Built {
            return Err(AppError::AlreadyInitialized.into());
        }

        let entity = self.registry.create();
        self.registry.register(AppTag, entity)?;
        self.registry
            .register(AppState::new(self.settings.name.clone()), entity)?;
        self.registry.register(TimeComp::default(), entity)?;
        self.registry.register(InputComp::default(), entity)?;
        self.registry.register(EventEmitter::new(), entity)?;
        self.app_entity = Some(entity);
        self.phase = Phase::Running;

        for system in &mut self.systems {
            system
                .init(&mut self.registry)
                .with_context(|| format!("failed to initialise system `{}`", system.name()))?;
        }

        info!(
            app = %self.settings.name,
            %entity,
            systems = self.systems.len(),
            "application initialised"
        );
        Ok(())
    }

    /// Run one frame: every system's `update` in order, bracketed by timing.
    pub fn update(&mut self) -> Result<()> {
        if self.phase != Phase::Running {
            return Err(AppError::NotInitialized.into());
        }

        let started = Instant::now();
        app_component_mut::<TimeComp>(&mut self.registry)?.start = Some(started);

        for system in &mut self.systems {
            system
                .update(&mut self.registry)
                .with_context(|| format!("system `{}` failed to update", system.name()))?;
        }

        let dt = started.elapsed().as_secs_f64();
        let time = app_component_mut::<TimeComp>(&mut self.registry)?;
        time.dt = dt;
        time.elapsed += dt;
        time.frame += 1;
        debug!(frame = time.frame, dt_ms = dt * 1_000.0, "frame complete");
        Ok(())
    }

    /// Step frames until a shutdown is requested or `max_frames` have run,
    /// then shut down.
    pub fn run(&mut self, max_frames: Option<u64>) -> Result<RunSummary> {
        let budget = frame_budget(self.settings.frame_rate)?;
        if self.phase == Phase::Built {
            self.init()?;
        }

        info!(
            app = %self.settings.name,
            ?max_frames,
            frame_rate = self.settings.frame_rate,
            "starting frame loop"
        );

        let mut frames = 0_u64;
        loop {
            if self.shutdown_requested()? {
                info!(frames, "shutdown requested");
                break;
            }
            if max_frames.is_some_and(|max| frames >= max) {
                info!(frames, "frame limit reached");
                break;
            }

            let start = Instant::now();
            if let Err(err) = self.update() {
                if let Err(shutdown_err) = self.shutdown() {
                    warn!(error = %shutdown_err, "shutdown after failed frame also failed");
                }
                return Err(err);
            }
            frames += 1;

            if let Some(budget) = budget {
                let elapsed = start.elapsed();
                if elapsed < budget {
                    thread::sleep(budget - elapsed);
                } else {
                    warn!(
                        frame = frames,
                        elapsed_ms = elapsed.as_millis() as u64,
                        budget_ms = budget.as_millis() as u64,
                        "frame exceeded time budget"
                    );
                }
            }
        }

        let summary = self.summary()?;
        self.shutdown()?;
        Ok(summary)
    }

    /// Run every system's `shutdown` in order. Later calls do nothing.
    pub fn shutdown(&mut self) -> Result<()> {
        match self.phase {
            Phase::Built => return Err(AppError::NotInitialized.into()),
            Phase::ShutDown => return Ok(()),
            Phase::Running => {}
        }
        self.phase = Phase::ShutDown;

        for system in &mut self.systems {
            system
                .shutdown(&mut self.registry)
                .with_context(|| format!("failed to shut down system `{}`", system.name()))?;
        }
        info!(app = %self.settings.name, "application shut down");
        Ok(())
    }

    pub fn summary(&self) -> Result<RunSummary> {
        let time = app_component::<TimeComp>(&self.registry)?;
        let input = app_component::<InputComp>(&self.registry)?;
        let state = app_component::<AppState>(&self.registry)?;
        let mean_frame_ms = if time.frame > 0 {
            time.elapsed / time.frame as f64 * 1_000.0
        } else {
            0.0
        };
        Ok(RunSummary {
            name: state.name.clone(),
            frames: time.frame,
            elapsed_secs: time.elapsed,
            mean_frame_ms,
            scroll_x: input.scroll_x,
            scroll_y: input.scroll_y,
            shutdown_requested: state.request_shutdown,
        })
    }

    /// Queue a scroll input; it is applied by the input system next frame.
    pub fn push_scroll(&mut self, dx: f64, dy: f64) -> Result<()> {
        app_component_mut::<InputComp>(&mut self.registry)?.push_scroll(dx, dy);
        Ok(())
    }

    pub fn request_shutdown(&mut self) -> Result<()> {
        app_component_mut::<AppState>(&mut self.registry)?.request_shutdown = true;
        Ok(())
    }

    pub fn shutdown_requested(&self) -> Result<bool> {
        Ok(app_component::<AppState>(&self.registry)?.request_shutdown)
    }

    pub fn events_mut(&mut self) -> Result<&mut EventEmitter> {
        app_component_mut::<EventEmitter>(&mut self.registry)
    }

    pub fn app_entity(&self) -> Option<Entity> {
        self.app_entity
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }
}

/// Time allotted to one frame at `frame_rate` frames per second.
///
/// `None` when pacing is off (a rate of 0 or less).
pub fn frame_budget(frame_rate: f64) -> Result<Option<Duration>, AppError> {
    if frame_rate.is_nan() {
        return Err(AppError::InvalidFrameRate(frame_rate.to_string()));
    }
    if frame_rate <= 0.0 {
        return Ok(None);
    }
    Duration::try_from_secs_f64(1.0 / frame_rate)
        .map(Some)
        .map_err(|_| AppError::InvalidFrameRate(frame_rate.to_string()))
}

/// The entity tagged with [`AppTag`].
pub fn app_entity(registry: &Registry) -> Result<Entity> {
    let tagged = registry
        .view::<AppTag>()
        .map_err(|_| AppError::NotInitialized)?;
    tagged
        .first()
        .copied()
        .ok_or_else(|| AppError::NotInitialized.into())
}

/// A component of the application entity.
pub fn app_component<T: Component>(registry: &Registry) -> Result<&T> {
    let entity = app_entity(registry)?;
    registry
        .get::<T>(entity)?
        .ok_or_else(|| AppError::MissingComponent(type_name::<T>()).into())
}

pub fn app_component_mut<T: Component>(registry: &mut Registry) -> Result<&mut T> {
    let entity = app_entity(registry)?;
    registry
        .get_mut::<T>(entity)?
        .ok_or_else(|| AppError::MissingComponent(type_name::<T>()).into())
}
