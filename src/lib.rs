pub mod app;
pub mod components;
pub mod config;
pub mod ecs;
pub mod event;
pub mod systems;

pub use app::{App, AppBuilder, AppSettings, RunSummary, System};
pub use config::{AppConfig, ConfigLoader};
pub use ecs::{Component, EcsError, Entity, Registry};
pub use event::{Event, EventEmitter, EventError};
