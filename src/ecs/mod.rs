//! Entity Component System (ECS) store
//!
//! A [`Registry`] hands out [`Entity`] ids and keeps one contiguous
//! [`ComponentPool`] per component type, with an entity-to-slot index and an
//! ordered owner list next to each pool.

pub mod component;
pub mod entity;
pub mod error;
pub mod registry;

pub use component::{Component, ComponentPool, ComponentStorage};
pub use entity::Entity;
pub use error::EcsError;
pub use registry::Registry;
