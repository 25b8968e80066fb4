//! Synchronous, typed event dispatch

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;

use thiserror::Error;

use crate::ecs::Component;

/// Marker trait for event payloads
pub trait Event: 'static {}

type Callback<E> = Box<dyn FnMut(&E)>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event type `{event}` has no registered callbacks")]
    UnregisteredEventType { event: &'static str },
}

/// Maps an event type to the callbacks subscribed to it.
///
/// Callbacks run on the publishing thread, in the order they were added.
/// Publishing an event nobody subscribed to is an error rather than a no-op.
#[derive(Default)]
pub struct EventEmitter {
    callbacks: HashMap<TypeId, Box<dyn Any>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }

    /// Register a callback for events of type `E`
    pub fn on<E: Event>(&mut self, callback: impl FnMut(&E) + 'static) {
        let entry = self
            .callbacks
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<Callback<E>>::new()));
        if let Some(list) = entry.downcast_mut::<Vec<Callback<E>>>() {
            list.push(Box::new(callback));
        }
    }

    /// Run every callback registered for `E`, returning how many ran.
    pub fn publish<E: Event>(&mut self, event: &E) -> Result<usize, EventError> {
        let list = self
            .callbacks
            .get_mut(&TypeId::of::<E>())
            .and_then(|entry| entry.downcast_mut::<Vec<Callback<E>>>())
            .ok_or(EventError::UnregisteredEventType {
                event: type_name::<E>(),
            })?;
        for callback in list.iter_mut() {
            callback(event);
        }
        Ok(list.len())
    }

    pub fn is_registered<E: Event>(&self) -> bool {
        self.callbacks.contains_key(&TypeId::of::<E>())
    }

    pub fn listener_count<E: Event>(&self) -> usize {
        self.callbacks
            .get(&TypeId::of::<E>())
            .and_then(|entry| entry.downcast_ref::<Vec<Callback<E>>>())
            .map_or(0, Vec::len)
    }
}

impl Component for EventEmitter {}
