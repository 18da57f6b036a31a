// Contact event collection during the physics step

use rapier2d::prelude::*;
use std::sync::{Arc, Mutex};

/// A begin/end contact between two fixtures, reported by the broad phase.
///
/// Pair ordering is whatever the physics engine produced; the combat
/// resolver normalizes it by trying both orderings against its handler
/// table.
#[derive(Debug, Clone, Copy)]
pub enum ContactEvent {
    Begin(ColliderHandle, ColliderHandle),
    End(ColliderHandle, ColliderHandle),
}

/// Queue that buffers contact events raised during a physics step so they
/// can be dispatched after the step completes, never reentrantly.
pub struct ContactEventQueue {
    events: Arc<Mutex<Vec<ContactEvent>>>,
}

impl ContactEventQueue {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::with_capacity(32))),
        }
    }

    /// Clear all events (called at the start of each physics step)
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Drain the events buffered during the last step
    pub fn drain(&self) -> Vec<ContactEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    fn push(&self, event: ContactEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Default for ContactEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for ContactEventQueue {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        match event {
            CollisionEvent::Started(h1, h2, _flags) => {
                self.push(ContactEvent::Begin(h1, h2));
            }
            CollisionEvent::Stopped(h1, h2, _flags) => {
                self.push(ContactEvent::End(h1, h2));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
        // Force magnitudes are not part of the combat model
    }
}
