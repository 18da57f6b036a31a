// Animation states: ordered frames with per-frame collider geometry

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::math::ColliderShape;
use crate::engine::physics::ColliderRole;

/// Opaque handle to a drawable asset. The rendering collaborator resolves
/// it; the core only carries it from frame to frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpriteRef(pub u32);

/// One collider-geometry descriptor, tagged with its semantic role
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderDef {
    pub shape: ColliderShape,
    pub role: ColliderRole,
}

impl ColliderDef {
    pub fn new(shape: ColliderShape, role: ColliderRole) -> Self {
        Self { shape, role }
    }
}

/// A single animation frame: a drawable plus the collision geometry that is
/// live while this frame is showing
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub sprite: SpriteRef,
    pub colliders: Vec<ColliderDef>,
}

impl Frame {
    pub fn new(sprite: SpriteRef, colliders: Vec<ColliderDef>) -> Self {
        Self { sprite, colliders }
    }
}

/// Immutable description of one named animation state.
///
/// Constructed once at load time and shared read-only across every entity
/// instance of the same kind.
#[derive(Debug, Clone)]
pub struct AnimationState {
    name: String,
    frames: Vec<Frame>,
    looping: bool,
}

impl AnimationState {
    /// Create a state from its frames. Empty frame sequences are a load-time
    /// defect and abort immediately.
    pub fn new(name: &str, frames: Vec<Frame>, looping: bool) -> Self {
        assert!(
            !frames.is_empty(),
            "animation state '{name}' has no frames"
        );
        Self {
            name: name.to_string(),
            frames,
            looping,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Resolve the frame counter to an index: modulo for looping states,
    /// clamped to the last frame otherwise.
    pub fn effective_frame(&self, counter: f32) -> usize {
        let count = counter.max(0.0) as usize;
        if self.looping {
            count % self.frames.len()
        } else {
            count.min(self.frames.len() - 1)
        }
    }

    pub fn frame(&self, counter: f32) -> &Frame {
        &self.frames[self.effective_frame(counter)]
    }

    /// Whether the animation has run past its last frame. Looping states
    /// never finish; transition tables poll this for finite attack and
    /// windup animations.
    pub fn is_done(&self, counter: f32) -> bool {
        !self.looping && counter >= self.frames.len() as f32
    }
}

/// The ordered state table for one entity kind, indexed by state index
#[derive(Debug, Clone)]
pub struct StateTable {
    states: Vec<AnimationState>,
}

impl StateTable {
    pub fn new(states: Vec<AnimationState>) -> Self {
        assert!(!states.is_empty(), "state table is empty");
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Fetch a state by index. Out-of-range indices are transition-table
    /// bugs and abort.
    pub fn get(&self, index: usize) -> &AnimationState {
        &self.states[index]
    }
}

/// Shared state tables keyed by entity kind name, filled in by the asset
/// pipeline at load time
#[derive(Debug, Default)]
pub struct StateBank {
    tables: HashMap<String, Arc<StateTable>>,
}

impl StateBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: &str, table: StateTable) {
        self.tables.insert(kind.to_string(), Arc::new(table));
    }

    pub fn get(&self, kind: &str) -> Option<Arc<StateTable>> {
        self.tables.get(kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: usize) -> Vec<Frame> {
        (0..n).map(|i| Frame::new(SpriteRef(i as u32), Vec::new())).collect()
    }

    #[test]
    fn test_looping_frame_resolution() {
        let state = AnimationState::new("walk", frames(4), true);
        for counter in 0..20 {
            assert_eq!(state.effective_frame(counter as f32), counter % 4);
        }
    }

    #[test]
    fn test_non_looping_clamps_to_last_frame() {
        let state = AnimationState::new("attack", frames(4), false);
        assert_eq!(state.effective_frame(0.0), 0);
        assert_eq!(state.effective_frame(3.0), 3);
        assert_eq!(state.effective_frame(10.0), 3);
    }

    #[test]
    fn test_done_strictly_past_last_frame() {
        let state = AnimationState::new("attack", frames(4), false);
        // On the last frame is not done
        assert!(!state.is_done(3.0));
        assert!(!state.is_done(3.5));
        // Past the last frame is
        assert!(state.is_done(4.0));
        assert!(state.is_done(100.0));
    }

    #[test]
    fn test_looping_never_done() {
        let state = AnimationState::new("idle", frames(2), true);
        assert!(!state.is_done(0.0));
        assert!(!state.is_done(2.0));
        assert!(!state.is_done(1000.0));
    }

    #[test]
    fn test_fractional_counter_floors() {
        let state = AnimationState::new("walk", frames(4), true);
        assert_eq!(state.effective_frame(0.5), 0);
        assert_eq!(state.effective_frame(1.5), 1);
    }

    #[test]
    #[should_panic]
    fn test_empty_state_is_fatal() {
        AnimationState::new("bad", Vec::new(), false);
    }

    #[test]
    fn test_state_bank_lookup() {
        let mut bank = StateBank::new();
        bank.insert(
            "blob",
            StateTable::new(vec![AnimationState::new("idle", frames(1), true)]),
        );
        assert!(bank.get("blob").is_some());
        assert!(bank.get("spider").is_none());
    }
}
