// Generic entity record: physics body, state index, frame counter, and the
// collider sets rebuilt from the active frame every tick

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;
use thiserror::Error;

use crate::core::math::Rect;
use crate::engine::input::InputFrame;
use crate::engine::physics::{
    build_collider, BodyBuilder, ColliderHandle, ColliderRole, ColliderTag, EntityId,
    PhysicsWorld, RigidBodyHandle,
};
use crate::game::animation::{AnimationState, StateTable};
use crate::game::blob::Blob;
use crate::game::config::Tuning;
use crate::game::enemy::EnemyCore;
use crate::game::player::Player;
use crate::game::projectile::Projectile;
use crate::game::props::{Altar, Checkpoint, Platform, Tooltip};
use crate::game::shard::Shard;
use crate::game::spider::Spider;
use crate::game::wisp::Wisp;
use crate::game::wyrm::Wyrm;
use crate::game::{blob, player, projectile, props, shard, spider, wisp, wyrm};

#[derive(Debug, Error)]
pub enum ActivateError {
    #[error("entity {0} is already active")]
    AlreadyActive(EntityId),
}

/// Live fixture handles for the current frame, grouped by role
#[derive(Debug, Default)]
pub struct ColliderSets {
    pub hurtboxes: Vec<ColliderHandle>,
    pub hitboxes: Vec<ColliderHandle>,
    pub sensors: HashMap<ColliderRole, Vec<ColliderHandle>>,
}

impl ColliderSets {
    fn clear_into(&mut self, out: &mut Vec<ColliderHandle>) {
        out.extend(self.hurtboxes.drain(..));
        out.extend(self.hitboxes.drain(..));
        for handles in self.sensors.values_mut() {
            out.extend(handles.drain(..));
        }
    }

    pub fn total(&self) -> usize {
        self.hurtboxes.len()
            + self.hitboxes.len()
            + self.sensors.values().map(Vec::len).sum::<usize>()
    }
}

/// Common fields shared by every entity kind.
///
/// The state index is only ever changed through the per-kind `set_state`
/// wrappers, which run leave/enter hooks around `commit_switch`.
pub struct EntityBase {
    id: EntityId,
    spawn: Vec2,
    /// Facing direction, +1 right / -1 left
    pub dir: i8,
    state: usize,
    pub counter: f32,
    states: Arc<StateTable>,
    body_def: BodyBuilder,
    body: Option<RigidBodyHandle>,
    colliders: ColliderSets,
    friction: f32,
}

impl EntityBase {
    pub fn new(
        id: EntityId,
        spawn: Vec2,
        initial_state: usize,
        states: Arc<StateTable>,
        body_def: BodyBuilder,
        friction: f32,
    ) -> Self {
        assert!(
            initial_state < states.len(),
            "initial state {initial_state} out of range ({} states)",
            states.len()
        );
        Self {
            id,
            spawn,
            dir: 1,
            state: initial_state,
            counter: 0.0,
            states,
            body_def: body_def.position(spawn),
            body: None,
            colliders: ColliderSets::default(),
            friction,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn
    }

    pub fn state_index(&self) -> usize {
        self.state
    }

    pub fn state(&self) -> &AnimationState {
        self.states.get(self.state)
    }

    pub fn state_done(&self) -> bool {
        self.state().is_done(self.counter)
    }

    pub fn colliders(&self) -> &ColliderSets {
        &self.colliders
    }

    pub fn is_active(&self) -> bool {
        self.body.is_some()
    }

    /// Whether a switch to `next` would change state. Out-of-range indices
    /// are transition-table bugs and abort.
    pub fn can_switch(&self, next: usize) -> bool {
        assert!(
            next < self.states.len(),
            "state {next} out of range ({} states)",
            self.states.len()
        );
        next != self.state
    }

    /// Mechanical half of a state switch: set the index and reset the
    /// counter. Callers run their leave hook before and enter hook after.
    pub fn commit_switch(&mut self, next: usize) {
        self.state = next;
        self.counter = 0.0;
    }

    pub fn advance_counter(&mut self, increment: f32) {
        self.counter += increment;
    }

    /// Create the physics body from the pending definition
    pub fn activate(&mut self, physics: &mut PhysicsWorld) -> Result<(), ActivateError> {
        if self.body.is_some() {
            return Err(ActivateError::AlreadyActive(self.id));
        }
        self.body = Some(physics.add_rigid_body(self.body_def.build()));
        Ok(())
    }

    /// Remove the body and every attached fixture from the world
    pub fn deactivate(&mut self, physics: &mut PhysicsWorld) {
        if let Some(handle) = self.body.take() {
            physics.remove_rigid_body(handle);
        }
        self.colliders = ColliderSets::default();
    }

    /// Body handle for physics access. Calling this before activation is a
    /// driver-ordering bug and aborts.
    pub fn body(&self) -> RigidBodyHandle {
        match self.body {
            Some(handle) => handle,
            None => panic!("entity {} used before activation", self.id),
        }
    }

    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        match self.body {
            Some(handle) => physics.position(handle),
            None => self.body_def.initial_position(),
        }
    }

    /// Tear down last frame's fixtures and rebuild from the current frame,
    /// mirrored about the vertical axis when facing left.
    ///
    /// Must run after `update` and before the physics step; returns the
    /// handles of removed and created fixtures so the driver can keep its
    /// tag cache current.
    pub fn sync(&mut self, physics: &mut PhysicsWorld) -> SyncDelta {
        let body = self.body();

        let mut removed = Vec::new();
        self.colliders.clear_into(&mut removed);
        for &handle in &removed {
            physics.remove_collider(handle);
        }

        let mut created = Vec::new();
        let frame = self.states.get(self.state).frame(self.counter);
        for def in &frame.colliders {
            let shape = if self.dir < 0 {
                def.shape.mirrored()
            } else {
                def.shape
            };
            let tag = ColliderTag::new(self.id, def.role);
            let handle = physics.add_collider(build_collider(&shape, tag, self.friction), body);
            created.push((handle, tag));
            match def.role {
                ColliderRole::Hurtbox => self.colliders.hurtboxes.push(handle),
                ColliderRole::Hitbox => self.colliders.hitboxes.push(handle),
                role => self.colliders.sensors.entry(role).or_default().push(handle),
            }
        }
        SyncDelta { removed, created }
    }

    /// World-space bounding box around this entity's current hurtbox
    /// geometry, or `None` if the current frame has none
    pub fn hurtbox_aabb(&self, physics: &PhysicsWorld) -> Option<Rect> {
        let origin = self.position(physics);
        let frame = self.states.get(self.state).frame(self.counter);
        let mut bounds: Option<Rect> = None;
        for def in &frame.colliders {
            if def.role != ColliderRole::Hurtbox {
                continue;
            }
            let shape = if self.dir < 0 {
                def.shape.mirrored()
            } else {
                def.shape
            };
            let aabb = shape.aabb(origin);
            bounds = Some(match bounds {
                Some(b) => b.union(&aabb),
                None => aabb,
            });
        }
        bounds
    }
}

/// Fixture handles touched by one `sync` call
pub struct SyncDelta {
    pub removed: Vec<ColliderHandle>,
    pub created: Vec<(ColliderHandle, ColliderTag)>,
}

/// Kind-specific state and behavior
pub enum Payload {
    Player(Player),
    Spider(Spider),
    Wisp(Wisp),
    Wyrm(Wyrm),
    Blob(Blob),
    Projectile(Projectile),
    Platform(Platform),
    Checkpoint(Checkpoint),
    Shard(Shard),
    Tooltip(Tooltip),
    Altar(Altar),
}

/// Everything an update pass can see: the physics world, tuning, this
/// tick's input, and a snapshot of the player taken before the pass
pub struct UpdateCtx<'a> {
    pub physics: &'a mut PhysicsWorld,
    pub tuning: &'a Tuning,
    pub input: InputFrame,
    pub player_pos: Option<Vec2>,
    pub player_dir: i8,
}

pub struct Entity {
    pub base: EntityBase,
    pub payload: Payload,
}

impl Entity {
    pub fn new(base: EntityBase, payload: Payload) -> Self {
        Self { base, payload }
    }

    pub fn id(&self) -> EntityId {
        self.base.id()
    }

    /// Advance the frame counter and run this kind's transition table
    pub fn update(&mut self, ctx: &mut UpdateCtx) {
        match &mut self.payload {
            Payload::Player(p) => player::update(&mut self.base, p, ctx),
            Payload::Spider(s) => spider::update(&mut self.base, s, ctx),
            Payload::Wisp(w) => wisp::update(&mut self.base, w, ctx),
            Payload::Wyrm(w) => wyrm::update(&mut self.base, w, ctx),
            Payload::Blob(b) => blob::update(&mut self.base, b, ctx),
            Payload::Projectile(p) => projectile::update(&mut self.base, p, ctx),
            Payload::Platform(_) => self.base.advance_counter(ctx.tuning.counter_increment),
            Payload::Checkpoint(c) => props::update_checkpoint(&mut self.base, c, ctx),
            Payload::Shard(s) => shard::update(&mut self.base, s, ctx),
            Payload::Tooltip(t) => props::update_tooltip(&mut self.base, t, ctx),
            Payload::Altar(a) => props::update_altar(&mut self.base, a, ctx),
        }
    }

    pub fn sync(&mut self, physics: &mut PhysicsWorld) -> SyncDelta {
        self.base.sync(physics)
    }

    pub fn is_player(&self) -> bool {
        matches!(self.payload, Payload::Player(_))
    }

    pub fn player(&self) -> Option<&Player> {
        match &self.payload {
            Payload::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.payload {
            Payload::Player(p) => Some(p),
            _ => None,
        }
    }

    /// Shared enemy state, for kinds that have it
    pub fn enemy_core(&self) -> Option<&EnemyCore> {
        match &self.payload {
            Payload::Spider(s) => Some(&s.core),
            Payload::Wisp(w) => Some(&w.core),
            Payload::Wyrm(w) => Some(&w.core),
            Payload::Blob(b) => Some(&b.core),
            Payload::Projectile(p) => Some(&p.core),
            _ => None,
        }
    }

    pub fn enemy_core_mut(&mut self) -> Option<&mut EnemyCore> {
        match &mut self.payload {
            Payload::Spider(s) => Some(&mut s.core),
            Payload::Wisp(w) => Some(&mut w.core),
            Payload::Wyrm(w) => Some(&mut w.core),
            Payload::Blob(b) => Some(&mut b.core),
            Payload::Projectile(p) => Some(&mut p.core),
            _ => None,
        }
    }

    /// Whether something can stand on this entity: platforms always,
    /// enemies only once suspended
    pub fn is_standable(&self) -> bool {
        match &self.payload {
            Payload::Platform(_) => true,
            _ => self.enemy_core().map(EnemyCore::is_suspended).unwrap_or(false),
        }
    }

    /// Flagged for deferred removal by the driver
    pub fn should_remove(&self) -> bool {
        self.enemy_core().map(|core| core.remove).unwrap_or(false)
    }
}
