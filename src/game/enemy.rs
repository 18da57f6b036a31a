// Shared enemy state: health, suspension, patrol bounds, and the
// health-weighted post-step slowdown

use glam::Vec2;

use crate::engine::physics::{EntityId, PhysicsWorld};
use crate::game::entity::EntityBase;

/// State common to every enemy variant.
///
/// Health reaching zero suspends the enemy rather than destroying it: a
/// suspended enemy stops acting, stops hurting the player, and becomes
/// standable ground.
pub struct EnemyCore {
    health: f32,
    max_health: f32,
    /// Target position for this tick, refreshed by the driver from the
    /// vision contact set. Absence means no attack condition is met.
    pub target: Option<Vec2>,
    /// Entities currently inside this enemy's vision sensor
    pub seen: std::collections::HashSet<EntityId>,
    /// Deferred despawn flag, applied by the driver after the entity pass
    pub remove: bool,
    patrol_min: f32,
    patrol_max: f32,
    prev_position: Vec2,
    prev_velocity: Vec2,
}

impl EnemyCore {
    pub fn new(max_health: f32, spawn: Vec2, patrol_range: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            target: None,
            seen: std::collections::HashSet::new(),
            remove: false,
            patrol_min: spawn.x - patrol_range,
            patrol_max: spawn.x + patrol_range,
            prev_position: spawn,
            prev_velocity: Vec2::ZERO,
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Reduce health, clamping at zero
    pub fn lower_health(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
        if self.is_suspended() {
            log::debug!("enemy suspended");
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.health <= 0.0
    }

    /// Fraction of health remaining, the weight for all slow-down scaling
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    /// Whether ground movement in direction `dir` from `x` has reached the
    /// patrol bound and should turn around
    pub fn at_patrol_bound(&self, x: f32, dir: i8) -> bool {
        (dir > 0 && x >= self.patrol_max) || (dir < 0 && x <= self.patrol_min)
    }

    pub fn patrol_bounds(&self) -> (f32, f32) {
        (self.patrol_min, self.patrol_max)
    }
}

/// Post-step slowdown correction, run after the physics step for every
/// enemy still in the world.
///
/// The physics-resolved position and velocity are blended against last
/// tick's values by the health fraction, then written back. At full health
/// this passes the physics result through untouched; at zero health the
/// enemy is frozen in place. Linear state only; the angle is left to the
/// physics engine.
pub fn post_step(core: &mut EnemyCore, base: &EntityBase, physics: &mut PhysicsWorld) {
    let handle = base.body();
    let fraction = core.health_fraction();
    let stepped_pos = physics.position(handle);
    let stepped_vel = physics.velocity(handle);

    if fraction < 1.0 {
        let pos = core.prev_position.lerp(stepped_pos, fraction);
        let vel = core.prev_velocity.lerp(stepped_vel, fraction);
        physics.set_position(handle, pos);
        physics.set_velocity(handle, vel);
        core.prev_position = pos;
        core.prev_velocity = vel;
    } else {
        core.prev_position = stepped_pos;
        core.prev_velocity = stepped_vel;
    }
}
