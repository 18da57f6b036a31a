// Projectile: constant-velocity shot with a tick lifetime

use glam::Vec2;

use crate::game::enemy::EnemyCore;
use crate::game::entity::{EntityBase, UpdateCtx};

pub const STATE_IDLE: usize = 0;

pub struct Projectile {
    pub core: EnemyCore,
    velocity: Vec2,
    /// Ticks since spawn
    pub age: u32,
}

impl Projectile {
    pub fn new(core: EnemyCore, velocity: Vec2) -> Self {
        Self {
            core,
            velocity,
            age: 0,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

pub fn update(base: &mut EntityBase, p: &mut Projectile, ctx: &mut UpdateCtx) {
    // Suspended by damage: the shot stays in the world frozen, like any
    // other suspended enemy
    if p.core.is_suspended() {
        return;
    }
    base.advance_counter(ctx.tuning.counter_increment);
    p.age += 1;

    if p.age >= ctx.tuning.projectile_life {
        p.core.remove = true;
        return;
    }
    ctx.physics.set_velocity(base.body(), p.velocity);
}
