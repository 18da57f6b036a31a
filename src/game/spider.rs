// Spider: ground patroller that pounces when it spots a target

use std::collections::HashSet;

use glam::Vec2;

use crate::engine::physics::EntityId;
use crate::game::enemy::EnemyCore;
use crate::game::entity::{EntityBase, UpdateCtx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiderState {
    Wander = 0,
    Windup = 1,
    Attack = 2,
}

impl SpiderState {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Wander,
            1 => Self::Windup,
            2 => Self::Attack,
            _ => panic!("spider state index {index} out of range"),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

pub struct Spider {
    pub core: EnemyCore,
    /// Standable entities under the ground sensor
    pub support: HashSet<EntityId>,
    /// Standable entities under the leading edge sensor
    pub front_support: HashSet<EntityId>,
    /// Standable entities under the trailing edge sensor
    pub back_support: HashSet<EntityId>,
}

impl Spider {
    pub fn new(core: EnemyCore) -> Self {
        Self {
            core,
            support: HashSet::new(),
            front_support: HashSet::new(),
            back_support: HashSet::new(),
        }
    }

    pub fn state(base: &EntityBase) -> SpiderState {
        SpiderState::from_index(base.state_index())
    }

    fn grounded(&self) -> bool {
        !self.support.is_empty()
    }

    /// Ledge ahead: standing on something, but nothing under the leading
    /// edge sensor
    fn at_ledge(&self) -> bool {
        self.grounded() && self.front_support.is_empty()
    }

    /// Turning around is only safe while the trailing edge has support
    fn can_turn(&self) -> bool {
        !self.back_support.is_empty()
    }
}

fn set_state(base: &mut EntityBase, ctx: &mut UpdateCtx, next: SpiderState) {
    if !base.can_switch(next.index()) {
        return;
    }
    match Spider::state(base) {
        SpiderState::Attack => {
            ctx.physics.set_gravity_scale(base.body(), 1.0);
        }
        _ => {}
    }
    base.commit_switch(next.index());
    match next {
        SpiderState::Attack => {
            // Pounce toward the current facing, floatier than normal gravity
            let impulse = Vec2::new(
                ctx.tuning.spider_attack_impulse.x * base.dir as f32,
                ctx.tuning.spider_attack_impulse.y,
            );
            ctx.physics.set_gravity_scale(base.body(), ctx.tuning.spider_attack_gravity);
            ctx.physics.apply_impulse(base.body(), impulse);
        }
        _ => {}
    }
}

pub fn update(base: &mut EntityBase, s: &mut Spider, ctx: &mut UpdateCtx) {
    if s.core.is_suspended() {
        return;
    }
    base.advance_counter(ctx.tuning.counter_increment * s.core.health_fraction());

    advance(base, s, ctx);
    apply_movement(base, s, ctx);
}

fn advance(base: &mut EntityBase, s: &mut Spider, ctx: &mut UpdateCtx) {
    match Spider::state(base) {
        SpiderState::Wander => {
            if let Some(target) = s.core.target {
                // Face the target before winding up
                let x = base.position(ctx.physics).x;
                base.dir = if target.x >= x { 1 } else { -1 };
                set_state(base, ctx, SpiderState::Windup);
            }
        }
        SpiderState::Windup => {
            if base.state_done() {
                set_state(base, ctx, SpiderState::Attack);
            }
        }
        SpiderState::Attack => {
            if s.grounded() && base.state_done() {
                set_state(base, ctx, SpiderState::Wander);
            }
        }
    }
}

fn apply_movement(base: &mut EntityBase, s: &mut Spider, ctx: &mut UpdateCtx) {
    let handle = base.body();
    let tuning = ctx.tuning;

    match Spider::state(base) {
        SpiderState::Wander => {
            let x = ctx.physics.position(handle).x;
            let blocked = s.core.at_patrol_bound(x, base.dir) || s.at_ledge();
            if blocked && s.can_turn() {
                base.dir = -base.dir;
            }
            // Perched with a drop on both sides: plant instead of walking off
            let vx = if blocked && !s.can_turn() {
                0.0
            } else {
                tuning.spider_speed * base.dir as f32 * s.core.health_fraction()
            };
            let vy = ctx.physics.velocity(handle).y;
            ctx.physics.set_velocity(handle, Vec2::new(vx, vy));
        }
        SpiderState::Windup => {
            // Plant in place while winding up
            let vy = ctx.physics.velocity(handle).y;
            ctx.physics.set_velocity(handle, Vec2::new(0.0, vy));
        }
        SpiderState::Attack => {
            let velocity = ctx.physics.velocity(handle);
            let vy = velocity
                .y
                .clamp(-tuning.spider_max_y_speed, tuning.spider_max_y_speed);
            if vy != velocity.y {
                ctx.physics.set_velocity(handle, Vec2::new(velocity.x, vy));
            }
        }
    }
}
