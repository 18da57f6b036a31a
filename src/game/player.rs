// Player state machine: movement, jumping, dashing, and the five attacks

use std::collections::HashSet;

use glam::Vec2;

use crate::engine::physics::EntityId;
use crate::game::entity::{EntityBase, UpdateCtx};

/// Player states, in state-table order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle = 0,
    Walk = 1,
    Fall = 2,
    Jump = 3,
    Dash = 4,
    GndAttack = 5,
    UpGndAttack = 6,
    AirAttack = 7,
    DairAttack = 8,
    UairAttack = 9,
}

impl PlayerState {
    pub const COUNT: usize = 10;

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Idle,
            1 => Self::Walk,
            2 => Self::Fall,
            3 => Self::Jump,
            4 => Self::Dash,
            5 => Self::GndAttack,
            6 => Self::UpGndAttack,
            7 => Self::AirAttack,
            8 => Self::DairAttack,
            9 => Self::UairAttack,
            _ => panic!("player state index {index} out of range"),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_attack(self) -> bool {
        matches!(
            self,
            Self::GndAttack | Self::UpGndAttack | Self::AirAttack | Self::DairAttack | Self::UairAttack
        )
    }

    fn is_air_attack(self) -> bool {
        matches!(self, Self::AirAttack | Self::DairAttack | Self::UairAttack)
    }
}

pub struct Player {
    pub alive: bool,
    /// Derived each tick from the underfoot contact set
    pub grounded: bool,
    /// Standable entities currently touching the ground sensor
    pub underfoot: HashSet<EntityId>,
    /// Dash charge; replenished only while grounded
    pub has_dash: bool,
    pub dash_timer: u32,
    pub dash_cooldown: u32,
    dash_dir: Vec2,
    pub jump_timer: u32,
    /// Grows from the minimum toward the maximum while jump stays held
    pub jump_duration: u32,
    pub attack_cooldown: u32,
    /// Enemies already damaged by the attack in progress; cleared on
    /// leaving any attack state
    pub hit_enemies: HashSet<EntityId>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            alive: true,
            grounded: false,
            underfoot: HashSet::new(),
            has_dash: false,
            dash_timer: 0,
            dash_cooldown: 0,
            dash_dir: Vec2::X,
            jump_timer: 0,
            jump_duration: 0,
            attack_cooldown: 0,
            hit_enemies: HashSet::new(),
        }
    }

    pub fn state(base: &EntityBase) -> PlayerState {
        PlayerState::from_index(base.state_index())
    }

    /// Whether the attack hitbox can currently apply damage
    pub fn attack_window_open(base: &EntityBase, tuning: &crate::game::config::Tuning) -> bool {
        Self::state(base).is_attack()
            && base.counter >= tuning.attack_start
            && base.counter < tuning.attack_end
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

pub fn set_state(base: &mut EntityBase, p: &mut Player, ctx: &mut UpdateCtx, next: PlayerState) {
    if !base.can_switch(next.index()) {
        return;
    }
    leave(base, p, ctx, Player::state(base));
    base.commit_switch(next.index());
    enter(base, p, ctx, next);
}

fn enter(base: &mut EntityBase, p: &mut Player, ctx: &mut UpdateCtx, state: PlayerState) {
    match state {
        PlayerState::Jump => {
            p.jump_timer = 0;
            p.jump_duration = ctx.tuning.min_jump_duration;
        }
        PlayerState::Dash => {
            p.has_dash = false;
            p.dash_timer = 0;
            let input = Vec2::new(ctx.input.horizontal as f32, ctx.input.vertical as f32);
            p.dash_dir = if input == Vec2::ZERO {
                Vec2::new(base.dir as f32, 0.0)
            } else {
                input.normalize()
            };
            ctx.physics.set_gravity_scale(base.body(), 0.0);
        }
        s if s.is_attack() => {
            p.attack_cooldown = ctx.tuning.attack_cooldown;
        }
        _ => {}
    }
}

fn leave(base: &mut EntityBase, p: &mut Player, ctx: &mut UpdateCtx, state: PlayerState) {
    match state {
        PlayerState::Dash => {
            ctx.physics.set_gravity_scale(base.body(), 1.0);
            p.dash_cooldown = ctx.tuning.dash_cooldown;
        }
        s if s.is_attack() => {
            p.hit_enemies.clear();
        }
        _ => {}
    }
}

pub fn update(base: &mut EntityBase, p: &mut Player, ctx: &mut UpdateCtx) {
    base.advance_counter(ctx.tuning.counter_increment);

    p.grounded = !p.underfoot.is_empty();
    if p.grounded {
        p.has_dash = true;
    }
    p.dash_cooldown = p.dash_cooldown.saturating_sub(1);
    // The attack cooldown only runs between attacks, not during one
    if !Player::state(base).is_attack() {
        p.attack_cooldown = p.attack_cooldown.saturating_sub(1);
    }

    advance(base, p, ctx);
    apply_movement(base, p, ctx);
}

/// The transition table, evaluated once per tick
fn advance(base: &mut EntityBase, p: &mut Player, ctx: &mut UpdateCtx) {
    let state = Player::state(base);
    let input = ctx.input;

    // Dash preempts everything except an attack or dash in progress
    if input.dash_pressed
        && p.has_dash
        && p.dash_cooldown == 0
        && !state.is_attack()
        && state != PlayerState::Dash
    {
        set_state(base, p, ctx, PlayerState::Dash);
        return;
    }

    match state {
        PlayerState::Idle | PlayerState::Walk => {
            if input.jump_pressed && p.grounded {
                set_state(base, p, ctx, PlayerState::Jump);
            } else if !p.grounded {
                set_state(base, p, ctx, PlayerState::Fall);
            } else if input.attack_pressed && p.attack_cooldown == 0 {
                let next = if input.vertical > 0 {
                    PlayerState::UpGndAttack
                } else {
                    PlayerState::GndAttack
                };
                set_state(base, p, ctx, next);
            } else if input.horizontal != 0 {
                set_state(base, p, ctx, PlayerState::Walk);
            } else {
                set_state(base, p, ctx, PlayerState::Idle);
            }
        }
        PlayerState::Jump => {
            p.jump_timer += 1;
            if input.jump_held && p.jump_duration < ctx.tuning.max_jump_duration {
                p.jump_duration += 1;
            }
            if input.attack_pressed && p.attack_cooldown == 0 {
                set_state(base, p, ctx, air_attack_for(input.vertical));
            } else if p.jump_timer >= p.jump_duration {
                set_state(base, p, ctx, PlayerState::Fall);
            }
        }
        PlayerState::Fall => {
            if p.grounded {
                set_state(base, p, ctx, landing_state(input.horizontal));
            } else if input.attack_pressed && p.attack_cooldown == 0 {
                set_state(base, p, ctx, air_attack_for(input.vertical));
            }
        }
        PlayerState::Dash => {
            p.dash_timer += 1;
            if p.dash_timer >= ctx.tuning.dash_duration {
                let next = if p.grounded {
                    landing_state(input.horizontal)
                } else {
                    PlayerState::Fall
                };
                set_state(base, p, ctx, next);
            }
        }
        PlayerState::GndAttack | PlayerState::UpGndAttack => {
            if base.state_done() {
                set_state(base, p, ctx, landing_state(input.horizontal));
            }
        }
        s if s.is_air_attack() => {
            if p.grounded {
                set_state(base, p, ctx, landing_state(input.horizontal));
            } else if base.state_done() {
                set_state(base, p, ctx, PlayerState::Fall);
            }
        }
        _ => unreachable!(),
    }
}

fn air_attack_for(vertical: i8) -> PlayerState {
    match vertical.signum() {
        1 => PlayerState::UairAttack,
        -1 => PlayerState::DairAttack,
        _ => PlayerState::AirAttack,
    }
}

fn landing_state(horizontal: i8) -> PlayerState {
    if horizontal != 0 {
        PlayerState::Walk
    } else {
        PlayerState::Idle
    }
}

/// Impulse-based movement, applied after the transition table
fn apply_movement(base: &mut EntityBase, p: &mut Player, ctx: &mut UpdateCtx) {
    let handle = base.body();
    let state = Player::state(base);
    let tuning = ctx.tuning;

    // Forces persist across steps; last tick's damping is cleared before
    // anything new is applied
    ctx.physics.reset_forces(handle);

    if state == PlayerState::Dash {
        // Dash overrides both axes for its whole duration
        ctx.physics.set_velocity(handle, p.dash_dir * tuning.dash_speed);
        return;
    }

    let h = ctx.input.horizontal;
    if h != 0 {
        ctx.physics
            .apply_impulse(handle, Vec2::new(tuning.move_impulse * h as f32, 0.0));
        if !state.is_attack() {
            base.dir = h;
        }
    } else {
        // Horizontal damping force proportional to current speed
        let vx = ctx.physics.velocity(handle).x;
        ctx.physics
            .apply_force(handle, Vec2::new(-vx * tuning.move_damping, 0.0));
    }

    if state == PlayerState::Jump && p.jump_timer < p.jump_duration {
        ctx.physics.apply_impulse(handle, tuning.jump_impulse);
    }

    let velocity = ctx.physics.velocity(handle);
    let clamped = Vec2::new(
        velocity.x.clamp(-tuning.max_x_speed, tuning.max_x_speed),
        velocity.y.clamp(-tuning.max_y_speed, tuning.max_y_speed),
    );
    if clamped != velocity {
        ctx.physics.set_velocity(handle, clamped);
    }
}

/// Reset the player at a respawn point. Bypasses the transition table:
/// whatever state death interrupted, the body and flags are restored to a
/// clean falling start.
pub fn respawn(
    base: &mut EntityBase,
    p: &mut Player,
    physics: &mut crate::engine::physics::PhysicsWorld,
    position: Vec2,
) {
    if base.can_switch(PlayerState::Fall.index()) {
        base.commit_switch(PlayerState::Fall.index());
    }
    p.alive = true;
    p.underfoot.clear();
    p.hit_enemies.clear();
    p.has_dash = false;
    p.dash_timer = 0;
    p.jump_timer = 0;
    physics.set_position(base.body(), position);
    physics.set_velocity(base.body(), Vec2::ZERO);
    physics.set_gravity_scale(base.body(), 1.0);
    log::info!("player respawned at {position:?}");
}
