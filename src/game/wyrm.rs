// Wyrm: flying ambusher that dives at a captured target point, then
// returns to its roost

use glam::Vec2;

use crate::game::enemy::EnemyCore;
use crate::game::entity::{EntityBase, UpdateCtx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WyrmState {
    Idle = 0,
    Windup = 1,
    Attack = 2,
    Return = 3,
}

impl WyrmState {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Idle,
            1 => Self::Windup,
            2 => Self::Attack,
            3 => Self::Return,
            _ => panic!("wyrm state index {index} out of range"),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

pub struct Wyrm {
    pub core: EnemyCore,
    /// Ticks since the last dive
    pub cooldown: u32,
    /// Target point captured when the dive began
    dive_target: Option<Vec2>,
    /// Set by the contact resolver when a dive hits solid ground
    pub dive_blocked: bool,
}

impl Wyrm {
    /// A fresh wyrm spawns with its cooldown elapsed, so the first
    /// sighting triggers a dive immediately
    pub fn new(core: EnemyCore, attack_cooldown: u32) -> Self {
        Self {
            core,
            cooldown: attack_cooldown,
            dive_target: None,
            dive_blocked: false,
        }
    }

    pub fn state(base: &EntityBase) -> WyrmState {
        WyrmState::from_index(base.state_index())
    }
}

fn set_state(base: &mut EntityBase, w: &mut Wyrm, ctx: &mut UpdateCtx, next: WyrmState) {
    if !base.can_switch(next.index()) {
        return;
    }
    base.commit_switch(next.index());
    match next {
        WyrmState::Attack => {
            // Dive at the point where the target was when the windup ended
            if let Some(target) = w.dive_target {
                let position = base.position(ctx.physics);
                let heading = (target - position).normalize_or_zero();
                base.dir = if heading.x >= 0.0 { 1 } else { -1 };
                ctx.physics
                    .set_velocity(base.body(), heading * ctx.tuning.wyrm_dive_speed);
            }
        }
        WyrmState::Idle => {
            w.dive_target = None;
            w.dive_blocked = false;
            w.cooldown = 0;
            ctx.physics.set_velocity(base.body(), Vec2::ZERO);
        }
        _ => {}
    }
}

pub fn update(base: &mut EntityBase, w: &mut Wyrm, ctx: &mut UpdateCtx) {
    if w.core.is_suspended() {
        return;
    }
    base.advance_counter(ctx.tuning.counter_increment * w.core.health_fraction());
    w.cooldown = w.cooldown.saturating_add(1);

    let position = base.position(ctx.physics);
    let tuning = ctx.tuning;

    match Wyrm::state(base) {
        WyrmState::Idle => {
            // Drift back over the roost between dives
            let roost = base.spawn_point();
            let offset = roost - position;
            let velocity = if offset.length() > tuning.wyrm_arrive_distance {
                offset.normalize_or_zero() * tuning.wyrm_drift_speed
            } else {
                Vec2::ZERO
            };
            ctx.physics.set_velocity(base.body(), velocity);

            if w.core.target.is_some() && w.cooldown >= tuning.wyrm_attack_cooldown {
                set_state(base, w, ctx, WyrmState::Windup);
            }
        }
        WyrmState::Windup => {
            ctx.physics.set_velocity(base.body(), Vec2::ZERO);
            // Track the target until the moment the dive commits
            if let Some(target) = w.core.target {
                w.dive_target = Some(target);
            }
            if base.state_done() {
                set_state(base, w, ctx, WyrmState::Attack);
            }
        }
        WyrmState::Attack => {
            let arrived = w
                .dive_target
                .map(|t| position.distance(t) <= tuning.wyrm_arrive_distance)
                .unwrap_or(true);
            // Slamming into a platform cuts the dive short
            if arrived || w.dive_blocked {
                w.dive_blocked = false;
                set_state(base, w, ctx, WyrmState::Return);
            }
        }
        WyrmState::Return => {
            let roost = base.spawn_point();
            if position.distance(roost) <= tuning.wyrm_arrive_distance {
                set_state(base, w, ctx, WyrmState::Idle);
            } else {
                let heading = (roost - position).normalize_or_zero();
                base.dir = if heading.x >= 0.0 { 1 } else { -1 };
                ctx.physics
                    .set_velocity(base.body(), heading * tuning.wyrm_dive_speed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::engine::input::InputFrame;
    use crate::engine::physics::{BodyBuilder, PhysicsWorld};
    use crate::game::animation::{AnimationState, Frame, SpriteRef, StateTable};
    use crate::game::config::Tuning;

    fn table() -> Arc<StateTable> {
        let frames = |n: usize| {
            (0..n)
                .map(|i| Frame::new(SpriteRef(i as u32), Vec::new()))
                .collect()
        };
        Arc::new(StateTable::new(vec![
            AnimationState::new("idle", frames(4), true),
            AnimationState::new("windup", frames(8), false),
            AnimationState::new("attack", frames(2), true),
            AnimationState::new("return", frames(2), true),
        ]))
    }

    struct Rig {
        physics: PhysicsWorld,
        tuning: Tuning,
        base: EntityBase,
        wyrm: Wyrm,
    }

    impl Rig {
        fn new() -> Self {
            let tuning = Tuning::default();
            // Gravity off so position is fully script-driven
            let mut physics = PhysicsWorld::new(tuning.gravity);
            let spawn = Vec2::new(0.0, 4.0);
            let mut base = EntityBase::new(
                4,
                spawn,
                WyrmState::Idle.index(),
                table(),
                BodyBuilder::new_dynamic().gravity_scale(0.0),
                0.0,
            );
            base.activate(&mut physics).unwrap();
            let wyrm = Wyrm::new(
                EnemyCore::new(tuning.enemy_max_health, spawn, tuning.patrol_range),
                tuning.wyrm_attack_cooldown,
            );
            Self {
                physics,
                tuning,
                base,
                wyrm,
            }
        }

        fn tick(&mut self) {
            let mut ctx = UpdateCtx {
                physics: &mut self.physics,
                tuning: &self.tuning,
                input: InputFrame::idle(),
                player_pos: None,
                player_dir: 1,
            };
            update(&mut self.base, &mut self.wyrm, &mut ctx);
        }

        fn state(&self) -> WyrmState {
            Wyrm::state(&self.base)
        }
    }

    #[test]
    fn test_first_sighting_dives_without_waiting() {
        let mut rig = Rig::new();
        rig.tick();
        assert_eq!(rig.state(), WyrmState::Idle);

        rig.wyrm.core.target = Some(Vec2::new(2.0, 0.0));
        rig.tick();
        assert_eq!(rig.state(), WyrmState::Windup);
    }

    #[test]
    fn test_cooldown_gates_the_next_dive() {
        let mut rig = Rig::new();
        // As if a dive just ended
        rig.wyrm.cooldown = 0;
        rig.wyrm.core.target = Some(Vec2::new(2.0, 0.0));
        rig.tick();
        assert_eq!(rig.state(), WyrmState::Idle);

        rig.wyrm.cooldown = rig.tuning.wyrm_attack_cooldown;
        rig.tick();
        assert_eq!(rig.state(), WyrmState::Windup);
    }

    #[test]
    fn test_dive_velocity_points_at_captured_target() {
        let mut rig = Rig::new();
        let target = Vec2::new(3.0, 0.0);
        rig.wyrm.core.target = Some(target);
        rig.wyrm.cooldown = rig.tuning.wyrm_attack_cooldown;
        rig.tick();
        assert_eq!(rig.state(), WyrmState::Windup);

        // Windup is 8 frames at half speed
        for _ in 0..16 {
            rig.tick();
        }
        assert_eq!(rig.state(), WyrmState::Attack);
        assert_eq!(rig.base.dir, 1);
        let velocity = rig.physics.velocity(rig.base.body());
        assert!((velocity.length() - rig.tuning.wyrm_dive_speed).abs() < 1e-4);
        let expected = (target - Vec2::new(0.0, 4.0)).normalize();
        assert!((velocity.normalize() - expected).length() < 1e-4);
    }

    #[test]
    fn test_blocked_dive_returns_early() {
        let mut rig = Rig::new();
        rig.wyrm.core.target = Some(Vec2::new(3.0, 0.0));
        for _ in 0..17 {
            rig.tick();
        }
        assert_eq!(rig.state(), WyrmState::Attack);

        // Still far from the dive target, but a platform got in the way
        rig.wyrm.dive_blocked = true;
        rig.tick();
        assert_eq!(rig.state(), WyrmState::Return);
        assert!(!rig.wyrm.dive_blocked);
    }

    #[test]
    fn test_arrival_turns_dive_into_return() {
        let mut rig = Rig::new();
        rig.wyrm.core.target = Some(Vec2::new(3.0, 0.0));
        for _ in 0..17 {
            rig.tick();
        }
        assert_eq!(rig.state(), WyrmState::Attack);

        // Teleport to just inside the arrive threshold
        rig.physics
            .set_position(rig.base.body(), Vec2::new(3.0, 0.1));
        rig.tick();
        assert_eq!(rig.state(), WyrmState::Return);

        // And back home
        rig.physics
            .set_position(rig.base.body(), Vec2::new(0.0, 4.0));
        rig.tick();
        assert_eq!(rig.state(), WyrmState::Idle);
        assert_eq!(rig.wyrm.cooldown, 0);
        assert_eq!(rig.physics.velocity(rig.base.body()), Vec2::ZERO);
    }
}
