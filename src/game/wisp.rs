// Wisp: hovering caster that lobs projectiles at its target

use glam::Vec2;

use crate::game::enemy::EnemyCore;
use crate::game::entity::{EntityBase, UpdateCtx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WispState {
    Idle = 0,
    Windup = 1,
    Attack = 2,
}

impl WispState {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Idle,
            1 => Self::Windup,
            2 => Self::Attack,
            _ => panic!("wisp state index {index} out of range"),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Request for a projectile to be spawned by the driver after the entity
/// pass finishes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpawn {
    pub position: Vec2,
    pub velocity: Vec2,
}

pub struct Wisp {
    pub core: EnemyCore,
    /// Ticks since the last shot
    pub cooldown: u32,
    /// Projectiles requested this tick, drained by the driver
    pub spawned: Vec<ProjectileSpawn>,
}

impl Wisp {
    pub fn new(core: EnemyCore) -> Self {
        Self {
            core,
            cooldown: 0,
            spawned: Vec::new(),
        }
    }

    pub fn state(base: &EntityBase) -> WispState {
        WispState::from_index(base.state_index())
    }
}

fn set_state(base: &mut EntityBase, w: &mut Wisp, ctx: &mut UpdateCtx, next: WispState) {
    if !base.can_switch(next.index()) {
        return;
    }
    base.commit_switch(next.index());
    if next == WispState::Attack {
        fire(base, w, ctx);
    }
}

/// Launch a projectile toward the facing direction from the muzzle offset
fn fire(base: &mut EntityBase, w: &mut Wisp, ctx: &mut UpdateCtx) {
    let tuning = ctx.tuning;
    let dir = base.dir as f32;
    let origin = base.position(ctx.physics);
    let offset = Vec2::new(tuning.wisp_projectile_offset.x * dir, tuning.wisp_projectile_offset.y);
    w.spawned.push(ProjectileSpawn {
        position: origin + offset,
        velocity: Vec2::new(tuning.wisp_projectile_speed * dir, 0.0),
    });
    w.cooldown = 0;
    log::debug!("wisp fired from {:?}", origin + offset);
}

pub fn update(base: &mut EntityBase, w: &mut Wisp, ctx: &mut UpdateCtx) {
    if w.core.is_suspended() {
        return;
    }
    base.advance_counter(ctx.tuning.counter_increment * w.core.health_fraction());
    w.cooldown = w.cooldown.saturating_add(1);

    // Hold station: shrugs off shoves from passing bodies
    ctx.physics.set_velocity(base.body(), Vec2::ZERO);

    match Wisp::state(base) {
        WispState::Idle => {
            if let Some(target) = w.core.target {
                if w.cooldown >= ctx.tuning.wisp_attack_cooldown {
                    let x = base.position(ctx.physics).x;
                    base.dir = if target.x >= x { 1 } else { -1 };
                    set_state(base, w, ctx, WispState::Windup);
                }
            }
        }
        WispState::Windup => {
            if base.state_done() {
                set_state(base, w, ctx, WispState::Attack);
            }
        }
        WispState::Attack => {
            if base.state_done() {
                set_state(base, w, ctx, WispState::Idle);
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
            AnimationState::new("windup", frames(6), false),
            AnimationState::new("attack", frames(4), false),
        ]))
    }

    struct Rig {
        physics: PhysicsWorld,
        tuning: Tuning,
        base: EntityBase,
        wisp: Wisp,
    }

    impl Rig {
        fn new() -> Self {
            let tuning = Tuning::default();
            let mut physics = PhysicsWorld::new(tuning.gravity);
            let spawn = Vec2::new(0.0, 3.0);
            let mut base = EntityBase::new(
                3,
                spawn,
                WispState::Idle.index(),
                table(),
                BodyBuilder::new_dynamic().gravity_scale(0.0),
                0.0,
            );
            base.activate(&mut physics).unwrap();
            let wisp = Wisp::new(EnemyCore::new(
                tuning.enemy_max_health,
                spawn,
                tuning.patrol_range,
            ));
            Self {
                physics,
                tuning,
                base,
                wisp,
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
            update(&mut self.base, &mut self.wisp, &mut ctx);
        }

        fn state(&self) -> WispState {
            Wisp::state(&self.base)
        }
    }

    #[test]
    fn test_idle_until_cooldown_and_target() {
        let mut rig = Rig::new();
        rig.wisp.core.target = Some(Vec2::new(4.0, 3.0));
        // Cooldown not yet elapsed
        for _ in 0..rig.tuning.wisp_attack_cooldown - 1 {
            rig.tick();
            assert_eq!(rig.state(), WispState::Idle);
        }
        rig.tick();
        assert_eq!(rig.state(), WispState::Windup);
    }

    #[test]
    fn test_no_windup_without_target() {
        let mut rig = Rig::new();
        for _ in 0..100 {
            rig.tick();
        }
        assert_eq!(rig.state(), WispState::Idle);
    }

    #[test]
    fn test_attack_fires_exactly_one_projectile() {
        let mut rig = Rig::new();
        rig.wisp.cooldown = rig.tuning.wisp_attack_cooldown;
        rig.wisp.core.target = Some(Vec2::new(-4.0, 3.0));
        rig.tick();
        assert_eq!(rig.state(), WispState::Windup);
        assert_eq!(rig.base.dir, -1);

        // Windup is 6 frames at half speed
        for _ in 0..12 {
            rig.tick();
        }
        assert_eq!(rig.state(), WispState::Attack);
        assert_eq!(rig.wisp.spawned.len(), 1);
        let shot = rig.wisp.spawned[0];
        assert_eq!(
            shot.velocity,
            Vec2::new(-rig.tuning.wisp_projectile_speed, 0.0)
        );
        assert_eq!(
            shot.position,
            Vec2::new(
                -rig.tuning.wisp_projectile_offset.x,
                3.0 + rig.tuning.wisp_projectile_offset.y
            )
        );
        assert_eq!(rig.wisp.cooldown, 0);

        // Riding out the attack state fires nothing further
        for _ in 0..8 {
            rig.tick();
        }
        assert_eq!(rig.state(), WispState::Idle);
        assert_eq!(rig.wisp.spawned.len(), 1);
    }
}
