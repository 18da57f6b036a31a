// Blob: harmless bobbing obstacle

use glam::Vec2;

use crate::game::enemy::EnemyCore;
use crate::game::entity::{EntityBase, UpdateCtx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobState {
    IdleUp = 0,
    IdleDown = 1,
}

impl BlobState {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::IdleUp,
            1 => Self::IdleDown,
            _ => panic!("blob state index {index} out of range"),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

pub struct Blob {
    pub core: EnemyCore,
}

impl Blob {
    pub fn new(core: EnemyCore) -> Self {
        Self { core }
    }

    pub fn state(base: &EntityBase) -> BlobState {
        BlobState::from_index(base.state_index())
    }
}

pub fn update(base: &mut EntityBase, b: &mut Blob, ctx: &mut UpdateCtx) {
    if b.core.is_suspended() {
        ctx.physics.set_velocity(base.body(), Vec2::ZERO);
        return;
    }
    base.advance_counter(ctx.tuning.counter_increment * b.core.health_fraction());

    let tuning = ctx.tuning;
    let speed = tuning.blob_bob_speed * b.core.health_fraction();
    let (velocity, next) = match Blob::state(base) {
        BlobState::IdleUp => (Vec2::new(0.0, speed), BlobState::IdleDown),
        BlobState::IdleDown => (Vec2::new(0.0, -speed), BlobState::IdleUp),
    };
    ctx.physics.set_velocity(base.body(), velocity);

    // Flip direction every bob period
    if base.counter >= tuning.blob_bob_period && base.can_switch(next.index()) {
        base.commit_switch(next.index());
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
            AnimationState::new("idle_up", frames(4), true),
            AnimationState::new("idle_down", frames(4), true),
        ]))
    }

    struct Rig {
        physics: PhysicsWorld,
        tuning: Tuning,
        base: EntityBase,
        blob: Blob,
    }

    impl Rig {
        fn new() -> Self {
            let tuning = Tuning::default();
            let mut physics = PhysicsWorld::new(tuning.gravity);
            let spawn = Vec2::new(0.0, 2.0);
            let mut base = EntityBase::new(
                5,
                spawn,
                BlobState::IdleUp.index(),
                table(),
                BodyBuilder::new_kinematic(),
                0.0,
            );
            base.activate(&mut physics).unwrap();
            let blob = Blob::new(EnemyCore::new(
                tuning.enemy_max_health,
                spawn,
                tuning.patrol_range,
            ));
            Self {
                physics,
                tuning,
                base,
                blob,
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
            update(&mut self.base, &mut self.blob, &mut ctx);
        }
    }

    #[test]
    fn test_alternates_every_period() {
        let mut rig = Rig::new();
        // Period 20 at half-speed counting: 40 ticks per phase
        let ticks_per_phase = (rig.tuning.blob_bob_period / rig.tuning.counter_increment) as usize;
        for _ in 0..ticks_per_phase {
            assert_eq!(Blob::state(&rig.base), BlobState::IdleUp);
            rig.tick();
        }
        assert_eq!(Blob::state(&rig.base), BlobState::IdleDown);
        rig.tick();
        assert!(rig.physics.velocity(rig.base.body()).y < 0.0);
        for _ in 0..ticks_per_phase - 1 {
            rig.tick();
        }
        assert_eq!(Blob::state(&rig.base), BlobState::IdleUp);
    }

    #[test]
    fn test_suspended_blob_stops() {
        let mut rig = Rig::new();
        rig.tick();
        assert!(rig.physics.velocity(rig.base.body()).y > 0.0);
        rig.blob.core.lower_health(100.0);
        rig.tick();
        assert_eq!(rig.physics.velocity(rig.base.body()), Vec2::ZERO);
    }
}
