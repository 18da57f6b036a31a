// Shard: the spinning companion that trails the player

use glam::Vec2;

use crate::game::entity::{EntityBase, UpdateCtx};

pub const STATE_IDLE: usize = 0;

pub struct Shard;

pub fn update(base: &mut EntityBase, _s: &mut Shard, ctx: &mut UpdateCtx) {
    base.advance_counter(ctx.tuning.counter_increment);

    let tuning = ctx.tuning;
    let handle = base.body();
    if let Some(player_pos) = ctx.player_pos {
        // Hover a fixed distance behind the player's facing
        let anchor = player_pos - Vec2::new(ctx.player_dir as f32 * tuning.shard_distance, 0.0);
        let position = ctx.physics.position(handle);
        ctx.physics
            .set_velocity(handle, (anchor - position) * tuning.shard_follow_rate);
    } else {
        ctx.physics.set_velocity(handle, Vec2::ZERO);
    }
    ctx.physics.set_angular_velocity(handle, tuning.shard_spin_speed);
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
        Arc::new(StateTable::new(vec![AnimationState::new(
            "idle",
            vec![
                Frame::new(SpriteRef(0), Vec::new()),
                Frame::new(SpriteRef(1), Vec::new()),
            ],
            true,
        )]))
    }

    #[test]
    fn test_follows_anchor_behind_player() {
        let tuning = Tuning::default();
        let mut physics = PhysicsWorld::new(tuning.gravity);
        let mut base = EntityBase::new(
            11,
            Vec2::new(0.0, 1.0),
            STATE_IDLE,
            table(),
            BodyBuilder::new_dynamic()
                .gravity_scale(0.0)
                .fixed_rotation(false),
            0.0,
        );
        base.activate(&mut physics).unwrap();
        let mut shard = Shard;

        let mut ctx = UpdateCtx {
            physics: &mut physics,
            tuning: &tuning,
            input: InputFrame::idle(),
            player_pos: Some(Vec2::new(2.0, 1.0)),
            player_dir: 1,
        };
        update(&mut base, &mut shard, &mut ctx);

        // Anchor is shard_distance behind a right-facing player
        let velocity = physics.velocity(base.body());
        assert!(velocity.x > 0.0);
        let expected =
            (Vec2::new(2.0 - tuning.shard_distance, 1.0) - Vec2::new(0.0, 1.0)) * tuning.shard_follow_rate;
        assert!((velocity - expected).length() < 1e-4);
        assert_eq!(
            physics.body(base.body()).unwrap().angvel(),
            tuning.shard_spin_speed
        );

        // Spin accumulates once the world steps
        physics.step();
        assert!(physics.angle(base.body()) > 0.0);
    }

    #[test]
    fn test_idles_without_a_player() {
        let tuning = Tuning::default();
        let mut physics = PhysicsWorld::new(tuning.gravity);
        let mut base = EntityBase::new(
            11,
            Vec2::new(0.0, 1.0),
            STATE_IDLE,
            table(),
            BodyBuilder::new_dynamic()
                .gravity_scale(0.0)
                .fixed_rotation(false),
            0.0,
        );
        base.activate(&mut physics).unwrap();
        let mut shard = Shard;
        let mut ctx = UpdateCtx {
            physics: &mut physics,
            tuning: &tuning,
            input: InputFrame::idle(),
            player_pos: None,
            player_dir: 1,
        };
        update(&mut base, &mut shard, &mut ctx);
        assert_eq!(physics.velocity(base.body()), Vec2::ZERO);
    }
}
