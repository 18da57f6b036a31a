// Built-in state table definitions for every entity kind
//
// The geometry here is authored facing right; sync mirrors it when an
// entity faces left. Sprite references are placeholders resolved by the
// rendering collaborator.

use glam::Vec2;

use crate::core::math::ColliderShape;
use crate::engine::physics::ColliderRole;
use crate::game::animation::{AnimationState, ColliderDef, Frame, SpriteRef, StateBank, StateTable};
use crate::game::config::Tuning;

fn boxed(center: Vec2, half_extents: Vec2, role: ColliderRole) -> ColliderDef {
    ColliderDef::new(
        ColliderShape::Box {
            center,
            half_extents,
            angle: 0.0,
        },
        role,
    )
}

fn circle(center: Vec2, radius: f32, role: ColliderRole) -> ColliderDef {
    ColliderDef::new(ColliderShape::Circle { center, radius }, role)
}

fn state(name: &str, frames: usize, looping: bool, colliders: Vec<ColliderDef>) -> AnimationState {
    let frames = (0..frames)
        .map(|i| Frame::new(SpriteRef(i as u32), colliders.clone()))
        .collect();
    AnimationState::new(name, frames, looping)
}

fn player_table(tuning: &Tuning) -> StateTable {
    let body = vec![
        boxed(Vec2::ZERO, Vec2::new(0.25, 0.45), ColliderRole::Hurtbox),
        boxed(
            Vec2::new(0.0, -0.47),
            Vec2::new(0.18, 0.05),
            ColliderRole::Ground,
        ),
    ];
    let mut attack = body.clone();
    attack.push(circle(
        tuning.attack_offset,
        tuning.attack_radius,
        ColliderRole::Hitbox,
    ));
    let mut up_attack = body.clone();
    up_attack.push(circle(
        Vec2::new(0.0, tuning.attack_offset.x),
        tuning.attack_radius,
        ColliderRole::Hitbox,
    ));
    let mut down_attack = body.clone();
    down_attack.push(circle(
        Vec2::new(0.0, -tuning.attack_offset.x),
        tuning.attack_radius,
        ColliderRole::Hitbox,
    ));

    StateTable::new(vec![
        state("idle", 4, true, body.clone()),
        state("walk", 6, true, body.clone()),
        state("fall", 2, true, body.clone()),
        state("jump", 2, true, body.clone()),
        state("dash", 6, false, body),
        state("gnd_attack", 8, false, attack.clone()),
        state("up_gnd_attack", 8, false, up_attack.clone()),
        state("air_attack", 8, false, attack),
        state("dair_attack", 8, false, down_attack),
        state("uair_attack", 8, false, up_attack),
    ])
}

fn spider_table() -> StateTable {
    let body = vec![
        boxed(Vec2::ZERO, Vec2::new(0.3, 0.2), ColliderRole::Hurtbox),
        boxed(
            Vec2::new(0.0, -0.23),
            Vec2::new(0.25, 0.05),
            ColliderRole::Ground,
        ),
        boxed(
            Vec2::new(0.35, -0.3),
            Vec2::new(0.08, 0.15),
            ColliderRole::FrontEdge,
        ),
        boxed(
            Vec2::new(-0.35, -0.3),
            Vec2::new(0.08, 0.15),
            ColliderRole::BackEdge,
        ),
        boxed(
            Vec2::new(1.0, 0.1),
            Vec2::new(1.0, 0.4),
            ColliderRole::Vision,
        ),
    ];
    StateTable::new(vec![
        state("wander", 4, true, body.clone()),
        state("windup", 6, false, body.clone()),
        state("attack", 6, false, body),
    ])
}

fn wisp_table() -> StateTable {
    let body = vec![
        circle(Vec2::ZERO, 0.3, ColliderRole::Hurtbox),
        circle(Vec2::ZERO, 2.5, ColliderRole::Vision),
    ];
    StateTable::new(vec![
        state("idle", 4, true, body.clone()),
        state("windup", 6, false, body.clone()),
        state("attack", 4, false, body),
    ])
}

fn wyrm_table() -> StateTable {
    let body = vec![
        boxed(Vec2::ZERO, Vec2::new(0.4, 0.25), ColliderRole::Hurtbox),
        circle(Vec2::ZERO, 3.0, ColliderRole::Vision),
    ];
    StateTable::new(vec![
        state("idle", 4, true, body.clone()),
        state("windup", 8, false, body.clone()),
        state("attack", 2, true, body.clone()),
        state("return", 2, true, body),
    ])
}

fn blob_table() -> StateTable {
    let body = vec![circle(Vec2::ZERO, 0.35, ColliderRole::Hurtbox)];
    StateTable::new(vec![
        state("idle_up", 4, true, body.clone()),
        state("idle_down", 4, true, body),
    ])
}

fn projectile_table() -> StateTable {
    let body = vec![circle(Vec2::ZERO, 0.12, ColliderRole::Hurtbox)];
    StateTable::new(vec![state("idle", 2, true, body)])
}

fn checkpoint_table() -> StateTable {
    let sensor = vec![boxed(Vec2::ZERO, Vec2::new(0.3, 0.5), ColliderRole::Center)];
    StateTable::new(vec![
        state("inactive", 2, true, sensor.clone()),
        state("active", 4, true, sensor),
    ])
}

fn tooltip_table() -> StateTable {
    let sensor = vec![circle(Vec2::ZERO, 1.2, ColliderRole::Center)];
    StateTable::new(vec![
        state("hidden", 1, true, sensor.clone()),
        state("shown", 2, true, sensor),
    ])
}

fn altar_table() -> StateTable {
    let sensor = vec![boxed(Vec2::ZERO, Vec2::new(0.5, 0.8), ColliderRole::Center)];
    StateTable::new(vec![state("idle", 4, true, sensor)])
}

fn shard_table() -> StateTable {
    let sensor = vec![circle(Vec2::ZERO, 0.1, ColliderRole::Center)];
    StateTable::new(vec![state("idle", 2, true, sensor)])
}

/// One frame of box geometry sized per platform instance
pub fn platform_table(half_extents: Vec2) -> StateTable {
    StateTable::new(vec![state(
        "solid",
        1,
        true,
        vec![boxed(Vec2::ZERO, half_extents, ColliderRole::Hurtbox)],
    )])
}

/// Fill a bank with the default tables for every non-platform kind
pub fn default_bank(tuning: &Tuning) -> StateBank {
    let mut bank = StateBank::new();
    bank.insert("player", player_table(tuning));
    bank.insert("spider", spider_table());
    bank.insert("wisp", wisp_table());
    bank.insert("wyrm", wyrm_table());
    bank.insert("blob", blob_table());
    bank.insert("projectile", projectile_table());
    bank.insert("checkpoint", checkpoint_table());
    bank.insert("tooltip", tooltip_table());
    bank.insert("altar", altar_table());
    bank.insert("shard", shard_table());
    bank
}
