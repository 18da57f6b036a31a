// Combat and contact resolution
//
// Raw fixture-pair events become semantic handlers through a lookup table
// keyed on the two collider roles. Handlers mutate entity flags only; body
// and velocity changes wait for the next update phase.

use std::collections::HashMap;

use glam::Vec2;

use crate::core::math::circle_overlaps_rect;
use crate::engine::physics::{ColliderRole, ColliderTag, EntityId, PhysicsWorld};
use crate::game::config::Tuning;
use crate::game::entity::{Entity, Payload};
use crate::game::player::Player;
use crate::game::props::Checkpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Begin,
    End,
}

/// A handler receives the entity whose role matched first in the table key
/// as `owner`, the other as `other`
type Handler = fn(Phase, usize, usize, &mut [Entity]);

/// Role-pair dispatch table for contact events
pub struct CombatResolver {
    handlers: HashMap<(ColliderRole, ColliderRole), Handler>,
}

impl CombatResolver {
    pub fn new() -> Self {
        let mut handlers: HashMap<(ColliderRole, ColliderRole), Handler> = HashMap::new();
        handlers.insert((ColliderRole::Hurtbox, ColliderRole::Hurtbox), on_hurtbox_hurtbox);
        handlers.insert((ColliderRole::Ground, ColliderRole::Hurtbox), on_ground_sensor);
        handlers.insert((ColliderRole::FrontEdge, ColliderRole::Hurtbox), on_front_edge);
        handlers.insert((ColliderRole::BackEdge, ColliderRole::Hurtbox), on_back_edge);
        handlers.insert((ColliderRole::Vision, ColliderRole::Hurtbox), on_vision);
        handlers.insert((ColliderRole::Center, ColliderRole::Hurtbox), on_prop_sensor);
        Self { handlers }
    }

    /// Dispatch one contact event. The raw pair order is irrelevant: both
    /// orderings are tried against the table.
    pub fn resolve(
        &self,
        phase: Phase,
        a: ColliderTag,
        b: ColliderTag,
        index: &HashMap<EntityId, usize>,
        entities: &mut [Entity],
    ) {
        if a.entity == b.entity {
            return;
        }
        let (ia, ib) = match (index.get(&a.entity), index.get(&b.entity)) {
            (Some(&ia), Some(&ib)) => (ia, ib),
            // One side already removed from the world this tick
            _ => return,
        };
        if let Some(handler) = self.handlers.get(&(a.role, b.role)) {
            handler(phase, ia, ib, entities);
        } else if let Some(handler) = self.handlers.get(&(b.role, a.role)) {
            handler(phase, ib, ia, entities);
        }
    }
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn on_hurtbox_hurtbox(phase: Phase, a: usize, b: usize, entities: &mut [Entity]) {
    if phase != Phase::Begin {
        return;
    }
    kill_player_on_contact(a, b, entities);
    expire_projectile(a, b, entities);
    expire_projectile(b, a, entities);
    block_wyrm_dive(a, b, entities);
    block_wyrm_dive(b, a, entities);
}

/// Player body against a live enemy body is lethal
fn kill_player_on_contact(a: usize, b: usize, entities: &mut [Entity]) {
    let (player_idx, enemy_idx) = if entities[a].is_player() {
        (a, b)
    } else if entities[b].is_player() {
        (b, a)
    } else {
        return;
    };
    let lethal = entities[enemy_idx]
        .enemy_core()
        .map(|core| !core.is_suspended())
        .unwrap_or(false);
    if !lethal {
        return;
    }
    let enemy_id = entities[enemy_idx].id();
    if let Some(player) = entities[player_idx].player_mut() {
        if player.alive {
            player.alive = false;
            log::info!("player killed by enemy {enemy_id}");
        }
    }
}

/// An in-flight projectile burns out against the player or anything
/// standable (platforms, suspended enemies). Live enemies let it pass,
/// and a suspended projectile persists as frozen ground.
fn expire_projectile(proj: usize, other: usize, entities: &mut [Entity]) {
    let in_flight = match &entities[proj].payload {
        Payload::Projectile(p) => !p.core.is_suspended(),
        _ => false,
    };
    if !in_flight {
        return;
    }
    if !entities[other].is_player() && !entities[other].is_standable() {
        return;
    }
    if let Some(core) = entities[proj].enemy_core_mut() {
        core.remove = true;
    }
}

/// Hitting a platform mid-dive cuts the dive short
fn block_wyrm_dive(wyrm: usize, other: usize, entities: &mut [Entity]) {
    if !matches!(entities[other].payload, Payload::Platform(_)) {
        return;
    }
    if let Payload::Wyrm(w) = &mut entities[wyrm].payload {
        w.dive_blocked = true;
    }
}

/// Ground sensor against something standable. Standability is checked at
/// resolution time, so a contact that began against a live enemy never
/// counts, and one that ends against a since-suspended enemy is harmless
/// set removal.
fn on_ground_sensor(phase: Phase, owner: usize, other: usize, entities: &mut [Entity]) {
    let standable = entities[other].is_standable();
    let other_id = entities[other].id();
    match &mut entities[owner].payload {
        Payload::Player(player) => match phase {
            Phase::Begin if standable => {
                player.underfoot.insert(other_id);
            }
            Phase::End => {
                player.underfoot.remove(&other_id);
            }
            _ => {}
        },
        Payload::Spider(spider) => match phase {
            Phase::Begin if standable => {
                spider.support.insert(other_id);
            }
            Phase::End => {
                spider.support.remove(&other_id);
            }
            _ => {}
        },
        _ => {}
    }
}

fn on_front_edge(phase: Phase, owner: usize, other: usize, entities: &mut [Entity]) {
    let standable = entities[other].is_standable();
    let other_id = entities[other].id();
    if let Payload::Spider(spider) = &mut entities[owner].payload {
        match phase {
            Phase::Begin if standable => {
                spider.front_support.insert(other_id);
            }
            Phase::End => {
                spider.front_support.remove(&other_id);
            }
            _ => {}
        }
    }
}

fn on_back_edge(phase: Phase, owner: usize, other: usize, entities: &mut [Entity]) {
    let standable = entities[other].is_standable();
    let other_id = entities[other].id();
    if let Payload::Spider(spider) = &mut entities[owner].payload {
        match phase {
            Phase::Begin if standable => {
                spider.back_support.insert(other_id);
            }
            Phase::End => {
                spider.back_support.remove(&other_id);
            }
            _ => {}
        }
    }
}

/// An enemy's vision sensor sees the player. The driver turns the sighting
/// set into a target position each tick.
fn on_vision(phase: Phase, owner: usize, other: usize, entities: &mut [Entity]) {
    if !entities[other].is_player() {
        return;
    }
    let player_id = entities[other].id();
    if let Some(core) = entities[owner].enemy_core_mut() {
        match phase {
            Phase::Begin => {
                core.seen.insert(player_id);
            }
            Phase::End => {
                core.seen.remove(&player_id);
            }
        }
    }
}

/// Prop trigger sensor touched by the player
fn on_prop_sensor(phase: Phase, owner: usize, other: usize, entities: &mut [Entity]) {
    if !entities[other].is_player() {
        return;
    }
    let player_id = entities[other].id();
    let Entity { base, payload } = &mut entities[owner];
    match payload {
        Payload::Checkpoint(checkpoint) => {
            if phase == Phase::Begin {
                Checkpoint::trigger(base, checkpoint);
            }
        }
        Payload::Tooltip(tooltip) => match phase {
            Phase::Begin => {
                tooltip.visitors.insert(player_id);
            }
            Phase::End => {
                tooltip.visitors.remove(&player_id);
            }
        },
        Payload::Altar(altar) => {
            if phase == Phase::Begin && !altar.reached {
                altar.reached = true;
                log::info!("altar reached");
            }
        }
        _ => {}
    }
}

/// Once-per-tick damage application, deliberately independent of the
/// physics engine's contact reporting.
///
/// While the player's attack window is open, a circle at the attack offset
/// is tested against each live enemy's hurtbox bounds; each enemy in the
/// attack's hit set is skipped, giving exact hit-once semantics per attack.
/// Returns the number of enemies damaged this tick.
pub fn apply_attack_damage(
    entities: &mut [Entity],
    player_index: usize,
    physics: &PhysicsWorld,
    tuning: &Tuning,
) -> usize {
    let player_entity = &entities[player_index];
    let Some(player) = player_entity.player() else {
        return 0;
    };
    if !Player::attack_window_open(&player_entity.base, tuning) {
        return 0;
    }
    let dir = player_entity.base.dir as f32;
    let center = player_entity.base.position(physics)
        + Vec2::new(tuning.attack_offset.x * dir, tuning.attack_offset.y);

    let mut hits = Vec::new();
    for (i, entity) in entities.iter().enumerate() {
        if i == player_index {
            continue;
        }
        let Some(core) = entity.enemy_core() else {
            continue;
        };
        if core.is_suspended() || player.hit_enemies.contains(&entity.id()) {
            continue;
        }
        let Some(bounds) = entity.base.hurtbox_aabb(physics) else {
            continue;
        };
        if circle_overlaps_rect(center, tuning.attack_radius, &bounds) {
            hits.push((i, entity.id()));
        }
    }

    for &(i, id) in &hits {
        if let Some(core) = entities[i].enemy_core_mut() {
            core.lower_health(tuning.attack_damage);
            log::debug!("enemy {id} damaged, health {}", core.health());
        }
    }
    if let Some(player) = entities[player_index].player_mut() {
        for &(_, id) in &hits {
            player.hit_enemies.insert(id);
        }
    }
    hits.len()
}
