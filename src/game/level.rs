// Level driver: owns the physics world and the entity list, and runs the
// fixed per-tick pipeline in its one legal order:
// update all -> damage pass -> sync all -> physics step -> contact
// dispatch -> enemy slowdown correction -> deferred add/remove

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Context, Result};
use glam::Vec2;

use crate::engine::input::InputFrame;
use crate::engine::physics::{
    BodyBuilder, ColliderHandle, ColliderTag, ContactEvent, EntityId, PhysicsWorld,
    RigidBodyType,
};
use crate::game::animation::StateBank;
use crate::game::blob::{Blob, BlobState};
use crate::game::combat::{self, CombatResolver, Phase};
use crate::game::config::Tuning;
use crate::game::enemy::{self, EnemyCore};
use crate::game::entity::{Entity, EntityBase, Payload, UpdateCtx};
use crate::game::player::{self, Player, PlayerState};
use crate::game::projectile::{self, Projectile};
use crate::game::props::{Altar, Checkpoint, Platform, Tooltip, CHECKPOINT_INACTIVE};
use crate::game::shard::{self, Shard};
use crate::game::spider::{Spider, SpiderState};
use crate::game::wisp::{ProjectileSpawn, Wisp, WispState};
use crate::game::wyrm::{Wyrm, WyrmState};
use crate::game::{content, props};

/// Entity spawn record supplied by the level data collaborator
#[derive(Debug, Clone, Copy)]
pub enum SpawnKind {
    Player,
    Spider,
    Wisp,
    Wyrm,
    Blob,
    Platform { half_extents: Vec2 },
    Checkpoint,
    Tooltip,
    Altar,
    Shard,
}

#[derive(Debug, Clone, Copy)]
pub struct SpawnRecord {
    pub kind: SpawnKind,
    pub position: Vec2,
}

impl SpawnRecord {
    pub fn new(kind: SpawnKind, position: Vec2) -> Self {
        Self { kind, position }
    }
}

pub struct Level {
    physics: PhysicsWorld,
    tuning: Tuning,
    bank: StateBank,
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
    /// Owner tags for every fixture created since the last prune. Entries
    /// outlive their fixtures by one tick so that removal-generated
    /// contact-end events can still be resolved.
    tags: HashMap<ColliderHandle, ColliderTag>,
    resolver: CombatResolver,
    next_id: EntityId,
    player_id: Option<EntityId>,
    respawn: Vec2,
    claimed_checkpoints: HashSet<EntityId>,
    ticks: u64,
}

impl Level {
    pub fn new(tuning: Tuning) -> Self {
        let bank = content::default_bank(&tuning);
        Self {
            physics: PhysicsWorld::new(tuning.gravity),
            tuning,
            bank,
            entities: Vec::new(),
            index: HashMap::new(),
            tags: HashMap::new(),
            resolver: CombatResolver::new(),
            next_id: 1,
            player_id: None,
            respawn: Vec2::ZERO,
            claimed_checkpoints: HashSet::new(),
            ticks: 0,
        }
    }

    /// Construct and activate every entity in the level data
    pub fn load(&mut self, records: &[SpawnRecord]) -> Result<()> {
        for record in records {
            self.spawn(*record)?;
        }
        log::info!("level loaded with {} entities", self.entities.len());
        Ok(())
    }

    fn table(&self, kind: &str) -> Result<std::sync::Arc<crate::game::animation::StateTable>> {
        self.bank
            .get(kind)
            .ok_or_else(|| anyhow!("no state table for kind '{kind}'"))
    }

    pub fn spawn(&mut self, record: SpawnRecord) -> Result<EntityId> {
        let id = self.next_id;
        let position = record.position;
        let tuning = &self.tuning;

        let (base, payload) = match record.kind {
            SpawnKind::Player => {
                let base = EntityBase::new(
                    id,
                    position,
                    PlayerState::Idle.index(),
                    self.table("player")?,
                    BodyBuilder::new_dynamic(),
                    0.0,
                );
                (base, Payload::Player(Player::new()))
            }
            SpawnKind::Spider => {
                let base = EntityBase::new(
                    id,
                    position,
                    SpiderState::Wander.index(),
                    self.table("spider")?,
                    BodyBuilder::new_dynamic(),
                    0.0,
                );
                let core = EnemyCore::new(tuning.enemy_max_health, position, tuning.patrol_range);
                (base, Payload::Spider(Spider::new(core)))
            }
            SpawnKind::Wisp => {
                let base = EntityBase::new(
                    id,
                    position,
                    WispState::Idle.index(),
                    self.table("wisp")?,
                    BodyBuilder::new_dynamic().gravity_scale(0.0),
                    0.0,
                );
                let core = EnemyCore::new(tuning.enemy_max_health, position, tuning.patrol_range);
                (base, Payload::Wisp(Wisp::new(core)))
            }
            SpawnKind::Wyrm => {
                let base = EntityBase::new(
                    id,
                    position,
                    WyrmState::Idle.index(),
                    self.table("wyrm")?,
                    BodyBuilder::new_dynamic().gravity_scale(0.0),
                    0.0,
                );
                let core = EnemyCore::new(tuning.enemy_max_health, position, tuning.patrol_range);
                (base, Payload::Wyrm(Wyrm::new(core, tuning.wyrm_attack_cooldown)))
            }
            SpawnKind::Blob => {
                let base = EntityBase::new(
                    id,
                    position,
                    BlobState::IdleUp.index(),
                    self.table("blob")?,
                    BodyBuilder::new_kinematic(),
                    0.0,
                );
                let core = EnemyCore::new(tuning.enemy_max_health, position, tuning.patrol_range);
                (base, Payload::Blob(Blob::new(core)))
            }
            SpawnKind::Platform { half_extents } => {
                let table = std::sync::Arc::new(content::platform_table(half_extents));
                let base = EntityBase::new(
                    id,
                    position,
                    0,
                    table,
                    BodyBuilder::new_fixed(),
                    0.0,
                );
                (base, Payload::Platform(Platform))
            }
            SpawnKind::Checkpoint => {
                let base = EntityBase::new(
                    id,
                    position,
                    CHECKPOINT_INACTIVE,
                    self.table("checkpoint")?,
                    BodyBuilder::new_fixed(),
                    0.0,
                );
                (base, Payload::Checkpoint(Checkpoint::new()))
            }
            SpawnKind::Tooltip => {
                let base = EntityBase::new(
                    id,
                    position,
                    props::TOOLTIP_HIDDEN,
                    self.table("tooltip")?,
                    BodyBuilder::new_fixed(),
                    0.0,
                );
                (base, Payload::Tooltip(Tooltip::new()))
            }
            SpawnKind::Altar => {
                let base = EntityBase::new(
                    id,
                    position,
                    props::ALTAR_IDLE,
                    self.table("altar")?,
                    BodyBuilder::new_fixed(),
                    0.0,
                );
                (base, Payload::Altar(Altar::new()))
            }
            SpawnKind::Shard => {
                let base = EntityBase::new(
                    id,
                    position,
                    shard::STATE_IDLE,
                    self.table("shard")?,
                    BodyBuilder::new_dynamic()
                        .gravity_scale(0.0)
                        .fixed_rotation(false),
                    0.0,
                );
                (base, Payload::Shard(Shard))
            }
        };

        if matches!(record.kind, SpawnKind::Player) {
            self.player_id = Some(id);
            self.respawn = position;
        }
        self.insert(Entity::new(base, payload))
            .with_context(|| format!("spawning {:?}", record.kind))
    }

    fn spawn_projectile(&mut self, request: ProjectileSpawn) -> Result<EntityId> {
        let id = self.next_id;
        let base = EntityBase::new(
            id,
            request.position,
            projectile::STATE_IDLE,
            self.table("projectile")?,
            BodyBuilder::new_dynamic()
                .gravity_scale(0.0)
                .linvel(request.velocity),
            0.0,
        );
        let core = EnemyCore::new(self.tuning.projectile_max_health, request.position, 0.0);
        self.insert(Entity::new(
            base,
            Payload::Projectile(Projectile::new(core, request.velocity)),
        ))
    }

    /// Activate an entity, build its first frame of fixtures, and index it
    fn insert(&mut self, mut entity: Entity) -> Result<EntityId> {
        let id = entity.id();
        entity.base.activate(&mut self.physics)?;
        let delta = entity.sync(&mut self.physics);
        for (handle, tag) in delta.created {
            self.tags.insert(handle, tag);
        }
        self.index.insert(id, self.entities.len());
        self.entities.push(entity);
        self.next_id += 1;
        Ok(id)
    }

    /// Advance the whole level by one fixed timestep
    pub fn tick(&mut self, input: InputFrame) {
        self.ticks += 1;

        let snapshot = self.player_snapshot();
        self.refresh_targets(snapshot);

        // Update pass: transition tables and impulses
        {
            let mut ctx = UpdateCtx {
                physics: &mut self.physics,
                tuning: &self.tuning,
                input,
                player_pos: snapshot.map(|s| s.1),
                player_dir: snapshot.map(|s| s.2).unwrap_or(1),
            };
            for entity in self.entities.iter_mut() {
                entity.update(&mut ctx);
            }
        }

        // Additions requested during the pass are applied only now
        let mut requests = Vec::new();
        for entity in self.entities.iter_mut() {
            if let Payload::Wisp(wisp) = &mut entity.payload {
                requests.append(&mut wisp.spawned);
            }
        }
        for request in requests {
            if let Err(err) = self.spawn_projectile(request) {
                log::error!("projectile spawn failed: {err:#}");
            }
        }

        // Manual damage pass, outside the contact callback path
        if let Some(player_index) = self.player_index() {
            combat::apply_attack_damage(
                &mut self.entities,
                player_index,
                &self.physics,
                &self.tuning,
            );
        }

        // Sync pass: every entity swaps in its current frame's fixtures
        for i in 0..self.entities.len() {
            let delta = self.entities[i].sync(&mut self.physics);
            for (handle, tag) in delta.created {
                self.tags.insert(handle, tag);
            }
        }

        self.physics.step();
        self.dispatch_contacts();

        // Stale tag entries have served any removal events by now
        {
            let physics = &self.physics;
            self.tags.retain(|handle, _| physics.collider(*handle).is_some());
        }

        self.apply_enemy_slowdown();
        self.claim_checkpoints();
        self.respawn_dead_player();
        self.apply_removals();
    }

    fn player_index(&self) -> Option<usize> {
        self.player_id.and_then(|id| self.index.get(&id).copied())
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player_index().map(|i| &self.entities[i])
    }

    fn player_snapshot(&self) -> Option<(EntityId, Vec2, i8, bool)> {
        let entity = self.player()?;
        let player = entity.player()?;
        Some((
            entity.id(),
            entity.base.position(&self.physics),
            entity.base.dir,
            player.alive,
        ))
    }

    /// Turn vision sightings into per-tick target positions
    fn refresh_targets(&mut self, snapshot: Option<(EntityId, Vec2, i8, bool)>) {
        for entity in self.entities.iter_mut() {
            if let Some(core) = entity.enemy_core_mut() {
                core.target = match snapshot {
                    Some((pid, pos, _, true)) if core.seen.contains(&pid) => Some(pos),
                    _ => None,
                };
            }
        }
    }

    /// Resolve the step's contact events. Per-tick fixture rebuilds mean a
    /// persisting overlap re-begins every step, so ends are applied before
    /// begins and a live contact never flickers off.
    fn dispatch_contacts(&mut self) {
        let events = self.physics.drain_contact_events();
        let mut begins = Vec::new();
        let mut ends = Vec::new();
        for event in events {
            match event {
                ContactEvent::Begin(a, b) => begins.push((a, b)),
                ContactEvent::End(a, b) => ends.push((a, b)),
            }
        }
        for (phase, pairs) in [(Phase::End, ends), (Phase::Begin, begins)] {
            for (a, b) in pairs {
                let (Some(&tag_a), Some(&tag_b)) = (self.tags.get(&a), self.tags.get(&b)) else {
                    continue;
                };
                self.resolver
                    .resolve(phase, tag_a, tag_b, &self.index, &mut self.entities);
            }
        }
    }

    fn apply_enemy_slowdown(&mut self) {
        let physics = &mut self.physics;
        for entity in self.entities.iter_mut() {
            let core = match &mut entity.payload {
                Payload::Spider(s) => &mut s.core,
                Payload::Wisp(w) => &mut w.core,
                Payload::Wyrm(w) => &mut w.core,
                Payload::Blob(b) => &mut b.core,
                Payload::Projectile(p) => &mut p.core,
                _ => continue,
            };
            if core.is_suspended() {
                // A suspended enemy becomes static ground
                let handle = entity.base.body();
                if physics.body_type(handle) != Some(RigidBodyType::Fixed) {
                    physics.set_velocity(handle, Vec2::ZERO);
                    physics.set_body_type(handle, RigidBodyType::Fixed);
                }
                continue;
            }
            enemy::post_step(core, &entity.base, physics);
        }
    }

    /// A checkpoint activated this tick becomes the respawn point
    fn claim_checkpoints(&mut self) {
        for entity in &self.entities {
            if let Payload::Checkpoint(checkpoint) = &entity.payload {
                if checkpoint.activated && self.claimed_checkpoints.insert(entity.id()) {
                    self.respawn = entity.base.spawn_point();
                    log::info!("respawn moved to {:?}", self.respawn);
                }
            }
        }
    }

    fn respawn_dead_player(&mut self) {
        let Some(player_index) = self.player_index() else {
            return;
        };
        let dead = self.entities[player_index]
            .player()
            .map(|p| !p.alive)
            .unwrap_or(false);
        if !dead {
            return;
        }
        let respawn = self.respawn;
        let Entity { base, payload } = &mut self.entities[player_index];
        if let Payload::Player(p) = payload {
            player::respawn(base, p, &mut self.physics, respawn);
        }
    }

    /// Apply deferred removals, never during iteration
    fn apply_removals(&mut self) {
        if !self.entities.iter().any(Entity::should_remove) {
            return;
        }
        let physics = &mut self.physics;
        for entity in self.entities.iter_mut() {
            if entity.should_remove() {
                log::debug!("removing entity {}", entity.id());
                entity.base.deactivate(physics);
            }
        }
        self.entities.retain(|e| !e.should_remove());
        self.index = self
            .entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id(), i))
            .collect();
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&i| &self.entities[i])
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Live tuning access for the dev-mode editor
    pub fn tuning_mut(&mut self) -> &mut Tuning {
        &mut self.tuning
    }

    pub fn respawn_point(&self) -> Vec2 {
        self.respawn
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether the player has reached the level-end altar
    pub fn altar_reached(&self) -> bool {
        self.entities.iter().any(|e| match &e.payload {
            Payload::Altar(altar) => altar.reached,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> SpawnRecord {
        SpawnRecord::new(
            SpawnKind::Platform {
                half_extents: Vec2::new(20.0, 0.5),
            },
            Vec2::new(0.0, -0.5),
        )
    }

    fn level_with(records: &[SpawnRecord]) -> Level {
        let mut level = Level::new(Tuning::default());
        level.load(records).unwrap();
        level
    }

    fn player_state(level: &Level) -> PlayerState {
        Player::state(&level.player().unwrap().base)
    }

    fn projectile_count(level: &Level) -> usize {
        level
            .entities()
            .iter()
            .filter(|e| matches!(e.payload, Payload::Projectile(_)))
            .count()
    }

    #[test]
    fn test_player_lands_and_idles() {
        let mut level = level_with(&[
            ground(),
            SpawnRecord::new(SpawnKind::Player, Vec2::new(0.0, 0.6)),
        ]);
        for _ in 0..30 {
            level.tick(InputFrame::idle());
        }
        let player = level.player().unwrap();
        assert!(player.player().unwrap().grounded);
        assert_eq!(player_state(&level), PlayerState::Idle);
    }

    #[test]
    fn test_walk_moves_player() {
        let mut level = level_with(&[
            ground(),
            SpawnRecord::new(SpawnKind::Player, Vec2::new(0.0, 0.6)),
        ]);
        for _ in 0..30 {
            level.tick(InputFrame::idle());
        }
        let start = level.player().unwrap().base.position(level.physics()).x;
        for _ in 0..60 {
            level.tick(InputFrame::idle().with_horizontal(1));
        }
        let end = level.player().unwrap().base.position(level.physics()).x;
        assert!(end > start + 1.0);
        assert_eq!(player_state(&level), PlayerState::Walk);
    }

    #[test]
    fn test_attack_damages_adjacent_spider() {
        let mut level = level_with(&[
            ground(),
            SpawnRecord::new(SpawnKind::Player, Vec2::new(0.0, 0.6)),
            SpawnRecord::new(SpawnKind::Spider, Vec2::new(0.8, 0.3)),
        ]);
        for _ in 0..10 {
            level.tick(InputFrame::idle());
        }
        let spider_id = level
            .entities()
            .iter()
            .find(|e| matches!(e.payload, Payload::Spider(_)))
            .unwrap()
            .id();
        let full = level.tuning().enemy_max_health;

        level.tick(InputFrame::idle().with_attack());
        for _ in 0..8 {
            level.tick(InputFrame::idle());
        }
        let health = level.entity(spider_id).unwrap().enemy_core().unwrap().health();
        assert_eq!(health, full - level.tuning().attack_damage);
    }

    #[test]
    fn test_wisp_fires_projectile_that_expires() {
        let mut level = level_with(&[
            ground(),
            SpawnRecord::new(SpawnKind::Player, Vec2::new(0.0, 0.6)),
            SpawnRecord::new(SpawnKind::Wisp, Vec2::new(1.8, 1.5)),
        ]);
        // Run until the first shot appears
        let mut first_shot = None;
        for _ in 0..120 {
            level.tick(InputFrame::idle());
            if first_shot.is_none() {
                first_shot = level
                    .entities()
                    .iter()
                    .find(|e| matches!(e.payload, Payload::Projectile(_)))
                    .map(Entity::id);
            }
        }
        let first_shot = first_shot.expect("wisp never fired");

        // The first projectile outlives its tick lifetime and is culled,
        // even while the wisp keeps firing fresh ones
        for _ in 0..level.tuning().projectile_life + 10 {
            level.tick(InputFrame::idle());
        }
        assert!(level.entity(first_shot).is_none());
        assert!(projectile_count(&level) >= 1);
    }

    #[test]
    fn test_suspended_enemy_body_turns_static() {
        let mut level = level_with(&[
            ground(),
            SpawnRecord::new(SpawnKind::Player, Vec2::new(-3.0, 0.6)),
            SpawnRecord::new(SpawnKind::Spider, Vec2::new(3.0, 0.3)),
        ]);
        let handle = level.entities[2].base.body();
        assert_ne!(level.physics().body_type(handle), Some(RigidBodyType::Fixed));

        level.entities[2].enemy_core_mut().unwrap().lower_health(100.0);
        level.tick(InputFrame::idle());
        assert_eq!(level.physics().body_type(handle), Some(RigidBodyType::Fixed));
        assert!(level.entities[2].is_standable());
    }

    #[test]
    fn test_player_death_respawns_at_spawn() {
        let mut level = level_with(&[
            ground(),
            SpawnRecord::new(SpawnKind::Player, Vec2::new(0.0, 0.6)),
            SpawnRecord::new(SpawnKind::Blob, Vec2::new(0.0, 0.6)),
        ]);
        for _ in 0..3 {
            level.tick(InputFrame::idle());
        }
        // Contact with the live blob is lethal; the driver respawns the
        // player the same tick
        let player = level.player().unwrap();
        assert!(player.player().unwrap().alive);
        let position = player.base.position(level.physics());
        assert!((position - Vec2::new(0.0, 0.6)).length() < 0.2);
    }

    #[test]
    fn test_checkpoint_moves_respawn() {
        let mut level = level_with(&[
            ground(),
            SpawnRecord::new(SpawnKind::Player, Vec2::new(0.0, 0.6)),
            SpawnRecord::new(SpawnKind::Checkpoint, Vec2::new(0.0, 0.5)),
        ]);
        assert_eq!(level.respawn_point(), Vec2::new(0.0, 0.6));
        for _ in 0..5 {
            level.tick(InputFrame::idle());
        }
        assert_eq!(level.respawn_point(), Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_altar_contact_is_recorded() {
        let mut level = level_with(&[
            ground(),
            SpawnRecord::new(SpawnKind::Player, Vec2::new(0.0, 0.6)),
            SpawnRecord::new(SpawnKind::Altar, Vec2::new(0.0, 0.6)),
        ]);
        assert!(!level.altar_reached());
        for _ in 0..3 {
            level.tick(InputFrame::idle());
        }
        assert!(level.altar_reached());
    }

    #[test]
    fn test_shard_trails_player() {
        let mut level = level_with(&[
            ground(),
            SpawnRecord::new(SpawnKind::Player, Vec2::new(0.0, 0.6)),
            SpawnRecord::new(SpawnKind::Shard, Vec2::new(-2.0, 2.0)),
        ]);
        for _ in 0..120 {
            level.tick(InputFrame::idle());
        }
        let player_pos = level.player().unwrap().base.position(level.physics());
        let shard = level
            .entities()
            .iter()
            .find(|e| matches!(e.payload, Payload::Shard(_)))
            .unwrap();
        let shard_pos = shard.base.position(level.physics());
        assert!(shard_pos.distance(player_pos) < 1.5);
    }

    #[test]
    fn test_tooltip_shows_near_player() {
        let mut level = level_with(&[
            ground(),
            SpawnRecord::new(SpawnKind::Player, Vec2::new(0.0, 0.6)),
            SpawnRecord::new(SpawnKind::Tooltip, Vec2::new(0.5, 0.6)),
        ]);
        for _ in 0..5 {
            level.tick(InputFrame::idle());
        }
        let tooltip = level
            .entities()
            .iter()
            .find(|e| matches!(e.payload, Payload::Tooltip(_)))
            .unwrap();
        assert!(Tooltip::is_shown(&tooltip.base));
    }
}
