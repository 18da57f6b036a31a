// Gameplay core: entities, state machines, combat, and the level driver

pub mod animation;
pub mod blob;
pub mod combat;
pub mod config;
pub mod content;
pub mod enemy;
pub mod entity;
pub mod level;
pub mod player;
pub mod projectile;
pub mod props;
pub mod shard;
pub mod spider;
pub mod wisp;
pub mod wyrm;
