//! Cadenza: a 2D action-platformer gameplay core.
//!
//! Entities are per-kind finite-state machines layered over a rapier2d
//! simulation. Each animation state owns its frames, each frame owns its
//! collision geometry, and `sync` swaps that geometry into the physics
//! world exactly once per fixed timestep. The level driver runs the tick
//! pipeline; rendering, audio, and input polling are external
//! collaborators.

pub mod core;
pub mod engine;
pub mod game;
