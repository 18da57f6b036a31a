// Physics integration built on rapier2d

pub mod body;
pub mod collision;
pub mod tag;
pub mod world;

pub use body::{build_collider, BodyBuilder, ColliderHandle, RigidBodyHandle};
pub use collision::ContactEvent;
pub use tag::{ColliderRole, ColliderTag, EntityId};
pub use world::{PhysicsWorld, PHYSICS_DT};

// Re-export the rapier types that cross the game-layer boundary
pub use rapier2d::prelude::RigidBodyType;
