// Rigid body and fixture construction

use glam::Vec2;
use rapier2d::prelude::*;

use crate::core::math::ColliderShape;

use super::tag::ColliderTag;

pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

/// Pending description of a rigid body, held by an entity until it is
/// activated in the physics world
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    body_type: RigidBodyType,
    position: Vec2,
    linvel: Vec2,
    gravity_scale: f32,
    fixed_rotation: bool,
    can_sleep: bool,
    mass: f32,
}

impl BodyBuilder {
    /// A dynamic body (affected by gravity and impulses)
    pub fn new_dynamic() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: Vec2::ZERO,
            linvel: Vec2::ZERO,
            gravity_scale: 1.0,
            fixed_rotation: true,
            can_sleep: true,
            mass: 1.0,
        }
    }

    /// A kinematic velocity-based body (driven by set velocities only)
    pub fn new_kinematic() -> Self {
        Self {
            body_type: RigidBodyType::KinematicVelocityBased,
            position: Vec2::ZERO,
            linvel: Vec2::ZERO,
            gravity_scale: 0.0,
            fixed_rotation: true,
            can_sleep: false,
            mass: 1.0,
        }
    }

    /// A fixed (static) body
    pub fn new_fixed() -> Self {
        Self {
            body_type: RigidBodyType::Fixed,
            position: Vec2::ZERO,
            linvel: Vec2::ZERO,
            gravity_scale: 0.0,
            fixed_rotation: true,
            can_sleep: false,
            mass: 0.0,
        }
    }

    pub fn position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn linvel(mut self, linvel: Vec2) -> Self {
        self.linvel = linvel;
        self
    }

    /// Gravity scale (1.0 = normal gravity, 0.0 = none)
    pub fn gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Whether rotation is locked (true for almost every entity; the
    /// player's shard spins freely)
    pub fn fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn body_type(&self) -> RigidBodyType {
        self.body_type
    }

    pub fn initial_position(&self) -> Vec2 {
        self.position
    }

    /// Build the rapier rigid body
    pub fn build(&self) -> RigidBody {
        let mut builder = RigidBodyBuilder::new(self.body_type)
            .translation(vector![self.position.x, self.position.y])
            .linvel(vector![self.linvel.x, self.linvel.y])
            .gravity_scale(self.gravity_scale)
            .can_sleep(self.can_sleep);
        if self.mass > 0.0 {
            builder = builder.additional_mass(self.mass);
        }
        if self.fixed_rotation {
            builder = builder.locked_axes(LockedAxes::ROTATION_LOCKED);
        }
        builder.build()
    }
}

/// Build a fixture for one collider-geometry descriptor.
///
/// Hurtboxes are solid; every other role is a sensor fixture. All fixtures
/// request contact events and carry the owner tag in `user_data`. Fixtures
/// are massless: the body's mass comes from its `BodyBuilder` so per-tick
/// fixture rebuilds never change how impulses land.
pub fn build_collider(shape: &ColliderShape, tag: ColliderTag, friction: f32) -> Collider {
    let builder = match *shape {
        ColliderShape::Circle { center, radius } => {
            ColliderBuilder::ball(radius).translation(vector![center.x, center.y])
        }
        ColliderShape::Box {
            center,
            half_extents,
            angle,
        } => ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .position(Isometry::new(vector![center.x, center.y], angle)),
    };
    builder
        .sensor(!tag.role.is_solid())
        .density(0.0)
        .friction(friction)
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .user_data(tag.pack())
        .build()
}
