// Physics world wrapper around the rapier2d pipeline

use glam::Vec2;
use rapier2d::prelude::*;

use super::collision::{ContactEvent, ContactEventQueue};

/// Fixed simulation timestep (60 Hz)
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

/// Owns the complete rapier simulation state and steps it at a fixed
/// timestep. Entities interact with it only through their own body and
/// collider handles.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    contact_events: ContactEventQueue,
}

impl PhysicsWorld {
    /// Create a world with the given downward gravity magnitude
    pub fn new(gravity_y: f32) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = PHYSICS_DT;

        Self {
            gravity: vector![0.0, gravity_y],
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            contact_events: ContactEventQueue::new(),
        }
    }

    /// Advance the simulation by one fixed timestep
    pub fn step(&mut self) {
        self.contact_events.clear();
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &self.contact_events,
        );
    }

    /// Take the contact events raised during the last step
    pub fn drain_contact_events(&mut self) -> Vec<ContactEvent> {
        self.contact_events.drain()
    }

    pub fn add_rigid_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        let handle = self.rigid_body_set.insert(body);
        // rapier defers mass-property computation to the next step; force it
        // now so the builder's mass is effective from insertion, as the
        // BodyBuilder contract promises
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.recompute_mass_properties_from_colliders(&self.collider_set);
        }
        handle
    }

    pub fn add_collider(
        &mut self,
        collider: Collider,
        parent: RigidBodyHandle,
    ) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    /// Remove a body and all of its attached colliders
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set
            .remove(handle, &mut self.island_manager, &mut self.rigid_body_set, true);
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.collider_set.get(handle)
    }

    pub fn body_type(&self, handle: RigidBodyHandle) -> Option<RigidBodyType> {
        self.body(handle).map(RigidBody::body_type)
    }

    pub fn set_body_type(&mut self, handle: RigidBodyHandle, body_type: RigidBodyType) {
        if let Some(body) = self.body_mut(handle) {
            body.set_body_type(body_type, true);
        }
    }

    // Convenience accessors used by the game layer; all take and return
    // glam vectors.

    pub fn position(&self, handle: RigidBodyHandle) -> Vec2 {
        self.body(handle)
            .map(|b| Vec2::new(b.translation().x, b.translation().y))
            .unwrap_or_default()
    }

    pub fn set_position(&mut self, handle: RigidBodyHandle, position: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.set_translation(vector![position.x, position.y], true);
        }
    }

    pub fn angle(&self, handle: RigidBodyHandle) -> f32 {
        self.body(handle).map(|b| b.rotation().angle()).unwrap_or(0.0)
    }

    pub fn velocity(&self, handle: RigidBodyHandle) -> Vec2 {
        self.body(handle)
            .map(|b| Vec2::new(b.linvel().x, b.linvel().y))
            .unwrap_or_default()
    }

    pub fn set_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.set_linvel(vector![velocity.x, velocity.y], true);
        }
    }

    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, angvel: f32) {
        if let Some(body) = self.body_mut(handle) {
            body.set_angvel(angvel, true);
        }
    }

    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.apply_impulse(vector![impulse.x, impulse.y], true);
        }
    }

    pub fn apply_force(&mut self, handle: RigidBodyHandle, force: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.add_force(vector![force.x, force.y], true);
        }
    }

    /// Clear the force accumulator fed by `apply_force`
    pub fn reset_forces(&mut self, handle: RigidBodyHandle) {
        if let Some(body) = self.body_mut(handle) {
            body.reset_forces(true);
        }
    }

    pub fn set_gravity_scale(&mut self, handle: RigidBodyHandle, scale: f32) {
        if let Some(body) = self.body_mut(handle) {
            body.set_gravity_scale(scale, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::body::BodyBuilder;

    #[test]
    fn test_add_and_query_body() {
        let mut world = PhysicsWorld::new(-70.0);
        let handle = world.add_rigid_body(
            BodyBuilder::new_dynamic()
                .position(Vec2::new(3.0, 4.0))
                .build(),
        );
        assert_eq!(world.position(handle), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_gravity_pulls_dynamic_body_down() {
        let mut world = PhysicsWorld::new(-70.0);
        let handle = world.add_rigid_body(
            BodyBuilder::new_dynamic()
                .position(Vec2::new(0.0, 10.0))
                .build(),
        );
        for _ in 0..10 {
            world.step();
        }
        assert!(world.velocity(handle).y < 0.0);
        assert!(world.position(handle).y < 10.0);
    }

    #[test]
    fn test_fixed_body_stays_put() {
        let mut world = PhysicsWorld::new(-70.0);
        let handle = world.add_rigid_body(
            BodyBuilder::new_fixed()
                .position(Vec2::new(0.0, 1.0))
                .build(),
        );
        for _ in 0..10 {
            world.step();
        }
        assert_eq!(world.position(handle), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_set_velocity_round_trip() {
        let mut world = PhysicsWorld::new(0.0);
        let handle = world.add_rigid_body(BodyBuilder::new_dynamic().build());
        world.set_velocity(handle, Vec2::new(2.0, -1.0));
        assert_eq!(world.velocity(handle), Vec2::new(2.0, -1.0));
    }

    #[test]
    fn test_remove_body() {
        let mut world = PhysicsWorld::new(0.0);
        let handle = world.add_rigid_body(BodyBuilder::new_dynamic().build());
        world.remove_rigid_body(handle);
        assert!(world.body(handle).is_none());
    }
}
