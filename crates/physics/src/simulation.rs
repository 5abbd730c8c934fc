//! # Physics Simulation Core
//!
//! This module provides the main physics simulation structure and high-level
//! execution methods. It coordinates integration, joint solving and ground
//! contact for every rigid body in the scene.

use crate::body::RigidBody;
use crate::error::PhysicsError;
use crate::integrator::{predict_bodies, update_velocities};
use crate::steps::contact::resolve_ground_contacts;
use crate::steps::joint::solve_ball_joints;
use crate::types::{BallJoint, PhysParams};

/// Main physics simulation container
#[derive(Clone, Debug, Default)]
pub struct PhysicsSim {
    pub bodies: Vec<RigidBody>,
    pub joints: Vec<BallJoint>,
    pub params: PhysParams,
    steps_taken: u64,
}

impl PhysicsSim {
    /// Create a new empty simulation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed physics steps.
    #[must_use]
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] if `index` is out of range.
    pub fn body(&self, index: usize) -> Result<&RigidBody, PhysicsError> {
        self.bodies.get(index).ok_or(PhysicsError::UnknownBody(index))
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] if `index` is out of range.
    pub fn body_mut(&mut self, index: usize) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies.get_mut(index).ok_or(PhysicsError::UnknownBody(index))
    }

    /// Execute one physics step on CPU using `params.dt`.
    pub fn step_cpu(&mut self) {
        let dt = self.params.dt;

        // 1. Apply gravity and integrate poses
        let prev = predict_bodies(&mut self.bodies, &self.params, dt);

        // 2. Solve constraints
        solve_ball_joints(&mut self.bodies, &self.joints, self.params.joint_iterations);

        // 3. Resolve ground contact
        if let Some(height) = self.params.ground_height {
            resolve_ground_contacts(&mut self.bodies, &prev, height, self.params.ground_friction);
        }

        // 4. Derive velocities from the corrected poses
        update_velocities(&mut self.bodies, &prev, &self.params, dt);

        self.steps_taken += 1;
    }

    /// Run simulation for multiple steps (CPU)
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidTimeStep`] unless `dt` is positive and finite.
    pub fn run_cpu(&mut self, dt: f32, steps: usize) -> Result<(), PhysicsError> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(PhysicsError::InvalidTimeStep(dt));
        }
        self.params.dt = dt;
        for _ in 0..steps {
            self.step_cpu();
        }
        Ok(())
    }
}
