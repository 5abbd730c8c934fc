//! # Physics Simulation Builder
//!
//! Builder functions for adding rigid bodies and joints to the simulation.

use crate::body::RigidBody;
use crate::error::PhysicsError;
use crate::transform;
use crate::types::{BallJoint, Vec3};
use crate::PhysicsSim;

/// Builder methods for adding rigid bodies to the simulation
impl PhysicsSim {
    /// Add a body and return its index.
    pub fn add_body(&mut self, body: RigidBody) -> usize {
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    /// Add a solid box with the given half extents.
    pub fn add_box(&mut self, pos: Vec3, half_extents: Vec3, mass: f32) -> usize {
        self.add_body(RigidBody::new_box(pos, half_extents, mass))
    }

    /// Add a solid sphere.
    pub fn add_sphere(&mut self, pos: Vec3, radius: f32, mass: f32) -> usize {
        self.add_body(RigidBody::new_sphere(pos, radius, mass))
    }

    /// Add a solid cylinder with its axis along local Y.
    pub fn add_cylinder(&mut self, pos: Vec3, radius: f32, half_height: f32, mass: f32) -> usize {
        self.add_body(RigidBody::new_cylinder(pos, radius, half_height, mass))
    }
}

/// Builder methods for adding constraints/joints
impl PhysicsSim {
    /// Add a ball joint pinning `body_a` and `body_b` together at the world
    /// point `anchor`, expressed relative to the bodies' current poses.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] if either index is out of range.
    pub fn add_ball_joint(&mut self, body_a: usize, body_b: usize, anchor: Vec3) -> Result<usize, PhysicsError> {
        let a = *self.body(body_a)?;
        let b = *self.body(body_b)?;
        let to_local = |body: &RigidBody| {
            let inverse = [
                -body.orientation[0],
                -body.orientation[1],
                -body.orientation[2],
                body.orientation[3],
            ];
            transform::rotate(inverse, anchor - body.pos)
        };
        self.joints.push(BallJoint {
            body_a,
            body_b,
            anchor_a: to_local(&a),
            anchor_b: to_local(&b),
        });
        Ok(self.joints.len() - 1)
    }
}
