//! # Physics Integration
//!
//! Position-based stepping: bodies are advanced to predicted poses, the
//! constraint passes move those poses, and velocities are then recovered
//! from the total displacement.

use crate::body::RigidBody;
use crate::transform;
use crate::types::{PhysParams, Vec3};

/// Pose of a body at the start of a step.
#[derive(Copy, Clone, Debug)]
pub struct PrevPose {
    pub pos: Vec3,
    pub orientation: [f32; 4],
}

/// Apply gravity and advance every dynamic body's pose by its velocity.
/// Returns the poses the bodies had before the update.
pub fn predict_bodies(bodies: &mut [RigidBody], params: &PhysParams, dt: f32) -> Vec<PrevPose> {
    bodies
        .iter_mut()
        .map(|body| {
            let prev = PrevPose {
                pos: body.pos,
                orientation: body.orientation,
            };
            if !body.is_kinematic() {
                body.vel += params.gravity * dt;
                body.pos += body.vel * dt;
                body.orientation = transform::integrate_orientation(body.orientation, body.angular_vel, dt);
            }
            prev
        })
        .collect()
}

/// Recover velocities from the displacement since `prev` and apply damping.
pub fn update_velocities(bodies: &mut [RigidBody], prev: &[PrevPose], params: &PhysParams, dt: f32) {
    for (body, prev) in bodies.iter_mut().zip(prev) {
        if body.is_kinematic() {
            continue;
        }
        body.vel = (body.pos - prev.pos) / dt * params.linear_damping;
        body.angular_vel = transform::angular_velocity_between(prev.orientation, body.orientation, dt)
            * params.angular_damping;
    }
}
