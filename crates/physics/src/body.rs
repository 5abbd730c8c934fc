//! # Rigid Bodies
//!
//! A single rigid body with a pose, velocities, mass and a diagonal inertia
//! tensor expressed in the body's local frame.

use crate::transform;
use crate::types::{BodyType, Mat3, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub pos: Vec3,
    pub vel: Vec3,
    /// xyzw quaternion, body-local to world.
    pub orientation: [f32; 4],
    pub angular_vel: Vec3,
    pub mass: f32,
    /// Diagonal of the inverse inertia tensor in body-local coordinates.
    pub inv_inertia_local: Vec3,
    /// Distance from the center to the lowest point, for ground contact.
    pub radius: f32,
    pub body_type: BodyType,
}

impl RigidBody {
    /// Solid box with the given half extents.
    #[must_use]
    pub fn new_box(pos: Vec3, half_extents: Vec3, mass: f32) -> Self {
        let (x2, y2, z2) = (
            4.0 * half_extents.x * half_extents.x,
            4.0 * half_extents.y * half_extents.y,
            4.0 * half_extents.z * half_extents.z,
        );
        let k = mass / 12.0;
        let inertia = Vec3::new(k * (y2 + z2), k * (x2 + z2), k * (x2 + y2));
        Self::with_inertia(pos, mass, inertia, half_extents.length())
    }

    /// Solid sphere.
    #[must_use]
    pub fn new_sphere(pos: Vec3, radius: f32, mass: f32) -> Self {
        let i = 0.4 * mass * radius * radius;
        Self::with_inertia(pos, mass, Vec3::new(i, i, i), radius)
    }

    /// Solid cylinder with its axis along local Y.
    #[must_use]
    pub fn new_cylinder(pos: Vec3, radius: f32, half_height: f32, mass: f32) -> Self {
        let height = 2.0 * half_height;
        let side = mass * (3.0 * radius * radius + height * height) / 12.0;
        let axial = 0.5 * mass * radius * radius;
        let reach = (radius * radius + half_height * half_height).sqrt();
        Self::with_inertia(pos, mass, Vec3::new(side, axial, side), reach)
    }

    fn with_inertia(pos: Vec3, mass: f32, inertia: Vec3, radius: f32) -> Self {
        let inv = |i: f32| if i > 0.0 { 1.0 / i } else { 0.0 };
        Self {
            pos,
            vel: Vec3::ZERO,
            orientation: transform::IDENTITY,
            angular_vel: Vec3::ZERO,
            mass,
            inv_inertia_local: Vec3::new(inv(inertia.x), inv(inertia.y), inv(inertia.z)),
            radius,
            body_type: BodyType::Dynamic,
        }
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: [f32; 4]) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_body_type(mut self, body_type: BodyType) -> Self {
        self.body_type = body_type;
        self
    }

    #[must_use]
    pub fn is_kinematic(&self) -> bool {
        self.body_type == BodyType::Kinematic
    }

    #[must_use]
    pub fn inverse_mass(&self) -> f32 {
        if self.is_kinematic() || self.mass <= 0.0 {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Inverse inertia tensor in world coordinates: `R * diag(inv) * R^T`.
    #[must_use]
    pub fn inverse_inertia_world(&self) -> Mat3 {
        let r = Mat3::from_quat(self.orientation);
        r.mul_mat(&Mat3::from_diagonal(self.inv_inertia_local))
            .mul_mat(&r.transpose())
    }

    /// Transform a body-local point into world coordinates.
    #[must_use]
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.pos + transform::rotate(self.orientation, local)
    }

    /// Change linear velocity by `impulse / mass`. Ignored for kinematic bodies.
    pub fn apply_central_impulse(&mut self, impulse: Vec3) {
        self.vel += impulse * self.inverse_mass();
    }

    /// Change angular velocity by the world-frame inverse inertia times
    /// `impulse`. Ignored for kinematic bodies.
    pub fn apply_torque_impulse(&mut self, impulse: Vec3) {
        if self.is_kinematic() {
            return;
        }
        self.angular_vel += self.inverse_inertia_world().mul_vec(impulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn central_impulse_scales_with_mass() {
        let mut body = RigidBody::new_sphere(Vec3::ZERO, 0.5, 2.0);
        body.apply_central_impulse(Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(body.vel, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn kinematic_body_ignores_impulses() {
        let mut body = RigidBody::new_box(Vec3::ZERO, Vec3::new(0.5, 0.5, 0.5), 1.0)
            .with_body_type(BodyType::Kinematic);
        body.apply_central_impulse(Vec3::UNIT_X);
        body.apply_torque_impulse(Vec3::UNIT_Z);
        assert_eq!(body.vel, Vec3::ZERO);
        assert_eq!(body.angular_vel, Vec3::ZERO);
    }

    #[test]
    fn world_inertia_follows_rotation() {
        // Long box along local X, rotated a quarter turn about Z so the long
        // axis points along world Y.
        let body = RigidBody::new_box(Vec3::ZERO, Vec3::new(2.0, 0.1, 0.1), 1.0)
            .with_orientation(transform::from_axis_angle(Vec3::UNIT_Z, std::f32::consts::FRAC_PI_2));
        let local = body.inv_inertia_local;
        let world = body.inverse_inertia_world();
        assert!((world.cols[1].y - local.x).abs() / local.x < 1e-4);
        assert!((world.cols[0].x - local.y).abs() / local.y < 1e-4);
    }

    #[test]
    fn torque_impulse_uses_inverse_inertia() {
        let mut body = RigidBody::new_sphere(Vec3::ZERO, 1.0, 2.5);
        // I = 0.4 * 2.5 * 1 = 1
        body.apply_torque_impulse(Vec3::new(0.0, 0.0, 3.0));
        assert!((body.angular_vel - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-6);
    }
}
