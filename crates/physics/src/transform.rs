//! Quaternion helpers for body orientation.
//!
//! Orientations are stored as `[f32; 4]` in xyzw order; the heavy lifting is
//! done by `glam`.

use crate::types::Vec3;
use glam::Quat;

pub const IDENTITY: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Rotate `v` from body-local into world coordinates.
#[must_use]
pub fn rotate(orientation: [f32; 4], v: Vec3) -> Vec3 {
    (Quat::from_array(orientation) * glam::Vec3::from(v)).into()
}

/// Quaternion for a rotation of `angle` radians about `axis`.
/// A zero axis yields the identity.
#[must_use]
pub fn from_axis_angle(axis: Vec3, angle: f32) -> [f32; 4] {
    match axis.try_normalize() {
        Some(unit) => Quat::from_axis_angle(unit.into(), angle).to_array(),
        None => IDENTITY,
    }
}

/// Advance an orientation by angular velocity `omega` over `dt` seconds.
/// The result is re-normalized.
#[must_use]
pub fn integrate_orientation(orientation: [f32; 4], omega: Vec3, dt: f32) -> [f32; 4] {
    let q = Quat::from_array(orientation);
    let spin = Quat::from_xyzw(omega.x, omega.y, omega.z, 0.0) * q;
    let next = Quat::from_xyzw(
        q.x + 0.5 * dt * spin.x,
        q.y + 0.5 * dt * spin.y,
        q.z + 0.5 * dt * spin.z,
        q.w + 0.5 * dt * spin.w,
    );
    let len = next.length();
    if len > 0.0 && len.is_finite() {
        (next / len).to_array()
    } else {
        IDENTITY
    }
}

/// Angular velocity that carries `prev` to `next` over `dt` seconds.
#[must_use]
pub fn angular_velocity_between(prev: [f32; 4], next: [f32; 4], dt: f32) -> Vec3 {
    let dq = Quat::from_array(next) * Quat::from_array(prev).conjugate();
    let omega = Vec3::new(dq.x, dq.y, dq.z) * (2.0 / dt);
    if dq.w < 0.0 {
        -omega
    } else {
        omega
    }
}
