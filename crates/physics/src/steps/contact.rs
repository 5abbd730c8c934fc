use crate::body::RigidBody;
use crate::integrator::PrevPose;

/// Push bodies out of the ground plane at `height` and cancel part of their
/// horizontal slip while in contact.
pub fn resolve_ground_contacts(bodies: &mut [RigidBody], prev: &[PrevPose], height: f32, friction: f32) {
    for (body, prev) in bodies.iter_mut().zip(prev) {
        if body.is_kinematic() {
            continue;
        }
        let penetration = height - (body.pos.y - body.radius);
        if penetration <= 0.0 {
            continue;
        }
        body.pos.y += penetration;
        body.pos.x -= (body.pos.x - prev.pos.x) * friction;
        body.pos.z -= (body.pos.z - prev.pos.z) * friction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    #[test]
    fn body_rests_on_ground() {
        let mut bodies = vec![RigidBody::new_sphere(Vec3::new(1.0, 0.1, 0.0), 0.5, 1.0)];
        let prev = [PrevPose {
            pos: Vec3::new(0.0, 0.6, 0.0),
            orientation: bodies[0].orientation,
        }];
        resolve_ground_contacts(&mut bodies, &prev, 0.0, 0.5);
        assert!((bodies[0].pos.y - 0.5).abs() < 1e-6);
        assert!((bodies[0].pos.x - 0.5).abs() < 1e-6);
    }
}
