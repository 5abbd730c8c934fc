use crate::body::RigidBody;
use crate::transform;
use crate::types::{BallJoint, Mat3, Vec3};

/// Borrow two distinct bodies mutably.
fn pair_mut(bodies: &mut [RigidBody], a: usize, b: usize) -> Option<(&mut RigidBody, &mut RigidBody)> {
    if a == b || a >= bodies.len() || b >= bodies.len() {
        return None;
    }
    if a < b {
        let (lo, hi) = bodies.split_at_mut(b);
        Some((&mut lo[a], &mut hi[0]))
    } else {
        let (lo, hi) = bodies.split_at_mut(a);
        Some((&mut hi[0], &mut lo[b]))
    }
}

fn solver_inverse_inertia(body: &RigidBody) -> Mat3 {
    if body.is_kinematic() {
        Mat3::from_diagonal(Vec3::ZERO)
    } else {
        body.inverse_inertia_world()
    }
}

/// Move the bodies of each joint so that their pivots coincide.
/// Each body is corrected in proportion to its generalized inverse mass.
pub fn solve_ball_joints(bodies: &mut [RigidBody], joints: &[BallJoint], iterations: u32) {
    for _ in 0..iterations {
        for joint in joints {
            let Some((a, b)) = pair_mut(bodies, joint.body_a, joint.body_b) else {
                continue;
            };
            let ra = transform::rotate(a.orientation, joint.anchor_a);
            let rb = transform::rotate(b.orientation, joint.anchor_b);
            let gap = (b.pos + rb) - (a.pos + ra);
            let separation = gap.length();
            if separation < 1e-6 {
                continue;
            }
            let n = gap / separation;

            let inv_ia = solver_inverse_inertia(a);
            let inv_ib = solver_inverse_inertia(b);
            let ra_n = ra.cross(n);
            let rb_n = rb.cross(n);
            let wa = a.inverse_mass() + ra_n.dot(inv_ia.mul_vec(ra_n));
            let wb = b.inverse_mass() + rb_n.dot(inv_ib.mul_vec(rb_n));
            let w = wa + wb;
            if w <= 0.0 {
                continue;
            }

            let p = n * (separation / w);
            a.pos += p * a.inverse_mass();
            a.orientation = transform::integrate_orientation(a.orientation, inv_ia.mul_vec(ra.cross(p)), 1.0);
            b.pos -= p * b.inverse_mass();
            b.orientation = transform::integrate_orientation(b.orientation, -inv_ib.mul_vec(rb.cross(p)), 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BodyType;

    #[test]
    fn pivots_are_pulled_together() {
        let mut bodies = vec![
            RigidBody::new_sphere(Vec3::ZERO, 0.2, 1.0).with_body_type(BodyType::Kinematic),
            RigidBody::new_sphere(Vec3::new(0.0, -1.3, 0.0), 0.2, 1.0),
        ];
        let joints = [BallJoint {
            body_a: 0,
            body_b: 1,
            anchor_a: Vec3::ZERO,
            anchor_b: Vec3::new(0.0, 1.0, 0.0),
        }];
        solve_ball_joints(&mut bodies, &joints, 10);

        assert_eq!(bodies[0].pos, Vec3::ZERO);
        let pivot_b = bodies[1].local_to_world(joints[0].anchor_b);
        assert!(pivot_b.length() < 1e-3, "pivot_b={pivot_b:?}");
    }

    #[test]
    fn self_joint_is_ignored() {
        let mut bodies = vec![RigidBody::new_sphere(Vec3::ZERO, 0.2, 1.0)];
        let joints = [BallJoint {
            body_a: 0,
            body_b: 0,
            anchor_a: Vec3::UNIT_X,
            anchor_b: Vec3::ZERO,
        }];
        solve_ball_joints(&mut bodies, &joints, 4);
        assert_eq!(bodies[0].pos, Vec3::ZERO);
    }
}
