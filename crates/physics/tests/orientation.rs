use physics::{transform, PhysicsSim, Vec3};

#[test]
fn torque_impulse_spins_a_free_body() {
    let mut sim = PhysicsSim::new();
    sim.params.gravity = Vec3::ZERO;
    sim.params.ground_height = None;
    sim.params.angular_damping = 1.0;
    let idx = sim.add_box(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.5, 0.5, 0.5), 6.0);

    // I = m/12 * (1 + 1) = 1 about each axis
    sim.body_mut(idx).unwrap().apply_torque_impulse(Vec3::new(0.0, 0.0, 1.0));
    sim.run_cpu(0.01, 50).unwrap();

    let up = transform::rotate(sim.bodies[idx].orientation, Vec3::UNIT_Y);
    let angle = (-up.x).atan2(up.y);
    assert!((angle - 0.5).abs() < 1e-2, "angle={angle}");
}
