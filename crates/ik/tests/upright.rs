use ik::{CenterOfMass, ControllerChain, IkController, LinkContext, UprightController};
use physics::{transform, PhysicsSim, Ragdoll, RigidBody, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

fn still(body: &RigidBody) -> CenterOfMass {
    CenterOfMass {
        mass: body.mass,
        location: body.pos,
        velocity: Vec3::ZERO,
    }
}

fn tick(controller: &mut UprightController, body: &mut RigidBody) -> Vec3 {
    let com = still(body);
    let mut link = LinkContext { body, ragdoll: com };
    controller.pre_tick(&mut link, 1.0 / 60.0).unwrap()
}

fn cube(orientation: [f32; 4]) -> RigidBody {
    RigidBody::new_box(Vec3::ZERO, Vec3::new(0.5, 0.5, 0.5), 6.0).with_orientation(orientation)
}

#[test]
fn upright_body_gets_no_torque() {
    let mut controller = UprightController::new(Vec3::UNIT_Y).unwrap();
    let mut body = cube(transform::IDENTITY);
    let impulse = tick(&mut controller, &mut body);
    assert_eq!(impulse, Vec3::ZERO);
    assert_eq!(body.angular_vel, Vec3::ZERO);
    assert_eq!(controller.previous_error(), Vec3::ZERO);
}

#[test]
fn inverted_body_still_gets_a_correction() {
    let mut controller = UprightController::new(Vec3::UNIT_Y).unwrap();
    let mut body = cube(transform::from_axis_angle(Vec3::UNIT_X, PI));
    let impulse = tick(&mut controller, &mut body);
    assert!(impulse.length() > 0.0);
    assert!(impulse.is_finite());
    assert!(body.angular_vel.length() > 0.0);
    // Saturated error: unit length, horizontal.
    let error = controller.previous_error();
    assert!((error.length() - 1.0).abs() < 1e-5);
    assert!(error.y.abs() < 1e-6);
}

#[test]
fn downward_direction_in_identity_body_is_antipodal() {
    let mut controller = UprightController::new(Vec3::new(0.0, -2.0, 0.0)).unwrap();
    let mut body = cube(transform::IDENTITY);
    let impulse = tick(&mut controller, &mut body);
    assert!(impulse.length() > 0.0);
}

#[test]
fn torque_turns_toward_vertical() {
    // Tilted 30 degrees about +Z: up points toward -X.
    let mut controller = UprightController::new(Vec3::UNIT_Y).unwrap();
    let mut body = cube(transform::from_axis_angle(Vec3::UNIT_Z, PI / 6.0));
    tick(&mut controller, &mut body);
    // Correcting means rotating back about -Z.
    assert!(body.angular_vel.z < 0.0);
    assert!(body.angular_vel.x.abs() < 1e-6 && body.angular_vel.y.abs() < 1e-6);
}

#[test]
fn first_tick_combines_delta_and_error_terms() {
    let mut controller = UprightController::new(Vec3::UNIT_Y).unwrap();
    controller.set_delta_gain_factor(0.1);
    controller.set_error_gain_factor(0.1);
    let mut body = cube(transform::from_axis_angle(Vec3::UNIT_Z, PI / 6.0));
    tick(&mut controller, &mut body);
    // previous error was zero, so delta == error; I * I^-1 cancels out.
    let expected = 0.2 * (PI / 6.0).sin();
    assert!((body.angular_vel.z + expected).abs() < 1e-4, "w={:?}", body.angular_vel);
}

#[test]
fn error_saturates_past_ninety_degrees() {
    let mut controller = UprightController::new(Vec3::UNIT_Y).unwrap();
    let mut body = cube(transform::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2 + 0.5));
    tick(&mut controller, &mut body);
    assert!((controller.previous_error().length() - 1.0).abs() < 1e-5);
}

#[test]
fn repeated_ticks_at_rest_drop_the_delta_term() {
    let mut controller = UprightController::new(Vec3::UNIT_Y).unwrap();
    let orientation = transform::from_axis_angle(Vec3::UNIT_X, 0.4);
    let mut first = cube(orientation);
    let a = tick(&mut controller, &mut first);
    let mut second = cube(orientation);
    let b = tick(&mut controller, &mut second);
    // Second tick has only the proportional term: half of the first.
    assert!((a * 0.5 - b).length() < 1e-5, "a={a:?} b={b:?}");
}

#[test]
fn closed_loop_rights_a_tilted_body() {
    let mut sim = PhysicsSim::new();
    sim.params.gravity = Vec3::ZERO;
    sim.params.ground_height = None;
    let idx = sim.add_body(cube(transform::from_axis_angle(Vec3::new(1.0, 0.0, 1.0), 1.0)));
    sim.bodies[idx].pos = Vec3::new(0.0, 2.0, 0.0);
    let ragdoll = Ragdoll::new(vec![idx], idx, vec![]).unwrap();
    let mut chain = ControllerChain::new();
    chain.push(idx, UprightController::new(Vec3::UNIT_Y).unwrap());

    for _ in 0..600 {
        let dt = sim.params.dt;
        chain.pre_tick(&mut sim, &ragdoll, dt).unwrap();
        sim.step_cpu();
    }
    let up = transform::rotate(sim.bodies[idx].orientation, Vec3::UNIT_Y);
    let tilt = up.y.clamp(-1.0, 1.0).acos();
    assert!(tilt < 0.05, "tilt={tilt}");
}
