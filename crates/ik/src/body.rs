//! The two collaborators a controller reads from: the rigid body it drives
//! and the aggregate state of the ragdoll that body belongs to.

use physics::{transform, CenterOfMass, Mat3, PhysicsError, Ragdoll, RigidBody, Vec3};

/// A rigid body a controller can read and push.
///
/// Implemented for [`physics::RigidBody`]; other engines can implement it to
/// host the controllers.
pub trait ControlledBody {
    /// World location of the center of mass.
    fn location(&self) -> Vec3;

    /// Body-to-world rotation as an xyzw quaternion.
    fn orientation(&self) -> [f32; 4];

    fn linear_velocity(&self) -> Vec3;

    fn angular_velocity(&self) -> Vec3;

    /// Inverse inertia tensor in world coordinates.
    fn inverse_inertia_world(&self) -> Mat3;

    fn mass(&self) -> f32;

    fn is_kinematic(&self) -> bool;

    fn apply_central_impulse(&mut self, impulse: Vec3);

    fn apply_torque_impulse(&mut self, impulse: Vec3);

    /// Rotate a body-local direction into world coordinates.
    fn to_world_direction(&self, local: Vec3) -> Vec3 {
        transform::rotate(self.orientation(), local)
    }
}

impl ControlledBody for RigidBody {
    fn location(&self) -> Vec3 {
        self.pos
    }

    fn orientation(&self) -> [f32; 4] {
        self.orientation
    }

    fn linear_velocity(&self) -> Vec3 {
        self.vel
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_vel
    }

    fn inverse_inertia_world(&self) -> Mat3 {
        RigidBody::inverse_inertia_world(self)
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn is_kinematic(&self) -> bool {
        RigidBody::is_kinematic(self)
    }

    fn apply_central_impulse(&mut self, impulse: Vec3) {
        RigidBody::apply_central_impulse(self, impulse);
    }

    fn apply_torque_impulse(&mut self, impulse: Vec3) {
        RigidBody::apply_torque_impulse(self, impulse);
    }
}

/// Source of a ragdoll's total mass, center of mass and its velocity.
pub trait RagdollAggregate {
    /// # Errors
    ///
    /// Fails when the aggregate cannot be formed, for example a ragdoll
    /// with no mass.
    fn center_of_mass(&self) -> Result<CenterOfMass, PhysicsError>;
}

impl RagdollAggregate for CenterOfMass {
    fn center_of_mass(&self) -> Result<CenterOfMass, PhysicsError> {
        Ok(*self)
    }
}

/// A ragdoll together with the bodies its link indices refer to.
#[derive(Copy, Clone, Debug)]
pub struct RagdollView<'a> {
    pub ragdoll: &'a Ragdoll,
    pub bodies: &'a [RigidBody],
}

impl RagdollAggregate for RagdollView<'_> {
    fn center_of_mass(&self) -> Result<CenterOfMass, PhysicsError> {
        self.ragdoll.center_of_mass(self.bodies)
    }
}

/// Everything a controller sees during one pre-tick callback.
pub struct LinkContext<'a> {
    /// The controlled link's rigid body.
    pub body: &'a mut dyn ControlledBody,
    /// Aggregate state of the whole ragdoll, sampled just before the call.
    pub ragdoll: CenterOfMass,
}

impl<'a> LinkContext<'a> {
    /// # Errors
    ///
    /// Propagates the aggregate's failure to produce a center of mass.
    pub fn new(body: &'a mut dyn ControlledBody, aggregate: &dyn RagdollAggregate) -> Result<Self, PhysicsError> {
        Ok(Self {
            body,
            ragdoll: aggregate.center_of_mass()?,
        })
    }
}
