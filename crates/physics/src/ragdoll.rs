//! Ragdoll entity: an ordered set of linked rigid bodies
//!
//! This module provides a high-level ragdoll that wraps the physics
//! simulation components, and the mass-weighted aggregate the balance
//! controller consumes.

use crate::body::RigidBody;
use crate::error::PhysicsError;
use crate::types::{BodyType, Vec3};
use crate::PhysicsSim;
use serde::{Deserialize, Serialize};

/// Mass-weighted state of a whole ragdoll.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CenterOfMass {
    /// Total mass of all links (kg)
    pub mass: f32,
    /// Center-of-mass location in physics-space coordinates
    pub location: Vec3,
    /// Center-of-mass velocity in physics-space coordinates
    pub velocity: Vec3,
}

/// Configuration for the default three-link ragdoll
#[derive(Clone, Debug)]
pub struct RagdollConfig {
    /// Torso half-extents (width, height, depth)
    pub torso_size: Vec3,
    /// Torso mass in kg
    pub torso_mass: f32,
    /// Leg length in meters
    pub leg_length: f32,
    /// Leg radius in meters
    pub leg_radius: f32,
    /// Mass of each leg in kg
    pub leg_mass: f32,
    /// Distance between the hip joints in meters
    pub hip_width: f32,
}

impl Default for RagdollConfig {
    fn default() -> Self {
        Self {
            torso_size: Vec3::new(0.25, 0.35, 0.15),
            torso_mass: 30.0,
            leg_length: 0.9,
            leg_radius: 0.07,
            leg_mass: 8.0,
            hip_width: 0.3,
        }
    }
}

/// A ragdoll in the physics simulation
#[derive(Clone, Debug, PartialEq)]
pub struct Ragdoll {
    links: Vec<usize>,
    torso: usize,
    feet: Vec<usize>,
}

impl Ragdoll {
    /// # Errors
    ///
    /// Returns [`PhysicsError::EmptyRagdoll`] when `links` is empty, and
    /// [`PhysicsError::UnknownBody`] when the torso or a foot is not a link.
    pub fn new(links: Vec<usize>, torso: usize, feet: Vec<usize>) -> Result<Self, PhysicsError> {
        if links.is_empty() {
            return Err(PhysicsError::EmptyRagdoll);
        }
        if let Some(&stray) = std::iter::once(&torso).chain(&feet).find(|i| !links.contains(i)) {
            return Err(PhysicsError::UnknownBody(stray));
        }
        Ok(Self { links, torso, feet })
    }

    /// Build a standing torso-and-two-legs ragdoll with its feet on the
    /// ground at `position`.
    pub fn build(sim: &mut PhysicsSim, position: Vec3, config: &RagdollConfig) -> Self {
        let half_leg = config.leg_length * 0.5;
        let hip_y = position.y + config.leg_length;
        let half_hip = config.hip_width * 0.5;

        let mut legs = Vec::with_capacity(2);
        for side in [-1.0_f32, 1.0] {
            let center = Vec3::new(position.x + side * half_hip, position.y + half_leg, position.z);
            let idx = sim.add_cylinder(center, config.leg_radius, half_leg, config.leg_mass);
            sim.bodies[idx].radius = half_leg;
            legs.push(idx);
        }

        let torso_center = Vec3::new(position.x, hip_y + config.torso_size.y, position.z);
        let torso = sim.add_box(torso_center, config.torso_size, config.torso_mass);

        for (&leg, side) in legs.iter().zip([-1.0_f32, 1.0]) {
            let hip = Vec3::new(position.x + side * half_hip, hip_y, position.z);
            // Both indices were just created, so the lookup cannot fail.
            if let Err(e) = sim.add_ball_joint(torso, leg, hip) {
                tracing::error!("failed to attach leg {leg}: {e}");
            }
        }

        let mut links = legs.clone();
        links.push(torso);
        Self {
            links,
            torso,
            feet: legs,
        }
    }

    #[must_use]
    pub fn links(&self) -> &[usize] {
        &self.links
    }

    #[must_use]
    pub fn torso(&self) -> usize {
        self.torso
    }

    #[must_use]
    pub fn feet(&self) -> &[usize] {
        &self.feet
    }

    /// Total mass, center-of-mass location and center-of-mass velocity,
    /// summed over the dynamic links. A fully kinematic ragdoll is summed
    /// over every link.
    ///
    /// # Errors
    ///
    /// Fails when a link index is out of range or the total mass is not positive.
    pub fn center_of_mass(&self, bodies: &[RigidBody]) -> Result<CenterOfMass, PhysicsError> {
        let mut links = Vec::with_capacity(self.links.len());
        for &link in &self.links {
            links.push(bodies.get(link).ok_or(PhysicsError::UnknownBody(link))?);
        }
        let all_kinematic = links.iter().all(|b| b.is_kinematic());

        let mut mass = 0.0;
        let mut weighted_location = Vec3::ZERO;
        let mut weighted_velocity = Vec3::ZERO;
        for body in links.into_iter().filter(|b| all_kinematic || !b.is_kinematic()) {
            mass += body.mass;
            weighted_location += body.pos * body.mass;
            weighted_velocity += body.vel * body.mass;
        }
        if mass <= 0.0 {
            return Err(PhysicsError::ZeroMass);
        }
        Ok(CenterOfMass {
            mass,
            location: weighted_location / mass,
            velocity: weighted_velocity / mass,
        })
    }

    /// Ground point midway between the lowest points of the feet, or below
    /// the torso if the ragdoll has no feet.
    ///
    /// # Errors
    ///
    /// Fails when a link index is out of range.
    pub fn center_of_support(&self, bodies: &[RigidBody]) -> Result<Vec3, PhysicsError> {
        let lowest = |i: usize| -> Result<Vec3, PhysicsError> {
            let body = bodies.get(i).ok_or(PhysicsError::UnknownBody(i))?;
            Ok(Vec3::new(body.pos.x, body.pos.y - body.radius, body.pos.z))
        };
        if self.feet.is_empty() {
            return lowest(self.torso);
        }
        let mut sum = Vec3::ZERO;
        for &foot in &self.feet {
            sum += lowest(foot)?;
        }
        #[allow(clippy::cast_precision_loss)]
        Ok(sum / self.feet.len() as f32)
    }

    /// Whether the torso is currently simulated.
    #[must_use]
    pub fn is_ragdoll(&self, bodies: &[RigidBody]) -> bool {
        bodies.get(self.torso).is_some_and(|b| !b.is_kinematic())
    }

    /// Hand every link to the physics simulation.
    pub fn set_ragdoll_mode(&self, bodies: &mut [RigidBody]) {
        self.set_body_type(bodies, BodyType::Dynamic);
        tracing::debug!(links = self.links.len(), "ragdoll mode");
    }

    /// Freeze every link in place; velocities are cleared.
    pub fn set_kinematic_mode(&self, bodies: &mut [RigidBody]) {
        self.set_body_type(bodies, BodyType::Kinematic);
        for &link in &self.links {
            if let Some(body) = bodies.get_mut(link) {
                body.vel = Vec3::ZERO;
                body.angular_vel = Vec3::ZERO;
            }
        }
        tracing::debug!(links = self.links.len(), "kinematic mode");
    }

    fn set_body_type(&self, bodies: &mut [RigidBody], body_type: BodyType) {
        for &link in &self.links {
            if let Some(body) = bodies.get_mut(link) {
                body.body_type = body_type;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_of_mass_is_mass_weighted() {
        let bodies = vec![
            RigidBody::new_sphere(Vec3::new(0.0, 0.0, 0.0), 0.1, 1.0),
            RigidBody::new_sphere(Vec3::new(3.0, 0.0, 0.0), 0.1, 2.0),
        ];
        let mut moving = bodies.clone();
        moving[1].vel = Vec3::new(0.0, 3.0, 0.0);
        let ragdoll = Ragdoll::new(vec![0, 1], 1, vec![]).unwrap();
        let com = ragdoll.center_of_mass(&moving).unwrap();
        assert_eq!(com.mass, 3.0);
        assert!((com.location - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
        assert!((com.velocity - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn kinematic_links_are_left_out() {
        let mut bodies = vec![
            RigidBody::new_sphere(Vec3::new(0.0, 0.0, 0.0), 0.1, 1.0),
            RigidBody::new_sphere(Vec3::new(3.0, 0.0, 0.0), 0.1, 2.0),
        ];
        bodies[0].body_type = BodyType::Kinematic;
        let ragdoll = Ragdoll::new(vec![0, 1], 1, vec![]).unwrap();
        let com = ragdoll.center_of_mass(&bodies).unwrap();
        assert_eq!(com.mass, 2.0);
        assert_eq!(com.location, Vec3::new(3.0, 0.0, 0.0));

        bodies[1].body_type = BodyType::Kinematic;
        assert_eq!(ragdoll.center_of_mass(&bodies).unwrap().mass, 3.0);
    }

    #[test]
    fn empty_ragdoll_is_rejected() {
        assert_eq!(Ragdoll::new(vec![], 0, vec![]), Err(PhysicsError::EmptyRagdoll));
    }

    #[test]
    fn torso_must_be_a_link() {
        assert_eq!(Ragdoll::new(vec![0, 1], 5, vec![]), Err(PhysicsError::UnknownBody(5)));
    }

    #[test]
    fn zero_mass_is_an_error() {
        let bodies = vec![RigidBody::new_sphere(Vec3::ZERO, 0.1, 0.0)];
        let ragdoll = Ragdoll::new(vec![0], 0, vec![]).unwrap();
        assert_eq!(ragdoll.center_of_mass(&bodies), Err(PhysicsError::ZeroMass));
    }

    #[test]
    fn built_ragdoll_stands_on_ground() {
        let mut sim = PhysicsSim::new();
        let ragdoll = Ragdoll::build(&mut sim, Vec3::ZERO, &RagdollConfig::default());
        assert_eq!(ragdoll.links().len(), 3);
        assert_eq!(sim.joints.len(), 2);
        let support = ragdoll.center_of_support(&sim.bodies).unwrap();
        assert!(support.length() < 1e-6, "support={support:?}");
        let com = ragdoll.center_of_mass(&sim.bodies).unwrap();
        assert!(com.location.y > support.y);
    }

    #[test]
    fn kinematic_mode_freezes_links() {
        let mut sim = PhysicsSim::new();
        let ragdoll = Ragdoll::build(&mut sim, Vec3::ZERO, &RagdollConfig::default());
        sim.bodies[ragdoll.torso()].vel = Vec3::UNIT_X;
        ragdoll.set_kinematic_mode(&mut sim.bodies);
        assert!(!ragdoll.is_ragdoll(&sim.bodies));
        assert_eq!(sim.bodies[ragdoll.torso()].vel, Vec3::ZERO);
        ragdoll.set_ragdoll_mode(&mut sim.bodies);
        assert!(ragdoll.is_ragdoll(&sim.bodies));
    }
}
