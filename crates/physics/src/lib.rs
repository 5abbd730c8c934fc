#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Ragdoll Physics
//!
//! A small rigid-body layer that hosts articulated ragdolls for the balance
//! and upright controllers in the `ik` crate.
//!
//! ## Key Components
//!
//! -   **Rigid Bodies:** [`RigidBody`] carries pose, velocities, mass and a
//!     diagonal local inertia. Impulses change velocities directly, and
//!     kinematic bodies ignore them.
//! -   **Simulation:** [`PhysicsSim`] in the [`simulation`] module steps all
//!     bodies on the CPU: position-based integration, ball joints and a
//!     ground plane.
//! -   **Ragdolls:** [`Ragdoll`] groups bodies into one articulated figure and
//!     computes its mass-weighted [`CenterOfMass`].
//!
//! ## Usage
//!
//! ```rust
//! use physics::{PhysicsSim, Ragdoll, RagdollConfig, Vec3};
//!
//! let mut sim = PhysicsSim::new();
//! let ragdoll = Ragdoll::build(&mut sim, Vec3::ZERO, &RagdollConfig::default());
//! sim.run_cpu(0.01, 10)?;
//! let com = ragdoll.center_of_mass(&sim.bodies)?;
//! assert!(com.mass > 0.0);
//! # Ok::<(), physics::PhysicsError>(())
//! ```

pub mod body;
pub mod builder;
pub mod error;
pub mod integrator;
pub mod ragdoll;
pub mod simulation;
pub mod steps;
pub mod transform;
pub mod types;

pub use body::RigidBody;
pub use error::PhysicsError;
pub use ragdoll::{CenterOfMass, Ragdoll, RagdollConfig};
pub use simulation::PhysicsSim;
pub use types::{BallJoint, BodyType, Mat3, PhysParams, Vec3};
