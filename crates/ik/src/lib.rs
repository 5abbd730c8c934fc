#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Ragdoll IK Controllers
//!
//! Per-tick feedback controllers that keep an articulated ragdoll on its
//! feet.
//!
//! -   [`BalanceController`] pushes one link with a linear impulse so the
//!     ragdoll's center of mass stays over its center of support.
//! -   [`UprightController`] turns one link with a torque impulse so a chosen
//!     body-local direction tracks world +Y.
//!
//! Controllers read a [`ControlledBody`] and a [`CenterOfMass`] snapshot and
//! never own either. A [`ControllerChain`] runs them in a fixed order before
//! every physics step.
//!
//! ```rust
//! use ik::{ControllerChain, UprightController};
//! use physics::{PhysicsSim, Ragdoll, RagdollConfig, Vec3};
//!
//! let mut sim = PhysicsSim::new();
//! let ragdoll = Ragdoll::build(&mut sim, Vec3::ZERO, &RagdollConfig::default());
//! let mut chain = ControllerChain::new();
//! chain.push(ragdoll.torso(), UprightController::new(Vec3::UNIT_Y)?);
//!
//! for _ in 0..10 {
//!     let dt = sim.params.dt;
//!     chain.pre_tick(&mut sim, &ragdoll, dt)?;
//!     sim.step_cpu();
//! }
//! # Ok::<(), ik::IkError>(())
//! ```

pub mod balance;
pub mod body;
pub mod chain;
pub mod controller;
pub mod error;
pub mod state;
pub mod upright;

pub use balance::BalanceController;
pub use body::{ControlledBody, LinkContext, RagdollAggregate, RagdollView};
pub use chain::{Applied, ControllerChain};
pub use controller::IkController;
pub use error::IkError;
pub use physics::CenterOfMass;
pub use state::{BalanceState, ControllerState, UprightState, STATE_VERSION};
pub use upright::UprightController;
