//! # Controller Chain
//!
//! Several controllers may act on the same ragdoll, some on the same link.
//! The chain invokes them in insertion order, and each one sees the
//! velocities left by the controllers before it.

use crate::body::{LinkContext, RagdollAggregate, RagdollView};
use crate::controller::IkController;
use crate::error::IkError;
use crate::state::ControllerState;
use physics::{PhysicsError, PhysicsSim, Ragdoll, Vec3};
use tracing::debug;

#[derive(Debug)]
struct ChainEntry {
    link: usize,
    controller: Box<dyn IkController>,
}

/// Impulse applied by one controller during a pre-tick pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Applied {
    /// Position of the controller in the chain.
    pub index: usize,
    pub link: usize,
    pub name: &'static str,
    pub impulse: Vec3,
}

#[derive(Debug, Default)]
pub struct ControllerChain {
    entries: Vec<ChainEntry>,
}

impl ControllerChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a controller for body `link`; returns its position.
    pub fn push(&mut self, link: usize, controller: impl IkController + 'static) -> usize {
        self.entries.push(ChainEntry {
            link,
            controller: Box::new(controller),
        });
        self.entries.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(link, controller)` pairs in invocation order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &dyn IkController)> {
        self.entries.iter().map(|e| (e.link, e.controller.as_ref()))
    }

    #[must_use]
    pub fn controller(&self, index: usize) -> Option<&dyn IkController> {
        self.entries.get(index).map(|e| e.controller.as_ref())
    }

    pub fn controller_mut(&mut self, index: usize) -> Option<&mut (dyn IkController + 'static)> {
        self.entries.get_mut(index).map(|e| e.controller.as_mut())
    }

    /// Enable or disable every controller attached to `link`.
    pub fn set_link_enabled(&mut self, link: usize, enabled: bool) {
        for entry in self.entries.iter_mut().filter(|e| e.link == link) {
            entry.controller.set_enabled(enabled);
            debug!(link, name = entry.controller.name(), enabled, "controller toggled");
        }
    }

    /// Enable or disable every controller in the chain.
    pub fn set_all_enabled(&mut self, enabled: bool) {
        for entry in &mut self.entries {
            entry.controller.set_enabled(enabled);
        }
        debug!(count = self.entries.len(), enabled, "all controllers toggled");
    }

    /// Run every enabled controller once, in order, before a physics step.
    ///
    /// The ragdoll aggregate is sampled again before each controller.
    ///
    /// # Errors
    ///
    /// Fails on an invalid `time_step`, a link outside the simulation, a
    /// ragdoll without mass, or an enabled controller on a kinematic link.
    pub fn pre_tick(&mut self, sim: &mut PhysicsSim, ragdoll: &Ragdoll, time_step: f32) -> Result<Vec<Applied>, IkError> {
        if !(time_step > 0.0 && time_step.is_finite()) {
            return Err(PhysicsError::InvalidTimeStep(time_step).into());
        }

        let mut applied = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if !entry.controller.is_enabled() {
                continue;
            }
            let com = ragdoll.center_of_mass(&sim.bodies)?;
            let body = sim.body_mut(entry.link)?;
            if body.is_kinematic() {
                return Err(IkError::KinematicLink { link: entry.link });
            }
            let mut ctx = LinkContext { body, ragdoll: com };
            if let Some(impulse) = entry.controller.pre_tick(&mut ctx, time_step) {
                applied.push(Applied {
                    index,
                    link: entry.link,
                    name: entry.controller.name(),
                    impulse,
                });
            }
        }
        Ok(applied)
    }

    /// Run every enabled controller's post-tick hook, in order.
    ///
    /// # Errors
    ///
    /// Same conditions as [`pre_tick`](Self::pre_tick), except that
    /// kinematic links are skipped.
    pub fn post_tick(&mut self, sim: &mut PhysicsSim, ragdoll: &Ragdoll, time_step: f32) -> Result<(), IkError> {
        for entry in &mut self.entries {
            if !entry.controller.is_enabled() {
                continue;
            }
            let aggregate = RagdollView {
                ragdoll,
                bodies: &sim.bodies,
            };
            let com = aggregate.center_of_mass()?;
            let body = sim.body_mut(entry.link)?;
            if body.is_kinematic() {
                continue;
            }
            let mut ctx = LinkContext { body, ragdoll: com };
            entry.controller.post_tick(&mut ctx, time_step);
        }
        Ok(())
    }

    /// Persisted state of every controller, in chain order.
    #[must_use]
    pub fn save(&self) -> Vec<ControllerState> {
        self.entries.iter().map(|e| e.controller.state()).collect()
    }

    /// Replace the full state of every controller, in chain order.
    ///
    /// # Errors
    ///
    /// Fails if the number or kinds of states do not match the chain. On
    /// failure, controllers before the offending entry have been updated.
    pub fn restore(&mut self, states: &[ControllerState]) -> Result<(), IkError> {
        self.check_len(states)?;
        for (entry, state) in self.entries.iter_mut().zip(states) {
            entry.controller.restore(state)?;
        }
        Ok(())
    }

    /// Replace tunables only, keeping each controller's per-tick memory and
    /// enabled flag.
    ///
    /// # Errors
    ///
    /// Same as [`restore`](Self::restore).
    pub fn retune(&mut self, states: &[ControllerState]) -> Result<(), IkError> {
        self.check_len(states)?;
        for (entry, state) in self.entries.iter_mut().zip(states) {
            entry.controller.retune(state)?;
        }
        debug!(count = states.len(), "controllers retuned");
        Ok(())
    }

    fn check_len(&self, states: &[ControllerState]) -> Result<(), IkError> {
        if states.len() == self.entries.len() {
            Ok(())
        } else {
            Err(IkError::ChainLength {
                expected: self.entries.len(),
                actual: states.len(),
            })
        }
    }
}
