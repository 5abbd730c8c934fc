//! Keeps a ragdoll's center of mass directly above its center of support.
//!
//! If the model oscillates, try reducing the gain factors.

use crate::body::LinkContext;
use crate::controller::{check_time_step, IkController};
use crate::error::IkError;
use crate::state::{BalanceState, ControllerState};
use physics::Vec3;
use tracing::trace;

pub const DEFAULT_LOCATION_GAIN_FACTOR: f32 = 0.02;
pub const DEFAULT_VELOCITY_GAIN_FACTOR: f32 = 0.02;

#[derive(Clone, Debug, PartialEq)]
pub struct BalanceController {
    enabled: bool,
    location_gain_factor: f32,
    velocity_gain_factor: f32,
    /// Physics-space coordinates.
    center_of_support: Vec3,
}

impl BalanceController {
    /// An enabled controller with default gains.
    #[must_use]
    pub fn new(center_of_support: Vec3) -> Self {
        debug_assert!(center_of_support.is_finite());
        Self {
            enabled: true,
            location_gain_factor: DEFAULT_LOCATION_GAIN_FACTOR,
            velocity_gain_factor: DEFAULT_VELOCITY_GAIN_FACTOR,
            center_of_support,
        }
    }

    #[must_use]
    pub fn from_state(state: &BalanceState) -> Self {
        let mut controller = Self::new(state.center_of_support);
        controller.apply(state);
        controller
    }

    #[must_use]
    pub fn center_of_support(&self) -> Vec3 {
        self.center_of_support
    }

    #[must_use]
    pub fn location_gain_factor(&self) -> f32 {
        self.location_gain_factor
    }

    #[must_use]
    pub fn velocity_gain_factor(&self) -> f32 {
        self.velocity_gain_factor
    }

    pub fn set_center_of_support(&mut self, location: Vec3) {
        debug_assert!(location.is_finite());
        self.center_of_support = location;
    }

    /// Default 0.02. Negative values destabilize the controller.
    pub fn set_location_gain_factor(&mut self, factor: f32) {
        debug_assert!(factor.is_finite());
        self.location_gain_factor = factor;
    }

    /// Default 0.02. Negative values destabilize the controller.
    pub fn set_velocity_gain_factor(&mut self, factor: f32) {
        debug_assert!(factor.is_finite());
        self.velocity_gain_factor = factor;
    }

    fn apply(&mut self, state: &BalanceState) {
        self.enabled = state.enabled;
        self.apply_tunables(state);
    }

    fn apply_tunables(&mut self, state: &BalanceState) {
        self.set_location_gain_factor(state.location_gain_factor);
        self.set_velocity_gain_factor(state.velocity_gain_factor);
        self.set_center_of_support(state.center_of_support);
    }

    fn balance_state(state: &ControllerState) -> Result<&BalanceState, IkError> {
        match state {
            ControllerState::Balance(s) => Ok(s),
            ControllerState::Upright(_) => Err(IkError::StateKindMismatch),
        }
    }
}

impl IkController for BalanceController {
    fn name(&self) -> &'static str {
        "balance"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Push the controlled body so the ragdoll's center of mass drifts back
    /// over the center of support. Acts only while the center of mass is
    /// above the support point, and only horizontally on location.
    fn pre_tick(&mut self, link: &mut LinkContext<'_>, time_step: f32) -> Option<Vec3> {
        check_time_step(time_step);
        if !self.enabled {
            return None;
        }
        debug_assert!(!link.body.is_kinematic(), "balance controller on a kinematic body");

        let com = link.ragdoll;
        // error = setpoint - actual; the velocity setpoint is zero
        let mut location_error = self.center_of_support - com.location;
        let velocity_error = -com.velocity;

        let mut sum = Vec3::ZERO;
        if location_error.y < 0.0 {
            // center of mass is ABOVE the center of support
            location_error.y = 0.0;
            let location_gain = self.location_gain_factor * com.mass / time_step;
            sum += location_error * location_gain;

            let velocity_gain = self.velocity_gain_factor * com.mass;
            sum += velocity_error * velocity_gain;
        }

        link.body.apply_central_impulse(sum);
        trace!(
            offset = location_error.length(),
            impulse = sum.length(),
            "balance impulse"
        );
        Some(sum)
    }

    fn state(&self) -> ControllerState {
        ControllerState::Balance(BalanceState {
            enabled: self.enabled,
            location_gain_factor: self.location_gain_factor,
            velocity_gain_factor: self.velocity_gain_factor,
            center_of_support: self.center_of_support,
        })
    }

    fn restore(&mut self, state: &ControllerState) -> Result<(), IkError> {
        let state = Self::balance_state(state)?;
        self.apply(state);
        Ok(())
    }

    fn retune(&mut self, state: &ControllerState) -> Result<(), IkError> {
        let state = Self::balance_state(state)?;
        self.apply_tunables(state);
        Ok(())
    }
}
