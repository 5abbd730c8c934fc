//! Keeps the controlled link upright: a chosen body-local direction is
//! turned toward world +Y.
//!
//! If the model oscillates, try reducing the gain factors.

use crate::body::LinkContext;
use crate::controller::{check_time_step, IkController};
use crate::error::IkError;
use crate::state::{ControllerState, UprightState};
use physics::Vec3;
use tracing::{debug, trace};

pub const DEFAULT_DELTA_GAIN_FACTOR: f32 = 0.1;
pub const DEFAULT_ERROR_GAIN_FACTOR: f32 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct UprightController {
    enabled: bool,
    delta_gain_factor: f32,
    error_gain_factor: f32,
    /// Desired up direction, unit length, in link-body coordinates.
    direction_in_link_body: Vec3,
    /// Error vector from the previous tick.
    previous_error: Vec3,
}

fn unit_direction(direction: Vec3) -> Result<Vec3, IkError> {
    if !direction.is_finite() {
        return Err(IkError::NonFiniteDirection);
    }
    direction.try_normalize().ok_or(IkError::ZeroDirection)
}

impl UprightController {
    /// An enabled controller with default gains.
    ///
    /// # Errors
    ///
    /// Rejects a zero or non-finite `direction_in_link_body`.
    pub fn new(direction_in_link_body: Vec3) -> Result<Self, IkError> {
        Ok(Self {
            enabled: true,
            delta_gain_factor: DEFAULT_DELTA_GAIN_FACTOR,
            error_gain_factor: DEFAULT_ERROR_GAIN_FACTOR,
            direction_in_link_body: unit_direction(direction_in_link_body)?,
            previous_error: Vec3::ZERO,
        })
    }

    /// # Errors
    ///
    /// Rejects a state whose direction is zero or non-finite.
    pub fn from_state(state: &UprightState) -> Result<Self, IkError> {
        let mut controller = Self::new(state.direction_in_link_body)?;
        controller.apply(state, true)?;
        Ok(controller)
    }

    #[must_use]
    pub fn direction_in_link_body(&self) -> Vec3 {
        self.direction_in_link_body
    }

    #[must_use]
    pub fn delta_gain_factor(&self) -> f32 {
        self.delta_gain_factor
    }

    #[must_use]
    pub fn error_gain_factor(&self) -> f32 {
        self.error_gain_factor
    }

    #[must_use]
    pub fn previous_error(&self) -> Vec3 {
        self.previous_error
    }

    /// Default 0.1.
    pub fn set_delta_gain_factor(&mut self, factor: f32) {
        debug_assert!(factor.is_finite());
        self.delta_gain_factor = factor;
    }

    /// Default 0.1.
    pub fn set_error_gain_factor(&mut self, factor: f32) {
        debug_assert!(factor.is_finite());
        self.error_gain_factor = factor;
    }

    /// `full` also replaces the enabled flag and the previous error.
    fn apply(&mut self, state: &UprightState, full: bool) -> Result<(), IkError> {
        let direction = unit_direction(state.direction_in_link_body)?;
        if full {
            self.enabled = state.enabled;
            self.previous_error = state.previous_error;
        }
        self.set_delta_gain_factor(state.delta_gain_factor);
        self.set_error_gain_factor(state.error_gain_factor);
        self.direction_in_link_body = direction;
        Ok(())
    }

    fn upright_state(state: &ControllerState) -> Result<&UprightState, IkError> {
        match state {
            ControllerState::Upright(s) => Ok(s),
            ControllerState::Balance(_) => Err(IkError::StateKindMismatch),
        }
    }
}

impl IkController for UprightController {
    fn name(&self) -> &'static str {
        "upright"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Apply a torque impulse that turns the link's up direction toward
    /// world +Y, scaled by the body's rotational inertia.
    fn pre_tick(&mut self, link: &mut LinkContext<'_>, time_step: f32) -> Option<Vec3> {
        check_time_step(time_step);
        if !self.enabled {
            return None;
        }
        debug_assert!(!link.body.is_kinematic(), "upright controller on a kinematic body");

        let actual = link.body.to_world_direction(self.direction_in_link_body);
        // error = actual X desired; its length is |sin(error angle)|
        let mut error = actual.cross(Vec3::UNIT_Y);
        let mut abs_sin_error_angle = error.length();
        // The cross product with +Y never has a vertical component, so the
        // side of 90 degrees comes from the actual direction itself.
        let beyond_right_angle = actual.y < 0.0;

        if abs_sin_error_angle == 0.0 {
            if !beyond_right_angle {
                // Already upright.
                self.previous_error = error;
                return Some(Vec3::ZERO);
            }
            // Upside down: any horizontal axis will do.
            let (ortho, _) = Vec3::UNIT_Y.orthonormal_basis();
            error = actual.cross(ortho);
            abs_sin_error_angle = error.length();
            debug!(?error, "upright controller resolved an inverted link");
        }

        let error_axis = error / abs_sin_error_angle;
        // Past 90 degrees the sine shrinks again, so saturate instead.
        let error_magnitude = if beyond_right_angle { 1.0 } else { abs_sin_error_angle };
        let error = error_axis * error_magnitude;

        let delta = error - self.previous_error;
        self.previous_error = error;

        let mut sum = delta * self.delta_gain_factor + error * self.error_gain_factor;
        match link.body.inverse_inertia_world().inverse() {
            Some(inertia) => sum = inertia.mul_vec(sum),
            None => debug!("singular inverse inertia; torque impulse left unscaled"),
        }

        link.body.apply_torque_impulse(sum);
        trace!(error = error_magnitude, impulse = sum.length(), "upright torque impulse");
        Some(sum)
    }

    fn state(&self) -> ControllerState {
        ControllerState::Upright(UprightState {
            enabled: self.enabled,
            delta_gain_factor: self.delta_gain_factor,
            error_gain_factor: self.error_gain_factor,
            direction_in_link_body: self.direction_in_link_body,
            previous_error: self.previous_error,
        })
    }

    fn restore(&mut self, state: &ControllerState) -> Result<(), IkError> {
        self.apply(Self::upright_state(state)?, true)
    }

    fn retune(&mut self, state: &ControllerState) -> Result<(), IkError> {
        self.apply(Self::upright_state(state)?, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_normalized() {
        let controller = UprightController::new(Vec3::new(0.0, 3.0, 4.0)).unwrap();
        let d = controller.direction_in_link_body();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!((d - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert_eq!(UprightController::new(Vec3::ZERO), Err(IkError::ZeroDirection));
    }

    #[test]
    fn nan_direction_is_rejected() {
        assert_eq!(
            UprightController::new(Vec3::new(f32::NAN, 1.0, 0.0)),
            Err(IkError::NonFiniteDirection)
        );
    }

    #[test]
    fn defaults_match_documentation() {
        let controller = UprightController::new(Vec3::UNIT_Y).unwrap();
        assert_eq!(controller.delta_gain_factor(), 0.1);
        assert_eq!(controller.error_gain_factor(), 0.1);
        assert_eq!(controller.previous_error(), Vec3::ZERO);
    }

    #[test]
    fn retune_keeps_previous_error() {
        let mut controller = UprightController::new(Vec3::UNIT_Y).unwrap();
        controller.previous_error = Vec3::new(0.5, 0.0, 0.0);
        let mut tuned = controller.state();
        if let ControllerState::Upright(s) = &mut tuned {
            s.error_gain_factor = 0.3;
            s.previous_error = Vec3::ZERO;
        }
        controller.retune(&tuned).unwrap();
        assert_eq!(controller.error_gain_factor(), 0.3);
        assert_eq!(controller.previous_error(), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn retune_keeps_enabled_flag() {
        let mut controller = UprightController::new(Vec3::UNIT_Y).unwrap();
        controller.set_enabled(false);
        let mut tuned = controller.state();
        if let ControllerState::Upright(s) = &mut tuned {
            s.enabled = true;
        }
        controller.retune(&tuned).unwrap();
        assert!(!controller.is_enabled());
        controller.restore(&tuned).unwrap();
        assert!(controller.is_enabled());
    }
}
