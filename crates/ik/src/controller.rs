use crate::body::LinkContext;
use crate::error::IkError;
use crate::state::ControllerState;
use physics::Vec3;
use std::fmt::Debug;

/// A feedback controller bound to one ragdoll link.
///
/// The host calls [`pre_tick`](IkController::pre_tick) exactly once per
/// physics step, before the step integrates, and
/// [`post_tick`](IkController::post_tick) after it.
pub trait IkController: Debug + Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Compute and apply this tick's correction to `link.body`.
    ///
    /// Returns the impulse that was applied, or `None` if the controller is
    /// disabled.
    ///
    /// # Panics
    ///
    /// Panics unless `time_step` is positive and finite.
    fn pre_tick(&mut self, link: &mut LinkContext<'_>, time_step: f32) -> Option<Vec3>;

    fn post_tick(&mut self, _link: &mut LinkContext<'_>, _time_step: f32) {}

    /// Snapshot of every persisted field.
    fn state(&self) -> ControllerState;

    /// Replace every persisted field, per-tick memory included.
    ///
    /// # Errors
    ///
    /// Fails if `state` is for another kind of controller or is invalid.
    fn restore(&mut self, state: &ControllerState) -> Result<(), IkError>;

    /// Replace the tunable fields only, keeping per-tick memory and the
    /// enabled flag.
    ///
    /// # Errors
    ///
    /// Fails if `state` is for another kind of controller or is invalid.
    fn retune(&mut self, state: &ControllerState) -> Result<(), IkError>;
}

pub(crate) fn check_time_step(time_step: f32) {
    assert!(
        time_step > 0.0 && time_step.is_finite(),
        "time step must be positive and finite, got {time_step}"
    );
}
