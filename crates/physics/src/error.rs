use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("no rigid body with index {0}")]
    UnknownBody(usize),
    #[error("ragdoll has no links")]
    EmptyRagdoll,
    #[error("ragdoll has zero total mass")]
    ZeroMass,
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f32),
}
