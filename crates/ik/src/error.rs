use physics::PhysicsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IkError {
    #[error("direction in link body must be non-zero")]
    ZeroDirection,
    #[error("direction in link body must be finite")]
    NonFiniteDirection,
    #[error("link {link} is kinematic but has an enabled controller")]
    KinematicLink { link: usize },
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error("state record is {actual} bytes, expected {expected}")]
    StateLength { expected: usize, actual: usize },
    #[error("unsupported state version {0}")]
    UnsupportedVersion(u32),
    #[error("state belongs to a different kind of controller")]
    StateKindMismatch,
    #[error("chain has {expected} controllers but {actual} states were supplied")]
    ChainLength { expected: usize, actual: usize },
}
