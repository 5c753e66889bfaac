use crate::distribution::Face;

/// Errors raised while building a probability vector.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("vector is empty")]
    Empty,
    #[error("vector has sum zero")]
    ZeroSum,
    #[error("negative value encountered")]
    NegativeValue,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DiceError {
    #[error("face {0} does not exist, faces are numbered 1 to 6")]
    InvalidFace(u8),

    #[error("face {face} is locked at {pinned}%")]
    FaceLocked { face: Face, pinned: u32 },

    #[error("distribution sums to {0}, expected 100")]
    InvalidDistribution(u32),

    #[error(
        "every face is locked but the locked values sum to {0}, expected 100"
    )]
    LockedSumMismatch(u32),

    #[error("invalid dice count: {0}")]
    InvalidDiceCount(String),

    #[error("invalid roll count: {0}")]
    InvalidRollCount(String),

    #[error("all {0} rolls of this simulation have been made")]
    RollBudgetExhausted(u64),

    #[error(
        "roll {roll_number} summed to {sum}, outside the possible outcomes"
    )]
    OutcomeOutOfRange { roll_number: u64, sum: u32 },

    #[error("could not build a probability vector: {0}")]
    Build(#[from] BuildError),
}

pub type DiceResult<T> = Result<T, DiceError>;
