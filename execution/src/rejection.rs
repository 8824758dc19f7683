use thiserror::Error;

/// Reasons a command is ignored.
///
/// Rejections never reach the client: the caller logs them and carries on.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("identity is empty")]
    EmptyName,
    #[error("connection has no bound identity")]
    Unbound,
    #[error("amount is not a positive integer")]
    InvalidAmount,
    #[error("stake {amount} is below the minimum of {minimum}")]
    BelowMinimum { amount: u64, minimum: u64 },
    #[error("{0} is not allowed to change the configuration")]
    Unauthorized(String),
}
