/*!
Error types for rafflehouse operations

Taxonomy covers input validation, caller authorization, lifecycle state
violations and failures of the external collaborators. Every public engine
operation is all-or-nothing: an error means no mutation survived the call.
*/

use crate::types::{Amount, LotteryId, RequestId, Timestamp};
use thiserror::Error;

/// Result type alias for rafflehouse operations
pub type Result<T> = std::result::Result<T, RaffleError>;

/// Top-level error type for rafflehouse operations
#[derive(Error, Debug)]
pub enum RaffleError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Caller authorization errors
    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    /// Lifecycle state errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// External collaborator failures
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// Internal errors that shouldn't normally occur
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Input validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Ticket price must be positive")]
    InvalidTicketPrice,

    #[error("End time {end_time} is not in the future (now {now})")]
    InvalidEndTime { end_time: Timestamp, now: Timestamp },

    #[error("Incorrect payment amount: expected {expected}, got {got}")]
    IncorrectPaymentAmount { expected: Amount, got: Amount },

    #[error("Fulfillment word count {got} does not match batch size {expected}")]
    WordCountMismatch { expected: usize, got: usize },
}

/// Caller authorization errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Caller lacks transfer authority over the asset")]
    NotAssetAuthority,

    #[error("Caller is not the fee operator")]
    NotOperator,

    #[error("Caller is not the trusted randomness collaborator")]
    NotRandomnessAuthority,
}

/// Lifecycle state errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateError {
    #[error("Lottery {0} not found")]
    LotteryNotFound(LotteryId),

    #[error("Lottery {0} has ended")]
    LotteryEnded(LotteryId),

    #[error("No lottery is pending settlement")]
    NoPendingLotteries,

    #[error("Randomness request {0} is unknown or already consumed")]
    UnknownOrConsumedRequest(RequestId),
}

/// External collaborator failures
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Asset transfer failed: {0}")]
    AssetTransfer(String),

    #[error("Randomness request failed: {0}")]
    RandomnessRequest(String),

    #[error("Funds transfer failed: {0}")]
    FundsTransfer(String),
}

impl RaffleError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error category for log labelling
    pub fn category(&self) -> &'static str {
        match self {
            RaffleError::Config(_) => "config",
            RaffleError::Validation(_) => "validation",
            RaffleError::Authorization(_) => "authorization",
            RaffleError::State(_) => "state",
            RaffleError::Collaborator(_) => "collaborator",
            RaffleError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(RaffleError::config("bad").category(), "config");
        assert_eq!(
            RaffleError::State(StateError::NoPendingLotteries).category(),
            "state"
        );
        assert_eq!(
            RaffleError::Validation(ValidationError::InvalidTicketPrice).category(),
            "validation"
        );
    }

    #[test]
    fn test_error_display() {
        let err = RaffleError::Validation(ValidationError::IncorrectPaymentAmount {
            expected: 100,
            got: 120,
        });
        assert!(err.to_string().contains("expected 100, got 120"));

        let err = RaffleError::State(StateError::UnknownOrConsumedRequest(9));
        assert!(err.to_string().contains("unknown or already consumed"));
    }
}
