//! Error types and handling.

use chrono::NaiveTime;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Input rejected before touching storage
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation conflicts with existing state (double punch-in, duplicate record)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Requested slot is already taken for the stylist
    #[error("Slot unavailable: {message}")]
    SlotUnavailable {
        message: String,
        /// Next bookable slot on the same day, if one exists
        suggestion: Option<NaiveTime>,
    },

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Status change not allowed from the current state
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excel export error
    #[error("Export error: {0}")]
    Export(String),

    /// Backend temporarily unreachable
    #[error("Transient error: {0}")]
    Transient(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a validation error with message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error with message
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a not found error with message
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a config error with message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a slot conflict, optionally carrying an alternative time
    pub fn slot_unavailable(msg: impl Into<String>, suggestion: Option<NaiveTime>) -> Self {
        Self::SlotUnavailable {
            message: msg.into(),
            suggestion,
        }
    }

    /// Create an invalid transition error from any displayable states
    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transient(_) => true,
            Self::Database(err) => matches!(
                err,
                sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_)
            ),
            Self::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Whether the error is a user-correctable rejection (no retry).
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Conflict(_)
                | Self::SlotUnavailable { .. }
                | Self::NotFound(_)
                | Self::InvalidTransition { .. }
        )
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(AppError::Transient("backend down".into()).is_transient());
        assert!(!AppError::validation("missing name").is_transient());
        assert!(!AppError::conflict("already punched in").is_transient());

        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        assert!(AppError::from(io).is_transient());
    }

    #[test]
    fn test_slot_unavailable_message() {
        let err = AppError::slot_unavailable("14:00 is taken", NaiveTime::from_hms_opt(15, 0, 0));
        assert_eq!(err.to_string(), "Slot unavailable: 14:00 is taken");
        assert!(err.is_user_facing());
    }
}
