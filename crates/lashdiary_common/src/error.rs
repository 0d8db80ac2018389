// --- File: crates/lashdiary_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for the scheduling backend.
///
/// Every crate in the workspace maps its failures onto these variants so
/// that handlers can translate any error into an HTTP response with a
/// single code path. The taxonomy follows the booking contract: validation
/// and conflict errors are returned to the caller with actionable messages,
/// while downstream failures (calendar, mail) are logged by the commit
/// pipeline and never surfaced for best-effort side effects.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// Malformed or missing required input. Rejected before any side
    /// effect; safe to retry after correction.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A token or record id did not resolve to anything known.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requested slot is already taken. Safe to retry with a
    /// different slot.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Data store I/O or serialization failure.
    #[error("Store error: {0}")]
    Store(String),

    /// A collaborator (calendar, notifier) failed. For best-effort side
    /// effects this is logged, not returned.
    #[error("Downstream service error: {service} - {message}")]
    Downstream { service: String, message: String },

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything that does not fit the categories above.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for SchedulingError {
    fn status_code(&self) -> u16 {
        match self {
            SchedulingError::Validation(_) => 400,
            SchedulingError::NotFound(_) => 404,
            SchedulingError::Conflict(_) => 409,
            SchedulingError::Store(_) => 500,
            SchedulingError::Downstream { .. } => 502,
            SchedulingError::Config(_) => 500,
            SchedulingError::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for SchedulingError {
    fn from(err: serde_json::Error) -> Self {
        SchedulingError::Store(err.to_string())
    }
}

impl From<std::io::Error> for SchedulingError {
    fn from(err: std::io::Error) -> Self {
        SchedulingError::Store(err.to_string())
    }
}

// Utility constructors for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> SchedulingError {
    SchedulingError::Validation(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> SchedulingError {
    SchedulingError::NotFound(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> SchedulingError {
    SchedulingError::Conflict(message.to_string())
}

pub fn downstream_error<T: fmt::Display>(service: &str, message: T) -> SchedulingError {
    SchedulingError::Downstream {
        service: service.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> SchedulingError {
    SchedulingError::Internal(message.to_string())
}
