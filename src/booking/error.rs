//! Error taxonomy of the booking core

use thiserror::Error;

/// Failure talking to a collaborator, before translation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend rejected the request as invalid (4xx other than 409)
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The slot was taken between query and commit (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Errors surfaced by the resolver, the guard and the wizard
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    /// A required field is missing or malformed; nothing was sent
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// No workable date or no slot left; an expected outcome
    #[error("No availability for the chosen date")]
    NoAvailability,

    /// The slot was taken by a concurrent booking
    #[error("The chosen time is no longer available")]
    Conflict,

    /// Reading availability failed; treated as no availability
    #[error("Availability source unavailable: {0}")]
    SourceUnavailable(String),

    /// Writing the booking failed; no appointment exists
    #[error("Booking could not be completed: {0}")]
    CommitFailure(String),

    /// The service catalog could not be loaded; the wizard cannot start
    #[error("Service catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("{event} is not accepted at step {step}")]
    InvalidTransition { step: &'static str, event: &'static str },

    /// A previous selection or submission is still in flight
    #[error("Request already in progress")]
    InFlight,
}

impl BookingError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        BookingError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether the user can retry the same action
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BookingError::SourceUnavailable(_) | BookingError::CommitFailure(_) | BookingError::InFlight
        )
    }
}
