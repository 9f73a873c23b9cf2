//! # Checkout Error Types
//!
//! Typed error handling for the checkout orchestrator.
//! All checkout operations return `Result<T, PaymentError>`.
//!
//! Errors fall into three families:
//! - validation errors, caught before any network call
//! - provider/network errors, surfaced verbatim to the user
//! - confirmation errors, a payment that did not reach a successful status

use crate::method::PaymentMethodId;
use thiserror::Error;

/// Fallback text shown when a provider gives no usable message
pub const GENERIC_PAYMENT_ERROR: &str = "Payment failed. Please try again.";

/// Core error type for all checkout operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid user input (missing receipt, bad IBAN, no method selected)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Method is disabled or not configured and cannot be selected
    #[error("Payment method unavailable: {method}")]
    MethodUnavailable { method: PaymentMethodId },

    /// Transition not allowed from the current step
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// No adapter registered for the selected method
    #[error("No payment adapter registered for {method}")]
    AdapterNotFound { method: PaymentMethodId },

    /// Plan not found in catalog
    #[error("Plan not found: {plan_id}")]
    PlanNotFound { plan_id: String },

    /// A payment attempt is already in flight for this checkout
    #[error("A payment is already being processed")]
    AlreadySubmitting,

    /// Backend or provider rejected the request
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with the backend
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Payment did not reach a successful terminal status
    #[error("Payment not confirmed: status {status}")]
    ConfirmationFailed { status: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Text handed to the error callback.
    ///
    /// Provider messages pass through verbatim. Transport and internal
    /// failures collapse to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::ProviderError { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            PaymentError::Validation(msg) => msg.clone(),
            PaymentError::PlanNotFound { plan_id } => format!("Plan {} is not available", plan_id),
            PaymentError::ConfirmationFailed { .. }
            | PaymentError::MethodUnavailable { .. }
            | PaymentError::AlreadySubmitting => self.to_string(),
            _ => GENERIC_PAYMENT_ERROR.to_string(),
        }
    }

    /// Returns true for errors caught before any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PaymentError::Validation(_)
                | PaymentError::MethodUnavailable { .. }
                | PaymentError::InvalidTransition(_)
                | PaymentError::AlreadySubmitting
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::Validation(_) => 400,
            PaymentError::MethodUnavailable { .. } => 409,
            PaymentError::InvalidTransition(_) => 409,
            PaymentError::AdapterNotFound { .. } => 501,
            PaymentError::PlanNotFound { .. } => 404,
            PaymentError::AlreadySubmitting => 409,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::NetworkError(_) => 503,
            PaymentError::ConfirmationFailed { .. } => 402,
            PaymentError::Serialization(_) => 500,
            PaymentError::Internal(_) => 500,
        }
    }
}

/// Result type alias for checkout operations
pub type PaymentResult<T> = Result<T, PaymentError>;
