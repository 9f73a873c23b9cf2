//! # Confirmation Callbacks
//!
//! The orchestrator reports outcomes to its caller and never touches
//! subscription or account state itself.

use crate::method::PaymentMethodId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// How a successful payment was completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessKind {
    /// Wallet payment confirmed and verified by the backend
    Confirmed,
    /// Receipt submitted and waiting for review
    PendingReview,
}

/// Payload handed to [`CheckoutCallbacks::on_success`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccess {
    pub method: PaymentMethodId,
    pub plan_id: String,
    pub kind: SuccessKind,
    /// Provider or backend reference (payment intent id, manual payment id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl PaymentSuccess {
    pub fn new(method: PaymentMethodId, plan_id: impl Into<String>, kind: SuccessKind) -> Self {
        Self {
            method,
            plan_id: plan_id.into(),
            kind,
            reference: None,
            completed_at: Utc::now(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Caller-supplied success and error handlers
pub trait CheckoutCallbacks: Send + Sync {
    fn on_success(&self, success: &PaymentSuccess);

    /// `message` is ready to show to the user
    fn on_error(&self, message: &str);
}

/// Full-page navigation, used by redirect-based providers
pub trait Navigator: Send + Sync {
    fn redirect(&self, url: &str);
}

/// Callbacks that only log
pub struct LoggingCallbacks;

impl CheckoutCallbacks for LoggingCallbacks {
    fn on_success(&self, success: &PaymentSuccess) {
        info!(
            "Payment succeeded: method={}, plan={}, kind={:?}",
            success.method, success.plan_id, success.kind
        );
    }

    fn on_error(&self, message: &str) {
        warn!("Payment failed: {}", message);
    }
}
