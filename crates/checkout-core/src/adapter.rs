//! # Provider Adapters
//!
//! Strategy trait for the side effects behind each payment method.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  PaymentAdapter (trait)                     │
//! │  ├── execute(context) -> Redirect | Completed | error       │
//! │  ├── methods()                                              │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┼─────────────────┐
//!          │                 │                 │
//!  ┌───────┴───────┐ ┌───────┴───────┐ ┌───────┴───────┐
//!  │  CardCheckout │ │  PayPalOrder  │ │ ManualReceipt │
//!  └───────────────┘ └───────────────┘ └───────────────┘
//! ```
//!
//! Adapters live in an [`AdapterRegistry`] keyed by [`PaymentMethodId`], so a
//! new provider is a new table entry. Wallet methods are not in the table:
//! their terminal action is the wallet button (see [`crate::wallet`]).

use crate::callback::PaymentSuccess;
use crate::error::{PaymentError, PaymentResult};
use crate::flow::{CheckoutState, ReceiptFile};
use crate::method::PaymentMethodId;
use crate::plan::Plan;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Everything an adapter needs for one payment attempt
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    /// Unique per attempt, sent as the idempotency key
    pub attempt_id: Uuid,
    pub method: PaymentMethodId,
    pub plan: Plan,
    pub receipt: Option<ReceiptFile>,
    pub iban: Option<String>,
}

impl CheckoutContext {
    pub fn new(method: PaymentMethodId, plan: Plan) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            method,
            plan,
            receipt: None,
            iban: None,
        }
    }

    /// Snapshot the modal state for a submit.
    ///
    /// Fails when no method is selected.
    pub fn from_state(state: &CheckoutState, plan: &Plan) -> PaymentResult<Self> {
        let method = state.selected_method().ok_or_else(|| {
            PaymentError::Validation("Choose a payment method first".to_string())
        })?;

        Ok(Self {
            receipt: state.receipt().cloned(),
            iban: state.iban_number().map(str::to_string),
            ..Self::new(method, plan.clone())
        })
    }

    pub fn with_receipt(mut self, receipt: ReceiptFile) -> Self {
        self.receipt = Some(receipt);
        self
    }

    pub fn with_iban(mut self, iban: impl Into<String>) -> Self {
        self.iban = Some(iban.into());
        self
    }

    pub fn idempotency_key(&self) -> String {
        self.attempt_id.to_string()
    }
}

/// Result of a successful adapter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterOutcome {
    /// Navigate away; leaving the page is the only success signal
    Redirect { url: String },
    /// Payment finished (or was handed over for review) without leaving
    Completed(PaymentSuccess),
}

/// Side effects behind one or more payment methods
#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Run the provider-specific part of a submit
    async fn execute(&self, ctx: &CheckoutContext) -> PaymentResult<AdapterOutcome>;

    /// Methods this adapter completes
    fn methods(&self) -> &[PaymentMethodId];

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared adapter (dynamic dispatch)
pub type BoxedPaymentAdapter = Arc<dyn PaymentAdapter>;

/// Adapter table keyed by method id
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<PaymentMethodId, BoxedPaymentAdapter>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter for every method it handles.
    ///
    /// A later registration for the same method replaces the earlier one.
    pub fn register(&mut self, adapter: BoxedPaymentAdapter) {
        for method in adapter.methods() {
            self.adapters.insert(*method, Arc::clone(&adapter));
        }
    }

    /// Register with builder pattern
    pub fn with_adapter(mut self, adapter: BoxedPaymentAdapter) -> Self {
        self.register(adapter);
        self
    }

    pub fn get(&self, method: PaymentMethodId) -> Option<&BoxedPaymentAdapter> {
        self.adapters.get(&method)
    }

    pub fn has_method(&self, method: PaymentMethodId) -> bool {
        self.adapters.contains_key(&method)
    }

    /// Methods with a registered adapter, in id order
    pub fn methods(&self) -> Vec<PaymentMethodId> {
        self.adapters.keys().copied().collect()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.adapters
                    .iter()
                    .map(|(method, adapter)| (method, adapter.provider_name())),
            )
            .finish()
    }
}

/// Shared flag for the one payment attempt a modal may have in flight.
///
/// The orchestrator and its wallet buttons hold clones of the same flag.
#[derive(Debug, Clone, Default)]
pub struct AttemptFlag(Arc<AtomicBool>);

impl AttemptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Claim the flag, failing if another attempt holds it
    pub fn begin(&self) -> PaymentResult<AttemptGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| PaymentError::AlreadySubmitting)?;
        Ok(AttemptGuard {
            flag: self.clone(),
            armed: true,
        })
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Releases its [`AttemptFlag`] on drop unless [`AttemptGuard::hold`] was called
#[derive(Debug)]
pub struct AttemptGuard {
    flag: AttemptFlag,
    armed: bool,
}

impl AttemptGuard {
    /// Keep the flag set after the guard goes away (page is navigating)
    pub fn hold(mut self) {
        self.armed = false;
    }
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        if self.armed {
            self.flag.clear();
        }
    }
}
