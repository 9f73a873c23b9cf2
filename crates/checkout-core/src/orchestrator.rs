//! # Checkout Orchestrator
//!
//! One orchestrator per open checkout modal. It owns the selection flow,
//! looks up the adapter for the chosen method on submit, and reports the
//! outcome through the caller's callbacks.

use crate::adapter::{AdapterOutcome, AdapterRegistry, AttemptFlag, CheckoutContext};
use crate::callback::{CheckoutCallbacks, Navigator};
use crate::error::{PaymentError, PaymentResult};
use crate::flow::{CheckoutState, CheckoutStep, ReceiptFile, SubmitControl};
use crate::method::{CompletionKind, PaymentMethodInfo};
use crate::plan::Plan;
use crate::wallet::{PaymentRequestSdk, WalletBackend, WalletButton, WalletPolicy};
use std::sync::Arc;
use tracing::{error, info, instrument};

const DEFAULT_MERCHANT_COUNTRY: &str = "US";

/// Checkout modal controller
pub struct CheckoutOrchestrator {
    plan: Plan,
    state: CheckoutState,
    registry: AdapterRegistry,
    callbacks: Arc<dyn CheckoutCallbacks>,
    navigator: Arc<dyn Navigator>,
    wallet_backend: Option<Arc<dyn WalletBackend>>,
    wallet_policy: WalletPolicy,
    merchant_country: String,
    /// Shared with wallet buttons; one attempt in flight per modal
    in_flight: AttemptFlag,
}

impl CheckoutOrchestrator {
    pub fn new(
        plan: Plan,
        registry: AdapterRegistry,
        callbacks: Arc<dyn CheckoutCallbacks>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            plan,
            state: CheckoutState::new(),
            registry,
            callbacks,
            navigator,
            wallet_backend: None,
            wallet_policy: WalletPolicy::default(),
            merchant_country: DEFAULT_MERCHANT_COUNTRY.to_string(),
            in_flight: AttemptFlag::new(),
        }
    }

    /// Builder: backend used by wallet buttons
    pub fn with_wallet_backend(mut self, backend: Arc<dyn WalletBackend>) -> Self {
        self.wallet_backend = Some(backend);
        self
    }

    pub fn with_wallet_policy(mut self, policy: WalletPolicy) -> Self {
        self.wallet_policy = policy;
        self
    }

    /// Builder: merchant country shown on the payment sheet
    pub fn with_merchant_country(mut self, country: impl Into<String>) -> Self {
        self.merchant_country = country.into();
        self
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_set()
    }

    pub fn select(&mut self, method: &PaymentMethodInfo) -> PaymentResult<CheckoutStep> {
        self.ensure_idle()?;
        self.state.select(method)
    }

    pub fn back(&mut self) -> PaymentResult<CheckoutStep> {
        self.ensure_idle()?;
        Ok(self.state.back())
    }

    pub fn set_iban(&mut self, raw: &str) -> PaymentResult<()> {
        self.ensure_idle()?;
        self.state.set_iban(raw)
    }

    pub fn proceed_to_upload(&mut self) -> PaymentResult<CheckoutStep> {
        self.ensure_idle()?;
        self.state.proceed_to_upload()
    }

    pub fn attach_receipt(&mut self, receipt: ReceiptFile) -> PaymentResult<()> {
        self.ensure_idle()?;
        self.state.attach_receipt(receipt)
    }

    pub fn clear_receipt(&mut self) {
        self.state.clear_receipt();
    }

    /// Submit control, disabled while an attempt is in flight
    pub fn submit_control(&self) -> SubmitControl {
        match self.state.submit_control() {
            SubmitControl::Enabled if self.is_submitting() => SubmitControl::Disabled,
            control => control,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.submit_control() == SubmitControl::Enabled
    }

    /// Run the selected method's adapter.
    ///
    /// Validation happens before any network call. Errors are reported to
    /// `on_error` and returned; the modal stays usable. A redirect hands
    /// control to the navigator and leaves the modal in its submitting state.
    #[instrument(skip(self), fields(plan = %self.plan.id))]
    pub async fn submit(&mut self) -> PaymentResult<AdapterOutcome> {
        self.ensure_idle()?;

        let ctx = match self.prepare() {
            Ok(ctx) => ctx,
            Err(e) => {
                self.callbacks.on_error(&e.user_message());
                return Err(e);
            }
        };
        let adapter = match self.registry.get(ctx.method) {
            Some(adapter) => Arc::clone(adapter),
            None => {
                let e = PaymentError::AdapterNotFound { method: ctx.method };
                error!("{}", e);
                self.callbacks.on_error(&e.user_message());
                return Err(e);
            }
        };

        info!(
            "Submitting payment: method={}, provider={}, attempt={}",
            ctx.method,
            adapter.provider_name(),
            ctx.attempt_id
        );

        let attempt = self.in_flight.begin()?;
        let result = adapter.execute(&ctx).await;

        match result {
            Ok(AdapterOutcome::Redirect { url }) => {
                attempt.hold();
                info!("Redirecting to provider: {}", url);
                self.navigator.redirect(&url);
                Ok(AdapterOutcome::Redirect { url })
            }
            Ok(AdapterOutcome::Completed(success)) => {
                drop(attempt);
                self.callbacks.on_success(&success);
                Ok(AdapterOutcome::Completed(success))
            }
            Err(e) => {
                drop(attempt);
                error!("Payment attempt failed: {}", e);
                self.callbacks.on_error(&e.user_message());
                Err(e)
            }
        }
    }

    /// Wallet button for the selected wallet method
    pub fn wallet_button(&self, sdk: Arc<dyn PaymentRequestSdk>) -> PaymentResult<WalletButton> {
        let method = self
            .state
            .selected_method()
            .filter(|m| m.is_wallet() && self.state.step() == CheckoutStep::Details)
            .ok_or_else(|| {
                PaymentError::InvalidTransition("no wallet method selected".to_string())
            })?;
        let backend = self.wallet_backend.clone().ok_or_else(|| {
            PaymentError::Configuration("wallet backend not configured".to_string())
        })?;

        Ok(WalletButton::new(
            method,
            self.plan.clone(),
            self.merchant_country.clone(),
            sdk,
            backend,
            Arc::clone(&self.callbacks),
        )?
        .with_policy(self.wallet_policy)
        .with_attempt_flag(self.in_flight.clone()))
    }

    /// Modal closed: drop the receipt and any in-flight flag
    pub fn close(&mut self) {
        self.state.reset();
        self.in_flight.clear();
    }

    fn ensure_idle(&self) -> PaymentResult<()> {
        if self.is_submitting() {
            Err(PaymentError::AlreadySubmitting)
        } else {
            Ok(())
        }
    }

    fn prepare(&self) -> PaymentResult<CheckoutContext> {
        let method = self.state.selected_method().ok_or_else(|| {
            PaymentError::Validation("Choose a payment method first".to_string())
        })?;

        match method.completion() {
            CompletionKind::Wallet => {
                return Err(PaymentError::Validation(
                    "Use the wallet button to complete this payment".to_string(),
                ))
            }
            CompletionKind::Receipt { .. } if !self.state.can_submit() => {
                return Err(PaymentError::Validation(
                    "Upload your payment receipt first".to_string(),
                ))
            }
            _ if !self.state.can_submit() => {
                return Err(PaymentError::InvalidTransition(format!(
                    "cannot submit from the {:?} step",
                    self.state.step()
                )))
            }
            _ => {}
        }

        CheckoutContext::from_state(&self.state, &self.plan)
    }
}

impl std::fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutOrchestrator")
            .field("plan", &self.plan.id)
            .field("state", &self.state)
            .field("registry", &self.registry)
            .field("is_submitting", &self.is_submitting())
            .finish()
    }
}
