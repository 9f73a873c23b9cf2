//! # Wallet Payments
//!
//! Apple Pay, Google Pay and Samsung Pay through a browser payment request.
//!
//! The wallet button is the terminal action for wallet methods:
//!
//! 1. `probe()` asks the SDK whether the device can pay. Until it answers
//!    the button is `Checking`; it then becomes `Ready` or `Unavailable`.
//!    Nothing is rendered unless it is `Ready`.
//! 2. When the sheet hands back a payment method, the backend creates a
//!    payment intent, the SDK confirms it without redirect actions, the
//!    sheet is completed as success or fail, and the backend verifies the
//!    intent.
//! 3. Only a verified accepted status fires the success callback. Any other
//!    status is an error and is not retried.

use crate::adapter::AttemptFlag;
use crate::callback::{CheckoutCallbacks, PaymentSuccess, SuccessKind};
use crate::error::{PaymentError, PaymentResult};
use crate::method::PaymentMethodId;
use crate::plan::{Currency, Plan};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Parameters of the payment sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestSpec {
    /// Merchant country (ISO 3166 alpha-2)
    pub country: String,
    pub currency: Currency,
    /// Line shown on the sheet
    pub label: String,
    /// Amount in smallest currency unit
    pub amount: i64,
    pub request_payer_name: bool,
    pub request_payer_email: bool,
}

impl PaymentRequestSpec {
    pub fn for_plan(plan: &Plan, country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            currency: plan.price.currency,
            label: plan.name.clone(),
            amount: plan.price.amount,
            request_payer_name: true,
            request_payer_email: true,
        }
    }
}

/// What the wallet button renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletAvailability {
    Checking,
    Unavailable,
    Ready,
}

/// Payment intent status as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Succeeded,
    RequiresCapture,
    RequiresAction,
    RequiresPaymentMethod,
    RequiresConfirmation,
    Processing,
    Canceled,
    #[serde(untagged)]
    Other(String),
}

impl IntentStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "succeeded" => IntentStatus::Succeeded,
            "requires_capture" => IntentStatus::RequiresCapture,
            "requires_action" => IntentStatus::RequiresAction,
            "requires_payment_method" => IntentStatus::RequiresPaymentMethod,
            "requires_confirmation" => IntentStatus::RequiresConfirmation,
            "processing" => IntentStatus::Processing,
            "canceled" => IntentStatus::Canceled,
            other => IntentStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::RequiresCapture => "requires_capture",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::Processing => "processing",
            IntentStatus::Canceled => "canceled",
            IntentStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which statuses unlock the purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletPolicy {
    /// Authorized but not yet captured funds count as paid
    pub accept_requires_capture: bool,
}

impl Default for WalletPolicy {
    fn default() -> Self {
        Self {
            accept_requires_capture: true,
        }
    }
}

impl WalletPolicy {
    pub fn accepts(&self, status: &IntentStatus) -> bool {
        match status {
            IntentStatus::Succeeded => true,
            IntentStatus::RequiresCapture => self.accept_requires_capture,
            _ => false,
        }
    }
}

/// How the payment sheet is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetCompletion {
    Success,
    Fail,
}

/// Payment intent created by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIntent {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// Body of the create-payment-intent call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub plan_id: String,
    pub amount: i64,
    pub currency: Currency,
    pub payment_method_type: PaymentMethodId,
}

/// The card SDK's payment-request primitives
#[async_trait]
pub trait PaymentRequestSdk: Send + Sync {
    /// Whether this device can pay with a wallet for `spec`
    async fn can_make_payment(&self, spec: &PaymentRequestSpec) -> PaymentResult<bool>;

    /// Confirm an intent with the wallet's payment method, without
    /// performing any redirect or authentication action
    async fn confirm_payment(
        &self,
        client_secret: &str,
        payment_method_id: &str,
    ) -> PaymentResult<IntentStatus>;
}

/// The sheet's payment-method event
pub trait PaymentMethodEvent: Send + Sync {
    fn payment_method_id(&self) -> &str;

    /// Close the sheet with a result
    fn complete(&self, status: SheetCompletion);
}

/// Backend endpoints used by wallet payments
#[async_trait]
pub trait WalletBackend: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
        idempotency_key: &str,
    ) -> PaymentResult<CreatedIntent>;

    async fn verify_payment_intent(
        &self,
        payment_intent_id: &str,
        plan_id: &str,
    ) -> PaymentResult<IntentStatus>;
}

/// Wallet button for one checkout
pub struct WalletButton {
    method: PaymentMethodId,
    plan: Plan,
    spec: PaymentRequestSpec,
    availability: WalletAvailability,
    policy: WalletPolicy,
    paid: bool,
    in_flight: AttemptFlag,
    sdk: Arc<dyn PaymentRequestSdk>,
    backend: Arc<dyn WalletBackend>,
    callbacks: Arc<dyn CheckoutCallbacks>,
}

impl WalletButton {
    pub fn new(
        method: PaymentMethodId,
        plan: Plan,
        merchant_country: impl Into<String>,
        sdk: Arc<dyn PaymentRequestSdk>,
        backend: Arc<dyn WalletBackend>,
        callbacks: Arc<dyn CheckoutCallbacks>,
    ) -> PaymentResult<Self> {
        if !method.is_wallet() {
            return Err(PaymentError::Validation(format!(
                "{} is not a wallet payment method",
                method
            )));
        }
        let spec = PaymentRequestSpec::for_plan(&plan, merchant_country);
        Ok(Self {
            method,
            plan,
            spec,
            availability: WalletAvailability::Checking,
            policy: WalletPolicy::default(),
            paid: false,
            in_flight: AttemptFlag::new(),
            sdk,
            backend,
            callbacks,
        })
    }

    pub fn with_policy(mut self, policy: WalletPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Share the orchestrator's in-flight flag
    pub fn with_attempt_flag(mut self, flag: AttemptFlag) -> Self {
        self.in_flight = flag;
        self
    }

    pub fn availability(&self) -> WalletAvailability {
        self.availability
    }

    pub fn spec(&self) -> &PaymentRequestSpec {
        &self.spec
    }

    /// The payment button is shown only once the probe said yes
    pub fn renders_button(&self) -> bool {
        self.availability == WalletAvailability::Ready && !self.paid
    }

    /// Ask the SDK whether the device can pay
    pub async fn probe(&mut self) -> WalletAvailability {
        self.availability = WalletAvailability::Checking;
        self.availability = match self.sdk.can_make_payment(&self.spec).await {
            Ok(true) => WalletAvailability::Ready,
            Ok(false) => WalletAvailability::Unavailable,
            Err(e) => {
                warn!("Wallet availability probe failed: {}", e);
                WalletAvailability::Unavailable
            }
        };
        debug!("Wallet {} availability: {:?}", self.method, self.availability);
        self.availability
    }

    /// Handle the sheet's payment-method event.
    ///
    /// Reports the outcome through the callbacks and returns it.
    #[instrument(skip(self, event), fields(method = %self.method, plan = %self.plan.id))]
    pub async fn handle_payment_method(
        &mut self,
        event: &dyn PaymentMethodEvent,
    ) -> PaymentResult<PaymentSuccess> {
        if !self.renders_button() {
            event.complete(SheetCompletion::Fail);
            return Err(PaymentError::InvalidTransition(
                "wallet payment is not ready".to_string(),
            ));
        }
        let attempt = match self.in_flight.begin() {
            Ok(guard) => guard,
            Err(e) => {
                event.complete(SheetCompletion::Fail);
                return Err(e);
            }
        };
        let result = self.pay(event).await;
        drop(attempt);

        match result {
            Ok(success) => {
                self.paid = true;
                info!("Wallet payment verified: {:?}", success.reference);
                self.callbacks.on_success(&success);
                Ok(success)
            }
            Err(e) => {
                warn!("Wallet payment failed: {}", e);
                self.callbacks.on_error(&e.user_message());
                Err(e)
            }
        }
    }

    async fn pay(&self, event: &dyn PaymentMethodEvent) -> PaymentResult<PaymentSuccess> {
        let request = PaymentIntentRequest {
            plan_id: self.plan.id.clone(),
            amount: self.spec.amount,
            currency: self.spec.currency,
            payment_method_type: self.method,
        };
        let idempotency_key = uuid::Uuid::new_v4().to_string();

        let intent = match self
            .backend
            .create_payment_intent(&request, &idempotency_key)
            .await
        {
            Ok(intent) => intent,
            Err(e) => {
                event.complete(SheetCompletion::Fail);
                return Err(e);
            }
        };

        let confirmed = self
            .sdk
            .confirm_payment(&intent.client_secret, event.payment_method_id())
            .await;

        match confirmed {
            Ok(status) if self.policy.accepts(&status) => {
                event.complete(SheetCompletion::Success);
            }
            Ok(status) => {
                event.complete(SheetCompletion::Fail);
                return Err(PaymentError::ConfirmationFailed {
                    status: status.to_string(),
                });
            }
            Err(e) => {
                event.complete(SheetCompletion::Fail);
                return Err(e);
            }
        }

        let verified = self
            .backend
            .verify_payment_intent(&intent.payment_intent_id, &self.plan.id)
            .await?;

        if !self.policy.accepts(&verified) {
            return Err(PaymentError::ConfirmationFailed {
                status: verified.to_string(),
            });
        }

        Ok(
            PaymentSuccess::new(self.method, self.plan.id.clone(), SuccessKind::Confirmed)
                .with_reference(intent.payment_intent_id),
        )
    }
}

impl std::fmt::Debug for WalletButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletButton")
            .field("method", &self.method)
            .field("plan", &self.plan.id)
            .field("availability", &self.availability)
            .field("paid", &self.paid)
            .field("in_flight", &self.in_flight.is_set())
            .finish()
    }
}
