//! # checkout-core
//!
//! Core types and state machines for the checkout orchestrator.
//!
//! This crate provides:
//! - `MethodCatalog` for the payment methods offered per country
//! - `CheckoutState`, the `select → details → upload` selection flow
//! - `PaymentAdapter` and `AdapterRegistry` for provider side effects
//! - `WalletButton` for payment-request (Apple/Google/Samsung Pay) checkout
//! - `CheckoutOrchestrator`, tying the above to caller callbacks
//! - `Preferences` and `SettingsStore` for injected user settings
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{CatalogConfig, CheckoutOrchestrator, MethodCatalog, PaymentMethodId};
//!
//! let catalog = MethodCatalog::new(CatalogConfig::all_providers());
//! let methods = catalog.available_methods(Some("SN"));
//!
//! let mut checkout = CheckoutOrchestrator::new(plan, registry, callbacks, navigator);
//! let card = methods.iter().find(|m| m.id == PaymentMethodId::Card).unwrap();
//! checkout.select(card)?;
//!
//! // Redirects through the navigator, or reports to the callbacks
//! checkout.submit().await?;
//! ```

pub mod adapter;
pub mod bank;
pub mod callback;
pub mod catalog;
pub mod error;
pub mod flow;
pub mod method;
pub mod orchestrator;
pub mod plan;
pub mod settings;
pub mod wallet;

// Re-exports for convenience
pub use adapter::{
    AdapterOutcome, AdapterRegistry, AttemptFlag, AttemptGuard, BoxedPaymentAdapter, CheckoutContext,
    PaymentAdapter,
};
pub use bank::{validate_iban, BankDetails};
pub use callback::{CheckoutCallbacks, LoggingCallbacks, Navigator, PaymentSuccess, SuccessKind};
pub use catalog::{get_available_payment_methods, normalize_country, CatalogConfig, MethodCatalog};
pub use error::{PaymentError, PaymentResult, GENERIC_PAYMENT_ERROR};
pub use flow::{CheckoutState, CheckoutStep, ReceiptFile, SubmitControl, MAX_RECEIPT_BYTES};
pub use method::{CompletionKind, PaymentMethodId, PaymentMethodInfo};
pub use orchestrator::CheckoutOrchestrator;
pub use plan::{BillingInterval, Currency, Plan, PlanCatalog, Price};
pub use settings::{Language, MemorySettingsStore, Preferences, SettingsStore};
pub use wallet::{
    CreatedIntent, IntentStatus, PaymentIntentRequest, PaymentMethodEvent, PaymentRequestSdk,
    PaymentRequestSpec, SheetCompletion, WalletAvailability, WalletBackend, WalletButton,
    WalletPolicy,
};
