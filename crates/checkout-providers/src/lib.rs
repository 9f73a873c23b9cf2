//! # checkout-providers
//!
//! Provider adapters for checkout-rs, talking to the payment backend.
//!
//! | Adapter                | Methods                                   | Outcome    |
//! |------------------------|-------------------------------------------|------------|
//! | `CardCheckoutAdapter`  | card                                      | redirect   |
//! | `PayPalAdapter`        | paypal                                    | redirect   |
//! | `ManualReceiptAdapter` | bank transfer, Orange, MTN, Wave, Moov    | completed  |
//!
//! Wallet methods are completed by `checkout_core::WalletButton`;
//! `BackendClient` implements its `WalletBackend`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_providers::{default_registry, BackendClient, ProviderConfig};
//!
//! let config = ProviderConfig::from_env()?;
//! let client = BackendClient::new(&config)?;
//! let registry = default_registry(client.clone(), &config);
//!
//! let checkout = CheckoutOrchestrator::new(plan, registry, callbacks, navigator)
//!     .with_wallet_backend(Arc::new(client));
//! ```

pub mod card;
pub mod client;
pub mod config;
pub mod manual;
pub mod paypal;
pub mod wallet;

// Re-exports
pub use card::CardCheckoutAdapter;
pub use client::{endpoints, BackendClient};
pub use config::{ProviderConfig, ReturnUrls};
pub use manual::ManualReceiptAdapter;
pub use paypal::PayPalAdapter;

use checkout_core::AdapterRegistry;
use std::sync::Arc;

/// Registry with every backend-driven adapter
pub fn default_registry(client: BackendClient, config: &ProviderConfig) -> AdapterRegistry {
    AdapterRegistry::new()
        .with_adapter(Arc::new(CardCheckoutAdapter::new(
            client.clone(),
            config.return_urls.clone(),
        )))
        .with_adapter(Arc::new(PayPalAdapter::new(
            client.clone(),
            config.return_urls.clone(),
        )))
        .with_adapter(Arc::new(ManualReceiptAdapter::new(client)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::{
        BankDetails, BillingInterval, CatalogConfig, CheckoutCallbacks, CheckoutOrchestrator, CheckoutStep,
        Currency, MethodCatalog, Navigator, PaymentMethodId, PaymentSuccess, Plan, Price,
        ReceiptFile, SubmitControl,
    };
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct Recorder {
        successes: Mutex<Vec<PaymentSuccess>>,
        errors: Mutex<Vec<String>>,
        redirects: Mutex<Vec<String>>,
    }

    impl CheckoutCallbacks for Recorder {
        fn on_success(&self, success: &PaymentSuccess) {
            self.successes.lock().unwrap().push(success.clone());
        }

        fn on_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    impl Navigator for Recorder {
        fn redirect(&self, url: &str) {
            self.redirects.lock().unwrap().push(url.to_string());
        }
    }

    fn checkout(server: &MockServer, recorder: &Arc<Recorder>) -> CheckoutOrchestrator {
        let config = ProviderConfig::new(server.uri());
        let client = BackendClient::new(&config).unwrap();
        let plan = Plan::new("pro", "Pro", Price::new(19.0, Currency::EUR), BillingInterval::Monthly);
        CheckoutOrchestrator::new(
            plan,
            default_registry(client, &config),
            recorder.clone(),
            recorder.clone(),
        )
    }

    #[test]
    fn test_default_registry_covers_non_wallet_methods() {
        let config = ProviderConfig::new("http://localhost:3000/api");
        let registry = default_registry(BackendClient::new(&config).unwrap(), &config);

        for method in PaymentMethodId::ALL {
            assert_eq!(registry.has_method(method), !method.is_wallet(), "{}", method);
        }
    }

    #[tokio::test]
    async fn test_card_server_error_keeps_modal_open() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stripe/checkout-session"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "success": false,
                "error": "Card payments are paused"
            })))
            .mount(&server)
            .await;

        let recorder = Arc::new(Recorder::default());
        let mut checkout = checkout(&server, &recorder);
        let catalog = MethodCatalog::new(CatalogConfig::all_providers());
        let card = catalog.find(None, PaymentMethodId::Card).unwrap();

        checkout.select(&card).unwrap();
        assert_eq!(checkout.submit_control(), SubmitControl::Enabled);
        assert!(checkout.submit().await.is_err());

        assert_eq!(*recorder.errors.lock().unwrap(), vec!["Card payments are paused".to_string()]);
        assert!(recorder.redirects.lock().unwrap().is_empty());
        assert!(!checkout.is_submitting());
        assert_eq!(checkout.submit_control(), SubmitControl::Enabled);
    }

    #[tokio::test]
    async fn test_card_redirects_to_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stripe/checkout-session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "url": "https://checkout.stripe.com/c/pay/cs_1" }
            })))
            .mount(&server)
            .await;

        let recorder = Arc::new(Recorder::default());
        let mut checkout = checkout(&server, &recorder);
        let catalog = MethodCatalog::new(CatalogConfig::all_providers());
        checkout
            .select(&catalog.find(None, PaymentMethodId::Card).unwrap())
            .unwrap();
        checkout.submit().await.unwrap();

        assert_eq!(
            *recorder.redirects.lock().unwrap(),
            vec!["https://checkout.stripe.com/c/pay/cs_1".to_string()]
        );
        assert!(recorder.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bank_transfer_with_receipt_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/manual"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "id": "mp_7" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let recorder = Arc::new(Recorder::default());
        let mut checkout = checkout(&server, &recorder);
        let catalog = MethodCatalog::new(
            CatalogConfig::all_providers()
                .with_bank(BankDetails::new("GB82WEST12345698765432", "Acme Ltd")),
        );
        let bank = catalog.find(None, PaymentMethodId::BankTransfer).unwrap();

        assert_eq!(checkout.select(&bank).unwrap(), CheckoutStep::Details);
        checkout.set_iban("FR14 2004 1010 0505 0001 3M02 606").unwrap();
        checkout.proceed_to_upload().unwrap();
        assert_eq!(checkout.submit_control(), SubmitControl::Disabled);

        let receipt = ReceiptFile::new("transfer.png", "image/png", vec![0x89, b'P', b'N', b'G']).unwrap();
        checkout.attach_receipt(receipt).unwrap();
        assert_eq!(checkout.submit_control(), SubmitControl::Enabled);

        checkout.submit().await.unwrap();

        let successes = recorder.successes.lock().unwrap();
        assert_eq!(successes.len(), 1);
        assert_eq!(successes[0].reference.as_deref(), Some("mp_7"));
        assert!(recorder.errors.lock().unwrap().is_empty());
    }
}
