//! # Card Checkout
//!
//! Card payments through a hosted checkout session.
//! The backend creates the session and returns its URL; the customer is
//! sent there with a full-page redirect.

use crate::client::{checked_redirect_url, endpoints, require_data, BackendClient};
use crate::config::ReturnUrls;
use async_trait::async_trait;
use checkout_core::{
    AdapterOutcome, CheckoutContext, Currency, PaymentAdapter, PaymentError, PaymentMethodId,
    PaymentResult,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

const PROVIDER: &str = "stripe";

/// Hosted checkout session adapter for card payments
#[derive(Debug, Clone)]
pub struct CardCheckoutAdapter {
    client: BackendClient,
    return_urls: ReturnUrls,
}

impl CardCheckoutAdapter {
    pub fn new(client: BackendClient, return_urls: ReturnUrls) -> Self {
        Self {
            client,
            return_urls,
        }
    }

    fn session_request<'a>(&'a self, ctx: &'a CheckoutContext) -> CheckoutSessionRequest<'a> {
        CheckoutSessionRequest {
            plan_id: &ctx.plan.id,
            amount: ctx.plan.price.amount,
            currency: ctx.plan.price.currency,
            payment_method: ctx.method,
            success_url: self.return_urls.success_url(),
            cancel_url: self.return_urls.cancel_url(),
        }
    }
}

#[async_trait]
impl PaymentAdapter for CardCheckoutAdapter {
    #[instrument(skip(self, ctx), fields(plan_id = %ctx.plan.id, attempt = %ctx.attempt_id))]
    async fn execute(&self, ctx: &CheckoutContext) -> PaymentResult<AdapterOutcome> {
        if ctx.method != PaymentMethodId::Card {
            return Err(PaymentError::Validation(format!(
                "Card checkout cannot complete {}",
                ctx.method
            )));
        }

        let request = self.session_request(ctx);
        debug!(
            "Creating checkout session: amount={}, currency={}",
            request.amount, request.currency
        );

        let data: Option<CheckoutSessionData> = self
            .client
            .post_json(
                PROVIDER,
                endpoints::STRIPE_CHECKOUT_SESSION,
                &request,
                Some(&ctx.idempotency_key()),
            )
            .await?;
        let session = require_data(PROVIDER, data)?;
        let url = checked_redirect_url(PROVIDER, &session.url)?;

        info!(
            "Created checkout session{}",
            session
                .session_id
                .as_deref()
                .map(|id| format!(": {}", id))
                .unwrap_or_default()
        );

        Ok(AdapterOutcome::Redirect { url })
    }

    fn methods(&self) -> &[PaymentMethodId] {
        &[PaymentMethodId::Card]
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Backend API Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutSessionRequest<'a> {
    plan_id: &'a str,
    amount: i64,
    currency: Currency,
    payment_method: PaymentMethodId,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutSessionData {
    url: String,
    #[serde(default)]
    session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use checkout_core::{BillingInterval, Plan, Price};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn plan() -> Plan {
        Plan::new(
            "pro-monthly",
            "Pro",
            Price::new(19.0, Currency::USD),
            BillingInterval::Monthly,
        )
    }

    fn adapter(server: &MockServer) -> CardCheckoutAdapter {
        let client = BackendClient::new(&ProviderConfig::new(format!("{}/api", server.uri()))).unwrap();
        CardCheckoutAdapter::new(client, ReturnUrls::new("https://app.example.com"))
    }

    #[tokio::test]
    async fn test_redirects_to_session_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/stripe/checkout-session"))
            .and(header_exists("Idempotency-Key"))
            .and(body_partial_json(json!({
                "planId": "pro-monthly",
                "amount": 1900,
                "currency": "usd",
                "paymentMethod": "card",
                "successUrl": "https://app.example.com/dashboard?payment=success",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "url": "https://checkout.stripe.com/c/pay/cs_test_1", "sessionId": "cs_test_1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = CheckoutContext::new(PaymentMethodId::Card, plan());
        let outcome = adapter(&server).execute(&ctx).await.unwrap();

        assert_eq!(
            outcome,
            AdapterOutcome::Redirect {
                url: "https://checkout.stripe.com/c/pay/cs_test_1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_server_error_message_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/stripe/checkout-session"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "error": "Plan is no longer available"
            })))
            .mount(&server)
            .await;

        let ctx = CheckoutContext::new(PaymentMethodId::Card, plan());
        let err = adapter(&server).execute(&ctx).await.unwrap_err();

        assert_eq!(err.user_message(), "Plan is no longer available");
    }

    #[tokio::test]
    async fn test_rejects_non_http_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/stripe/checkout-session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "url": "javascript:void(0)" }
            })))
            .mount(&server)
            .await;

        let ctx = CheckoutContext::new(PaymentMethodId::Card, plan());
        assert!(adapter(&server).execute(&ctx).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_method_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let ctx = CheckoutContext::new(PaymentMethodId::Paypal, plan());
        let err = adapter(&server).execute(&ctx).await.unwrap_err();
        assert!(err.is_validation());
    }
}
