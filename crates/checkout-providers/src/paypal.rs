//! # PayPal Orders
//!
//! The backend creates a PayPal order and returns its approval URL.
//! The customer approves the order on PayPal and comes back to the
//! app's return URL.

use crate::client::{checked_redirect_url, endpoints, require_data, BackendClient};
use crate::config::ReturnUrls;
use async_trait::async_trait;
use checkout_core::{
    AdapterOutcome, CheckoutContext, Currency, PaymentAdapter, PaymentError, PaymentMethodId,
    PaymentResult,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

const PROVIDER: &str = "paypal";

/// Order-approval redirect adapter
#[derive(Debug, Clone)]
pub struct PayPalAdapter {
    client: BackendClient,
    return_urls: ReturnUrls,
}

impl PayPalAdapter {
    pub fn new(client: BackendClient, return_urls: ReturnUrls) -> Self {
        Self {
            client,
            return_urls,
        }
    }
}

#[async_trait]
impl PaymentAdapter for PayPalAdapter {
    #[instrument(skip(self, ctx), fields(plan_id = %ctx.plan.id, attempt = %ctx.attempt_id))]
    async fn execute(&self, ctx: &CheckoutContext) -> PaymentResult<AdapterOutcome> {
        if ctx.method != PaymentMethodId::Paypal {
            return Err(PaymentError::Validation(format!(
                "PayPal cannot complete {}",
                ctx.method
            )));
        }

        let request = CreateOrderRequest {
            plan_id: &ctx.plan.id,
            amount: ctx.plan.price.amount,
            currency: ctx.plan.price.currency,
            return_url: self.return_urls.success_url(),
            cancel_url: self.return_urls.cancel_url(),
        };

        let data: Option<CreateOrderData> = self
            .client
            .post_json(
                PROVIDER,
                endpoints::PAYPAL_CREATE_ORDER,
                &request,
                Some(&ctx.idempotency_key()),
            )
            .await?;
        let order = require_data(PROVIDER, data)?;
        let url = checked_redirect_url(PROVIDER, &order.approval_url)?;

        if let Some(ref id) = order.order_id {
            info!("Created PayPal order: {}", id);
        }

        Ok(AdapterOutcome::Redirect { url })
    }

    fn methods(&self) -> &[PaymentMethodId] {
        &[PaymentMethodId::Paypal]
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest<'a> {
    plan_id: &'a str,
    amount: i64,
    currency: Currency,
    return_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderData {
    #[serde(alias = "url")]
    approval_url: String,
    #[serde(default)]
    order_id: Option<String>,
}
