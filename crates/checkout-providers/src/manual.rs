//! # Manual Payments
//!
//! Offline methods (bank transfer and mobile money) are confirmed by a
//! proof-of-payment upload. The receipt goes to the backend as a multipart
//! form and the payment waits for manual review.

use crate::client::{endpoints, BackendClient};
use async_trait::async_trait;
use checkout_core::{
    AdapterOutcome, CheckoutContext, PaymentAdapter, PaymentError, PaymentMethodId,
    PaymentResult, PaymentSuccess, SuccessKind,
};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{info, instrument};

const PROVIDER: &str = "manual";

const MANUAL_METHODS: &[PaymentMethodId] = &[
    PaymentMethodId::BankTransfer,
    PaymentMethodId::OrangeMoney,
    PaymentMethodId::MtnMomo,
    PaymentMethodId::Wave,
    PaymentMethodId::MoovMoney,
];

/// Receipt upload adapter
#[derive(Debug, Clone)]
pub struct ManualReceiptAdapter {
    client: BackendClient,
}

impl ManualReceiptAdapter {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    fn build_form(ctx: &CheckoutContext) -> PaymentResult<Form> {
        let receipt = ctx.receipt.as_ref().ok_or_else(|| {
            PaymentError::Validation("Upload your payment receipt first".to_string())
        })?;

        let file = Part::bytes(receipt.bytes.clone())
            .file_name(receipt.file_name.clone())
            .mime_str(&receipt.content_type)
            .map_err(|e| PaymentError::Validation(format!("Invalid receipt type: {}", e)))?;

        let mut form = Form::new()
            .part("file", file)
            .text("plan", ctx.plan.id.clone())
            .text("amount", ctx.plan.price.amount.to_string())
            .text("currency", ctx.plan.price.currency.as_str())
            .text("method", ctx.method.as_str());

        if let Some(ref iban) = ctx.iban {
            form = form.text("iban", iban.clone());
        }

        Ok(form)
    }
}

#[async_trait]
impl PaymentAdapter for ManualReceiptAdapter {
    #[instrument(skip(self, ctx), fields(method = %ctx.method, plan_id = %ctx.plan.id))]
    async fn execute(&self, ctx: &CheckoutContext) -> PaymentResult<AdapterOutcome> {
        if !MANUAL_METHODS.contains(&ctx.method) {
            return Err(PaymentError::Validation(format!(
                "{} is not confirmed by receipt",
                ctx.method
            )));
        }

        let form = Self::build_form(ctx)?;
        let data: Option<ManualPaymentData> = self
            .client
            .post_multipart(
                PROVIDER,
                endpoints::MANUAL_PAYMENT,
                form,
                Some(&ctx.idempotency_key()),
            )
            .await?;

        let mut success = PaymentSuccess::new(ctx.method, ctx.plan.id.clone(), SuccessKind::PendingReview);
        if let Some(id) = data.and_then(|d| d.id) {
            info!("Manual payment submitted for review: {}", id);
            success = success.with_reference(id);
        } else {
            info!("Manual payment submitted for review");
        }

        Ok(AdapterOutcome::Completed(success))
    }

    fn methods(&self) -> &[PaymentMethodId] {
        MANUAL_METHODS
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManualPaymentData {
    #[serde(default, alias = "paymentId")]
    id: Option<String>,
}
