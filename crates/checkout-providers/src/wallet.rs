//! # Wallet Backend
//!
//! Payment intent endpoints behind the wallet button. The intent is created
//! before the SDK confirms it and verified server-side afterwards.

use crate::client::{endpoints, require_data, BackendClient};
use async_trait::async_trait;
use checkout_core::{CreatedIntent, IntentStatus, PaymentIntentRequest, PaymentResult, WalletBackend};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const PROVIDER: &str = "stripe";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyIntentRequest<'a> {
    payment_intent_id: &'a str,
    plan_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyIntentData {
    status: String,
}

#[async_trait]
impl WalletBackend for BackendClient {
    #[instrument(skip(self, request, idempotency_key), fields(plan_id = %request.plan_id, method = %request.payment_method_type))]
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
        idempotency_key: &str,
    ) -> PaymentResult<CreatedIntent> {
        let data: Option<CreatedIntent> = self
            .post_json(
                PROVIDER,
                endpoints::STRIPE_CREATE_PAYMENT_INTENT,
                request,
                Some(idempotency_key),
            )
            .await?;
        let intent = require_data(PROVIDER, data)?;
        debug!("Created payment intent: {}", intent.payment_intent_id);
        Ok(intent)
    }

    #[instrument(skip(self))]
    async fn verify_payment_intent(
        &self,
        payment_intent_id: &str,
        plan_id: &str,
    ) -> PaymentResult<IntentStatus> {
        let data: Option<VerifyIntentData> = self
            .post_json(
                PROVIDER,
                endpoints::STRIPE_VERIFY_PAYMENT_INTENT,
                &VerifyIntentRequest {
                    payment_intent_id,
                    plan_id,
                },
                None,
            )
            .await?;
        let verified = require_data(PROVIDER, data)?;
        Ok(IntentStatus::parse(&verified.status))
    }
}
