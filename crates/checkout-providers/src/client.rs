//! # Backend Client
//!
//! HTTP client for the payment backend. Every endpoint answers with a
//! JSON envelope:
//!
//! ```json
//! { "success": true,  "data": { ... } }
//! { "success": false, "error": "Human readable message" }
//! ```
//!
//! Non-OK responses and `success: false` bodies become
//! `PaymentError::ProviderError` carrying the server's message verbatim.

use crate::config::ProviderConfig;
use checkout_core::{PaymentError, PaymentResult};
use reqwest::{multipart::Form, Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};

/// Endpoint paths, relative to the API base URL
pub mod endpoints {
    pub const STRIPE_CHECKOUT_SESSION: &str = "stripe/checkout-session";
    pub const STRIPE_CREATE_PAYMENT_INTENT: &str = "stripe/create-payment-intent";
    pub const STRIPE_VERIFY_PAYMENT_INTENT: &str = "stripe/verify-payment-intent";
    pub const PAYPAL_CREATE_ORDER: &str = "paypal/create-order";
    pub const MANUAL_PAYMENT: &str = "payments/manual";
}

/// The backend's response envelope
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    /// Some endpoints use `message` instead of `error`
    #[serde(default)]
    pub message: Option<String>,
}

/// Error-only view of a response body
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the payment backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: Client,
}

impl BackendClient {
    /// Create a client from configuration
    pub fn new(config: &ProviderConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PaymentError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(&ProviderConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST a JSON body and decode the envelope's `data`
    pub async fn post_json<B, T>(
        &self,
        provider: &str,
        path: &str,
        body: &B,
        idempotency_key: Option<&str>,
    ) -> PaymentResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.endpoint(path)).json(body);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }
        self.send(provider, path, request).await
    }

    /// POST a multipart form and decode the envelope's `data`
    pub async fn post_multipart<T>(
        &self,
        provider: &str,
        path: &str,
        form: Form,
        idempotency_key: Option<&str>,
    ) -> PaymentResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.endpoint(path)).multipart(form);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }
        self.send(provider, path, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        provider: &str,
        path: &str,
        request: RequestBuilder,
    ) -> PaymentResult<Option<T>> {
        debug!("POST {} ({})", path, provider);

        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        decode_envelope(provider, status, &body)
    }
}

/// Turn a status + body into the envelope's data or a provider error
pub fn decode_envelope<T: DeserializeOwned>(
    provider: &str,
    status: StatusCode,
    body: &str,
) -> PaymentResult<Option<T>> {
    if !status.is_success() {
        error!("Backend error: provider={}, status={}, body={}", provider, status, body);
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        return Err(PaymentError::ProviderError {
            provider: provider.to_string(),
            message: parsed.error.or(parsed.message).unwrap_or_default(),
        });
    }

    let envelope: ApiEnvelope<T> = serde_json::from_str(body).map_err(|e| {
        PaymentError::Serialization(format!("Failed to parse {} response: {}", provider, e))
    })?;

    if !envelope.success {
        error!("Backend rejected request: provider={}, body={}", provider, body);
        return Err(PaymentError::ProviderError {
            provider: provider.to_string(),
            message: envelope.error.or(envelope.message).unwrap_or_default(),
        });
    }

    Ok(envelope.data)
}

/// Require `data` to be present in a successful envelope
pub fn require_data<T>(provider: &str, data: Option<T>) -> PaymentResult<T> {
    data.ok_or_else(|| {
        PaymentError::Serialization(format!("{} response is missing data", provider))
    })
}

/// Check a provider-issued redirect URL before navigating to it
pub fn checked_redirect_url(provider: &str, url: &str) -> PaymentResult<String> {
    let url = url.trim();
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(url.to_string())
    } else {
        Err(PaymentError::ProviderError {
            provider: provider.to_string(),
            message: format!("Invalid redirect URL from {}", provider),
        })
    }
}
