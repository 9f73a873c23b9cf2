//! # Request Handlers
//!
//! Axum request handlers for the checkout API.
//! Responses use the `{success, data | error}` envelope the checkout
//! client expects.

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use checkout_core::{BankDetails, PaymentError, PaymentMethodInfo, Plan};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

// =============================================================================
// Envelope
// =============================================================================

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Error envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError(PaymentError);

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            success: false,
            error: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct MethodsQuery {
    /// ISO 3166 alpha-2 country of the user
    #[serde(default)]
    pub country: Option<String>,
}

/// Public checkout settings for the browser
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfigResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_publishable_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paypal_client_id: Option<String>,
    pub test_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankTransferInfo>,
}

/// Bank account shown on the bank-transfer step
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransferInfo {
    #[serde(flatten)]
    pub details: BankDetails,
    pub formatted_iban: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "checkout-rs",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Payment methods offered for a country
#[instrument(skip(state))]
pub async fn list_payment_methods(
    State(state): State<AppState>,
    Query(query): Query<MethodsQuery>,
) -> Json<ApiResponse<Vec<PaymentMethodInfo>>> {
    let methods = state.methods.available_methods(query.country.as_deref());
    debug!("Serving {} payment methods", methods.len());
    ApiResponse::ok(methods.to_vec())
}

/// Active plans
pub async fn list_plans(State(state): State<AppState>) -> Json<ApiResponse<Vec<Plan>>> {
    ApiResponse::ok(state.plans.active_plans().cloned().collect())
}

/// One active plan
pub async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<ApiResponse<Plan>>, ApiError> {
    let plan = state
        .plans
        .get(&plan_id)
        .cloned()
        .ok_or(PaymentError::PlanNotFound { plan_id })?;
    Ok(ApiResponse::ok(plan))
}

/// Publishable provider settings and bank transfer details
pub async fn checkout_config(State(state): State<AppState>) -> Json<ApiResponse<CheckoutConfigResponse>> {
    let providers = &state.providers;
    ApiResponse::ok(CheckoutConfigResponse {
        stripe_publishable_key: providers.stripe_publishable_key.clone(),
        paypal_client_id: providers.paypal_client_id.clone(),
        test_mode: providers.is_test_mode(),
        bank: providers.bank.clone().map(|details| BankTransferInfo {
            formatted_iban: details.formatted_iban(),
            details,
        }),
    })
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            error: "Not found".to_string(),
        }),
    )
}
