//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET /health - Health check
/// - GET /api/v1/payment-methods?country=XX - Method catalog for a country
/// - GET /api/v1/plans - Active plans
/// - GET /api/v1/plans/{plan_id} - One plan
/// - GET /api/v1/checkout/config - Publishable keys and bank details
pub fn create_router(state: AppState) -> Router {
    // The checkout UI may be served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/payment-methods", get(handlers::list_payment_methods))
        .route("/plans", get(handlers::list_plans))
        .route("/plans/{plan_id}", get(handlers::get_plan))
        .route("/checkout/config", get(handlers::checkout_config));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use checkout_core::{BankDetails, BillingInterval, Currency, Plan, PlanCatalog, Price};
    use checkout_providers::ProviderConfig;
    use serde_json::Value;

    fn state(providers: ProviderConfig) -> AppState {
        let mut plans = PlanCatalog::new();
        plans.add(Plan::new(
            "pro-monthly",
            "Pro",
            Price::new(19.0, Currency::USD),
            BillingInterval::Monthly,
        ));
        let mut retired = Plan::new(
            "legacy",
            "Legacy",
            Price::new(5.0, Currency::USD),
            BillingInterval::Monthly,
        );
        retired.active = false;
        plans.add(retired);

        AppState::from_parts(AppConfig::from_lookup(|_| None), providers, plans)
    }

    fn server(providers: ProviderConfig) -> TestServer {
        TestServer::new(create_router(state(providers))).unwrap()
    }

    fn method_ids(body: &Value) -> Vec<String> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_health() {
        let response = server(ProviderConfig::new("http://localhost:3000/api"))
            .get("/health")
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_payment_methods_for_country() {
        let server = server(ProviderConfig::new("http://localhost:3000/api").with_stripe_key("pk_test_x"));

        let response = server
            .get("/api/v1/payment-methods")
            .add_query_param("country", "sn")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);

        let ids = method_ids(&body);
        assert!(ids.contains(&"wave".to_string()));
        assert!(ids.contains(&"orange_money".to_string()));
        assert!(!ids.contains(&"moov_money".to_string()));

        let card = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["id"] == "card")
            .unwrap();
        assert_eq!(card["available"], true);
        assert_eq!(card["needsConfiguration"], false);

        let paypal = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|m| m["id"] == "paypal")
            .unwrap();
        assert_eq!(paypal["available"], false);
        assert_eq!(paypal["needsConfiguration"], true);
    }

    #[tokio::test]
    async fn test_payment_methods_without_country() {
        let server = server(ProviderConfig::new("http://localhost:3000/api"));
        let body: Value = server.get("/api/v1/payment-methods").await.json();
        let ids = method_ids(&body);

        assert!(ids.contains(&"card".to_string()));
        assert!(!ids.contains(&"wave".to_string()));
        assert!(!ids.contains(&"mtn_momo".to_string()));
    }

    #[tokio::test]
    async fn test_plans() {
        let server = server(ProviderConfig::new("http://localhost:3000/api"));

        let body: Value = server.get("/api/v1/plans").await.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let response = server.get("/api/v1/plans/pro-monthly").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["price"]["amount"], 1900);
    }

    #[tokio::test]
    async fn test_unknown_or_inactive_plan_is_404() {
        let server = server(ProviderConfig::new("http://localhost:3000/api"));

        for id in ["legacy", "enterprise"] {
            let response = server.get(&format!("/api/v1/plans/{}", id)).await;
            response.assert_status(StatusCode::NOT_FOUND);
            let body: Value = response.json();
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], format!("Plan {} is not available", id));
        }
    }

    #[tokio::test]
    async fn test_checkout_config_exposes_bank_details() {
        let providers = ProviderConfig::new("http://localhost:3000/api")
            .with_stripe_key("pk_test_abc")
            .with_bank(BankDetails::new("GB82WEST12345698765432", "Acme Ltd").with_bic("WESTGB2L"));
        let body: Value = server(providers).get("/api/v1/checkout/config").await.json();

        assert_eq!(body["data"]["stripePublishableKey"], "pk_test_abc");
        assert_eq!(body["data"]["testMode"], true);
        assert_eq!(body["data"]["bank"]["iban"], "GB82WEST12345698765432");
        assert_eq!(body["data"]["bank"]["formattedIban"], "GB82 WEST 1234 5698 7654 32");
        assert_eq!(body["data"]["bank"]["accountHolder"], "Acme Ltd");
        assert!(body["data"].get("paypalClientId").is_none());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = server(ProviderConfig::new("http://localhost:3000/api"))
            .get("/api/v1/orders")
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["success"], false);
    }
}
